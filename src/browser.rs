//! Browser implementations of the storage, analytics and shell ports.
//!
//! Everything here calls into `web_sys`/`js_sys` and only does anything
//! useful when compiled to wasm and running in a page.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Blob, BlobPropertyBag, Event, HtmlAnchorElement, ScrollBehavior, ScrollToOptions,
    ServiceWorkerRegistration, Url,
};

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::error::{Error, Result};
use crate::shell::{InstallOutcome, ShellEvent};
use crate::store::KeyValueStore;

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(context: &str, value: JsValue) -> Error {
    Error::platform(format!("{context}: {}", describe(&value)))
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| Error::platform("no window"))
}

/// `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

impl BrowserStore {
    fn storage(&self) -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| Error::Storage("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|err| Error::Storage(describe(&err)))?
            .ok_or_else(|| Error::Storage("localStorage is disabled".to_string()))
    }
}

impl KeyValueStore for BrowserStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|err| Error::Storage(describe(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| Error::persistence(key, describe(&err)))
    }
}

/// Forwards events to `window.gtag` when the page has loaded it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GtagSink;

impl AnalyticsSink for GtagSink {
    fn emit(&self, event: &AnalyticsEvent) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let gtag = match Reflect::get(&window, &JsValue::from_str("gtag")) {
            Ok(value) if value.is_function() => value.unchecked_into::<Function>(),
            _ => {
                tracing::trace!(action = event.action(), "gtag not loaded; dropping event");
                return;
            }
        };

        let params = Object::new();
        let _ = Reflect::set(
            &params,
            &JsValue::from_str("event_category"),
            &JsValue::from_str(event.event_category()),
        );
        let _ = Reflect::set(
            &params,
            &JsValue::from_str("event_label"),
            &JsValue::from_str(event.label()),
        );
        if let Some(value) = event.value() {
            let _ = Reflect::set(&params, &JsValue::from_str("value"), &JsValue::from_f64(value));
        }

        if let Err(err) = gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("event"),
            &JsValue::from_str(event.action()),
            &params,
        ) {
            tracing::debug!(action = event.action(), error = %describe(&err), "gtag call failed");
        }
    }
}

/// Offer `content` to the user as a file download.
///
/// # Errors
///
/// Returns an error if any of the DOM calls fail.
pub fn download_text(file_name: &str, content: &str, mime: &str) -> Result<()> {
    let document = window()?
        .document()
        .ok_or_else(|| Error::platform("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| Error::platform("no document body"))?;

    let parts = Array::of1(&JsValue::from_str(content));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
        .map_err(|err| js_error("create blob", err))?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|err| js_error("create object URL", err))?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|err| js_error("create anchor", err))?
        .dyn_into()
        .map_err(|_| Error::platform("created element is not an anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);

    body.append_child(&anchor)
        .map_err(|err| js_error("attach anchor", err))?;
    anchor.click();
    let _ = body.remove_child(&anchor);

    Url::revoke_object_url(&url).map_err(|err| js_error("revoke object URL", err))?;
    tracing::debug!(file = file_name, "download started");
    Ok(())
}

/// Toggle the `dark` class on the document element.
pub fn apply_theme(dark: bool) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    if let Err(err) = root.class_list().toggle_with_force("dark", dark) {
        tracing::warn!(error = %describe(&err), "could not apply theme");
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn reload() {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().reload() {
            tracing::warn!(error = %describe(&err), "reload failed");
        }
    }
}

/// Smooth-scroll the page back to the top.
pub fn scroll_to_top() {
    if let Some(window) = web_sys::window() {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }
}

/// Call `on_scroll` with the vertical scroll offset whenever the page scrolls.
pub fn watch_scroll<F>(on_scroll: F) -> Option<EventListener>
where
    F: Fn(f64) + 'static,
{
    let window = web_sys::window()?;
    let target = window.clone();
    Some(EventListener::new(&window, "scroll", move |_| {
        on_scroll(target.scroll_y().unwrap_or(0.0));
    }))
}

/// `navigator.onLine`; assumes online when there is no window.
pub fn is_online() -> bool {
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(true)
}

/// Whether the app is running as an installed, standalone app.
pub fn is_installed() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let standalone = window
        .match_media("(display-mode: standalone)")
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);
    // iOS Safari exposes navigator.standalone instead
    let ios_standalone = Reflect::get(&window.navigator(), &JsValue::from_str("standalone"))
        .map(|v| v.as_bool() == Some(true))
        .unwrap_or(false);
    standalone || ios_standalone
}

/// Register the offline-caching service worker, if the browser has them.
/// Failure is logged and otherwise ignored.
pub fn register_service_worker(url: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        tracing::info!("service workers not supported");
        return;
    }

    let promise = navigator.service_worker().register(&url);
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(registration) => {
                let registration: ServiceWorkerRegistration = registration.unchecked_into();
                tracing::info!(scope = %registration.scope(), "service worker registered");
            }
            Err(err) => {
                tracing::error!(%url, error = %describe(&err), "service worker registration failed");
            }
        }
    });
}

/// The deferred `beforeinstallprompt` event, kept until the user asks to
/// install.
#[derive(Clone, Default)]
pub struct InstallPrompt {
    deferred: Rc<RefCell<Option<Event>>>,
}

impl PartialEq for InstallPrompt {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.deferred, &other.deferred)
    }
}

impl InstallPrompt {
    /// Show the platform install flow and wait for the user's answer.
    ///
    /// Returns `Ok(None)` when no prompt is available. The prompt is used up
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown.
    pub async fn prompt(&self) -> Result<Option<InstallOutcome>> {
        let Some(event) = self.deferred.borrow_mut().take() else {
            return Ok(None);
        };

        let prompt: Function = Reflect::get(&event, &JsValue::from_str("prompt"))
            .map_err(|err| js_error("read prompt()", err))?
            .dyn_into()
            .map_err(|_| Error::platform("install prompt is not callable"))?;
        let shown = prompt
            .call0(&event)
            .map_err(|err| js_error("prompt()", err))?;
        JsFuture::from(Promise::resolve(&shown))
            .await
            .map_err(|err| js_error("prompt()", err))?;

        let choice = Reflect::get(&event, &JsValue::from_str("userChoice"))
            .map_err(|err| js_error("read userChoice", err))?;
        let choice = JsFuture::from(Promise::resolve(&choice))
            .await
            .map_err(|err| js_error("userChoice", err))?;
        let outcome = Reflect::get(&choice, &JsValue::from_str("outcome"))
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default();

        Ok(Some(InstallOutcome::from_platform(&outcome)))
    }

    fn defer(&self, event: Event) {
        *self.deferred.borrow_mut() = Some(event);
    }

    fn discard(&self) {
        self.deferred.borrow_mut().take();
    }
}

/// Listen for connectivity and install lifecycle events.
///
/// The listeners stay attached until the returned handles are dropped.
pub fn watch_shell<F>(prompt: InstallPrompt, on_event: F) -> Vec<EventListener>
where
    F: Fn(ShellEvent) + 'static,
{
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let on_event: Rc<dyn Fn(ShellEvent)> = Rc::new(on_event);
    let mut listeners = Vec::with_capacity(4);

    for (name, event) in [("online", ShellEvent::Online), ("offline", ShellEvent::Offline)] {
        let on_event = on_event.clone();
        listeners.push(EventListener::new(&window, name, move |_| {
            tracing::info!(?event, "connectivity changed");
            on_event(event);
        }));
    }

    {
        let on_event = on_event.clone();
        let prompt = prompt.clone();
        listeners.push(EventListener::new_with_options(
            &window,
            "beforeinstallprompt",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                prompt.defer(event.clone());
                on_event(ShellEvent::InstallPromptAvailable);
            },
        ));
    }

    listeners.push(EventListener::new(&window, "appinstalled", move |_| {
        tracing::info!("app installed");
        prompt.discard();
        on_event(ShellEvent::AppInstalled);
    }));

    listeners
}
