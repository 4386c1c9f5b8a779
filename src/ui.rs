use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::aggregates::{BudgetStatus, CategoryShare};
use crate::browser::{self, BrowserStore, GtagSink, InstallPrompt};
use crate::error::{Field, ValidationError};
use crate::format::format_currency;
use crate::model::{Category, ExpenseInput, ExpenseRecord, DATE_FORMAT};
use crate::repository::SystemClock;
use crate::shell::{ShellEvent, ShellState};
use crate::state::{AppState, NoticeKind};

type SubmitResult = Result<(), ValidationError>;

/// Bumped after every state mutation to re-render.
struct Revision(u64);

impl Reducible for Revision {
    type Action = ();

    fn reduce(self: Rc<Self>, _: ()) -> Rc<Self> {
        Rc::new(Revision(self.0.wrapping_add(1)))
    }
}

#[derive(PartialEq)]
struct Shell(ShellState);

impl Reducible for Shell {
    type Action = ShellEvent;

    fn reduce(self: Rc<Self>, event: ShellEvent) -> Rc<Self> {
        Rc::new(Shell(self.0.apply(event)))
    }
}

/// Show the scroll-to-top button past this offset, in CSS pixels.
const SCROLL_TOP_THRESHOLD: f64 = 400.0;

fn scrolled_far(offset: f64) -> bool {
    offset > SCROLL_TOP_THRESHOLD
}

/// Today's UTC calendar date, used for new expenses and export file names.
fn utc_today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

fn today_input() -> String {
    utc_today().format(DATE_FORMAT).to_string()
}

fn blank_form() -> ExpenseInput {
    ExpenseInput {
        date: today_input(),
        ..ExpenseInput::default()
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_mut_ref(|| {
        AppState::open(BrowserStore, SystemClock, Box::new(GtagSink))
    });
    let revision = use_reducer(|| Revision(0));
    let rerender = revision.dispatcher();
    let shell = use_reducer(|| Shell(ShellState::new(browser::is_online(), browser::is_installed())));
    let install_prompt = use_state(InstallPrompt::default);
    let editing = use_state(|| None::<i64>);
    let show_scroll_top = use_state_eq(|| false);

    {
        let dispatcher = shell.dispatcher();
        let prompt = (*install_prompt).clone();
        let sw_url = state.borrow().config().service_worker_url.clone();
        use_effect_with_deps(
            move |_| {
                browser::register_service_worker(sw_url);
                let listeners =
                    browser::watch_shell(prompt, move |event| dispatcher.dispatch(event));
                move || drop(listeners)
            },
            (),
        );
    }

    {
        let show_scroll_top = show_scroll_top.clone();
        use_effect_with_deps(
            move |_| {
                let listener = browser::watch_scroll(move |offset| {
                    show_scroll_top.set(scrolled_far(offset))
                });
                move || drop(listener)
            },
            (),
        );
    }

    let (dark_mode, notice, timeout_ms, notes_max_chars) = {
        let app = state.borrow();
        (
            app.dark_mode(),
            app.notice().cloned(),
            app.config().notice_timeout_ms,
            app.config().notes_max_chars,
        )
    };

    use_effect_with_deps(
        |dark: &bool| {
            browser::apply_theme(*dark);
            || ()
        },
        dark_mode,
    );

    {
        let state = state.clone();
        let rerender = rerender.clone();
        use_effect_with_deps(
            move |seq: &Option<u64>| {
                let timeout = seq.map(|seq| {
                    Timeout::new(timeout_ms, move || {
                        state.borrow_mut().expire_notice(seq);
                        rerender.dispatch(());
                    })
                });
                move || drop(timeout)
            },
            notice.as_ref().map(|n| n.seq),
        );
    }

    let on_toggle_theme = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: MouseEvent| {
            state.borrow_mut().toggle_dark_mode();
            rerender.dispatch(());
        })
    };

    let on_add = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |input: ExpenseInput| -> SubmitResult {
            let result = state.borrow_mut().add_expense(&input).map(|_| ());
            rerender.dispatch(());
            result
        })
    };

    let on_update = {
        let state = state.clone();
        let rerender = rerender.clone();
        let editing = editing.clone();
        Callback::from(move |(id, input): (i64, ExpenseInput)| -> SubmitResult {
            let result = state.borrow_mut().update_expense(id, &input).map(|_| ());
            if result.is_ok() {
                editing.set(None);
            }
            rerender.dispatch(());
            result
        })
    };

    let on_edit = {
        let editing = editing.clone();
        Callback::from(move |id: i64| editing.set(Some(id)))
    };

    let on_cancel_edit = {
        let editing = editing.clone();
        Callback::from(move |_: ()| editing.set(None))
    };

    let on_delete = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |id: i64| {
            let amount = match state.borrow().find(id) {
                Some(record) => record.amount,
                None => return,
            };
            if browser::confirm(&format!("Delete this ${:.2} expense?", amount)) {
                state.borrow_mut().delete_expense(id);
                rerender.dispatch(());
            }
        })
    };

    let on_export = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: MouseEvent| {
            let exported = state.borrow_mut().export_csv(utc_today(), |export| {
                browser::download_text(&export.file_name, &export.content, "text/csv")
            });
            if let Err(err) = exported {
                tracing::debug!(error = %err, "export failed; error notice shown");
            }
            rerender.dispatch(());
        })
    };

    let on_set_budget = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |input: String| -> bool {
            let ok = state.borrow_mut().set_budget_goal(&input).is_ok();
            rerender.dispatch(());
            ok
        })
    };

    let on_clear_budget = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: ()| {
            state.borrow_mut().clear_budget_goal();
            rerender.dispatch(());
        })
    };

    let on_dismiss_notice = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: MouseEvent| {
            state.borrow_mut().dismiss_notice();
            rerender.dispatch(());
        })
    };

    let on_dismiss_warning = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: MouseEvent| {
            state.borrow_mut().dismiss_storage_warning();
            rerender.dispatch(());
        })
    };

    let on_close_guide = {
        let state = state.clone();
        let rerender = rerender.clone();
        Callback::from(move |_: MouseEvent| {
            state.borrow_mut().dismiss_guide();
            rerender.dispatch(());
        })
    };

    let on_install = {
        let prompt = (*install_prompt).clone();
        let dispatcher = shell.dispatcher();
        Callback::from(move |_: MouseEvent| {
            let prompt = prompt.clone();
            let dispatcher = dispatcher.clone();
            spawn_local(async move {
                match prompt.prompt().await {
                    Ok(Some(outcome)) => {
                        tracing::info!(?outcome, "install prompt answered");
                        dispatcher.dispatch(ShellEvent::InstallPromptResolved(outcome));
                    }
                    Ok(None) => tracing::debug!("no install prompt available"),
                    Err(err) => tracing::error!(error = %err, "install prompt failed"),
                }
            });
        })
    };

    let on_dismiss_install = {
        let dispatcher = shell.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ShellEvent::InstallBannerDismissed))
    };

    let on_dismiss_offline = {
        let dispatcher = shell.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ShellEvent::OfflineBannerDismissed))
    };

    let app = state.borrow();
    let records = app.records().to_vec();
    let count = records.len();
    let editing_record = (*editing).and_then(|id| app.find(id).cloned());
    let shell_state = shell.0;

    html! {
        <div class="min-h-screen bg-background text-foreground">
            { if shell_state.offline_banner {
                html! { <OfflineBanner on_dismiss={on_dismiss_offline} /> }
            } else { html!{} } }

            <Header online={shell_state.online} dark_mode={dark_mode} on_toggle_theme={on_toggle_theme} />

            <main class="max-w-4xl mx-auto px-4 py-8 space-y-8">
                <TotalCard total={app.total()} count={count} />

                <BudgetAltimeter
                    goal={app.budget_goal()}
                    total={app.total()}
                    progress={app.budget_progress()}
                    status={app.budget_status()}
                    on_set={on_set_budget}
                    on_clear={on_clear_budget}
                />

                {
                    if let Some(warning) = app.storage_warning() {
                        html! {
                            <div class="flex items-center justify-between bg-yellow-50 border border-yellow-200 text-yellow-800 px-4 py-3 rounded" role="alert">
                                <span>{ warning }</span>
                                <button onclick={on_dismiss_warning} class="text-sm underline" aria-label="Dismiss warning">{"Dismiss"}</button>
                            </div>
                        }
                    } else { html!{} }
                }

                {
                    if let Some(notice) = notice {
                        let class = match notice.kind {
                            NoticeKind::Success => "flex items-center justify-between bg-green-50 border border-green-200 text-green-700 px-4 py-3 rounded",
                            NoticeKind::Error => "flex items-center justify-between bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded",
                        };
                        html! {
                            <div class={class} role="status" aria-live="polite">
                                <span>{ notice.message }</span>
                                <button onclick={on_dismiss_notice} class="text-sm" aria-label="Dismiss">{"×"}</button>
                            </div>
                        }
                    } else { html!{} }
                }

                <ExpenseForm notes_max_chars={notes_max_chars} on_submit={on_add} />

                <Breakdown shares={app.breakdown()} />

                <ExpenseList records={records} on_edit={on_edit} on_delete={on_delete} on_export={on_export} />
            </main>

            {
                if let Some(record) = editing_record {
                    html! { <EditDialog notes_max_chars={notes_max_chars} record={record} on_save={on_update} on_cancel={on_cancel_edit} /> }
                } else { html!{} }
            }

            { if app.show_guide() {
                html! { <OnboardingGuide on_close={on_close_guide} /> }
            } else { html!{} } }

            { if *show_scroll_top {
                html! {
                    <button
                        onclick={Callback::from(|_: MouseEvent| browser::scroll_to_top())}
                        class="fixed bottom-6 right-6 z-40 bg-primary text-primary-foreground rounded-full w-12 h-12 shadow-lg flex items-center justify-center"
                        aria-label="Scroll to top"
                    >
                        { icon_arrow_up() }
                    </button>
                }
            } else { html!{} } }

            { if shell_state.show_install_banner() {
                html! { <InstallBanner on_install={on_install} on_dismiss={on_dismiss_install} /> }
            } else { html!{} } }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct HeaderProps {
    online: bool,
    dark_mode: bool,
    on_toggle_theme: Callback<MouseEvent>,
}

#[function_component(Header)]
fn header(props: &HeaderProps) -> Html {
    let badge = if props.online {
        "text-xs px-2 py-1 rounded-full border bg-green-100 text-green-800 border-green-200"
    } else {
        "text-xs px-2 py-1 rounded-full border bg-red-100 text-red-800 border-red-200"
    };

    html! {
        <header class="sticky top-0 z-40 border-b border-border bg-card">
            <div class="max-w-4xl mx-auto px-4 h-16 flex items-center justify-between">
                <div class="flex items-center gap-2 font-bold text-lg">
                    { icon_plane() }
                    {"Flight Cost Tracker"}
                </div>
                <div class="flex items-center gap-3">
                    <span class={badge}>{ if props.online { "Online" } else { "Offline" } }</span>
                    <button onclick={props.on_toggle_theme.clone()} class="p-2 rounded-lg border border-border" aria-label="Toggle dark mode">
                        { if props.dark_mode { icon_sun() } else { icon_moon() } }
                    </button>
                </div>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
struct TotalCardProps {
    total: f64,
    count: usize,
}

#[function_component(TotalCard)]
fn total_card(props: &TotalCardProps) -> Html {
    html! {
        <section class="bg-card rounded-xl p-6 border border-border text-center">
            <p class="text-sm text-muted-foreground">{"Total Investment"}</p>
            <h2 class="text-4xl font-bold">{ format_currency(props.total) }</h2>
            <p class="text-sm text-muted-foreground mt-2">
                { format!("{} expense{} logged", props.count, if props.count == 1 { "" } else { "s" }) }
            </p>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct BudgetAltimeterProps {
    goal: f64,
    total: f64,
    progress: f64,
    status: BudgetStatus,
    /// Returns whether the goal was accepted.
    on_set: Callback<String, bool>,
    on_clear: Callback<()>,
}

#[function_component(BudgetAltimeter)]
fn budget_altimeter(props: &BudgetAltimeterProps) -> Html {
    let show_settings = use_state(|| false);
    let budget_input = use_state(|| {
        if props.goal > 0.0 {
            props.goal.to_string()
        } else {
            String::new()
        }
    });

    let on_toggle = {
        let show_settings = show_settings.clone();
        Callback::from(move |_: MouseEvent| show_settings.set(!*show_settings))
    };

    let on_set = {
        let on_set = props.on_set.clone();
        let budget_input = budget_input.clone();
        let show_settings = show_settings.clone();
        Callback::from(move |_: MouseEvent| {
            if on_set.emit((*budget_input).clone()) {
                show_settings.set(false);
            }
        })
    };

    let on_clear = {
        let on_clear = props.on_clear.clone();
        let budget_input = budget_input.clone();
        let show_settings = show_settings.clone();
        Callback::from(move |_: MouseEvent| {
            on_clear.emit(());
            budget_input.set(String::new());
            show_settings.set(false);
        })
    };

    let (bar_class, status_class) = match props.status {
        BudgetStatus::Exceeded => ("h-full bg-red-500", "text-red-600"),
        BudgetStatus::Warning => ("h-full bg-yellow-500", "text-yellow-600"),
        BudgetStatus::OnTrack => ("h-full bg-green-500", "text-green-600"),
        BudgetStatus::NoBudget => ("h-full bg-secondary", "text-muted-foreground"),
    };

    html! {
        <section id="budget-altimeter" class="bg-card rounded-xl p-6 border border-border">
            <div class="flex items-center justify-between mb-4">
                <h3 class="text-lg font-semibold">{"Budget Altimeter"}</h3>
                <button onclick={on_toggle} class="text-sm font-medium px-3 py-1 rounded-lg bg-secondary">
                    { if props.goal > 0.0 { "Adjust Course" } else { "Set Budget" } }
                </button>
            </div>

            { if props.goal > 0.0 {
                html! {
                    <>
                        <div class="flex items-center justify-between text-sm mb-2">
                            <span class="text-muted-foreground">
                                { format!("{} of {}", format_currency(props.total), format_currency(props.goal)) }
                            </span>
                            <span class={status_class}>{ props.status.text() }</span>
                        </div>
                        <div class="h-3 w-full bg-secondary rounded-full overflow-hidden">
                            <div class={bar_class} style={format!("width: {}%", props.progress)}></div>
                        </div>
                        <p class="text-right text-sm text-muted-foreground mt-2">
                            { format!("{:.1}% of budget used", props.progress) }
                        </p>
                    </>
                }
            } else {
                html! {
                    <p class="text-center py-6 text-muted-foreground">
                        {"No flight plan set. Click \"Set Budget\" to track your training journey."}
                    </p>
                }
            }}

            { if *show_settings {
                html! {
                    <div class="mt-4 pt-4 border-t border-border flex gap-2">
                        <input
                            type="number"
                            step="0.01"
                            min="0"
                            placeholder="Enter budget target"
                            value={(*budget_input).clone()}
                            oninput={Callback::from({
                                let budget_input = budget_input.clone();
                                move |e: InputEvent| {
                                    if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                                        budget_input.set(input.value());
                                    }
                                }
                            })}
                            class="flex-1 p-2 border rounded"
                        />
                        <button onclick={on_set} class="bg-primary text-primary-foreground px-4 rounded">{"Set"}</button>
                        { if props.goal > 0.0 {
                            html! { <button onclick={on_clear} class="px-4 rounded border border-border">{"Clear"}</button> }
                        } else { html!{} } }
                    </div>
                }
            } else { html!{} } }
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct ExpenseFieldsProps {
    id_prefix: &'static str,
    notes_max_chars: usize,
    value: ExpenseInput,
    errors: ValidationError,
    /// The new form value and the validated field that changed, if any.
    on_change: Callback<(ExpenseInput, Option<Field>)>,
}

#[function_component(ExpenseFields)]
fn expense_fields(props: &ExpenseFieldsProps) -> Html {
    let id = |name: &str| format!("{}{}", props.id_prefix, name);
    let input_class = |field: Field| {
        if props.errors.has(field) {
            "w-full p-2 border border-red-500 rounded"
        } else {
            "w-full p-2 border rounded"
        }
    };
    let error_text = |field: Field| match props.errors.message_for(field) {
        Some(message) => html! {
            <p id={format!("{}{}-error", props.id_prefix, field.name())} class="mt-1 text-xs text-red-600">{ message }</p>
        },
        None => html! {},
    };

    let on_amount = {
        let value = props.value.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                let next = ExpenseInput { amount: input.value(), ..value.clone() };
                on_change.emit((next, Some(Field::Amount)));
            }
        })
    };

    let on_category = {
        let value = props.value.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<web_sys::HtmlSelectElement>() {
                let next = ExpenseInput { category: select.value(), ..value.clone() };
                on_change.emit((next, Some(Field::Category)));
            }
        })
    };

    let on_date = {
        let value = props.value.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<web_sys::HtmlInputElement>() {
                let next = ExpenseInput { date: input.value(), ..value.clone() };
                on_change.emit((next, Some(Field::Date)));
            }
        })
    };

    let on_notes = {
        let value = props.value.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(area) = e.target_dyn_into::<web_sys::HtmlTextAreaElement>() {
                let next = ExpenseInput { notes: area.value(), ..value.clone() };
                on_change.emit((next, None));
            }
        })
    };

    html! {
        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
            <div>
                <label for={id("amount")} class="block text-sm font-semibold mb-1">{"Amount ($)"}</label>
                <input id={id("amount")} type="number" step="0.01" min="0" placeholder="0.00"
                    value={props.value.amount.clone()} oninput={on_amount} class={input_class(Field::Amount)} />
                { error_text(Field::Amount) }
            </div>
            <div>
                <label for={id("category")} class="block text-sm font-semibold mb-1">{"Category"}</label>
                <select id={id("category")} onchange={on_category} class={input_class(Field::Category)}>
                    <option value="" selected={props.value.category.is_empty()}>{"Select a category"}</option>
                    { for Category::ALL.iter().map(|c| html! {
                        <option value={c.label()} selected={props.value.category == c.label()}>{ c.label() }</option>
                    }) }
                </select>
                { error_text(Field::Category) }
            </div>
            <div>
                <label for={id("date")} class="block text-sm font-semibold mb-1">{"Date"}</label>
                <input id={id("date")} type="date" value={props.value.date.clone()} oninput={on_date} class={input_class(Field::Date)} />
                { error_text(Field::Date) }
            </div>
            <div>
                <label for={id("notes")} class="block text-sm font-semibold mb-1">{"Notes"}</label>
                <textarea id={id("notes")} rows="2" maxlength={props.notes_max_chars.to_string()} placeholder="Tail number, lesson, etc."
                    value={props.value.notes.clone()} oninput={on_notes} class="w-full p-2 border rounded" />
            </div>
        </div>
    }
}

fn on_field_change(
    form: UseStateHandle<ExpenseInput>,
    errors: UseStateHandle<ValidationError>,
) -> Callback<(ExpenseInput, Option<Field>)> {
    Callback::from(move |(next, field): (ExpenseInput, Option<Field>)| {
        if let Some(field) = field {
            let mut updated = (*errors).clone();
            updated.set(field, next.field_error(field));
            errors.set(updated);
        }
        form.set(next);
    })
}

#[derive(Properties, PartialEq)]
struct ExpenseFormProps {
    notes_max_chars: usize,
    on_submit: Callback<ExpenseInput, SubmitResult>,
}

#[function_component(ExpenseForm)]
fn expense_form(props: &ExpenseFormProps) -> Html {
    let form = use_state(blank_form);
    let errors = use_state(ValidationError::default);

    let on_change = on_field_change(form.clone(), errors.clone());

    let on_submit = {
        let form = form.clone();
        let errors = errors.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |_: MouseEvent| match on_submit.emit((*form).clone()) {
            Ok(()) => {
                form.set(blank_form());
                errors.set(ValidationError::default());
            }
            Err(failed) => errors.set(failed),
        })
    };

    html! {
        <section id="add-expense" class="bg-card rounded-xl p-6 border border-border" aria-label="Add expense form">
            <h2 class="text-2xl font-bold mb-4">{"Log Flight Training Expense"}</h2>
            <ExpenseFields id_prefix="" notes_max_chars={props.notes_max_chars} value={(*form).clone()} errors={(*errors).clone()} on_change={on_change} />
            <button onclick={on_submit} class="mt-4 w-full bg-primary text-primary-foreground py-2 rounded-lg font-semibold flex items-center justify-center gap-2">
                { icon_plus() }
                {"Add Expense"}
            </button>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct BreakdownProps {
    shares: Vec<CategoryShare>,
}

#[function_component(Breakdown)]
fn breakdown(props: &BreakdownProps) -> Html {
    if props.shares.is_empty() {
        return html! {};
    }

    html! {
        <section id="category-breakdown" class="bg-card rounded-xl p-6 border border-border">
            <h2 class="text-2xl font-bold mb-4">{"Spending by Category"}</h2>
            <div class="space-y-3">
                { for props.shares.iter().map(|share| html! {
                    <div>
                        <div class="flex justify-between text-sm mb-1">
                            <span class="font-medium">{ share.category.clone() }</span>
                            <span class="font-semibold">
                                { format!("{} ({:.1}%)", format_currency(share.amount), share.percentage) }
                            </span>
                        </div>
                        <div class="w-full bg-secondary rounded-full h-2">
                            <div class="bg-primary h-2 rounded-full" style={format!("width: {}%", share.percentage)}></div>
                        </div>
                    </div>
                }) }
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct ExpenseListProps {
    records: Vec<ExpenseRecord>,
    on_edit: Callback<i64>,
    on_delete: Callback<i64>,
    on_export: Callback<MouseEvent>,
}

#[function_component(ExpenseList)]
fn expense_list(props: &ExpenseListProps) -> Html {
    html! {
        <section id="expenses" class="bg-card rounded-xl p-6 border border-border">
            <h2 class="text-2xl font-bold mb-4">{"Expenses"}</h2>
            { if props.records.is_empty() {
                html! { <p class="text-center py-8 text-muted-foreground">{"No expenses logged yet. Add your first one above."}</p> }
            } else {
                html! {
                    <>
                        <div class="space-y-2">
                            { for props.records.iter().enumerate().map(|(idx, record)| {
                                let id = record.id;
                                let on_edit = props.on_edit.reform(move |_: MouseEvent| id);
                                let on_delete = props.on_delete.reform(move |_: MouseEvent| id);
                                let row_class = if idx % 2 == 0 { "p-4 rounded-lg bg-muted/30" } else { "p-4 rounded-lg" };
                                html! {
                                    <div key={id.to_string()} class={row_class}>
                                        <div class="flex items-center justify-between">
                                            <div>
                                                <div class="font-semibold">{ record.category.clone() }</div>
                                                <div class="text-sm text-muted-foreground">{ record.date.format(DATE_FORMAT).to_string() }</div>
                                            </div>
                                            <div class="flex items-center gap-3">
                                                <span class="text-lg font-bold">{ format_currency(record.amount) }</span>
                                                <button onclick={on_edit} class="text-sm text-blue-600" aria-label="Edit expense">{ icon_edit() }</button>
                                                <button onclick={on_delete} class="text-sm text-red-600" aria-label="Delete expense">{ icon_trash() }</button>
                                            </div>
                                        </div>
                                        { if record.notes.is_empty() {
                                            html! {}
                                        } else {
                                            html! { <div class="text-sm text-muted-foreground mt-2">{ record.notes.clone() }</div> }
                                        }}
                                    </div>
                                }
                            }) }
                        </div>
                        <button onclick={props.on_export.clone()} class="mt-4 flex items-center gap-2 bg-secondary px-4 py-2 rounded-lg font-medium">
                            { icon_download() }
                            {"Export CSV"}
                        </button>
                    </>
                }
            }}
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct EditDialogProps {
    notes_max_chars: usize,
    record: ExpenseRecord,
    on_save: Callback<(i64, ExpenseInput), SubmitResult>,
    on_cancel: Callback<()>,
}

#[function_component(EditDialog)]
fn edit_dialog(props: &EditDialogProps) -> Html {
    let form = {
        let record = props.record.clone();
        use_state(move || ExpenseInput::from_record(&record))
    };
    let errors = use_state(ValidationError::default);

    let on_change = on_field_change(form.clone(), errors.clone());

    let on_save = {
        let id = props.record.id;
        let form = form.clone();
        let errors = errors.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |_: MouseEvent| {
            if let Err(failed) = on_save.emit((id, (*form).clone())) {
                errors.set(failed);
            }
        })
    };

    let on_cancel = props.on_cancel.reform(|_: MouseEvent| ());
    let summary = errors.errors().first().map(|e| e.message);

    html! {
        <div class="fixed inset-0 bg-black/50 flex items-center justify-center p-4 z-50" role="dialog" aria-modal="true">
            <div class="bg-card rounded-lg shadow-xl max-w-md w-full p-6">
                <h3 class="text-xl font-semibold mb-4">{"Edit Expense"}</h3>
                { if let Some(message) = summary {
                    html! { <div class="bg-red-50 border border-red-200 text-red-700 px-4 py-3 rounded mb-4">{ message }</div> }
                } else { html!{} } }
                <ExpenseFields id_prefix="edit-" notes_max_chars={props.notes_max_chars} value={(*form).clone()} errors={(*errors).clone()} on_change={on_change} />
                <div class="flex gap-2 mt-4">
                    <button onclick={on_save} class="flex-1 bg-primary text-primary-foreground py-2 rounded-lg">{"Save Changes"}</button>
                    <button onclick={on_cancel} class="flex-1 border border-border py-2 rounded-lg">{"Cancel"}</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct InstallBannerProps {
    on_install: Callback<MouseEvent>,
    on_dismiss: Callback<MouseEvent>,
}

#[function_component(InstallBanner)]
fn install_banner(props: &InstallBannerProps) -> Html {
    html! {
        <div class="fixed bottom-4 left-4 right-4 z-50 md:left-auto md:right-4 md:w-96">
            <div class="bg-blue-600 text-white p-4 rounded-lg shadow-lg flex items-center justify-between">
                <div class="flex-1">
                    <h3 class="font-semibold text-sm">{"Install Flight Cost Tracker"}</h3>
                    <p class="text-xs mt-1 text-blue-100">{"Add to home screen for offline access"}</p>
                </div>
                <div class="flex gap-2 ml-4">
                    <button onclick={props.on_install.clone()} class="bg-white text-blue-600 px-3 py-1 rounded text-sm font-medium">{"Install"}</button>
                    <button onclick={props.on_dismiss.clone()} class="text-blue-100" aria-label="Dismiss install banner">{"×"}</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct OfflineBannerProps {
    on_dismiss: Callback<MouseEvent>,
}

#[function_component(OfflineBanner)]
fn offline_banner(props: &OfflineBannerProps) -> Html {
    html! {
        <div class="fixed top-0 left-0 right-0 z-50 bg-orange-500 text-white p-3">
            <div class="max-w-4xl mx-auto flex items-center justify-between">
                <span class="text-sm font-medium">{"You're offline. Some features may be limited."}</span>
                <div class="flex gap-3">
                    <button onclick={Callback::from(|_: MouseEvent| browser::reload())} class="text-sm underline">{"Refresh"}</button>
                    <button onclick={props.on_dismiss.clone()} class="text-sm" aria-label="Dismiss offline banner">{"×"}</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct OnboardingGuideProps {
    on_close: Callback<MouseEvent>,
}

#[function_component(OnboardingGuide)]
fn onboarding_guide(props: &OnboardingGuideProps) -> Html {
    html! {
        <div class="fixed inset-0 bg-black/50 flex items-center justify-center p-4 z-50" role="dialog" aria-modal="true">
            <div class="bg-card rounded-lg shadow-xl max-w-md w-full p-6">
                <div class="flex items-center justify-between mb-3">
                    <h3 class="text-xl font-semibold">{"Welcome aboard"}</h3>
                    <button onclick={props.on_close.clone()} aria-label="Close guide">{"×"}</button>
                </div>
                <ol class="list-decimal pl-5 space-y-1 text-sm">
                    <li>{"Set your training budget in the Budget Altimeter."}</li>
                    <li>{"Log expenses in Add Expense."}</li>
                    <li>{"Review the category breakdown and export CSV for records."}</li>
                </ol>
                <div class="mt-4 text-right">
                    <button onclick={props.on_close.clone()} class="bg-primary text-primary-foreground px-4 py-2 rounded-md">{"Got it"}</button>
                </div>
            </div>
        </div>
    }
}

fn icon_base(path: &'static str) -> Html {
    html! {
        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
            <path d={path}></path>
        </svg>
    }
}

fn icon_plane() -> Html {
    icon_base("M2 16l20-6-20-6 4 6-4 6zM6 10h16")
}
fn icon_moon() -> Html {
    icon_base("M21 12.79A9 9 0 1111.21 3a7 7 0 109.79 9.79z")
}
fn icon_sun() -> Html {
    icon_base("M12 17a5 5 0 100-10 5 5 0 000 10zM12 1v2M12 21v2M4.2 4.2l1.4 1.4M18.4 18.4l1.4 1.4M1 12h2M21 12h2")
}
fn icon_plus() -> Html {
    icon_base("M12 5v14M5 12h14")
}
fn icon_edit() -> Html {
    icon_base("M11 4H4v16h16v-7M18.5 2.5a2.1 2.1 0 013 3L12 15l-4 1 1-4z")
}
fn icon_trash() -> Html {
    icon_base("M3 6h18M8 6V4h8v2M6 6l1 14h10l1-14")
}
fn icon_arrow_up() -> Html {
    icon_base("M12 19V5M5 12l7-7 7 7")
}
fn icon_download() -> Html {
    icon_base("M21 15v4a2 2 0 01-2 2H5a2 2 0 01-2-2v-4M7 10l5 5 5-5M12 15V3")
}
