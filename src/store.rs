//! Persisted key-value storage.
//!
//! [`KeyValueStore`] is the narrow port over browser storage; the browser
//! implementation lives in [`crate::browser`]. [`PersistedStore`] knows the
//! fixed keys and their JSON shapes and is the only thing that reads or
//! writes them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::config::StorageKeys;
use crate::error::{Error, Result};
use crate::model::ExpenseRecord;

/// String-keyed, string-valued storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

/// In-memory storage with an optional size quota.
///
/// With a quota set, a write that would push the total size of keys and
/// values past it fails the way a full browser quota does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    quota: Cell<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: RefCell::default(),
            quota: Cell::new(Some(bytes)),
        }
    }

    /// Change the quota after the fact, e.g. to fail writes once data is seeded.
    #[cfg(test)]
    pub(crate) fn set_quota(&self, bytes: Option<usize>) {
        self.quota.set(bytes);
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota.get() {
            if self.used_without(key) + key.len() + value.len() > quota {
                return Err(Error::persistence(key, "QuotaExceededError"));
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the tracker's persisted values.
#[derive(Debug)]
pub struct PersistedStore<S> {
    inner: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> PersistedStore<S> {
    pub fn new(inner: S, keys: StorageKeys) -> Self {
        Self { inner, keys }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Load the expense collection.
    ///
    /// Missing, unreadable or malformed data yields an empty collection.
    pub fn load_expenses(&self) -> Vec<ExpenseRecord> {
        let key = &self.keys.expenses;
        match self.inner.get_item(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ExpenseRecord>>(&raw) {
                Ok(records) => {
                    tracing::debug!(count = records.len(), "loaded expenses");
                    records
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "discarding malformed expense data");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(%key, error = %err, "could not read expenses");
                Vec::new()
            }
        }
    }

    /// Write the full expense collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save_expenses(&self, records: &[ExpenseRecord]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.write(&self.keys.expenses, &raw)
    }

    pub fn load_dark_mode(&self) -> bool {
        let key = &self.keys.dark_mode;
        match self.inner.get_item(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(%key, error = %err, "ignoring malformed dark mode flag");
                false
            }),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(%key, error = %err, "could not read dark mode flag");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn save_dark_mode(&self, enabled: bool) -> Result<()> {
        let raw = serde_json::to_string(&enabled)?;
        self.write(&self.keys.dark_mode, &raw)
    }

    /// Load the budget goal; 0 means no goal.
    pub fn load_budget_goal(&self) -> f64 {
        let key = &self.keys.budget_goal;
        let raw = match self.inner.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return 0.0,
            Err(err) => {
                tracing::warn!(%key, error = %err, "could not read budget goal");
                return 0.0;
            }
        };
        match raw.trim().parse::<f64>() {
            Ok(goal) if goal.is_finite() && goal >= 0.0 => goal,
            _ => {
                tracing::warn!(%key, value = %raw, "ignoring malformed budget goal");
                0.0
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn save_budget_goal(&self, goal: f64) -> Result<()> {
        self.write(&self.keys.budget_goal, &goal.to_string())
    }

    /// True exactly once per browser profile: on the first call the
    /// onboarding flag is absent and gets written.
    pub fn first_visit(&self) -> bool {
        let key = &self.keys.onboarding_seen;
        match self.inner.get_item(key) {
            Ok(Some(_)) => false,
            Ok(None) => {
                if let Err(err) = self.write(key, "true") {
                    tracing::warn!(%key, error = %err, "could not record onboarding flag");
                }
                true
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "could not read onboarding flag");
                false
            }
        }
    }

    fn write(&self, key: &str, raw: &str) -> Result<()> {
        self.inner.set_item(key, raw).map_err(|err| {
            tracing::warn!(%key, error = %err, "storage write failed");
            match err {
                Error::Persistence { .. } => err,
                other => Error::persistence(key, other.to_string()),
            }
        })
    }
}
