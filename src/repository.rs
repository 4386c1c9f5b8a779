//! The in-memory expense collection, written through to storage after every
//! mutation.
//!
//! Writes are best effort: when storage refuses a write the change still
//! applies in memory and the failure comes back as a warning on [`Saved`].

use crate::error::{Error, Result};
use crate::model::{ExpenseRecord, ValidatedExpense};
use crate::store::{KeyValueStore, PersistedStore};

/// Source of wall-clock milliseconds for record ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// The result of a mutation that has been applied in memory.
#[derive(Debug)]
#[must_use]
pub struct Saved<T> {
    pub value: T,
    /// Set when the write to storage failed.
    pub warning: Option<Error>,
}

impl<T> Saved<T> {
    pub(crate) fn new(value: T, written: Result<()>) -> Self {
        Self {
            value,
            warning: written.err(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Owns the ordered expense collection, newest first.
pub struct ExpenseRepository<S, C = SystemClock> {
    records: Vec<ExpenseRecord>,
    store: PersistedStore<S>,
    clock: C,
    last_id: i64,
}

impl<S: KeyValueStore, C: Clock> ExpenseRepository<S, C> {
    /// Load the persisted collection. Never fails; bad data means empty.
    pub fn open(store: PersistedStore<S>, clock: C) -> Self {
        let records = store.load_expenses();
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::info!(count = records.len(), "opened expense repository");
        Self {
            records,
            store,
            clock,
            last_id,
        }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: i64) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn store(&self) -> &PersistedStore<S> {
        &self.store
    }

    /// Create a record at the front of the collection.
    pub fn add(&mut self, expense: ValidatedExpense) -> Saved<ExpenseRecord> {
        let record = ExpenseRecord {
            id: self.next_id(),
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            notes: expense.notes,
        };
        self.records.insert(0, record.clone());
        tracing::info!(id = record.id, category = %record.category, "added expense");
        Saved::new(record, self.persist())
    }

    /// Replace a record in place, keeping its id and position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id; nothing changes.
    pub fn update(&mut self, id: i64, expense: ValidatedExpense) -> Result<Saved<ExpenseRecord>> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(Error::NotFound(id))?;

        *slot = ExpenseRecord {
            id,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            notes: expense.notes,
        };
        let record = slot.clone();
        tracing::info!(id, category = %record.category, "updated expense");
        Ok(Saved::new(record, self.persist()))
    }

    /// Remove a record. Removing an unknown id is not an error.
    pub fn remove(&mut self, id: i64) -> Saved<Option<ExpenseRecord>> {
        let removed = self
            .records
            .iter()
            .position(|r| r.id == id)
            .map(|idx| self.records.remove(idx));
        match &removed {
            Some(record) => tracing::info!(id, category = %record.category, "removed expense"),
            None => tracing::debug!(id, "expense already removed"),
        }
        Saved::new(removed, self.persist())
    }

    fn next_id(&mut self) -> i64 {
        let id = match self.last_id.checked_add(1) {
            Some(floor) => self.clock.now_millis().max(floor),
            None => {
                tracing::warn!(last_id = self.last_id, "id space exhausted; reusing a free id");
                self.smallest_free_id()
            }
        };
        self.last_id = self.last_id.max(id);
        id
    }

    /// Lowest positive id no record holds.
    fn smallest_free_id(&self) -> i64 {
        let mut used: Vec<i64> = self.records.iter().map(|r| r.id).filter(|id| *id > 0).collect();
        used.sort_unstable();
        let mut candidate = 1;
        for id in used {
            if id == candidate {
                candidate += 1;
            } else if id > candidate {
                break;
            }
        }
        candidate
    }

    fn persist(&self) -> Result<()> {
        self.store.save_expenses(&self.records)
    }
}
