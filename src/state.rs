//! Application state owned by the root component.
//!
//! Presentation code reads from [`AppState`] and mutates only through its
//! methods, which route to the repository or preferences, emit analytics and
//! set the notices the page shows.

use chrono::NaiveDate;

use crate::aggregates::{self, BudgetStatus, CategoryShare};
use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::config::AppConfig;
use crate::error::{Result, ValidationError};
use crate::export;
use crate::model::{ExpenseInput, ExpenseRecord};
use crate::preferences::Preferences;
use crate::repository::{Clock, ExpenseRepository, Saved, SystemClock};
use crate::store::{KeyValueStore, PersistedStore};

pub const STORAGE_WARNING: &str = "Storage quota exceeded. Please export your data.";
pub const FORM_ERROR: &str = "Please fix the highlighted fields";
pub const BUDGET_ERROR: &str = "Please enter a valid budget amount greater than 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short-lived status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Increases with every notice so a timer only clears its own.
    pub seq: u64,
}

/// A rendered CSV export ready to hand to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub struct AppState<S, C = SystemClock> {
    config: AppConfig,
    expenses: ExpenseRepository<S, C>,
    preferences: Preferences<S>,
    analytics: Box<dyn AnalyticsSink>,
    notice: Option<Notice>,
    notice_seq: u64,
    storage_warning: bool,
    show_guide: bool,
}

impl<S: KeyValueStore + Clone, C: Clock> AppState<S, C> {
    /// Load configuration and all persisted state from `store`.
    pub fn open(store: S, clock: C, analytics: Box<dyn AnalyticsSink>) -> Self {
        let config = AppConfig::load(&store);
        let expenses = ExpenseRepository::open(
            PersistedStore::new(store.clone(), config.storage.clone()),
            clock,
        );
        let preferences = Preferences::load(PersistedStore::new(store, config.storage.clone()));
        let show_guide = preferences.take_first_visit();
        Self {
            config,
            expenses,
            preferences,
            analytics,
            notice: None,
            notice_seq: 0,
            storage_warning: false,
            show_guide,
        }
    }
}

impl<S: KeyValueStore, C: Clock> AppState<S, C> {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.expenses.records()
    }

    pub fn find(&self, id: i64) -> Option<&ExpenseRecord> {
        self.expenses.find(id)
    }

    pub fn total(&self) -> f64 {
        aggregates::total(self.records())
    }

    pub fn breakdown(&self) -> Vec<CategoryShare> {
        aggregates::category_breakdown(self.records())
    }

    pub fn budget_goal(&self) -> f64 {
        self.preferences.budget_goal()
    }

    pub fn budget_progress(&self) -> f64 {
        aggregates::budget_progress(self.records(), self.budget_goal())
    }

    pub fn budget_status(&self) -> BudgetStatus {
        aggregates::budget_status(self.records(), self.budget_goal())
    }

    pub fn dark_mode(&self) -> bool {
        self.preferences.dark_mode()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The persistence warning, while it has not been dismissed.
    pub fn storage_warning(&self) -> Option<&'static str> {
        self.storage_warning.then_some(STORAGE_WARNING)
    }

    pub fn show_guide(&self) -> bool {
        self.show_guide
    }

    /// Log a new expense from the add form.
    ///
    /// # Errors
    ///
    /// Returns the failing fields; the collection is unchanged.
    pub fn add_expense(
        &mut self,
        input: &ExpenseInput,
    ) -> std::result::Result<ExpenseRecord, ValidationError> {
        let expense = match input.validate(self.config.notes_max_chars) {
            Ok(expense) => expense,
            Err(errors) => {
                tracing::debug!(%errors, "rejected new expense");
                self.set_notice(NoticeKind::Error, FORM_ERROR);
                return Err(errors);
            }
        };

        let saved = self.expenses.add(expense);
        let record = self.settle(saved);
        self.analytics.emit(&AnalyticsEvent::ExpenseAdded {
            category: record.category.clone(),
            amount: record.amount,
        });
        self.set_notice(NoticeKind::Success, "Expense added successfully!");
        Ok(record)
    }

    /// Apply the edit dialog to an existing expense.
    ///
    /// Returns `Ok(None)` when the expense has gone away in the meantime;
    /// that is a no-op rather than an error.
    ///
    /// # Errors
    ///
    /// Returns the failing fields; the record is unchanged.
    pub fn update_expense(
        &mut self,
        id: i64,
        input: &ExpenseInput,
    ) -> std::result::Result<Option<ExpenseRecord>, ValidationError> {
        let expense = input.validate(self.config.notes_max_chars)?;

        match self.expenses.update(id, expense) {
            Ok(saved) => {
                let record = self.settle(saved);
                self.analytics.emit(&AnalyticsEvent::ExpenseEdited {
                    category: record.category.clone(),
                    amount: record.amount,
                });
                self.set_notice(NoticeKind::Success, "Expense updated successfully!");
                Ok(Some(record))
            }
            Err(err) => {
                tracing::debug!(id, error = %err, "edit target missing");
                Ok(None)
            }
        }
    }

    /// Delete an expense; deleting one that is already gone does nothing.
    pub fn delete_expense(&mut self, id: i64) -> Option<ExpenseRecord> {
        let saved = self.expenses.remove(id);
        let removed = self.settle(saved);
        if let Some(record) = &removed {
            self.analytics.emit(&AnalyticsEvent::ExpenseDeleted {
                category: record.category.clone(),
            });
        }
        removed
    }

    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidBudget`] unless the text is a positive number.
    pub fn set_budget_goal(&mut self, input: &str) -> Result<f64> {
        match self.preferences.set_budget_goal(input) {
            Ok(saved) => {
                let goal = self.settle(saved);
                self.analytics.emit(&AnalyticsEvent::BudgetSet { amount: goal });
                self.set_notice(NoticeKind::Success, "Budget goal set successfully!");
                Ok(goal)
            }
            Err(err) => {
                self.set_notice(NoticeKind::Error, BUDGET_ERROR);
                Err(err)
            }
        }
    }

    pub fn clear_budget_goal(&mut self) {
        let saved = self.preferences.clear_budget_goal();
        self.settle(saved);
        self.set_notice(NoticeKind::Success, "Budget goal cleared!");
    }

    /// Flip the theme and return the new dark-mode flag.
    pub fn toggle_dark_mode(&mut self) -> bool {
        let saved = self.preferences.toggle_dark_mode();
        // a theme that fails to persist only resets on reload
        if let Some(err) = &saved.warning {
            tracing::warn!(error = %err, "dark mode preference not saved");
        }
        let dark = saved.value;
        self.analytics.emit(&AnalyticsEvent::ThemeToggled {
            theme: if dark { "dark" } else { "light" },
        });
        dark
    }

    /// Render the collection as CSV and pass it to `deliver`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or delivery fails; an error notice is
    /// set in that case.
    pub fn export_csv<F>(&mut self, today: NaiveDate, deliver: F) -> Result<()>
    where
        F: FnOnce(&CsvExport) -> Result<()>,
    {
        let result = export::to_csv(self.records()).and_then(|content| {
            let export = CsvExport {
                file_name: export::export_file_name(&self.config.export_file_prefix, today),
                content,
            };
            deliver(&export)?;
            Ok(export)
        });

        match result {
            Ok(export) => {
                tracing::info!(file = %export.file_name, rows = self.records().len(), "exported CSV");
                self.analytics
                    .emit(&AnalyticsEvent::DataExported { format: "CSV" });
                self.set_notice(NoticeKind::Success, "CSV exported successfully!");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "CSV export failed");
                self.set_notice(NoticeKind::Error, "Could not export CSV.");
                Err(err)
            }
        }
    }

    /// Clear the notice if it is still the one numbered `seq`.
    pub fn expire_notice(&mut self, seq: u64) {
        if self.notice.as_ref().is_some_and(|n| n.seq == seq) {
            self.notice = None;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn dismiss_storage_warning(&mut self) {
        self.storage_warning = false;
    }

    pub fn dismiss_guide(&mut self) {
        self.show_guide = false;
    }

    fn set_notice(&mut self, kind: NoticeKind, message: &str) {
        self.notice_seq += 1;
        self.notice = Some(Notice {
            kind,
            message: message.to_string(),
            seq: self.notice_seq,
        });
    }

    /// Keep the in-memory result; raise the storage warning if the write
    /// did not land.
    fn settle<T>(&mut self, saved: Saved<T>) -> T {
        if let Some(err) = saved.warning {
            tracing::warn!(error = %err, "change kept in memory only");
            if err.is_persistence() {
                self.storage_warning = true;
            }
        }
        saved.value
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::analytics::RecordingSink;
    use crate::error::{Error, Field};
    use crate::logging::init_test_logging;
    use crate::repository::tests::FixedClock;
    use crate::store::MemoryStore;

    fn state_with(store: Rc<MemoryStore>) -> (AppState<Rc<MemoryStore>, FixedClock>, RecordingSink) {
        init_test_logging();
        let sink = RecordingSink::new();
        let state = AppState::open(store, FixedClock::at(1_000), Box::new(sink.clone()));
        (state, sink)
    }

    fn state() -> (AppState<Rc<MemoryStore>, FixedClock>, RecordingSink) {
        state_with(Rc::new(MemoryStore::new()))
    }

    fn fuel() -> ExpenseInput {
        ExpenseInput::new("120.50", "Fuel Costs", "2024-05-01", "")
    }

    #[test]
    fn test_add_expense_updates_aggregates() {
        let (mut state, sink) = state();
        let record = state.add_expense(&fuel()).unwrap();

        assert_eq!(state.total(), 120.50);
        let breakdown = state.breakdown();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, "Fuel Costs");
        assert_eq!(breakdown[0].percentage, 100.0);

        assert_eq!(
            sink.events(),
            vec![AnalyticsEvent::ExpenseAdded {
                category: "Fuel Costs".to_string(),
                amount: 120.50
            }]
        );
        let notice = state.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "Expense added successfully!");
        assert_eq!(state.find(record.id), Some(&record));
    }

    #[test]
    fn test_rejected_expense_changes_nothing() {
        let (mut state, sink) = state();
        let err = state
            .add_expense(&ExpenseInput::new("-5", "Fuel Costs", "2024-05-01", ""))
            .unwrap_err();
        assert!(err.has(Field::Amount));
        assert!(state.records().is_empty());
        assert!(sink.events().is_empty());
        assert_eq!(state.notice().map(|n| n.message.as_str()), Some(FORM_ERROR));
    }

    #[test]
    fn test_update_expense_and_missing_target() {
        let (mut state, sink) = state();
        let record = state.add_expense(&fuel()).unwrap();

        let edited = state
            .update_expense(
                record.id,
                &ExpenseInput::new("99", "Aircraft Rental", "2024-05-02", "C172"),
            )
            .unwrap()
            .unwrap();
        assert_eq!(edited.id, record.id);
        assert_eq!(state.total(), 99.0);

        let missing = state.update_expense(7, &fuel()).unwrap();
        assert!(missing.is_none());
        assert_eq!(sink.actions(), vec!["expense_added", "expense_edited"]);
    }

    #[test]
    fn test_invalid_edit_keeps_record() {
        let (mut state, _) = state();
        let record = state.add_expense(&fuel()).unwrap();
        let err = state
            .update_expense(record.id, &ExpenseInput::new("", "", "2024-05-01", ""))
            .unwrap_err();
        assert!(err.has(Field::Amount));
        assert!(err.has(Field::Category));
        assert_eq!(state.records(), &[record]);
    }

    #[test]
    fn test_delete_emits_once() {
        let (mut state, sink) = state();
        let record = state.add_expense(&fuel()).unwrap();
        assert!(state.delete_expense(record.id).is_some());
        assert!(state.delete_expense(record.id).is_none());
        assert!(state.records().is_empty());
        assert_eq!(sink.actions(), vec!["expense_added", "expense_deleted"]);
    }

    #[test]
    fn test_budget_goal_warning_scenario() {
        let (mut state, sink) = state();
        state
            .add_expense(&ExpenseInput::new("8500", "Aircraft Rental", "2024-05-01", ""))
            .unwrap();
        assert_eq!(state.set_budget_goal("10000").unwrap(), 10000.0);
        assert_eq!(state.budget_progress(), 85.0);
        assert_eq!(state.budget_status(), BudgetStatus::Warning);
        assert!(sink.actions().contains(&"budget_set"));

        state.clear_budget_goal();
        assert_eq!(state.budget_status(), BudgetStatus::NoBudget);
        assert_eq!(
            state.notice().map(|n| n.message.as_str()),
            Some("Budget goal cleared!")
        );
    }

    #[test]
    fn test_invalid_budget_goal_sets_error_notice() {
        let (mut state, _) = state();
        let err = state.set_budget_goal("zero").unwrap_err();
        assert!(matches!(err, Error::InvalidBudget { .. }));
        assert_eq!(state.notice().map(|n| n.message.as_str()), Some(BUDGET_ERROR));
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Error);
        assert_eq!(state.budget_goal(), 0.0);
    }

    #[test]
    fn test_toggle_dark_mode_emits_theme() {
        let (mut state, sink) = state();
        assert!(state.toggle_dark_mode());
        assert!(!state.toggle_dark_mode());
        assert_eq!(
            sink.events(),
            vec![
                AnalyticsEvent::ThemeToggled { theme: "dark" },
                AnalyticsEvent::ThemeToggled { theme: "light" },
            ]
        );
    }

    #[test]
    fn test_export_delivers_csv() {
        let (mut state, sink) = state();
        state.add_expense(&fuel()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        let mut delivered = None;
        state
            .export_csv(today, |export| {
                delivered = Some(export.clone());
                Ok(())
            })
            .unwrap();

        let export = delivered.unwrap();
        assert_eq!(export.file_name, "flight-training-expenses-2024-05-03.csv");
        assert!(export.content.starts_with("Date,Category,Amount,Notes\n"));
        assert!(export.content.contains("2024-05-01,Fuel Costs,120.50,\"\""));
        assert_eq!(sink.actions().last(), Some(&"data_exported"));
    }

    #[test]
    fn test_failed_delivery_reports_error() {
        let (mut state, sink) = state();
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let result = state.export_csv(today, |_| Err(Error::platform("no document")));
        assert!(result.is_err());
        assert_eq!(state.notice().unwrap().kind, NoticeKind::Error);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_storage_failure_raises_dismissible_warning() {
        let (mut state, _) = state_with(Rc::new(MemoryStore::with_quota(40)));
        state.add_expense(&fuel()).unwrap();
        assert_eq!(state.records().len(), 1);
        assert_eq!(state.storage_warning(), Some(STORAGE_WARNING));

        state.dismiss_storage_warning();
        assert_eq!(state.storage_warning(), None);
    }

    /// A state whose store accepted `seed` and then refuses every write.
    fn state_with_full_storage(
        seed: impl FnOnce(&mut AppState<Rc<MemoryStore>, FixedClock>),
    ) -> (AppState<Rc<MemoryStore>, FixedClock>, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        let (mut state, _) = state_with(store.clone());
        seed(&mut state);
        store.set_quota(Some(0));
        (state, store)
    }

    #[test]
    fn test_failed_update_write_keeps_edit() {
        let mut id = 0;
        let (mut state, store) = state_with_full_storage(|state| {
            id = state.add_expense(&fuel()).unwrap().id;
        });
        let stored = store.get_item("flightExpenses").unwrap();

        let edited = state
            .update_expense(id, &ExpenseInput::new("99", "Aircraft Rental", "2024-05-02", ""))
            .unwrap()
            .unwrap();
        assert_eq!(state.find(id), Some(&edited));
        assert_eq!(state.total(), 99.0);
        assert_eq!(state.storage_warning(), Some(STORAGE_WARNING));
        assert_eq!(store.get_item("flightExpenses").unwrap(), stored);
    }

    #[test]
    fn test_failed_delete_write_keeps_removal() {
        let mut id = 0;
        let (mut state, store) = state_with_full_storage(|state| {
            id = state.add_expense(&fuel()).unwrap().id;
        });
        let stored = store.get_item("flightExpenses").unwrap();

        assert!(state.delete_expense(id).is_some());
        assert!(state.records().is_empty());
        assert_eq!(state.storage_warning(), Some(STORAGE_WARNING));
        assert_eq!(store.get_item("flightExpenses").unwrap(), stored);
    }

    #[test]
    fn test_failed_budget_write_keeps_new_goal() {
        let (mut state, store) = state_with_full_storage(|state| {
            state.set_budget_goal("10000").unwrap();
        });

        assert_eq!(state.set_budget_goal("12000").unwrap(), 12000.0);
        assert_eq!(state.budget_goal(), 12000.0);
        assert_eq!(state.storage_warning(), Some(STORAGE_WARNING));
        assert_eq!(store.get_item("budgetGoal").unwrap().as_deref(), Some("10000"));
    }

    #[test]
    fn test_failed_budget_clear_write_keeps_cleared_goal() {
        let (mut state, store) = state_with_full_storage(|state| {
            state.set_budget_goal("10000").unwrap();
        });

        state.clear_budget_goal();
        assert_eq!(state.budget_goal(), 0.0);
        assert_eq!(state.budget_status(), BudgetStatus::NoBudget);
        assert_eq!(state.storage_warning(), Some(STORAGE_WARNING));
        assert_eq!(store.get_item("budgetGoal").unwrap().as_deref(), Some("10000"));
    }

    #[test]
    fn test_notice_expiry_only_clears_own_notice() {
        let (mut state, _) = state();
        state.add_expense(&fuel()).unwrap();
        let first = state.notice().unwrap().seq;
        state.clear_budget_goal();
        state.expire_notice(first);
        assert!(state.notice().is_some());

        let second = state.notice().unwrap().seq;
        state.expire_notice(second);
        assert!(state.notice().is_none());
    }

    #[test]
    fn test_guide_shown_on_first_open_only() {
        let store = Rc::new(MemoryStore::new());
        let (mut first, _) = state_with(store.clone());
        assert!(first.show_guide());
        first.dismiss_guide();
        assert!(!first.show_guide());

        let (second, _) = state_with(store);
        assert!(!second.show_guide());
    }

    #[test]
    fn test_state_reloads_from_shared_store() {
        let store = Rc::new(MemoryStore::new());
        let (mut state, _) = state_with(store.clone());
        state.add_expense(&fuel()).unwrap();
        state.set_budget_goal("2500").unwrap();
        state.toggle_dark_mode();

        let (reloaded, _) = state_with(store);
        assert_eq!(reloaded.records(), state.records());
        assert_eq!(reloaded.budget_goal(), 2500.0);
        assert!(reloaded.dark_mode());
    }

    #[test]
    fn test_config_override_changes_notes_limit() {
        let store = Rc::new(MemoryStore::new());
        store
            .set_item(crate::config::CONFIG_KEY, r#"{"notes_max_chars": 5}"#)
            .unwrap();
        let (mut state, _) = state_with(store);
        let record = state
            .add_expense(&ExpenseInput::new("1", "Other", "2024-01-01", "abcdefgh"))
            .unwrap();
        assert_eq!(record.notes, "abcde");
    }
}
