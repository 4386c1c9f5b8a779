//! Per-browser settings: theme, budget goal and the first-run guide.

use crate::error::{Error, Result};
use crate::repository::Saved;
use crate::store::{KeyValueStore, PersistedStore};

pub struct Preferences<S> {
    store: PersistedStore<S>,
    dark_mode: bool,
    budget_goal: f64,
}

impl<S: KeyValueStore> Preferences<S> {
    pub fn load(store: PersistedStore<S>) -> Self {
        let dark_mode = store.load_dark_mode();
        let budget_goal = store.load_budget_goal();
        tracing::debug!(dark_mode, budget_goal, "loaded preferences");
        Self {
            store,
            dark_mode,
            budget_goal,
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// The goal in dollars; 0 when none is set.
    pub fn budget_goal(&self) -> f64 {
        self.budget_goal
    }

    pub fn toggle_dark_mode(&mut self) -> Saved<bool> {
        self.dark_mode = !self.dark_mode;
        tracing::info!(dark_mode = self.dark_mode, "toggled theme");
        Saved::new(self.dark_mode, self.store.save_dark_mode(self.dark_mode))
    }

    /// Set the goal from the settings field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBudget`] unless the text is a positive number;
    /// the current goal is kept.
    pub fn set_budget_goal(&mut self, input: &str) -> Result<Saved<f64>> {
        let goal = input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite() && *g > 0.0)
            .ok_or_else(|| Error::InvalidBudget {
                input: input.to_string(),
            })?;
        self.budget_goal = goal;
        tracing::info!(goal, "set budget goal");
        Ok(Saved::new(goal, self.store.save_budget_goal(goal)))
    }

    pub fn clear_budget_goal(&mut self) -> Saved<f64> {
        self.budget_goal = 0.0;
        tracing::info!("cleared budget goal");
        Saved::new(0.0, self.store.save_budget_goal(0.0))
    }

    /// True on the very first visit; records that the guide has been seen.
    pub fn take_first_visit(&self) -> bool {
        self.store.first_visit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKeys;
    use crate::store::MemoryStore;

    fn prefs() -> Preferences<MemoryStore> {
        Preferences::load(PersistedStore::new(MemoryStore::new(), StorageKeys::default()))
    }

    #[test]
    fn test_defaults() {
        let prefs = prefs();
        assert!(!prefs.dark_mode());
        assert_eq!(prefs.budget_goal(), 0.0);
    }

    #[test]
    fn test_toggle_dark_mode_persists() {
        let mut prefs = prefs();
        let saved = prefs.toggle_dark_mode();
        assert!(saved.value);
        assert!(saved.is_persisted());

        let reloaded = Preferences::load(prefs.store);
        assert!(reloaded.dark_mode());
    }

    #[test]
    fn test_set_budget_goal() {
        let mut prefs = prefs();
        let saved = prefs.set_budget_goal(" 10000 ").unwrap();
        assert_eq!(saved.value, 10000.0);
        assert_eq!(prefs.budget_goal(), 10000.0);
        assert_eq!(
            prefs.store.inner().get_item("budgetGoal").unwrap().as_deref(),
            Some("10000")
        );
    }

    #[test]
    fn test_invalid_budget_goal_keeps_current() {
        let mut prefs = prefs();
        let _ = prefs.set_budget_goal("500").unwrap();
        for bad in ["0", "-1", "", "abc", "inf"] {
            let err = prefs.set_budget_goal(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidBudget { .. }), "input {bad:?}");
        }
        assert_eq!(prefs.budget_goal(), 500.0);
    }

    #[test]
    fn test_clear_budget_goal() {
        let mut prefs = prefs();
        let _ = prefs.set_budget_goal("500").unwrap();
        let _ = prefs.clear_budget_goal();
        assert_eq!(prefs.budget_goal(), 0.0);
        assert_eq!(Preferences::load(prefs.store).budget_goal(), 0.0);
    }

    #[test]
    fn test_first_visit() {
        let prefs = prefs();
        assert!(prefs.take_first_visit());
        assert!(!prefs.take_first_visit());
    }
}
