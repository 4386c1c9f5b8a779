//! Configuration for the tracker.
//!
//! Defaults cover everything; a deployment may override any part of it by
//! writing a JSON object under the `trackerConfig` storage key. Missing
//! fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::store::KeyValueStore;

/// Storage key holding the optional configuration override.
pub const CONFIG_KEY: &str = "trackerConfig";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keys used in browser storage.
    pub storage: StorageKeys,
    /// Notes longer than this many characters are cut.
    pub notes_max_chars: usize,
    /// Script registered as the offline-caching service worker.
    pub service_worker_url: String,
    /// Export file names are `<prefix>-YYYY-MM-DD.csv`.
    pub export_file_prefix: String,
    /// How long success notices stay up.
    pub notice_timeout_ms: u32,
    pub log_level: Verbosity,
}

/// Storage keys for each persisted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub expenses: String,
    pub dark_mode: String,
    pub budget_goal: String,
    pub onboarding_seen: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKeys::default(),
            notes_max_chars: 200,
            service_worker_url: "/sw.js".to_string(),
            export_file_prefix: "flight-training-expenses".to_string(),
            notice_timeout_ms: 3000,
            log_level: Verbosity::Normal,
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            expenses: "flightExpenses".to_string(),
            dark_mode: "darkMode".to_string(),
            budget_goal: "budgetGoal".to_string(),
            onboarding_seen: "seenGuide".to_string(),
        }
    }
}

impl StorageKeys {
    fn all(&self) -> [&str; 4] {
        [
            &self.expenses,
            &self.dark_mode,
            &self.budget_goal,
            &self.onboarding_seen,
        ]
    }
}

impl AppConfig {
    /// Parse an override document, layering it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails
    /// validation.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from storage, falling back to the defaults.
    ///
    /// A broken override never stops the app from starting; it is logged and
    /// ignored.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let raw = match store.get_item(CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read configuration override");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(config) => {
                tracing::debug!("loaded configuration override");
                config
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring configuration override");
                Self::default()
            }
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any key is blank or reused, notes may hold no
    /// characters, or the service worker URL is blank.
    pub fn validate(&self) -> Result<()> {
        let keys = self.storage.all();
        for (i, key) in keys.iter().enumerate() {
            if key.trim().is_empty() {
                return Err(Error::config("storage keys cannot be empty"));
            }
            if keys[..i].contains(key) {
                return Err(Error::config(format!("storage key '{key}' is used twice")));
            }
        }
        if keys.contains(&CONFIG_KEY) {
            return Err(Error::config(format!(
                "storage key '{CONFIG_KEY}' is reserved"
            )));
        }

        if self.notes_max_chars == 0 {
            return Err(Error::config("notes_max_chars must be greater than 0"));
        }

        if self.service_worker_url.trim().is_empty() {
            return Err(Error::config("service_worker_url cannot be empty"));
        }

        Ok(())
    }
}
