//! Error types for the flight cost tracker.
//!
//! Nothing here is fatal to the app: validation errors are shown next to the
//! offending form field, a missing record is a no-op, and persistence
//! failures become a dismissible warning while the in-memory change stands.

use std::fmt;

use thiserror::Error;

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Amount,
    Category,
    Date,
}

impl Field {
    /// The form field name, as used for element ids.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Date => "date",
        }
    }
}

/// One failed field with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every field that failed validation for a single submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    /// Replace the message for `field`; `None` clears it.
    pub fn set(&mut self, field: Field, message: Option<&'static str>) {
        self.errors.retain(|e| e.field != field);
        if let Some(message) = message {
            self.push(field, message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The message for `field`, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.errors.iter().map(|e| e.field.name()).collect();
        write!(f, "invalid {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// The main error type for tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// An expense or budget submission was rejected.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// A budget goal entry was not a positive number.
    #[error("invalid budget goal: {input:?}")]
    InvalidBudget {
        /// The text that was entered.
        input: String,
    },

    /// The expense targeted by an edit no longer exists.
    #[error("expense {0} not found")]
    NotFound(i64),

    // === Storage Errors ===
    /// Writing a key to storage failed, e.g. quota exceeded.
    #[error("failed to persist '{key}': {message}")]
    Persistence {
        /// Storage key that was being written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Browser storage is unavailable (private mode, disabled, no window).
    #[error("storage unavailable: {0}")]
    Storage(String),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Building the CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Platform Errors ===
    /// A browser API call failed.
    #[error("platform error: {0}")]
    Platform(String),

    // === Configuration Errors ===
    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl Error {
    /// Create a persistence error for a storage key.
    #[must_use]
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a new platform error.
    #[must_use]
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error means a write did not reach storage.
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::Storage(_))
    }
}
