//! Flight training expense tracker.
//!
//! Expenses, budget goal and theme live in the browser's `localStorage`;
//! the [`ui`] module renders them with Yew. Everything outside [`browser`]
//! and [`ui`] is plain Rust and is tested natively.

pub mod aggregates;
pub mod analytics;
pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod model;
pub mod preferences;
pub mod repository;
pub mod shell;
pub mod state;
pub mod store;
pub mod ui;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use model::{Category, ExpenseInput, ExpenseRecord};
pub use state::AppState;
