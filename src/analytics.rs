//! Fire-and-forget usage events.
//!
//! Sinks swallow their own failures; nothing in the app waits on or reacts
//! to delivery.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    ExpenseAdded { category: String, amount: f64 },
    ExpenseDeleted { category: String },
    ExpenseEdited { category: String, amount: f64 },
    BudgetSet { amount: f64 },
    DataExported { format: &'static str },
    ThemeToggled { theme: &'static str },
}

impl AnalyticsEvent {
    /// The event action name sent to the collector.
    pub fn action(&self) -> &'static str {
        match self {
            Self::ExpenseAdded { .. } => "expense_added",
            Self::ExpenseDeleted { .. } => "expense_deleted",
            Self::ExpenseEdited { .. } => "expense_edited",
            Self::BudgetSet { .. } => "budget_set",
            Self::DataExported { .. } => "data_exported",
            Self::ThemeToggled { .. } => "theme_toggled",
        }
    }

    pub fn event_category(&self) -> &'static str {
        match self {
            Self::ExpenseAdded { .. } | Self::ExpenseDeleted { .. } | Self::ExpenseEdited { .. } => {
                "expense_management"
            }
            Self::BudgetSet { .. } => "budget_management",
            Self::DataExported { .. } => "data_management",
            Self::ThemeToggled { .. } => "ui_interaction",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::ExpenseAdded { category, .. }
            | Self::ExpenseDeleted { category }
            | Self::ExpenseEdited { category, .. } => category.as_str(),
            Self::BudgetSet { .. } => "budget_amount",
            Self::DataExported { format } => *format,
            Self::ThemeToggled { theme } => *theme,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::ExpenseAdded { amount, .. }
            | Self::ExpenseEdited { amount, .. }
            | Self::BudgetSet { amount } => Some(*amount),
            _ => None,
        }
    }
}

/// Receives analytics events.
pub trait AnalyticsSink {
    fn emit(&self, event: &AnalyticsEvent);
}

/// Keeps every event in memory; clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<AnalyticsEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }

    pub fn actions(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(AnalyticsEvent::action).collect()
    }
}

impl AnalyticsSink for RecordingSink {
    fn emit(&self, event: &AnalyticsEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
