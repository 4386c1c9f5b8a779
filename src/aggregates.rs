//! Totals, category breakdown and budget progress over the expense
//! collection. All pure; recomputed on every render.

use crate::model::ExpenseRecord;

const WARNING_PERCENT: f64 = 80.0;

/// Spend for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Share of the grand total, 0 to 100.
    pub percentage: f64,
}

/// Where spending stands against the budget goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    NoBudget,
    OnTrack,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn text(&self) -> &'static str {
        match self {
            Self::NoBudget => "No budget set",
            Self::OnTrack => "On track",
            Self::Warning => "Budget warning",
            Self::Exceeded => "Budget exceeded!",
        }
    }
}

pub fn total(records: &[ExpenseRecord]) -> f64 {
    records.iter().map(|r| r.amount).sum()
}

/// Spend grouped by category, largest first.
///
/// Categories with equal spend stay in the order they were first seen.
pub fn category_breakdown(records: &[ExpenseRecord]) -> Vec<CategoryShare> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, amount)) => *amount += record.amount,
            None => groups.push((record.category.clone(), record.amount)),
        }
    }

    let grand_total = total(records);
    let mut shares: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            percentage: if grand_total > 0.0 {
                amount / grand_total * 100.0
            } else {
                0.0
            },
            category,
            amount,
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

/// Percentage of the goal spent, capped at 100; 0 without a goal.
pub fn budget_progress(records: &[ExpenseRecord], goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (total(records) / goal * 100.0).min(100.0)
}

pub fn budget_status(records: &[ExpenseRecord], goal: f64) -> BudgetStatus {
    if goal <= 0.0 {
        return BudgetStatus::NoBudget;
    }
    let percentage = total(records) / goal * 100.0;
    if percentage >= 100.0 {
        BudgetStatus::Exceeded
    } else if percentage >= WARNING_PERCENT {
        BudgetStatus::Warning
    } else {
        BudgetStatus::OnTrack
    }
}
