use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const AMOUNT_MESSAGE: &str = "Enter a valid amount (> 0)";
const CATEGORY_MESSAGE: &str = "Select a category";
const DATE_MESSAGE: &str = "Select a date";

/// Flight training cost categories, in the order the form lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    AircraftRental,
    InstructorTime,
    GroundSchool,
    MedicalCertificate,
    WrittenTestFees,
    CheckrideFee,
    BooksAndMaterials,
    HeadsetAndEquipment,
    EfbSubscription,
    ClubMembershipDues,
    FuelCosts,
    LandingAirportFees,
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::AircraftRental,
        Category::InstructorTime,
        Category::GroundSchool,
        Category::MedicalCertificate,
        Category::WrittenTestFees,
        Category::CheckrideFee,
        Category::BooksAndMaterials,
        Category::HeadsetAndEquipment,
        Category::EfbSubscription,
        Category::ClubMembershipDues,
        Category::FuelCosts,
        Category::LandingAirportFees,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::AircraftRental => "Aircraft Rental",
            Self::InstructorTime => "Instructor Time",
            Self::GroundSchool => "Ground School",
            Self::MedicalCertificate => "Medical Certificate",
            Self::WrittenTestFees => "Written Test Fees",
            Self::CheckrideFee => "Checkride Fee",
            Self::BooksAndMaterials => "Books & Materials",
            Self::HeadsetAndEquipment => "Headset & Equipment",
            Self::EfbSubscription => "ForeFlight/EFB Subscription",
            Self::ClubMembershipDues => "Club Membership Dues",
            Self::FuelCosts => "Fuel Costs",
            Self::LandingAirportFees => "Landing/Airport Fees",
            Self::Other => "Other",
        }
    }
}

/// One logged training cost.
///
/// The category is kept as its label text so stored records carrying a label
/// this build does not know about still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub notes: String,
}

/// Raw text of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseInput {
    pub amount: String,
    pub category: String,
    pub date: String,
    pub notes: String,
}

/// Form values that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExpense {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub notes: String,
}

impl ExpenseInput {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
            notes: notes.into(),
        }
    }

    /// Form prefilled from an existing record, for the edit dialog.
    pub fn from_record(record: &ExpenseRecord) -> Self {
        Self {
            amount: record.amount.to_string(),
            category: record.category.clone(),
            date: record.date.format(DATE_FORMAT).to_string(),
            notes: record.notes.clone(),
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self, notes_max_chars: usize) -> Result<ValidatedExpense, ValidationError> {
        let mut errors = ValidationError::default();

        let amount = parse_amount(&self.amount);
        if amount.is_none() {
            errors.push(Field::Amount, AMOUNT_MESSAGE);
        }

        let category = self.category.trim();
        if category.is_empty() {
            errors.push(Field::Category, CATEGORY_MESSAGE);
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok();
        if date.is_none() {
            errors.push(Field::Date, DATE_MESSAGE);
        }

        match (amount, date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ValidatedExpense {
                amount,
                category: category.to_string(),
                date,
                notes: truncate_chars(&self.notes, notes_max_chars),
            }),
            _ => Err(errors),
        }
    }

    /// Inline check for a single field while the user is typing.
    pub fn field_error(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::Amount => parse_amount(&self.amount).is_none().then_some(AMOUNT_MESSAGE),
            Field::Category => self.category.trim().is_empty().then_some(CATEGORY_MESSAGE),
            Field::Date => NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
                .is_err()
                .then_some(DATE_MESSAGE),
        }
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: &str, category: &str, date: &str) -> ExpenseInput {
        ExpenseInput::new(amount, category, date, "")
    }

    #[test]
    fn test_category_labels_are_distinct() {
        let labels: std::collections::HashSet<&str> =
            Category::ALL.iter().map(Category::label).collect();
        assert_eq!(labels.len(), 13);
        assert!(labels.contains("Fuel Costs"));
    }

    #[test]
    fn test_validate_accepts_valid_input() {
        let v = input("120.50", "Fuel Costs", "2024-05-01")
            .validate(200)
            .unwrap();
        assert_eq!(v.amount, 120.50);
        assert_eq!(v.category, "Fuel Costs");
        assert_eq!(v.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        for bad in ["-5", "0", "", "abc", "NaN", "inf"] {
            let err = input(bad, "Fuel Costs", "2024-05-01")
                .validate(200)
                .unwrap_err();
            assert_eq!(err.errors().len(), 1, "amount {bad:?}");
            assert_eq!(err.message_for(Field::Amount), Some(AMOUNT_MESSAGE));
        }
    }

    #[test]
    fn test_validate_reports_every_failed_field() {
        let err = input("", "  ", "").validate(200).unwrap_err();
        assert!(err.has(Field::Amount));
        assert!(err.has(Field::Category));
        assert!(err.has(Field::Date));
    }

    #[test]
    fn test_validate_rejects_impossible_date() {
        let err = input("10", "Other", "2024-02-30").validate(200).unwrap_err();
        assert_eq!(err.message_for(Field::Date), Some(DATE_MESSAGE));
    }

    #[test]
    fn test_notes_truncated_by_characters() {
        let notes = "é".repeat(250);
        let v = ExpenseInput::new("1", "Other", "2024-01-01", notes)
            .validate(200)
            .unwrap();
        assert_eq!(v.notes.chars().count(), 200);
    }

    #[test]
    fn test_field_error_inline() {
        let form = input("0", "Other", "");
        assert_eq!(form.field_error(Field::Amount), Some(AMOUNT_MESSAGE));
        assert_eq!(form.field_error(Field::Category), None);
        assert_eq!(form.field_error(Field::Date), Some(DATE_MESSAGE));
    }

    #[test]
    fn test_record_json_shape() {
        let record = ExpenseRecord {
            id: 1714521600000,
            amount: 120.5,
            category: "Fuel Costs".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            notes: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["category"], "Fuel Costs");

        let form = ExpenseInput::from_record(&record);
        assert_eq!(form.amount, "120.5");
        assert_eq!(form.date, "2024-05-01");
    }
}
