//! CSV export of the expense collection.

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{ExpenseRecord, DATE_FORMAT};

pub const CSV_HEADER: [&str; 4] = ["Date", "Category", "Amount", "Notes"];

/// Render the records as CSV in display order.
///
/// Notes are always quoted with embedded quotes doubled. The other fields
/// are written as-is: dates are ISO and categories come from a fixed list.
/// Lines are joined with `\n` and the last one is not terminated.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn to_csv(records: &[ExpenseRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.date.format(DATE_FORMAT).to_string(),
            record.category.clone(),
            format!("{:.2}", record.amount),
            quote(&record.notes),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    // rows are separated, not terminated
    if text.ends_with('\n') {
        text.pop();
    }
    tracing::debug!(rows = records.len(), bytes = text.len(), "rendered CSV export");
    Ok(text)
}

/// `<prefix>-YYYY-MM-DD.csv`
pub fn export_file_name(prefix: &str, today: NaiveDate) -> String {
    format!("{}-{}.csv", prefix, today.format(DATE_FORMAT))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, amount: f64, category: &str, date: (i32, u32, u32), notes: &str) -> ExpenseRecord {
        ExpenseRecord {
            id,
            amount,
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(to_csv(&[]).unwrap(), "Date,Category,Amount,Notes");
    }

    #[test]
    fn test_rows_in_display_order_with_two_decimals() {
        let records = [
            record(2, 120.5, "Fuel Costs", (2024, 5, 1), ""),
            record(1, 95.0, "Instructor Time", (2024, 4, 28), "dual"),
        ];
        assert_eq!(
            to_csv(&records).unwrap(),
            "Date,Category,Amount,Notes\n\
             2024-05-01,Fuel Costs,120.50,\"\"\n\
             2024-04-28,Instructor Time,95.00,\"dual\""
        );
    }

    #[test]
    fn test_notes_quotes_doubled() {
        let csv = to_csv(&[record(1, 10.0, "Other", (2024, 1, 1), r#"He said "go""#)]).unwrap();
        assert!(csv.contains(r#","He said ""go""""#));
    }

    #[test]
    fn test_export_parses_back() {
        let records = [
            record(3, 1234.567, "Aircraft Rental", (2024, 6, 2), "N12345, 1.3 hrs"),
            record(2, 49.99, "ForeFlight/EFB Subscription", (2024, 6, 1), r#"He said "go""#),
            record(1, 210.0, "Books & Materials", (2024, 5, 30), ""),
        ];
        let csv = to_csv(&records).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(&row[0], record.date.format(DATE_FORMAT).to_string());
            assert_eq!(&row[1], record.category);
            assert_eq!(&row[2], format!("{:.2}", record.amount));
            assert_eq!(&row[3], record.notes);
        }
    }

    #[test]
    fn test_export_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            export_file_name("flight-training-expenses", today),
            "flight-training-expenses-2024-05-01.csv"
        );
    }
}
