use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::read::lenient_int;

pub type Amount = i64;
pub type SerialNumber = u32;

/// One load/delivery line of `entry.csv`. It carries no serial number: the
/// Load table numbers its rows while it is being built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Entry {
    pub name: String,
    pub place: String,
    #[serde(deserialize_with = "lenient_int")]
    pub quantity: Amount,
    #[serde(deserialize_with = "lenient_int")]
    pub paid: Amount,
    #[serde(deserialize_with = "lenient_int")]
    pub to_paid: Amount,
    #[serde(deserialize_with = "lenient_int")]
    pub collection: Amount,
    pub comments: String,
}

/// A line of `expense.csv`. `serial` isn't part of the file, it is the
/// 1-based position of the row and gets filled in by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Expense {
    #[serde(skip)]
    pub serial: SerialNumber,
    pub name: String,
    #[serde(deserialize_with = "lenient_int")]
    pub amount: Amount,
    pub comments: String,
}

/// Same shape as `Expense`, read from `income.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Income {
    #[serde(skip)]
    pub serial: SerialNumber,
    pub name: String,
    #[serde(deserialize_with = "lenient_int")]
    pub amount: Amount,
    pub comments: String,
}

/// Everything the report is made of, loaded up front.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Records {
    pub entries: Vec<Entry>,
    pub expenses: Vec<Expense>,
    pub incomes: Vec<Income>,
}

/// The instant the report is stamped with, already formatted. Captured once so
/// every table of a run shows the same date and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Stamp {
    pub date: String,
    pub time: String,
    pub day: String,
}

impl Stamp {
    pub fn now() -> Self {
        Self::from(chrono::Local::now().naive_local())
    }
}

impl From<NaiveDateTime> for Stamp {
    fn from(at: NaiveDateTime) -> Self {
        Self {
            date: at.format("%d-%m-%Y").to_string(),
            time: at.format("%H:%M").to_string(),
            day: at.format("%A").to_string(),
        }
    }
}

/// Everything that can abort a run. There is no partial output: the first of
/// these stops the program before (or instead of) writing the PDF.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read CSV from {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Malformed row in {} at line {line}: expected {expected} columns, found {found}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Table {table:?} got a row of {found} cells for {expected} columns")]
    RowShape {
        table: String,
        expected: usize,
        found: usize,
    },
    #[error("Cannot write PDF to {}: {source}", .path.display())]
    Pdf {
        path: PathBuf,
        source: printpdf::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::Stamp;
    use chrono::NaiveDate;

    #[test]
    fn stamp_formats() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 42)
            .unwrap();
        assert_eq!(
            Stamp::from(at),
            Stamp {
                date: "07-03-2024".into(),
                time: "09:05".into(),
                day: "Thursday".into(),
            }
        );
    }
}
