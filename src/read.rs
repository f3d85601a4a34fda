use crate::data::{Amount, Entry, Error, Expense, Income};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::path::Path;
use tracing::{info, warn};

pub const ENTRY_COLUMNS: usize = 7;
pub const LEDGER_COLUMNS: usize = 3;

/// Numeric columns never fail a row: whatever doesn't parse as an integer is
/// counted as zero, with a warning so it doesn't go unnoticed.
pub(crate) fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    Ok(raw.parse().unwrap_or_else(|_| {
        warn!("{raw:?} is not an integer, counting it as 0");
        0
    }))
}

/// Failures of the underlying reader are file access problems, the rest is
/// the CSV itself.
fn csv_error(path: &Path, source: csv::Error) -> Error {
    let io_kind = match source.kind() {
        csv::ErrorKind::Io(err) => Some(err.kind()),
        _ => None,
    };
    match io_kind {
        Some(kind) => Error::FileAccess {
            path: path.to_owned(),
            source: std::io::Error::new(kind, source),
        },
        None => Error::Csv {
            path: path.to_owned(),
            source,
        },
    }
}

/// Headerless CSV importer. Every record must have exactly `columns` fields,
/// anything else aborts the whole read. `path` only names the source in errors.
/// Bytes that aren't valid UTF-8 are replaced rather than rejected.
fn read_rows<R: std::io::Read, T: DeserializeOwned>(
    reader: R,
    path: &Path,
    columns: usize,
) -> Result<Vec<T>, Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if record.len() != columns {
            return Err(Error::MalformedRow {
                path: path.to_owned(),
                line: record.position().map_or(0, |pos| pos.line()),
                expected: columns,
                found: record.len(),
            });
        }
        let record = csv::StringRecord::from_byte_record_lossy(record);
        rows.push(record.deserialize(None).map_err(|e| csv_error(path, e))?);
    }
    Ok(rows)
}

pub(crate) fn read_entries<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<Entry>, Error> {
    read_rows(reader, path, ENTRY_COLUMNS)
}

/// Expenses are numbered 1..=N in file order.
pub(crate) fn read_expenses<R: std::io::Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<Expense>, Error> {
    let rows: Vec<Expense> = read_rows(reader, path, LEDGER_COLUMNS)?;
    Ok(rows
        .into_iter()
        .zip(1..)
        .map(|(expense, serial)| Expense { serial, ..expense })
        .collect())
}

/// Incomes are numbered 1..=N in file order.
pub(crate) fn read_incomes<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<Income>, Error> {
    let rows: Vec<Income> = read_rows(reader, path, LEDGER_COLUMNS)?;
    Ok(rows
        .into_iter()
        .zip(1..)
        .map(|(income, serial)| Income { serial, ..income })
        .collect())
}

/// Opens `path`, hands it to `read` and closes it again before returning,
/// whatever the outcome.
fn load<T>(
    path: &Path,
    read: impl FnOnce(std::fs::File, &Path) -> Result<Vec<T>, Error>,
) -> Result<Vec<T>, Error> {
    let file = std::fs::File::open(path).map_err(|source| Error::FileAccess {
        path: path.to_owned(),
        source,
    })?;
    let rows = read(file, path)?;
    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub(crate) fn load_entries(path: &Path) -> Result<Vec<Entry>, Error> {
    load(path, read_entries)
}

pub(crate) fn load_expenses(path: &Path) -> Result<Vec<Expense>, Error> {
    load(path, read_expenses)
}

pub(crate) fn load_incomes(path: &Path) -> Result<Vec<Income>, Error> {
    load(path, read_incomes)
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{Entry, Error, Expense, Income},
        read::{load_entries, load_incomes, read_entries, read_expenses, read_incomes},
    };
    use std::{
        io::{self, Read, Write},
        path::Path,
    };

    fn mem() -> &'static Path {
        Path::new("<memory>")
    }

    #[test]
    fn read_entry_rows() {
        let entries_csv = b"\
Ravi,   Pune,   10, 5,  5,  0, first load
Anita,  Nashik, 4,  2,  3,  1,
";
        assert_eq!(
            read_entries(&entries_csv[..], mem()).unwrap(),
            [
                Entry {
                    name: "Ravi".into(),
                    place: "Pune".into(),
                    quantity: 10,
                    paid: 5,
                    to_paid: 5,
                    collection: 0,
                    comments: "first load".into(),
                },
                Entry {
                    name: "Anita".into(),
                    place: "Nashik".into(),
                    quantity: 4,
                    paid: 2,
                    to_paid: 3,
                    collection: 1,
                    comments: "".into(),
                },
            ]
        );
    }

    #[test]
    fn unparsable_numbers_become_zero() {
        let entries_csv = b"A,P,ten,5,-3,n/a,x\n";
        let entries = read_entries(&entries_csv[..], mem()).unwrap();
        assert_eq!(entries[0].quantity, 0);
        assert_eq!(entries[0].paid, 5);
        assert_eq!(entries[0].to_paid, -3);
        assert_eq!(entries[0].collection, 0);
    }

    #[test]
    fn ledger_serials_follow_file_order() {
        let expenses_csv = b"\
diesel, 1200, trip 1
toll,   150,
food,   300,  lunch
";
        let expenses = read_expenses(&expenses_csv[..], mem()).unwrap();
        assert_eq!(
            expenses.iter().map(|e| e.serial).collect::<Vec<_>>(),
            [1, 2, 3]
        );
        assert_eq!(
            expenses[2],
            Expense {
                serial: 3,
                name: "food".into(),
                amount: 300,
                comments: "lunch".into(),
            }
        );

        // each record type has its own numbering
        let incomes_csv = b"rent, 5000, march\n";
        assert_eq!(
            read_incomes(&incomes_csv[..], mem()).unwrap(),
            [Income {
                serial: 1,
                name: "rent".into(),
                amount: 5000,
                comments: "march".into(),
            }]
        );
    }

    #[test]
    fn empty_file_has_no_rows() {
        assert!(read_expenses(&b""[..], mem()).unwrap().is_empty());
        assert!(read_entries(&b""[..], mem()).unwrap().is_empty());
    }

    #[test]
    fn wrong_column_count_is_malformed() {
        let entries_csv = b"\
A,P,1,1,1,1,ok
B,P,1,1,1
";
        match read_entries(&entries_csv[..], mem()) {
            Err(Error::MalformedRow {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!((line, expected, found), (2, 7, 5));
            }
            other => panic!("expected a malformed row, got {other:?}"),
        }

        let incomes_csv = b"rent,5000,march,extra\n";
        assert!(matches!(
            read_incomes(&incomes_csv[..], mem()),
            Err(Error::MalformedRow {
                expected: 3,
                found: 4,
                ..
            })
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let entries_csv = b"Ra\xffvi,Pune,10,5,5,0,x\n";
        let entries = read_entries(&entries_csv[..], mem()).unwrap();
        assert_eq!(entries[0].name, "Ra\u{FFFD}vi");
        assert_eq!(entries[0].quantity, 10);
    }

    #[test]
    fn reader_failure_is_file_access() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            }
        }
        assert!(matches!(
            read_expenses(Broken, mem()),
            Err(Error::FileAccess { .. })
        ));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A,P,10,5,5,0,x").unwrap();
        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 10);
    }

    #[test]
    fn missing_file_is_file_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("income.csv");
        match load_incomes(&path) {
            Err(Error::FileAccess { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected a file access error, got {other:?}"),
        }
    }
}
