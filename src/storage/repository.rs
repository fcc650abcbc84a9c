use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::domain::{CategorySet, Record, char_prefix, format_cents, parse_cents_lenient};

/// Column header of the ledger file, in write order.
pub const LEDGER_COLUMNS: [&str; 4] = ["date", "category", "amount", "note"];

const TMP_SUFFIX: &str = "tmp";

/// File-backed persistence for the ledger and the category list.
///
/// Both files are always rewritten whole. Writes go to a sibling temporary
/// file first and are renamed over the target, so a crash mid-write leaves the
/// previous file intact.
#[derive(Debug, Clone)]
pub struct Repository {
    ledger_path: PathBuf,
    categories_path: PathBuf,
}

impl Repository {
    pub fn new(ledger_path: impl Into<PathBuf>, categories_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            categories_path: categories_path.into(),
        }
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    // ========================
    // Ledger file
    // ========================

    /// Read every record from the ledger file.
    /// Returns `None` when the file does not exist. Returned records have id 0.
    pub fn load_records(&self) -> Result<Option<Vec<Record>>> {
        let file = match fs::File::open(&self.ledger_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.ledger_path.display(), "No ledger file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open ledger file {}", self.ledger_path.display())
                });
            }
        };

        let records = read_records(file).with_context(|| {
            format!("Failed to read ledger file {}", self.ledger_path.display())
        })?;
        debug!(path = %self.ledger_path.display(), count = records.len(), "Loaded ledger");
        Ok(Some(records))
    }

    /// Overwrite the ledger file with `records`.
    pub fn save_records(&self, records: &[Record]) -> Result<()> {
        let mut buffer = Vec::new();
        write_records(&mut buffer, records)?;
        write_atomic(&self.ledger_path, &buffer).with_context(|| {
            format!("Failed to save ledger file {}", self.ledger_path.display())
        })?;
        debug!(path = %self.ledger_path.display(), count = records.len(), "Saved ledger");
        Ok(())
    }

    // ========================
    // Category file
    // ========================

    /// Read the category list. Returns `None` when the file does not exist.
    pub fn load_categories(&self) -> Result<Option<CategorySet>> {
        match fs::read_to_string(&self.categories_path) {
            Ok(text) => Ok(Some(CategorySet::from_lines(&text))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!(
                    "Failed to read category file {}",
                    self.categories_path.display()
                )
            }),
        }
    }

    pub fn save_categories(&self, categories: &CategorySet) -> Result<()> {
        write_atomic(&self.categories_path, categories.to_lines().as_bytes()).with_context(
            || {
                format!(
                    "Failed to save category file {}",
                    self.categories_path.display()
                )
            },
        )?;
        debug!(count = categories.len(), "Saved categories");
        Ok(())
    }
}

/// Parse ledger CSV. The header must name `date`, `category` and `amount`;
/// `note` is optional and columns may appear in any order.
///
/// Rows are loaded leniently: the date is cut to its first 10 characters and an
/// amount that does not parse becomes 0.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read header row")?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| {
        column(name).ok_or_else(|| anyhow!("Missing required column '{}'", name))
    };

    let date_idx = required("date")?;
    let category_idx = required("category")?;
    let amount_idx = required("amount")?;
    let note_idx = column("note");

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let line = line_num + 2; // +2 for header and 0-indexing
        let row = result.with_context(|| format!("Malformed row at line {}", line))?;

        let amount_str = row.get(amount_idx).unwrap_or("");
        let amount = match parse_cents_lenient(amount_str) {
            Ok(cents) => cents,
            Err(e) => {
                warn!(line, value = amount_str, error = %e, "Unparsable amount loaded as 0");
                0
            }
        };

        let record = Record::new(
            char_prefix(row.get(date_idx).unwrap_or(""), 10),
            row.get(category_idx).unwrap_or(""),
            amount,
        )
        .with_note(note_idx.and_then(|i| row.get(i)).unwrap_or(""));
        records.push(record);
    }

    Ok(records)
}

/// Write ledger CSV with the [`LEDGER_COLUMNS`] header. Ids are not written.
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(LEDGER_COLUMNS)?;

    for record in records {
        csv_writer.write_record([
            record.date.as_str(),
            record.category.as_str(),
            format_cents(record.amount).as_str(),
            record.note.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write temporary file {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cents;

    #[test]
    fn test_write_then_read() {
        let records = vec![
            Record::new("2024-01-05", "Salary", 300000).with_note("January"),
            Record::new("2024-01-07", "Food", -1250).with_note("lunch, with \"friends\""),
            Record::new("2024-01-08", "Misc", 0),
        ];

        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("date,category,amount,note\n"));
        assert!(text.contains("2024-01-07,Food,-12.50,"));

        let loaded = read_records(buffer.as_slice()).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_read_is_lenient() {
        let csv = "amount,category,date\nabc,Food,2024-01-05 00:00:00\n12,Salary,2024-02-01\n";
        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount, 0);
        assert_eq!(records[0].date, "2024-01-05");
        assert_eq!(records[0].note, "");
        assert_eq!(records[1].amount, 1200);
    }

    #[test]
    fn test_read_accepts_float_spellings() {
        let csv = "date,category,amount,note\n\
                   2024-01-05,Bonus,1e3,\n\
                   2024-01-06,Food,-1.25E1,\n\
                   2024-01-07,Lottery,1e20,\n";
        let records = read_records(csv.as_bytes()).unwrap();

        let amounts: Vec<Cents> = records.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![100000, -1250, 0]);
    }

    #[test]
    fn test_read_short_rows() {
        let csv = "date,category,amount,note\n2024-01-05,Food\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].amount, 0);
        assert_eq!(records[0].note, "");
    }

    #[test]
    fn test_read_missing_column() {
        let csv = "date,note\n2024-01-05,x\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path(Path::new("data/records.csv")),
            PathBuf::from("data/records.csv.tmp")
        );
    }
}
