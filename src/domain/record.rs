use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, ParseCentsError, parse_cents};

/// Identifier assigned by the store when a record enters the in-memory ledger.
/// Ids increase monotonically and are never reused while the store is open.
pub type RecordId = u64;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One ledger entry. Positive `amount` is income, negative is expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Calendar date as `YYYY-MM-DD`, so string order is chronological order
    pub date: String,
    pub category: String,
    pub amount: Cents,
    pub note: String,
}

impl Record {
    /// Create a new record. The id must be assigned by the store.
    pub fn new(date: impl Into<String>, category: impl Into<String>, amount: Cents) -> Self {
        Self {
            id: 0,
            date: date.into(),
            category: category.into(),
            amount,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Month key (`YYYY-MM`): the first seven characters of the date.
    pub fn month(&self) -> &str {
        char_prefix(&self.date, 7)
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0
    }

    /// Compare everything except the id.
    pub fn same_entry(&self, other: &Record) -> bool {
        self.date == other.date
            && self.category == other.category
            && self.amount == other.amount
            && self.note == other.note
    }
}

/// Raw input for a record, as typed into a form or passed on the command line.
/// Nothing is trusted until [`RecordForm::validate`] succeeds.
#[derive(Debug, Clone, Default)]
pub struct RecordForm {
    pub date: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
}

impl RecordForm {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: Some(date.into()),
            category: Some(category.into()),
            amount: Some(amount.into()),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check required fields and parse the amount and date.
    /// The returned record has id 0.
    pub fn validate(&self) -> Result<Record, ValidationError> {
        let date = required(&self.date, "date")?;
        let category = required(&self.category, "category")?;
        let amount = parse_amount(required(&self.amount, "amount")?)?;
        let date = parse_date(date)?;

        Ok(Record::new(date.format(DATE_FORMAT).to_string(), category, amount)
            .with_note(self.note.clone().unwrap_or_default()))
    }

    /// Apply the fields that are set on top of `record`, keeping its id.
    /// Fields left as `None` keep their current value and are not re-checked,
    /// so a record loaded with an odd date can still have its note changed.
    pub fn apply_to(&self, record: &Record) -> Result<Record, ValidationError> {
        let mut next = record.clone();
        if self.date.is_some() {
            next.date = parse_date(required(&self.date, "date")?)?
                .format(DATE_FORMAT)
                .to_string();
        }
        if self.category.is_some() {
            next.category = required(&self.category, "category")?.to_string();
        }
        if self.amount.is_some() {
            next.amount = parse_amount(required(&self.amount, "amount")?)?;
        }
        if let Some(note) = &self.note {
            next.note = note.clone();
        }
        Ok(next)
    }
}

fn parse_amount(value: &str) -> Result<Cents, ValidationError> {
    parse_cents(value).map_err(|source| ValidationError::InvalidAmount {
        value: value.to_string(),
        source,
    })
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))
}

/// Validate a `YYYY-MM` month key and return it in canonical form.
pub fn parse_month(input: &str) -> Result<String, ValidationError> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), DATE_FORMAT)
        .map(|date| date.format("%Y-%m").to_string())
        .map_err(|_| ValidationError::InvalidMonth(input.to_string()))
}

/// Month key for a date.
pub fn month_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// At most `count` leading characters of `s`, never splitting a character.
pub fn char_prefix(s: &str, count: usize) -> &str {
    match s.char_indices().nth(count) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidAmount {
        value: String,
        source: ParseCentsError,
    },
    InvalidDate(String),
    InvalidMonth(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ValidationError::InvalidAmount { value, source } => {
                write!(f, "Invalid amount '{}': {}", value, source)
            }
            ValidationError::InvalidDate(value) => {
                write!(f, "Invalid date '{}', expected YYYY-MM-DD", value)
            }
            ValidationError::InvalidMonth(value) => {
                write!(f, "Invalid month '{}', expected YYYY-MM", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
