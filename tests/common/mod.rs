// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use cashbook::{LedgerService, RecordForm, Repository};
use tempfile::TempDir;

/// Helper to create a store over files in a fresh temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(test_repository(&temp_dir))?;
    Ok((service, temp_dir))
}

pub fn test_repository(temp_dir: &TempDir) -> Repository {
    Repository::new(ledger_path(temp_dir), temp_dir.path().join("categories.txt"))
}

pub fn ledger_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("records.csv")
}

/// Shorthand for a filled-in form
pub fn form(date: &str, category: &str, amount: &str, note: &str) -> RecordForm {
    RecordForm::new(date, category, amount).with_note(note)
}

/// Test fixture: a small two-month ledger
pub struct SampleLedger;

impl SampleLedger {
    /// 2024-01: +10000 salary, -1000 food. 2024-02: -4000 rent.
    pub fn create(service: &mut LedgerService) -> Result<()> {
        service.add(&form("2024-01-05", "Income", "10000", "salary"))?;
        service.add(&form("2024-01-06", "Food", "-1000", "groceries"))?;
        service.add(&form("2024-02-01", "Rent", "-4000", "February rent"))?;
        Ok(())
    }
}
