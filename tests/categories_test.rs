mod common;

use std::fs;

use anyhow::Result;
use cashbook::application::AppError;
use cashbook::{CategoryError, DEFAULT_CATEGORIES, LedgerService};
use common::{SampleLedger, test_repository, test_service};
use tempfile::TempDir;

#[test]
fn test_missing_file_uses_defaults() -> Result<()> {
    let (service, _temp) = test_service()?;

    assert_eq!(service.categories().len(), DEFAULT_CATEGORIES.len());
    assert!(service.categories().contains("Food"));
    assert!(service.categories().contains("Income"));

    Ok(())
}

#[test]
fn test_add_category_is_saved() -> Result<()> {
    let (mut service, temp) = test_service()?;

    let name = service.add_category("  Travel ")?;
    assert_eq!(name, "Travel");

    let text = fs::read_to_string(temp.path().join("categories.txt"))?;
    assert!(text.lines().any(|line| line == "Travel"));

    let reopened = LedgerService::open(test_repository(&temp))?;
    assert!(reopened.categories().contains("Travel"));
    assert_eq!(reopened.categories().len(), DEFAULT_CATEGORIES.len() + 1);

    Ok(())
}

#[test]
fn test_add_duplicate_or_blank_category() -> Result<()> {
    let (mut service, _temp) = test_service()?;

    let err = service.add_category("Food").unwrap_err();
    assert!(matches!(
        err,
        AppError::Category(CategoryError::Duplicate(ref name)) if name == "Food"
    ));

    let err = service.add_category("   ").unwrap_err();
    assert!(matches!(err, AppError::Category(CategoryError::Blank)));
    assert_eq!(service.categories().len(), DEFAULT_CATEGORIES.len());

    Ok(())
}

#[test]
fn test_delete_category_keeps_records() -> Result<()> {
    let (mut service, temp) = test_service()?;
    SampleLedger::create(&mut service)?;

    service.delete_category("Rent")?;
    assert!(!service.categories().contains("Rent"));
    assert!(service.records().iter().any(|r| r.category == "Rent"));

    let reopened = LedgerService::open(test_repository(&temp))?;
    assert!(!reopened.categories().contains("Rent"));

    let err = service.delete_category("Rent").unwrap_err();
    assert!(matches!(err, AppError::Category(CategoryError::NotFound(_))));

    Ok(())
}

#[test]
fn test_category_file_is_read_as_lines() -> Result<()> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("categories.txt"),
        "Groceries\n\n  Pets  \nGroceries\n",
    )?;

    let service = LedgerService::open(test_repository(&temp))?;
    assert_eq!(service.categories().names(), ["Groceries", "Pets"]);

    Ok(())
}
