use thiserror::Error;

use crate::domain::{CategoryError, RecordId, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Category(#[from] CategoryError),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("The ledger has no records yet")]
    NoRecords,

    #[error("No records for {0}")]
    NoRecordsForMonth(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("Advice request failed: {0}")]
    Advice(String),

    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caused by user input rather than I/O or the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::Category(_))
    }
}
