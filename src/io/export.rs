use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::Record;
use crate::storage::write_records;

/// Full snapshot for JSON export. Amounts are in cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<String>,
    pub records: Vec<Record>,
}

/// Serialize records to CSV bytes in the ledger file layout.
pub fn records_to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(buffer)
}

/// Exporter for writing ledger data to other destinations
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export records to CSV, in the same layout as the ledger file
    pub fn export_csv<W: Write>(&self, writer: W, records: &[Record]) -> Result<usize> {
        write_records(writer, records)?;
        Ok(records.len())
    }

    /// Export records and the category list as a JSON snapshot
    pub fn export_json<W: Write>(
        &self,
        mut writer: W,
        records: &[Record],
    ) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            categories: self.service.categories().names().to_vec(),
            records: records.to_vec(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(snapshot)
    }
}
