use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of the company-name lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub ticker: String,
}

/// Static company-name → ticker lookup, loaded read-only at startup from a
/// `name,ticker` CSV file. Used only to prefill the ticker input.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    records: Vec<CompanyRecord>,
}

impl SymbolTable {
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: CompanyRecord = row?;
            if record.name.is_empty() || record.ticker.is_empty() {
                continue;
            }
            records.push(record);
        }

        tracing::info!(
            path = %path.as_ref().display(),
            companies = records.len(),
            "Loaded company symbol table"
        );
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive substring search over company names.
    pub fn search(&self, query: &str) -> Vec<&CompanyRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Ticker of the first company whose name matches, for prefilling the
    /// ticker field.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        self.search(query).first().map(|r| r.ticker.as_str())
    }
}
