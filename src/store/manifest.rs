use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::ColumnMapping;

// Serializable, comparable, explicit defaults.
// Hashed into the content hash of every build.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoreBuildConfig {
    pub version: String,
    pub table: String,
    pub columns: ColumnMapping,
    /// Rows per insert transaction.
    pub chunk_size: usize,
}

impl StoreBuildConfig {
    pub fn v0() -> Self {
        Self {
            version: "1".into(),
            table: "examples".into(),
            columns: ColumnMapping::v0(),
            chunk_size: 100_000,
        }
    }
}

/// Written next to the database of every built store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CurationManifest {
    pub content_hash: String,
    pub build_config: StoreBuildConfig,
    pub created_at: DateTime<Utc>, // informational only
    pub row_count: u64,
    pub word_count: u64,
}

impl CurationManifest {
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let f = fs::File::open(path)?;
        serde_json::from_reader(f)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
