use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::manifest::{CurationManifest, StoreBuildConfig};
use super::{quote, to_sql_int, validate_identifier, StoreError};
use crate::types::identifiers::ExampleId;
use crate::types::record::{ContextRecord, RecordError};

pub const DATABASE_FILE: &str = "contexts.sqlite3";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum StoreBuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Output directory already exists: {0}")]
    OutputExists(PathBuf),
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for StoreBuildError {
    fn from(e: rusqlite::Error) -> Self {
        StoreBuildError::Store(StoreError::Backend(e))
    }
}

/// A finished store directory.
#[derive(Debug)]
pub struct BuiltStore {
    pub root: PathBuf,
    pub manifest: CurationManifest,
}

impl BuiltStore {
    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

/// Loads curated records into a fresh SQLite store.
///
/// Single-threaded and non-reentrant. Ids are assigned densely from 1 in
/// input order, which is what the bank's random draw relies on.
pub struct StoreBuilder {
    config: StoreBuildConfig,
}

impl StoreBuilder {
    pub fn new(config: StoreBuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreBuildConfig {
        &self.config
    }

    pub fn build<I>(&self, records: I, output_dir: &Path) -> Result<BuiltStore, StoreBuildError>
    where
        I: IntoIterator<Item = Result<ContextRecord, RecordError>>,
    {
        if output_dir.exists() {
            return Err(StoreBuildError::OutputExists(output_dir.to_path_buf()));
        }
        if self.config.chunk_size == 0 {
            return Err(StoreBuildError::InvalidChunkSize(0));
        }
        validate_identifier(&self.config.table)?;
        self.config.columns.validate()?;

        // Build beside the target so the final rename stays on one filesystem
        let temp_dir = output_dir.with_extension("building");
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(&temp_dir)?;

        let mut conn = Connection::open(temp_dir.join(DATABASE_FILE))?;
        self.create_schema(&conn)?;

        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&self.config)?);

        let insert_sql = self.insert_sql();
        let has_freq = self.config.columns.freq.is_some();
        let mut words = HashSet::new();
        let mut next_id = ExampleId::first();
        let mut row_count: u64 = 0;
        let mut records = records.into_iter().peekable();

        while records.peek().is_some() {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(&insert_sql)?;
                for record in records.by_ref().take(self.config.chunk_size) {
                    let record = record?;
                    let id = to_sql_int(next_id.get())?;
                    if has_freq {
                        let freq = record.frequency.map(to_sql_int).transpose()?;
                        stmt.execute(params![id, record.left, record.word, record.right, freq])?;
                    } else {
                        stmt.execute(params![id, record.left, record.word, record.right])?;
                    }

                    let freq_text = record.frequency.map(|f| f.to_string()).unwrap_or_default();
                    let line = format!(
                        "{}\t{}\t{}\t{}\t{}\n",
                        next_id, record.word, record.left, record.right, freq_text
                    );
                    hasher.update(line.as_bytes());

                    words.insert(record.word);
                    next_id = next_id.next();
                    row_count += 1;
                }
            }
            tx.commit()?;
            tracing::info!(rows = row_count, "committed chunk");
        }
        conn.close().map_err(|(_, e)| StoreBuildError::from(e))?;

        let manifest = CurationManifest {
            content_hash: format!("sha256:{}", hex::encode(hasher.finalize())),
            build_config: self.config.clone(),
            created_at: Utc::now(),
            row_count,
            word_count: words.len() as u64,
        };

        let f_man = fs::File::create(temp_dir.join(MANIFEST_FILE))?;
        serde_json::to_writer_pretty(&f_man, &manifest)?;
        f_man.sync_all()?;

        fs::rename(&temp_dir, output_dir)?;
        tracing::info!(
            path = %output_dir.display(),
            rows = manifest.row_count,
            words = manifest.word_count,
            "store built"
        );

        Ok(BuiltStore {
            root: output_dir.to_path_buf(),
            manifest,
        })
    }

    fn create_schema(&self, conn: &Connection) -> Result<(), StoreBuildError> {
        let cols = &self.config.columns;
        let table = quote(&self.config.table);
        let freq = cols
            .freq
            .as_deref()
            .map(|f| format!(", {} INTEGER", quote(f)))
            .unwrap_or_default();
        conn.execute_batch(&format!(
            "CREATE TABLE {table} (
                 {} INTEGER PRIMARY KEY,
                 {} TEXT NOT NULL,
                 {} TEXT NOT NULL,
                 {} TEXT NOT NULL{freq}
             );
             CREATE INDEX {} ON {table} ({});",
            quote(&cols.id),
            quote(&cols.left),
            quote(&cols.word),
            quote(&cols.right),
            quote(&format!("ix_{}_{}", self.config.table, cols.word)),
            quote(&cols.word),
        ))?;
        Ok(())
    }

    fn insert_sql(&self) -> String {
        let cols = &self.config.columns;
        let table = quote(&self.config.table);
        match cols.freq.as_deref() {
            Some(freq) => format!(
                "INSERT INTO {table} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
                quote(&cols.id),
                quote(&cols.left),
                quote(&cols.word),
                quote(&cols.right),
                quote(freq),
            ),
            None => format!(
                "INSERT INTO {table} ({}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4)",
                quote(&cols.id),
                quote(&cols.left),
                quote(&cols.word),
                quote(&cols.right),
            ),
        }
    }
}
