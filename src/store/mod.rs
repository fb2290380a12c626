pub mod builder;
pub mod manifest;
pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::example::Example;
use crate::types::identifiers::ExampleId;

pub use builder::{BuiltStore, StoreBuildError, StoreBuilder};
pub use manifest::{CurationManifest, StoreBuildConfig};
pub use memory::InMemoryTable;
pub use sqlite::SqliteTable;

/// Read-only view of the persisted examples.
///
/// Implementations return every matching row; deciding what a duplicate id
/// means is left to the caller.
pub trait ContextTable {
    fn rows_with_id(&self, id: ExampleId) -> Result<Vec<Example>, StoreError>;

    fn rows_with_word(&self, word: &str) -> Result<Vec<Example>, StoreError>;

    /// Number of rows. Ids are expected to cover exactly `1..=row_count`.
    fn row_count(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("column role `{0}` is not mapped")]
    UnmappedRole(ColumnRole),
    #[error("unknown column role `{0}`")]
    UnknownRole(String),
    #[error("`{0}` is not a valid table or column name")]
    InvalidIdentifier(String),
    #[error("table `{0}` does not exist")]
    MissingTable(String),
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },
    #[error("stored id {0} is not a positive integer")]
    InvalidStoredId(i64),
    #[error("stored frequency {0} is negative")]
    InvalidStoredFrequency(i64),
    #[error("integer {0} does not fit the store")]
    IntegerOverflow(u64),
    #[error("store connection lock poisoned")]
    Poisoned,
    #[error("SQLite error: {0}")]
    Backend(#[from] rusqlite::Error),
}

impl StoreError {
    /// Whether the error stems from the mapping or schema rather than from
    /// a failing read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StoreError::UnmappedRole(_)
                | StoreError::UnknownRole(_)
                | StoreError::InvalidIdentifier(_)
                | StoreError::MissingTable(_)
                | StoreError::MissingColumn { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Id,
    Left,
    Word,
    Right,
    Freq,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 5] = [
        ColumnRole::Id,
        ColumnRole::Left,
        ColumnRole::Word,
        ColumnRole::Right,
        ColumnRole::Freq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Id => "id",
            ColumnRole::Left => "left",
            ColumnRole::Word => "word",
            ColumnRole::Right => "right",
            ColumnRole::Freq => "freq",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical role to physical column name, resolved once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub id: String,
    pub left: String,
    pub word: String,
    pub right: String,
    /// Optional; when absent every frequency reads as `None`.
    pub freq: Option<String>,
}

impl ColumnMapping {
    pub fn v0() -> Self {
        Self {
            id: "id".into(),
            left: "left".into(),
            word: "word".into(),
            right: "right".into(),
            freq: Some("frequency".into()),
        }
    }

    /// Build from a role → column map. `id`, `left`, `word` and `right`
    /// are required.
    pub fn resolve(roles: &BTreeMap<String, String>) -> Result<Self, StoreError> {
        for key in roles.keys() {
            if ColumnRole::parse(key).is_none() {
                return Err(StoreError::UnknownRole(key.clone()));
            }
        }
        let required = |role: ColumnRole| -> Result<String, StoreError> {
            roles
                .get(role.as_str())
                .cloned()
                .ok_or(StoreError::UnmappedRole(role))
        };
        let mapping = Self {
            id: required(ColumnRole::Id)?,
            left: required(ColumnRole::Left)?,
            word: required(ColumnRole::Word)?,
            right: required(ColumnRole::Right)?,
            freq: roles.get(ColumnRole::Freq.as_str()).cloned(),
        };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        for name in self.columns() {
            validate_identifier(name)?;
        }
        Ok(())
    }

    pub fn column(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Id => Some(&self.id),
            ColumnRole::Left => Some(&self.left),
            ColumnRole::Word => Some(&self.word),
            ColumnRole::Right => Some(&self.right),
            ColumnRole::Freq => self.freq.as_deref(),
        }
    }

    /// Mapped column names in role order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        ColumnRole::ALL.into_iter().filter_map(|role| self.column(role))
    }
}

pub(crate) fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

pub(crate) fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

pub(crate) fn to_sql_int(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::IntegerOverflow(value))
}
