use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::mask::DEFAULT_MASK_CHAR;
use super::BankError;
use crate::store::{ColumnMapping, SqliteTable};
use crate::types::window::ContextWindow;

/// Context widths as configured: either a (left, right) pair or a single
/// total window size, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    #[serde(default)]
    pub left_size: Option<i64>,
    #[serde(default)]
    pub right_size: Option<i64>,
    #[serde(default)]
    pub window_size: Option<i64>,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            left_size: Some(5),
            right_size: Some(5),
            window_size: None,
        }
    }
}

impl WindowSpec {
    pub fn resolve(&self) -> Result<ContextWindow, BankError> {
        match (self.window_size, self.left_size, self.right_size) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(BankError::Configuration(
                "window_size cannot be combined with left_size/right_size".into(),
            )),
            (Some(size), None, None) => Ok(ContextWindow::from_window_size(size)),
            (None, left, right) => Ok(ContextWindow::from_side_sizes(
                left.unwrap_or(0),
                right.unwrap_or(0),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    pub database: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
    /// Role (`id`, `left`, `word`, `right`, `freq`) to column name.
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub window: WindowSpec,
    #[serde(default = "default_mask_char")]
    pub mask_char: char,
}

fn default_table() -> String {
    "examples".into()
}

fn default_mask_char() -> char {
    DEFAULT_MASK_CHAR
}

impl BankConfig {
    pub fn load(path: &Path) -> Result<Self, BankError> {
        let content = fs::read_to_string(path).map_err(|source| BankError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| {
            BankError::Configuration(format!("cannot parse {}: {e}", path.display()))
        })
    }

    pub fn column_mapping(&self) -> Result<ColumnMapping, BankError> {
        ColumnMapping::resolve(&self.columns).map_err(|source| BankError::Store {
            context: "resolving column mapping".into(),
            source,
        })
    }

    pub fn open_table(&self) -> Result<SqliteTable, BankError> {
        let mapping = self.column_mapping()?;
        SqliteTable::open(&self.database, &self.table, &mapping).map_err(|source| BankError::Store {
            context: format!("opening {}", self.database.display()),
            source,
        })
    }
}
