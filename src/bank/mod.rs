//! Serve-time query engine over curated examples.
//!
//! The bank keeps no per-caller state: what a caller has already shown is
//! passed in as `displayed_ids` on every read. Random draws use the
//! thread-local generator, never a curation seed.

pub mod config;
pub mod mask;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::store::{ContextTable, SqliteTable, StoreError};
use crate::types::example::{DisplayRecord, Example, ExamplePartition, WordInfo};
use crate::types::identifiers::ExampleId;
use crate::types::window::ContextWindow;

pub use config::{BankConfig, WindowSpec};
pub use mask::{mask_word, WordMask, DEFAULT_MASK_CHAR};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("no example with id {0}")]
    IdNotFound(ExampleId),
    #[error("no examples for word `{0}`")]
    WordNotFound(String),
    #[error("the store holds no examples")]
    EmptyStore,
    #[error("id {id} matches {rows} rows; ids must be unique")]
    Corrupt { id: ExampleId, rows: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot read configuration {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store error while {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

/// Coarse classification of [`BankError`] for callers that only branch on
/// the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    NotFound,
    Corrupt,
    InvalidArgument,
    Store,
}

impl BankError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BankError::IdNotFound(_) | BankError::WordNotFound(_) | BankError::EmptyStore => {
                ErrorKind::NotFound
            }
            BankError::Corrupt { .. } => ErrorKind::Corrupt,
            BankError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            BankError::Configuration(_) | BankError::ConfigFile { .. } => ErrorKind::Configuration,
            BankError::Store { source, .. } if source.is_configuration() => {
                ErrorKind::Configuration
            }
            BankError::Store { .. } => ErrorKind::Store,
        }
    }
}

pub struct ContextBank<T> {
    table: T,
    window: ContextWindow,
    mask_char: char,
}

impl ContextBank<SqliteTable> {
    /// Open the SQLite store described by `config`. Mapping, schema and
    /// window problems are all reported here.
    pub fn open(config: &BankConfig) -> Result<Self, BankError> {
        let window = config.window.resolve()?;
        let table = config.open_table()?;
        tracing::info!(
            database = %config.database.display(),
            table = %config.table,
            ?window,
            "context bank ready"
        );
        Ok(Self::new(table, window, config.mask_char))
    }
}

impl<T: ContextTable> ContextBank<T> {
    pub fn new(table: T, window: ContextWindow, mask_char: char) -> Self {
        Self {
            table,
            window,
            mask_char,
        }
    }

    pub fn window(&self) -> ContextWindow {
        self.window
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Word and frequency of the example with `id`.
    pub fn identify_word_from_id(&self, id: ExampleId) -> Result<WordInfo, BankError> {
        let example = self.example_by_id(id)?;
        Ok(WordInfo {
            word: example.word,
            frequency: example.frequency,
        })
    }

    /// All examples of a word, split into the ones listed in
    /// `displayed_ids` (in that order) and the rest (freshly shuffled).
    ///
    /// When `word` is `None` it is looked up from `displayed_ids[0]`. Ids
    /// that do not belong to the word are skipped.
    pub fn read_examples_for_word(
        &self,
        word: Option<&str>,
        displayed_ids: &[ExampleId],
        hide_word: bool,
    ) -> Result<ExamplePartition, BankError> {
        let word = match word {
            Some(word) => word.to_string(),
            None => {
                let first = displayed_ids.first().ok_or(BankError::InvalidArgument(
                    "a word or at least one displayed id is required",
                ))?;
                self.identify_word_from_id(*first)?.word
            }
        };

        let rows = self
            .table
            .rows_with_word(&word)
            .map_err(|source| BankError::Store {
                context: format!("reading examples for `{word}`"),
                source,
            })?;
        if rows.is_empty() {
            return Err(BankError::WordNotFound(word));
        }

        let mask = WordMask::for_request(hide_word, self.mask_char);
        let wanted: HashSet<ExampleId> = displayed_ids.iter().copied().collect();
        let mut shown: HashMap<ExampleId, DisplayRecord> = HashMap::new();
        let mut new_examples = Vec::new();
        for row in &rows {
            let record = self.render(row, mask);
            if wanted.contains(&row.id) {
                shown.insert(row.id, record);
            } else {
                new_examples.push(record);
            }
        }

        let displayed = displayed_ids
            .iter()
            .filter_map(|id| shown.get(id).cloned())
            .collect();
        new_examples.shuffle(&mut rand::rng());

        Ok(ExamplePartition {
            displayed,
            new_examples,
        })
    }

    /// One masked record for a uniformly drawn id.
    pub fn select_one_random_example(&self) -> Result<Vec<DisplayRecord>, BankError> {
        let id = self.random_id()?;
        let example = self.example_by_id(id)?;
        Ok(vec![self.render(&example, WordMask::Mask(self.mask_char))])
    }

    /// Word and frequency of a uniformly drawn id, in clear.
    pub fn select_random_word(&self) -> Result<WordInfo, BankError> {
        let id = self.random_id()?;
        self.identify_word_from_id(id)
    }

    /// Project an example through the configured window and `mask`.
    pub fn render(&self, example: &Example, mask: WordMask) -> DisplayRecord {
        let (left, right) = self.window.apply(&example.left, &example.right);
        DisplayRecord {
            id: example.id,
            left,
            word: mask.apply(&example.word),
            right,
        }
    }

    fn example_by_id(&self, id: ExampleId) -> Result<Example, BankError> {
        let mut rows = self.table.rows_with_id(id).map_err(|source| BankError::Store {
            context: format!("resolving id {id}"),
            source,
        })?;
        match rows.len() {
            0 => Err(BankError::IdNotFound(id)),
            1 => Ok(rows.remove(0)),
            n => Err(BankError::Corrupt { id, rows: n }),
        }
    }

    fn random_id(&self) -> Result<ExampleId, BankError> {
        let count = self.table.row_count().map_err(|source| BankError::Store {
            context: "counting rows".into(),
            source,
        })?;
        if count == 0 {
            return Err(BankError::EmptyStore);
        }
        let raw = rand::rng().random_range(1..=count);
        ExampleId::new(raw).map_err(|_| BankError::EmptyStore)
    }
}
