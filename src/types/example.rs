use serde::{Deserialize, Serialize};

use crate::types::identifiers::ExampleId;

/// A persisted word-in-context row. Immutable once curated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub id: ExampleId,
    pub left: String,
    pub word: String,
    pub right: String,
    pub frequency: Option<u64>,
}

/// The truncated, optionally masked projection of an [`Example`] handed to
/// a caller. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: ExampleId,
    pub left: String,
    pub word: String,
    pub right: String,
}

/// Result of looking a word up by one of its example ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordInfo {
    pub word: String,
    pub frequency: Option<u64>,
}

/// Examples for one word, split by what the caller has already shown.
///
/// `displayed` follows the order of the caller's id list; `new_examples`
/// is reshuffled on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplePartition {
    pub displayed: Vec<DisplayRecord>,
    pub new_examples: Vec<DisplayRecord>,
}
