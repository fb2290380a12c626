use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a persisted example.
///
/// Ids are positive and densely assigned from 1 by the store builder; the
/// bank relies on the range `1..=row_count` when drawing a random row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ExampleId(u64);

#[derive(Debug, Error)]
pub enum ExampleIdError {
    #[error("Example ids start at 1, got 0")]
    Zero,
}

impl ExampleId {
    pub fn new(raw: u64) -> Result<Self, ExampleIdError> {
        if raw == 0 {
            return Err(ExampleIdError::Zero);
        }
        Ok(ExampleId(raw))
    }

    /// The first id of a freshly built store.
    pub fn first() -> Self {
        ExampleId(1)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        ExampleId(self.0 + 1)
    }
}

impl TryFrom<u64> for ExampleId {
    type Error = ExampleIdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        ExampleId::new(raw)
    }
}

impl From<ExampleId> for u64 {
    fn from(id: ExampleId) -> Self {
        id.0
    }
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Synthetic identifier shared by all truncation variants of one sampled
/// sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

/// Hands out group ids across the groups of one curation run.
#[derive(Debug, Clone)]
pub struct GroupIdSequence {
    next: u64,
}

impl GroupIdSequence {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> GroupId {
        let id = GroupId(self.next);
        self.next += 1;
        id
    }
}

impl Default for GroupIdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
