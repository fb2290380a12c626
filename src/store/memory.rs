use std::collections::HashMap;

use super::{ContextTable, StoreError};
use crate::types::example::Example;
use crate::types::identifiers::ExampleId;
use crate::types::record::ContextRecord;

/// Rows held in memory, indexed by id and by word.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTable {
    rows: Vec<Example>,
    by_id: HashMap<ExampleId, Vec<usize>>,
    by_word: HashMap<String, Vec<usize>>,
}

impl InMemoryTable {
    /// Takes rows as given; duplicate ids are kept so that integrity
    /// violations stay observable.
    pub fn new(rows: Vec<Example>) -> Self {
        let mut by_id: HashMap<ExampleId, Vec<usize>> = HashMap::new();
        let mut by_word: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            by_id.entry(row.id).or_default().push(i);
            by_word.entry(row.word.clone()).or_default().push(i);
        }
        Self { rows, by_id, by_word }
    }

    /// Assign dense ids from 1 in input order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ContextRecord>,
    {
        let mut id = ExampleId::first();
        let mut rows = Vec::new();
        for record in records {
            rows.push(Example {
                id,
                left: record.left,
                word: record.word,
                right: record.right,
                frequency: record.frequency,
            });
            id = id.next();
        }
        Self::new(rows)
    }

    pub fn rows(&self) -> &[Example] {
        &self.rows
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<Example> {
        indices
            .map(|indices| indices.iter().map(|&i| self.rows[i].clone()).collect())
            .unwrap_or_default()
    }
}

impl ContextTable for InMemoryTable {
    fn rows_with_id(&self, id: ExampleId) -> Result<Vec<Example>, StoreError> {
        Ok(self.collect(self.by_id.get(&id)))
    }

    fn rows_with_word(&self, word: &str) -> Result<Vec<Example>, StoreError> {
        Ok(self.collect(self.by_word.get(word)))
    }

    fn row_count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.len() as u64)
    }
}
