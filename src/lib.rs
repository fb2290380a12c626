//! Word-in-context curation and serving for guessing games.
//!
//! `context-bank` covers the whole life of an example: sliding-window
//! extraction of candidates from a sentence-per-line corpus, reproducible
//! per-word and per-vocabulary sampling, loading into a SQLite store, and
//! the serve-time [`bank::ContextBank`] that truncates, masks and
//! partitions examples for a caller.
//!
//! Curation is deterministic: a fixed seed and an identically ordered input
//! give byte-identical output. Serving is deliberately not.

pub mod bank;
pub mod extraction;
pub mod sampling;
pub mod store;
pub mod types;
