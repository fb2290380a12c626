//! Batch curation samplers.
//!
//! Every sampler draws from an explicitly seeded [`CurationRng`]; a run over
//! the same ordered input with the same seed is byte-reproducible. Inputs
//! are grouped by contiguous identical word and a group is never split.

pub mod diversity;
pub mod frequency;
pub mod grouping;
pub mod quota;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

use crate::types::record::RecordError;

pub use diversity::{DiversityConfig, DiversitySampler};
pub use frequency::{FrequencyCapConfig, FrequencyCapSampler};
pub use grouping::{group_contiguous, ContiguousGroups};
pub use quota::{count_groups, QuotaStats, QuotaSubsampler};

/// Generator used by every curation stage. Kept distinct from the
/// thread-local generator the bank uses at serve time.
pub type CurationRng = ChaCha20Rng;

pub const DEFAULT_SEED: u64 = 12345;

pub fn curation_rng(seed: u64) -> CurationRng {
    ChaCha20Rng::seed_from_u64(seed)
}

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot keep {keep_count} groups out of {total_groups}")]
    QuotaExceedsGroups { keep_count: usize, total_groups: usize },
    #[error("expected {expected} word groups, input has {found}")]
    GroupCountMismatch { expected: usize, found: usize },
    #[error("candidate for `{word}` carries no source sentence")]
    MissingSentence { word: String },
    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Counters reported by the streaming per-word samplers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleStats {
    pub groups: usize,
    pub lines_in: usize,
    pub lines_out: usize,
}
