pub mod filters;
pub mod window;

use std::path::PathBuf;

use thiserror::Error;

pub use filters::{Alphabet, Blocklist};
pub use window::{ExtractionConfig, WindowExtractor};

/// Configuration problems, all detected before any text is read.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("cannot read blocklist {path}: {source}")]
    Blocklist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid word length bounds: min {min}, max {max}")]
    LengthBounds { min: usize, max: usize },
    #[error("allowed alphabet is empty")]
    EmptyAlphabet,
}
