use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Characters a candidate word may be built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alphabet {
    chars: BTreeSet<char>,
}

impl Alphabet {
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
        }
    }

    /// ASCII lowercase plus the Hungarian accented vowels.
    pub fn hungarian_lowercase() -> Self {
        Self::from_chars(('a'..='z').chain("áéíóöőúüű".chars()))
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn admits(&self, word: &str) -> bool {
        word.chars().all(|c| self.contains(c))
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Words that must never become candidates.
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    words: HashSet<String>,
    source: Option<PathBuf>,
}

impl Blocklist {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            source: None,
        }
    }

    /// Load one word per line. Trailing whitespace is stripped; blank lines
    /// are ignored.
    pub fn load(path: &Path) -> Result<Self, ExtractionError> {
        let content = fs::read_to_string(path).map_err(|source| ExtractionError::Blocklist {
            path: path.to_path_buf(),
            source,
        })?;
        let words: HashSet<String> = content
            .lines()
            .map(str::trim_end)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        tracing::info!(path = %path.display(), entries = words.len(), "loaded blocklist");
        Ok(Self {
            words,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
