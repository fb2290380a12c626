use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use super::{Alphabet, Blocklist, ExtractionError};
use crate::types::record::{ContextRecord, RecordError, RecordShape};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Inclusive bounds on the candidate word, in characters.
    pub word_min_len: usize,
    pub word_max_len: usize,
    /// Context widths in tokens.
    pub left_len: usize,
    pub right_len: usize,
    pub alphabet: Alphabet,
}

impl ExtractionConfig {
    pub fn v0() -> Self {
        Self {
            word_min_len: 4,
            word_max_len: 15,
            left_len: 5,
            right_len: 5,
            alphabet: Alphabet::hungarian_lowercase(),
        }
    }

    pub fn window_len(&self) -> usize {
        self.left_len + 1 + self.right_len
    }

    fn validate(&self) -> Result<(), ExtractionError> {
        if self.word_min_len == 0 || self.word_min_len > self.word_max_len {
            return Err(ExtractionError::LengthBounds {
                min: self.word_min_len,
                max: self.word_max_len,
            });
        }
        if self.alphabet.is_empty() {
            return Err(ExtractionError::EmptyAlphabet);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub sentences: usize,
    /// Sentences holding a tab, which cannot travel in a tab-separated
    /// record.
    pub skipped: usize,
    pub candidates: usize,
}

/// Slides a fixed `left + 1 + right` window over tokenized sentences.
pub struct WindowExtractor {
    config: ExtractionConfig,
    blocklist: Blocklist,
}

impl WindowExtractor {
    pub fn new(config: ExtractionConfig, blocklist: Blocklist) -> Result<Self, ExtractionError> {
        config.validate()?;
        Ok(Self { config, blocklist })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Whether `word` passes the length, alphabet and blocklist filters.
    pub fn accepts(&self, word: &str) -> bool {
        let len = word.chars().count();
        self.config.word_min_len <= len
            && len <= self.config.word_max_len
            && self.config.alphabet.admits(word)
            && !self.blocklist.contains(word)
    }

    /// Candidates from one tokenized sentence. Windows never hang over the
    /// sentence edges, so sentences shorter than the window yield nothing.
    /// A sentence or window containing a tab yields nothing either.
    pub fn extract_tokens(&self, tokens: &[&str], sentence: &str) -> Vec<ContextRecord> {
        if sentence.contains('\t') {
            return Vec::new();
        }
        let left_len = self.config.left_len;
        tokens
            .windows(self.config.window_len())
            .filter(|window| !window.iter().any(|token| token.contains('\t')))
            .filter(|window| self.accepts(window[left_len]))
            .map(|window| {
                ContextRecord::new(
                    window[left_len],
                    window[..left_len].join(" "),
                    window[left_len + 1..].join(" "),
                )
                .with_sentence(sentence)
            })
            .collect()
    }

    /// Candidates from one sentence-per-line input line (tokens separated
    /// by single spaces).
    pub fn extract_line(&self, line: &str) -> Vec<ContextRecord> {
        let sentence = line.trim_end();
        let tokens: Vec<&str> = sentence.split(' ').collect();
        self.extract_tokens(&tokens, sentence)
    }

    /// Stream a sentence-per-line corpus into tab-separated candidates.
    /// `shape` selects whether the source sentence is kept.
    pub fn extract_to<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
        shape: RecordShape,
    ) -> Result<ExtractionStats, RecordError> {
        let mut stats = ExtractionStats::default();
        for line in reader.lines() {
            let line = line?;
            stats.sentences += 1;
            if line.contains('\t') {
                stats.skipped += 1;
                tracing::debug!(sentence = stats.sentences, "skipping sentence with a tab");
                continue;
            }
            for candidate in self.extract_line(&line) {
                writeln!(writer, "{}", candidate.to_line(shape)?)?;
                stats.candidates += 1;
            }
        }
        writer.flush()?;
        tracing::info!(
            sentences = stats.sentences,
            skipped = stats.skipped,
            candidates = stats.candidates,
            "extraction finished"
        );
        Ok(stats)
    }
}
