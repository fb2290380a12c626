use std::collections::HashSet;
use std::io::Write;

use rand::seq::index;
use serde::{Deserialize, Serialize};

use super::{group_contiguous, CurationRng, SampleStats, SamplingError};
use crate::types::identifiers::GroupIdSequence;
use crate::types::record::{ContextRecord, RecordError, RecordShape};
use crate::types::window::ContextWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiversityConfig {
    /// Sentences to keep per word.
    pub target_count: usize,
    /// Tokens per side compared when rejecting near-duplicates. Only used
    /// for dedup, never for the emitted width.
    pub dedup_width: usize,
    /// (left, right) truncations emitted for every kept sentence.
    pub variants: Vec<(usize, usize)>,
}

impl DiversityConfig {
    pub fn v0() -> Self {
        Self {
            target_count: 30,
            dedup_width: 4,
            variants: vec![(4, 0), (0, 4), (4, 4), (8, 0), (0, 8), (8, 8)],
        }
    }
}

/// Picks a small set of mutually dissimilar contexts per word and emits
/// each pick once per truncation variant.
pub struct DiversitySampler {
    config: DiversityConfig,
}

impl DiversitySampler {
    pub fn new(config: DiversityConfig) -> Result<Self, SamplingError> {
        if config.target_count == 0 {
            return Err(SamplingError::InvalidConfig("target_count must be positive"));
        }
        if config.variants.is_empty() {
            return Err(SamplingError::InvalidConfig("at least one truncation variant is required"));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Indices of the candidates that survive the near-duplicate filter,
    /// in input order. A candidate is rejected when its sentence, its
    /// dedup-width left or its dedup-width right was already kept.
    pub fn diverse_pool(&self, group: &[ContextRecord]) -> Result<Vec<usize>, SamplingError> {
        let dedup = ContextWindow::sides(self.config.dedup_width, self.config.dedup_width);
        let mut sentences = HashSet::new();
        let mut lefts = HashSet::new();
        let mut rights = HashSet::new();
        let mut pool = Vec::new();

        for (i, candidate) in group.iter().enumerate() {
            let sentence = candidate
                .sentence
                .as_deref()
                .ok_or_else(|| SamplingError::MissingSentence {
                    word: candidate.word.clone(),
                })?;
            let (left, right) = dedup.apply(&candidate.left, &candidate.right);
            if sentences.contains(sentence) || lefts.contains(&left) || rights.contains(&right) {
                continue;
            }
            sentences.insert(sentence);
            lefts.insert(left);
            rights.insert(right);
            pool.push(i);
        }
        Ok(pool)
    }

    /// Sample one word group. Every emitted record carries the group id of
    /// its source pick and the pre-sampling group size as frequency.
    pub fn sample_group(
        &self,
        group: &[ContextRecord],
        rng: &mut CurationRng,
        group_ids: &mut GroupIdSequence,
    ) -> Result<Vec<ContextRecord>, SamplingError> {
        let pool = self.diverse_pool(group)?;
        let amount = pool.len().min(self.config.target_count);
        let frequency = group.len() as u64;

        let mut out = Vec::with_capacity(amount * self.config.variants.len());
        for pick in index::sample(rng, pool.len(), amount) {
            let chosen = &group[pool[pick]];
            let group_id = group_ids.next_id();
            for &(left, right) in &self.config.variants {
                let (left, right) =
                    ContextWindow::sides(left, right).apply(&chosen.left, &chosen.right);
                out.push(ContextRecord {
                    word: chosen.word.clone(),
                    left,
                    right,
                    sentence: chosen.sentence.clone(),
                    group_id: Some(group_id),
                    frequency: Some(frequency),
                });
            }
        }

        if let Some(first) = group.first() {
            tracing::debug!(
                word = %first.word,
                candidates = group.len(),
                pool = pool.len(),
                picked = amount,
                "diversity sampled group"
            );
        }
        Ok(out)
    }

    /// Sample a stream of candidates already sorted by word, writing the
    /// `Grouped` shape.
    pub fn run<I, W>(
        &self,
        records: I,
        mut writer: W,
        rng: &mut CurationRng,
    ) -> Result<SampleStats, SamplingError>
    where
        I: IntoIterator<Item = Result<ContextRecord, RecordError>>,
        W: Write,
    {
        let mut stats = SampleStats::default();
        let mut group_ids = GroupIdSequence::default();
        for group in group_contiguous(records, |r: &ContextRecord| r.word.clone()) {
            let group = group?;
            stats.groups += 1;
            stats.lines_in += group.len();
            for record in self.sample_group(&group, rng, &mut group_ids)? {
                writeln!(writer, "{}", record.to_line(RecordShape::Grouped)?)?;
                stats.lines_out += 1;
            }
        }
        writer.flush()?;
        tracing::info!(
            groups = stats.groups,
            lines_in = stats.lines_in,
            lines_out = stats.lines_out,
            "diversity sampling finished"
        );
        Ok(stats)
    }
}
