use std::io::Write;

use rand::seq::index;
use serde::{Deserialize, Serialize};

use super::{group_contiguous, CurationRng, SampleStats, SamplingError};
use crate::types::record::{ContextRecord, RecordError, RecordShape};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyCapConfig {
    /// Maximum lines kept per word.
    pub target_count: usize,
}

impl FrequencyCapConfig {
    pub fn v0() -> Self {
        Self { target_count: 30 }
    }
}

/// Caps the number of examples per word without any diversity filter.
pub struct FrequencyCapSampler {
    config: FrequencyCapConfig,
}

impl FrequencyCapSampler {
    pub fn new(config: FrequencyCapConfig) -> Result<Self, SamplingError> {
        if config.target_count == 0 {
            return Err(SamplingError::InvalidConfig("target_count must be positive"));
        }
        Ok(Self { config })
    }

    /// Keep at most `target_count` lines of one word group, annotated with
    /// the group's original size. Kept lines stay in input order.
    pub fn sample_group(
        &self,
        group: Vec<ContextRecord>,
        rng: &mut CurationRng,
    ) -> Vec<ContextRecord> {
        let frequency = group.len() as u64;
        let mut kept: Vec<ContextRecord> = if group.len() > self.config.target_count {
            let mut picks = index::sample(rng, group.len(), self.config.target_count).into_vec();
            picks.sort_unstable();
            let mut slots: Vec<Option<ContextRecord>> = group.into_iter().map(Some).collect();
            picks.into_iter().filter_map(|i| slots[i].take()).collect()
        } else {
            group
        };
        for record in &mut kept {
            record.frequency = Some(frequency);
        }
        kept
    }

    /// Sample a stream sorted by word, writing the `WithFrequency` shape.
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
        for group in group_contiguous(records, |r: &ContextRecord| r.word.clone()) {
            let group = group?;
            stats.groups += 1;
            stats.lines_in += group.len();
            for record in self.sample_group(group, rng) {
                writeln!(writer, "{}", record.to_line(RecordShape::WithFrequency)?)?;
                stats.lines_out += 1;
            }
        }
        writer.flush()?;
        tracing::info!(
            groups = stats.groups,
            lines_in = stats.lines_in,
            lines_out = stats.lines_out,
            "frequency-capped sampling finished"
        );
        Ok(stats)
    }
}
