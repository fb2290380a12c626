use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use rand::seq::index;

use super::{CurationRng, SamplingError};
use crate::types::record::{ContextRecord, RecordShape};

/// First pass: number of contiguous word groups in a tab-separated stream.
/// Every line must parse as `shape`.
pub fn count_groups<R: BufRead>(reader: R, shape: RecordShape) -> Result<usize, SamplingError> {
    let mut groups = 0;
    let mut current: Option<String> = None;
    for (i, line) in raw_lines(reader).enumerate() {
        let word = ContextRecord::parse(&line?, shape, i + 1)?.word;
        if current.as_deref() != Some(word.as_str()) {
            groups += 1;
            current = Some(word);
        }
    }
    Ok(groups)
}

/// Lines with their terminator still attached, so they can be copied back
/// out byte for byte.
fn raw_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<String>> {
    std::iter::from_fn(move || {
        let mut buf = String::new();
        match reader.read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(buf)),
            Err(e) => Some(Err(e)),
        }
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaStats {
    pub groups_seen: usize,
    pub groups_kept: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
}

/// Keeps a uniform random subset of whole word groups.
#[derive(Debug, Clone)]
pub struct QuotaSubsampler {
    total_groups: usize,
    chosen: BTreeSet<usize>,
}

impl QuotaSubsampler {
    /// Draw `keep_count` of `total_groups` group indices without
    /// replacement.
    pub fn new(
        total_groups: usize,
        keep_count: usize,
        rng: &mut CurationRng,
    ) -> Result<Self, SamplingError> {
        if keep_count > total_groups {
            return Err(SamplingError::QuotaExceedsGroups {
                keep_count,
                total_groups,
            });
        }
        let chosen: BTreeSet<usize> = index::sample(rng, total_groups, keep_count)
            .into_iter()
            .collect();
        tracing::info!(total_groups, keep_count, "drew quota group subset");
        Ok(Self { total_groups, chosen })
    }

    pub fn is_chosen(&self, group_index: usize) -> bool {
        self.chosen.contains(&group_index)
    }

    /// Chosen group indices in ascending order.
    pub fn chosen_groups(&self) -> impl Iterator<Item = usize> + '_ {
        self.chosen.iter().copied()
    }

    /// Second pass: copy every line of a chosen group verbatim, drop the
    /// rest. Every line must parse as `shape`, and the stream must contain
    /// exactly `total_groups` groups.
    pub fn filter<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
        shape: RecordShape,
    ) -> Result<QuotaStats, SamplingError> {
        let mut stats = QuotaStats::default();
        let mut current: Option<String> = None;
        let mut keeping = false;

        for (i, line) in raw_lines(reader).enumerate() {
            let line = line?;
            let word = ContextRecord::parse(&line, shape, i + 1)?.word;
            if current.as_deref() != Some(word.as_str()) {
                let group_index = stats.groups_seen;
                stats.groups_seen += 1;
                keeping = self.is_chosen(group_index);
                if keeping {
                    stats.groups_kept += 1;
                }
                current = Some(word);
            }
            if keeping {
                writer.write_all(line.as_bytes())?;
                if !line.ends_with('\n') {
                    writer.write_all(b"\n")?;
                }
                stats.lines_kept += 1;
            } else {
                stats.lines_dropped += 1;
            }
        }
        writer.flush()?;

        if stats.groups_seen != self.total_groups {
            return Err(SamplingError::GroupCountMismatch {
                expected: self.total_groups,
                found: stats.groups_seen,
            });
        }
        tracing::info!(
            groups_kept = stats.groups_kept,
            lines_kept = stats.lines_kept,
            lines_dropped = stats.lines_dropped,
            "quota filtering finished"
        );
        Ok(stats)
    }
}
