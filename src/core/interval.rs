use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` on a named contig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskInterval {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl MaskInterval {
    /// Returns `None` when `start >= end`
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Option<Self> {
        if start < end {
            Some(Self {
                contig: contig.into(),
                start,
                end,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, contig: &str, pos: u64) -> bool {
        self.contig == contig && self.start <= pos && pos < self.end
    }
}

/// A set of mask intervals answering point-membership queries.
///
/// Intervals are merged per contig into a sorted, non-overlapping list, so a
/// lookup is a binary search. Membership follows union semantics: a position
/// is masked if any input interval covers it.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    by_contig: HashMap<String, Vec<(u64, u64)>>,
    source_count: usize,
}

impl IntervalSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_intervals(intervals: &[MaskInterval]) -> Self {
        let mut by_contig: HashMap<String, Vec<(u64, u64)>> = HashMap::new();
        for interval in intervals {
            by_contig
                .entry(interval.contig.clone())
                .or_default()
                .push((interval.start, interval.end));
        }

        for ranges in by_contig.values_mut() {
            *ranges = merge_ranges(std::mem::take(ranges));
        }

        Self {
            by_contig,
            source_count: intervals.len(),
        }
    }

    /// Number of intervals the set was built from (before merging)
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_contig.is_empty()
    }

    #[must_use]
    pub fn contains(&self, contig: &str, pos: u64) -> bool {
        let Some(ranges) = self.by_contig.get(contig) else {
            return false;
        };

        // First range whose end lies beyond pos; ranges are disjoint and sorted
        let idx = ranges.partition_point(|&(_, end)| end <= pos);
        ranges.get(idx).is_some_and(|&(start, _)| start <= pos)
    }
}

/// Sort and coalesce overlapping or touching ranges
pub(crate) fn merge_ranges(mut ranges: Vec<(u64, u64)>) -> Vec<(u64, u64)> {
    ranges.sort_unstable();

    let mut merged: Vec<(u64, u64)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}
