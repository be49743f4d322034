//! Interval mask filter.
//!
//! A record survives when its reference locus (if any) is outside every
//! reference-mask interval AND its query locus (if any) is outside every
//! query-mask interval. Records with a single locus are filtered by that
//! side's mask only.
//!
//! Lookups go through [`IntervalSet`], which merges intervals per contig and
//! binary-searches them, so cost is O(log intervals) per record.

use serde::Serialize;
use tracing::info;

use crate::core::interval::IntervalSet;
use crate::core::record::DifferenceRecord;

/// Records removed by each side; a record covered by both masks is counted
/// once, under the reference side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaskStats {
    pub input: usize,
    pub removed_by_reference: usize,
    pub removed_by_query: usize,
}

impl MaskStats {
    /// Records left after masking; zero if the removals exceed the input
    #[must_use]
    pub fn retained(&self) -> usize {
        self.input
            .saturating_sub(self.removed_by_reference)
            .saturating_sub(self.removed_by_query)
    }
}

#[derive(Debug, Clone)]
pub struct MaskOutcome {
    pub records: Vec<DifferenceRecord>,
    pub stats: MaskStats,
}

/// Keep the records not covered by either mask, preserving their order.
#[must_use]
pub fn apply_masks(
    records: &[DifferenceRecord],
    reference_mask: &IntervalSet,
    query_mask: &IntervalSet,
) -> MaskOutcome {
    let mut stats = MaskStats {
        input: records.len(),
        ..MaskStats::default()
    };
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let ref_masked = record
            .reference
            .as_ref()
            .is_some_and(|l| reference_mask.contains(&l.contig, l.pos));
        if ref_masked {
            stats.removed_by_reference += 1;
            continue;
        }

        let query_masked = record
            .query
            .as_ref()
            .is_some_and(|l| query_mask.contains(&l.contig, l.pos));
        if query_masked {
            stats.removed_by_query += 1;
            continue;
        }

        kept.push(record.clone());
    }

    info!(
        input = stats.input,
        removed_by_reference = stats.removed_by_reference,
        removed_by_query = stats.removed_by_query,
        retained = kept.len(),
        "Applied masks"
    );

    MaskOutcome {
        records: kept,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interval::MaskInterval;
    use crate::core::record::Locus;
    use crate::core::types::PairId;

    fn pair() -> PairId {
        PairId::new("H37Rv", "L1")
    }

    fn set(intervals: &[(&str, u64, u64)]) -> IntervalSet {
        let intervals: Vec<MaskInterval> = intervals
            .iter()
            .map(|&(c, s, e)| MaskInterval::new(c, s, e).unwrap())
            .collect();
        IntervalSet::from_intervals(&intervals)
    }

    fn snp_at(pos: u64) -> DifferenceRecord {
        DifferenceRecord::snp(
            pair(),
            Locus::new("chr", pos),
            Locus::new("q", pos),
            b'A',
            b'G',
        )
    }

    #[test]
    fn test_retained_never_underflows() {
        let stats = MaskStats {
            input: 1,
            removed_by_reference: 1,
            removed_by_query: 1,
        };
        assert_eq!(stats.retained(), 0);

        let stats = MaskStats {
            input: 5,
            removed_by_reference: 2,
            removed_by_query: 1,
        };
        assert_eq!(stats.retained(), 2);
    }

    #[test]
    fn test_reference_mask_removes_snp() {
        let records = vec![snp_at(105)];
        let outcome = apply_masks(&records, &set(&[("chr", 100, 108)]), &IntervalSet::new());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.removed_by_reference, 1);

        let unmasked = apply_masks(&records, &IntervalSet::new(), &IntervalSet::new());
        assert_eq!(unmasked.records, records);
    }

    #[test]
    fn test_half_open_boundary() {
        let records = vec![snp_at(99), snp_at(100), snp_at(107), snp_at(108)];
        let outcome = apply_masks(&records, &set(&[("chr", 100, 108)]), &IntervalSet::new());
        let kept: Vec<u64> = outcome
            .records
            .iter()
            .map(|r| r.reference.as_ref().unwrap().pos)
            .collect();
        assert_eq!(kept, vec![99, 108]);
    }

    #[test]
    fn test_insertion_ignores_reference_mask() {
        let ins = DifferenceRecord::insertion(pair(), Locus::new("q", 50), "ACG".to_string());
        let everything = set(&[("chr", 0, u64::MAX)]);
        let outcome = apply_masks(&[ins.clone()], &everything, &IntervalSet::new());
        assert_eq!(outcome.records, vec![ins.clone()]);

        let outcome = apply_masks(&[ins], &IntervalSet::new(), &set(&[("q", 49, 51)]));
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.removed_by_query, 1);
    }

    #[test]
    fn test_deletion_ignores_query_mask() {
        let del = DifferenceRecord::deletion(pair(), Locus::new("chr", 10), "T".to_string());
        let outcome = apply_masks(&[del.clone()], &IntervalSet::new(), &set(&[("q", 0, 1000)]));
        assert_eq!(outcome.records, vec![del]);
    }

    #[test]
    fn test_query_mask_uses_query_contig() {
        let records = vec![snp_at(5)];
        let other_contig = set(&[("chr", 0, 10)]);
        let outcome = apply_masks(&records, &IntervalSet::new(), &other_contig);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_superset_mask_never_keeps_more() {
        let records: Vec<DifferenceRecord> = (0..50).map(|p| snp_at(p * 3)).collect();
        let subset = set(&[("chr", 10, 40)]);
        let superset = set(&[("chr", 10, 40), ("chr", 60, 90), ("chr", 35, 70)]);
        let query_superset = set(&[("q", 120, 130)]);

        let small = apply_masks(&records, &subset, &IntervalSet::new());
        let large = apply_masks(&records, &superset, &query_superset);
        assert!(large.records.len() <= small.records.len());
        assert_eq!(large.stats.retained(), large.records.len());
        for record in &large.records {
            assert!(small.records.contains(record));
        }
    }

    #[test]
    fn test_inputs_untouched() {
        let records = vec![snp_at(1), snp_at(2)];
        let before = records.clone();
        let _ = apply_masks(&records, &set(&[("chr", 0, 2)]), &IntervalSet::new());
        assert_eq!(records, before);
    }
}
