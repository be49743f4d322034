//! Scenario classification and per-pair counting.
//!
//! Every record maps to exactly one [`Scenario`]. Rules are applied in
//! precedence order, first match wins:
//!
//! | Precedence | Scenario | Condition |
//! |-----------:|----------|-----------|
//! | 1 | `N_region` | either side's bases contain an ambiguity code, or the operation is `NRUN` |
//! | 2 | `Gap` | operation is `GAP` |
//! | 3 | `Insertion` | query locus only |
//! | 3 | `Deletion` | reference locus only |
//! | 4 | `SNP` | both loci, both bases single unambiguous nucleotides that differ |
//!
//! A record matching none of these is an error, never dropped. So is a
//! record with neither a reference nor a query locus.

use tracing::debug;

use crate::core::counts::ScenarioCount;
use crate::core::genome::{is_ambiguous_base, is_unambiguous_base};
use crate::core::record::DifferenceRecord;
use crate::core::types::{Operation, PairId, Scenario};
use crate::pipeline::PipelineError;

/// Classify one record.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRecord` for a record without any locus,
/// or `PipelineError::Classification` when no rule applies, e.g. a SNP whose
/// bases are identical or longer than one nucleotide.
pub fn classify(record: &DifferenceRecord) -> Result<Scenario, PipelineError> {
    if !record.has_locus() {
        return Err(PipelineError::MalformedRecord(format!(
            "{} {} record has no locus",
            record.pair, record.operation
        )));
    }

    if record.operation == Operation::NRun
        || has_ambiguous(&record.reference_bases)
        || has_ambiguous(&record.query_bases)
    {
        return Ok(Scenario::NRegion);
    }

    if record.operation == Operation::Gap {
        return Ok(Scenario::Gap);
    }

    match (&record.reference, &record.query) {
        (None, Some(_)) => Ok(Scenario::Insertion),
        (Some(_), None) => Ok(Scenario::Deletion),
        (Some(_), Some(_)) if is_snp(&record.reference_bases, &record.query_bases) => {
            Ok(Scenario::Snp)
        }
        _ => Err(PipelineError::Classification(describe(record))),
    }
}

fn has_ambiguous(bases: &str) -> bool {
    bases.bytes().any(is_ambiguous_base)
}

fn is_snp(reference_bases: &str, query_bases: &str) -> bool {
    match (reference_bases.as_bytes(), query_bases.as_bytes()) {
        ([r], [q]) => {
            is_unambiguous_base(*r) && is_unambiguous_base(*q) && !r.eq_ignore_ascii_case(q)
        }
        _ => false,
    }
}

fn describe(record: &DifferenceRecord) -> String {
    let locus = |l: &Option<crate::core::record::Locus>| {
        l.as_ref()
            .map_or_else(|| ".".to_string(), |l| format!("{}:{}", l.contig, l.pos))
    };
    format!(
        "{} {} at reference {} / query {} ({} -> {})",
        record.pair,
        record.operation,
        locus(&record.reference),
        locus(&record.query),
        record.reference_bases,
        record.query_bases
    )
}

/// Count the scenarios of one pair's masked records.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRecord` if a record belongs to another
/// pair, or `PipelineError::Classification` if a record cannot be classified.
pub fn count_scenarios(
    pair: &PairId,
    records: &[DifferenceRecord],
) -> Result<ScenarioCount, PipelineError> {
    let mut count = ScenarioCount::new(pair.clone());

    for record in records {
        if &record.pair != pair {
            return Err(PipelineError::MalformedRecord(format!(
                "record for {} found in table for {pair}",
                record.pair
            )));
        }
        count.add(classify(record)?);
    }

    debug!(pair = %pair, total = count.total(), "Counted scenarios");
    Ok(count)
}

/// Count a table that may hold several pairs, one result per pair in
/// first-seen order.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRecord` for a record without any locus,
/// or `PipelineError::Classification` if a record cannot be classified.
pub fn count_by_pair(records: &[DifferenceRecord]) -> Result<Vec<ScenarioCount>, PipelineError> {
    let mut counts: Vec<ScenarioCount> = Vec::new();

    for record in records {
        let scenario = classify(record)?;
        match counts.iter_mut().find(|c| c.pair == record.pair) {
            Some(count) => count.add(scenario),
            None => {
                let mut count = ScenarioCount::new(record.pair.clone());
                count.add(scenario);
                counts.push(count);
            }
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Locus;

    fn pair() -> PairId {
        PairId::new("H37Rv", "L1")
    }

    fn record(
        operation: Operation,
        reference: Option<u64>,
        query: Option<u64>,
        ref_bases: &str,
        query_bases: &str,
    ) -> DifferenceRecord {
        DifferenceRecord {
            pair: pair(),
            reference: reference.map(|p| Locus::new("chr", p)),
            query: query.map(|p| Locus::new("q", p)),
            operation,
            length: 1,
            reference_bases: ref_bases.to_string(),
            query_bases: query_bases.to_string(),
        }
    }

    #[test]
    fn test_basic_taxonomy() {
        let cases = [
            (record(Operation::Snp, Some(1), Some(1), "A", "G"), Scenario::Snp),
            (record(Operation::Insertion, None, Some(1), "-", "ACG"), Scenario::Insertion),
            (record(Operation::Deletion, Some(1), None, "TT", "-"), Scenario::Deletion),
            (record(Operation::NRun, Some(1), Some(1), "AC", "NN"), Scenario::NRegion),
            (record(Operation::Gap, Some(1), None, ".", "."), Scenario::Gap),
            (record(Operation::Gap, None, Some(1), ".", "."), Scenario::Gap),
        ];
        for (rec, expected) in cases {
            assert_eq!(classify(&rec).unwrap(), expected, "{rec:?}");
        }
    }

    #[test]
    fn test_ambiguous_insertion_is_n_region() {
        let rec = record(Operation::Insertion, None, Some(5), "-", "ANA");
        assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
    }

    #[test]
    fn test_ambiguous_deletion_is_n_region() {
        let rec = record(Operation::Deletion, Some(5), None, "NNN", "-");
        assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
    }

    #[test]
    fn test_ambiguous_snp_is_n_region() {
        let rec = record(Operation::Snp, Some(5), Some(5), "A", "R");
        assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
    }

    #[test]
    fn test_gap_beats_indel() {
        // A gap has one locus like an indel; the explicit operation wins
        let rec = record(Operation::Gap, None, Some(9), ".", ".");
        assert_eq!(classify(&rec).unwrap(), Scenario::Gap);
    }

    #[test]
    fn test_n_region_beats_gap() {
        let rec = record(Operation::Gap, Some(9), None, "N", ".");
        assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
    }

    #[test]
    fn test_snp_adjacent_to_gap_counts_both() {
        let records = vec![
            record(Operation::Gap, Some(0), None, ".", "."),
            record(Operation::Snp, Some(10), Some(0), "C", "T"),
        ];
        let count = count_scenarios(&pair(), &records).unwrap();
        assert_eq!(count.get(Scenario::Gap), 1);
        assert_eq!(count.get(Scenario::Snp), 1);
    }

    #[test]
    fn test_unclassifiable_records_error() {
        let same_bases = record(Operation::Snp, Some(1), Some(1), "A", "A");
        assert!(matches!(
            classify(&same_bases),
            Err(PipelineError::Classification(_))
        ));

        let multi_base = record(Operation::Snp, Some(1), Some(1), "AC", "GT");
        assert!(classify(&multi_base).is_err());

        let lowercase_same = record(Operation::Snp, Some(1), Some(1), "a", "A");
        assert!(classify(&lowercase_same).is_err());
    }

    #[test]
    fn test_record_without_locus_is_malformed() {
        for op in [Operation::Gap, Operation::NRun, Operation::Snp] {
            let rec = record(op, None, None, "A", "G");
            assert!(matches!(
                classify(&rec),
                Err(PipelineError::MalformedRecord(_))
            ));
        }

        let gap = record(Operation::Gap, None, None, ".", ".");
        assert!(count_scenarios(&pair(), &[gap.clone()]).is_err());
        assert!(count_by_pair(&[gap]).is_err());
    }

    #[test]
    fn test_one_sided_n_run_is_n_region() {
        let rec = record(Operation::NRun, None, Some(10), ".", "NNNNN");
        assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
    }

    #[test]
    fn test_every_boundary_record_gets_exactly_one_label() {
        let ops = [
            Operation::Snp,
            Operation::Insertion,
            Operation::Deletion,
            Operation::NRun,
            Operation::Gap,
        ];
        let loci = [(Some(1), Some(1)), (Some(1), None), (None, Some(1))];
        let bases = ["A", "G", "N", "-", ".", "ACG", "ANG"];

        for op in ops {
            for (r, q) in loci {
                for rb in bases {
                    for qb in bases {
                        let rec = record(op, r, q, rb, qb);
                        // Totality: either one label or an explicit error
                        if let Ok(scenario) = classify(&rec) {
                            assert!(Scenario::ALL.contains(&scenario));
                        }
                        if rb.contains('N') || qb.contains('N') {
                            assert_eq!(classify(&rec).unwrap(), Scenario::NRegion);
                        } else if op == Operation::Gap {
                            assert_eq!(classify(&rec).unwrap(), Scenario::Gap);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_count_conserves_records() {
        let records = vec![
            record(Operation::Snp, Some(1), Some(1), "A", "G"),
            record(Operation::Snp, Some(2), Some(2), "C", "T"),
            record(Operation::Insertion, None, Some(3), "-", "A"),
            record(Operation::NRun, Some(4), Some(4), "A", "N"),
        ];
        let count = count_scenarios(&pair(), &records).unwrap();
        assert_eq!(count.total(), records.len() as u64);
        assert_eq!(count.get(Scenario::Snp), 2);
        assert_eq!(count.get(Scenario::Deletion), 0);
        assert!(!count.counts.contains_key(&Scenario::Deletion));
    }

    #[test]
    fn test_empty_table_counts_nothing() {
        let count = count_scenarios(&pair(), &[]).unwrap();
        assert!(count.counts.is_empty());
        assert_eq!(count.pair, pair());
    }

    #[test]
    fn test_foreign_pair_rejected() {
        let mut rec = record(Operation::Snp, Some(1), Some(1), "A", "G");
        rec.pair = PairId::new("H37Rv", "L2");
        assert!(matches!(
            count_scenarios(&pair(), &[rec]),
            Err(PipelineError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_count_by_pair() {
        let mut other = record(Operation::Snp, Some(1), Some(1), "A", "G");
        other.pair = PairId::new("H37Rv", "L2");
        let records = vec![
            record(Operation::Snp, Some(1), Some(1), "A", "G"),
            other,
            record(Operation::Deletion, Some(7), None, "T", "-"),
        ];
        let counts = count_by_pair(&records).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].pair, pair());
        assert_eq!(counts[0].total(), 2);
        assert_eq!(counts[1].total(), 1);
    }
}
