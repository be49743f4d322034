use serde::{Deserialize, Serialize};

use crate::core::types::{Operation, PairId};

/// Placeholder for bases on the side of an indel that has none
pub const NO_BASES: &str = "-";

/// Placeholder for bases that are not materialized (unaligned gaps)
pub const UNSTATED_BASES: &str = ".";

/// A position on one genome
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Locus {
    /// Contig (sequence) name
    pub contig: String,

    /// 0-based, forward-strand position
    pub pos: u64,
}

impl Locus {
    pub fn new(contig: impl Into<String>, pos: u64) -> Self {
        Self {
            contig: contig.into(),
            pos,
        }
    }
}

/// One discrepancy between a reference and a query genome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceRecord {
    pub pair: PairId,

    /// Reference position, absent for query-only events (insertions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Locus>,

    /// Query position, absent for reference-only events (deletions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Locus>,

    pub operation: Operation,

    /// Number of bases the event spans
    pub length: u64,

    /// Upper-case reference bases, or a placeholder
    pub reference_bases: String,

    /// Upper-case query bases in reference orientation, or a placeholder
    pub query_bases: String,
}

impl DifferenceRecord {
    #[must_use]
    pub fn snp(pair: PairId, reference: Locus, query: Locus, ref_base: u8, query_base: u8) -> Self {
        Self {
            pair,
            reference: Some(reference),
            query: Some(query),
            operation: Operation::Snp,
            length: 1,
            reference_bases: char::from(ref_base).to_string(),
            query_bases: char::from(query_base).to_string(),
        }
    }

    #[must_use]
    pub fn insertion(pair: PairId, query: Locus, bases: String) -> Self {
        Self {
            pair,
            reference: None,
            query: Some(query),
            operation: Operation::Insertion,
            length: bases.len() as u64,
            reference_bases: NO_BASES.to_string(),
            query_bases: bases,
        }
    }

    #[must_use]
    pub fn deletion(pair: PairId, reference: Locus, bases: String) -> Self {
        Self {
            pair,
            reference: Some(reference),
            query: None,
            operation: Operation::Deletion,
            length: bases.len() as u64,
            reference_bases: bases,
            query_bases: NO_BASES.to_string(),
        }
    }

    #[must_use]
    pub fn gap(pair: PairId, reference: Option<Locus>, query: Option<Locus>, length: u64) -> Self {
        Self {
            pair,
            reference,
            query,
            operation: Operation::Gap,
            length,
            reference_bases: UNSTATED_BASES.to_string(),
            query_bases: UNSTATED_BASES.to_string(),
        }
    }

    /// Ambiguous bases outside every alignment, located on one genome only
    #[must_use]
    pub fn unaligned_n_run(
        pair: PairId,
        reference: Option<Locus>,
        query: Option<Locus>,
        bases: String,
    ) -> Self {
        let length = bases.len() as u64;
        let (reference_bases, query_bases) = if reference.is_some() {
            (bases, UNSTATED_BASES.to_string())
        } else {
            (UNSTATED_BASES.to_string(), bases)
        };
        Self {
            pair,
            reference,
            query,
            operation: Operation::NRun,
            length,
            reference_bases,
            query_bases,
        }
    }

    /// True when the record satisfies the at-least-one-locus invariant
    #[must_use]
    pub fn has_locus(&self) -> bool {
        self.reference.is_some() || self.query.is_some()
    }
}
