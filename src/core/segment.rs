use serde::{Deserialize, Serialize};

use crate::core::types::Strand;

/// Kind of a single alignment operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Aligned columns with identical bases (or unresolved `M`)
    Match,
    /// Aligned columns with differing bases
    Mismatch,
    /// Bases present in the query only
    Insertion,
    /// Bases present in the reference only
    Deletion,
    /// Aligned columns where either side carries an ambiguous base
    AmbiguousRun,
}

impl OpKind {
    #[must_use]
    pub fn consumes_reference(self) -> bool {
        !matches!(self, Self::Insertion)
    }

    #[must_use]
    pub fn consumes_query(self) -> bool {
        !matches!(self, Self::Deletion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignOp {
    pub kind: OpKind,
    pub len: u64,
}

impl AlignOp {
    #[must_use]
    pub fn new(kind: OpKind, len: u64) -> Self {
        Self { kind, len }
    }
}

/// One contiguous aligned block between a reference and a query contig.
///
/// Coordinates are 0-based, half-open and always on the forward strand of
/// their genome. For `Strand::Reverse` the query is walked from `query_end`
/// downwards while the reference is walked upwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSegment {
    pub reference_contig: String,
    pub reference_length: u64,
    pub reference_start: u64,
    pub reference_end: u64,

    pub query_contig: String,
    pub query_length: u64,
    pub query_start: u64,
    pub query_end: u64,

    pub strand: Strand,
    pub ops: Vec<AlignOp>,
}

impl AlignmentSegment {
    /// Reference bases consumed by `ops`, or `None` if the sum overflows
    #[must_use]
    pub fn ops_reference_span(&self) -> Option<u64> {
        self.ops
            .iter()
            .filter(|op| op.kind.consumes_reference())
            .try_fold(0u64, |acc, op| acc.checked_add(op.len))
    }

    /// Query bases consumed by `ops`, or `None` if the sum overflows
    #[must_use]
    pub fn ops_query_span(&self) -> Option<u64> {
        self.ops
            .iter()
            .filter(|op| op.kind.consumes_query())
            .try_fold(0u64, |acc, op| acc.checked_add(op.len))
    }

    /// Check that coordinates are ordered and agree with the operations.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.reference_start > self.reference_end || self.reference_end > self.reference_length
        {
            return Err(format!(
                "reference interval {}..{} invalid for contig '{}' of length {}",
                self.reference_start, self.reference_end, self.reference_contig, self.reference_length
            ));
        }
        if self.query_start > self.query_end || self.query_end > self.query_length {
            return Err(format!(
                "query interval {}..{} invalid for contig '{}' of length {}",
                self.query_start, self.query_end, self.query_contig, self.query_length
            ));
        }

        let ref_span = self.reference_end - self.reference_start;
        let ops_ref_span = self
            .ops_reference_span()
            .ok_or_else(|| "CIGAR reference length overflows".to_string())?;
        if ops_ref_span != ref_span {
            return Err(format!(
                "CIGAR consumes {ops_ref_span} reference bases but the segment spans {ref_span}"
            ));
        }

        let query_span = self.query_end - self.query_start;
        let ops_query_span = self
            .ops_query_span()
            .ok_or_else(|| "CIGAR query length overflows".to_string())?;
        if ops_query_span != query_span {
            return Err(format!(
                "CIGAR consumes {ops_query_span} query bases but the segment spans {query_span}"
            ));
        }

        Ok(())
    }
}
