//! Core data types for assembly-to-assembly variation counting.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Genome`]: An assembly's contig sequences loaded from FASTA
//! - [`AlignmentSegment`]: One aligned block between a reference and a query contig
//! - [`DifferenceRecord`]: One discrepancy between the two genomes
//! - [`MaskInterval`], [`IntervalSet`]: Untrusted regions used for masking
//! - [`ScenarioCount`], [`MergedSummary`]: Per-pair and cross-pair scenario tallies
//! - [`GenomeId`], [`PairId`], [`Operation`], [`Scenario`]: Identifiers and classification labels
//!
//! ## Coordinates
//!
//! All coordinates are 0-based and half-open, and always refer to the forward
//! strand of their own genome, regardless of the alignment orientation.
//!
//! [`Genome`]: genome::Genome
//! [`AlignmentSegment`]: segment::AlignmentSegment
//! [`DifferenceRecord`]: record::DifferenceRecord
//! [`MaskInterval`]: interval::MaskInterval
//! [`IntervalSet`]: interval::IntervalSet
//! [`ScenarioCount`]: counts::ScenarioCount
//! [`MergedSummary`]: counts::MergedSummary
//! [`GenomeId`]: types::GenomeId
//! [`PairId`]: types::PairId
//! [`Operation`]: types::Operation
//! [`Scenario`]: types::Scenario

pub mod counts;
pub mod genome;
pub mod interval;
pub mod record;
pub mod segment;
pub mod types;
