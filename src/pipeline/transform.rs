//! Difference extraction: turn alignment segments into difference records.
//!
//! Each segment is walked column by column against the two genome sequences:
//!
//! | Operation | Record |
//! |-----------|--------|
//! | aligned, same base | none |
//! | aligned, different unambiguous bases | `SNP` with both loci |
//! | aligned, either base ambiguous | extends an `NRUN` (one record per run) |
//! | insertion | `INS`, query locus only |
//! | deletion | `DEL`, reference locus only |
//!
//! Ambiguous columns become `NRUN` records even when the CIGAR calls them a
//! mismatch, so they can never be counted as SNPs.
//!
//! Stretches of either genome outside every segment are reported as `GAP`
//! records, except runs of ambiguous bases inside them, which become
//! one-sided `NRUN` records.
//!
//! Query loci are forward-strand coordinates and query bases are reported in
//! reference orientation, so the output does not depend on alignment strand.
//!
//! ## Overlapping segments
//!
//! With [`OverlapPolicy::FirstSeen`] the first record reported at a reference
//! coordinate wins and later ones at the same coordinate are dropped. This is
//! a best-effort heuristic: it removes exact double counts from repeated hits
//! but does not reconcile overlapping hits that disagree on event boundaries.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::core::genome::{
    complement, is_ambiguous_base, is_unambiguous_base, reverse_complement, Genome,
};
use crate::core::interval::merge_ranges;
use crate::core::record::{DifferenceRecord, Locus, NO_BASES};
use crate::core::segment::{AlignmentSegment, OpKind};
use crate::core::types::{Operation, PairId, Strand};
use crate::pipeline::config::OverlapPolicy;
use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub overlap_policy: OverlapPolicy,
    pub emit_gaps: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::FirstSeen,
            emit_gaps: true,
        }
    }
}

/// Position used to order records: reference-anchored records first, in
/// reference contig order, then query-only gaps in query contig order.
type SortKey = (u8, usize, u64);

/// Extract every non-match event of `segments`, in reference-coordinate order.
///
/// Segments are processed in the order given. Records are stably sorted by
/// reference contig (in FASTA order) and reference position; insertions are
/// placed at the reference position that follows them.
///
/// # Errors
///
/// Returns `PipelineError::MalformedRecord` if a segment names a contig that
/// is not in the corresponding genome or does not fit inside it.
pub fn extract_differences(
    reference: &Genome,
    query: &Genome,
    segments: &[AlignmentSegment],
    options: &TransformOptions,
) -> Result<Vec<DifferenceRecord>, PipelineError> {
    let pair = PairId {
        reference: reference.id.clone(),
        query: query.id.clone(),
    };

    let mut keyed: Vec<(SortKey, DifferenceRecord)> = Vec::new();
    let mut seen: HashSet<(String, u64, bool)> = HashSet::new();
    let mut duplicates = 0usize;

    for (i, segment) in segments.iter().enumerate() {
        let mut walker = SegmentWalker::new(&pair, reference, query, segment)
            .map_err(|msg| PipelineError::MalformedRecord(format!("segment {}: {msg}", i + 1)))?;
        walker.walk();
        debug!(
            segment = i + 1,
            reference_contig = %segment.reference_contig,
            records = walker.events.len(),
            "Walked alignment segment"
        );

        let contig_idx = contig_index(reference, &segment.reference_contig);
        for (anchor, record) in walker.events {
            if options.overlap_policy == OverlapPolicy::FirstSeen {
                let key = (
                    segment.reference_contig.clone(),
                    anchor,
                    record.operation == Operation::Insertion,
                );
                if !seen.insert(key) {
                    duplicates += 1;
                    continue;
                }
            }
            keyed.push(((0, contig_idx, anchor), record));
        }
    }

    if duplicates > 0 {
        debug!(duplicates, "Dropped records from overlapping segments");
    }

    keyed.extend(unaligned_records(
        &pair,
        reference,
        query,
        segments,
        options.emit_gaps,
    ));

    keyed.sort_by_key(|(key, _)| *key);
    let records: Vec<DifferenceRecord> = keyed.into_iter().map(|(_, record)| record).collect();

    info!(
        pair = %pair,
        segments = segments.len(),
        records = records.len(),
        "Extracted differences"
    );

    Ok(records)
}

fn contig_index(genome: &Genome, contig: &str) -> usize {
    genome
        .contig_names
        .iter()
        .position(|name| name == contig)
        .unwrap_or(usize::MAX)
}

/// Walks one segment, collecting `(reference anchor, record)` events
struct SegmentWalker<'a> {
    pair: &'a PairId,
    segment: &'a AlignmentSegment,
    ref_seq: &'a [u8],
    query_seq: &'a [u8],

    /// Next reference position
    ref_pos: u64,
    /// Query bases consumed so far, in alignment orientation
    query_offset: u64,

    run: Option<AmbiguousRun>,
    events: Vec<(u64, DifferenceRecord)>,
}

struct AmbiguousRun {
    ref_start: u64,
    query_offset_start: u64,
    ref_bases: Vec<u8>,
    query_bases: Vec<u8>,
}

impl<'a> SegmentWalker<'a> {
    fn new(
        pair: &'a PairId,
        reference: &'a Genome,
        query: &'a Genome,
        segment: &'a AlignmentSegment,
    ) -> Result<Self, String> {
        let ref_seq = checked_sequence(
            reference,
            &segment.reference_contig,
            segment.reference_length,
            segment.reference_end,
        )?;
        let query_seq = checked_sequence(
            query,
            &segment.query_contig,
            segment.query_length,
            segment.query_end,
        )?;
        segment.validate()?;

        Ok(Self {
            pair,
            segment,
            ref_seq,
            query_seq,
            ref_pos: segment.reference_start,
            query_offset: 0,
            run: None,
            events: Vec::new(),
        })
    }

    fn walk(&mut self) {
        let segment = self.segment;
        for op in &segment.ops {
            match op.kind {
                OpKind::Match | OpKind::Mismatch => self.aligned(op.len, false),
                OpKind::AmbiguousRun => self.aligned(op.len, true),
                OpKind::Insertion => {
                    self.flush_run();
                    self.insertion(op.len);
                }
                OpKind::Deletion => {
                    self.flush_run();
                    self.deletion(op.len);
                }
            }
        }
        self.flush_run();
    }

    /// Forward-strand query position of the base at `offset`
    fn query_pos(&self, offset: u64) -> u64 {
        match self.segment.strand {
            Strand::Forward => self.segment.query_start + offset,
            Strand::Reverse => self.segment.query_end - 1 - offset,
        }
    }

    /// Query base at `offset`, in reference orientation
    fn query_base(&self, offset: u64) -> u8 {
        let base = self.query_seq[to_index(self.query_pos(offset))];
        match self.segment.strand {
            Strand::Forward => base,
            Strand::Reverse => complement(base),
        }
    }

    fn aligned(&mut self, len: u64, force_ambiguous: bool) {
        for _ in 0..len {
            let ref_base = self.ref_seq[to_index(self.ref_pos)];
            let query_base = self.query_base(self.query_offset);

            if !force_ambiguous && is_unambiguous_base(ref_base) && is_unambiguous_base(query_base) {
                self.flush_run();
                if ref_base != query_base {
                    let record = DifferenceRecord::snp(
                        self.pair.clone(),
                        Locus::new(&self.segment.reference_contig, self.ref_pos),
                        Locus::new(&self.segment.query_contig, self.query_pos(self.query_offset)),
                        ref_base,
                        query_base,
                    );
                    self.events.push((self.ref_pos, record));
                }
            } else {
                let (ref_start, query_offset_start) = (self.ref_pos, self.query_offset);
                let run = self.run.get_or_insert_with(|| AmbiguousRun {
                    ref_start,
                    query_offset_start,
                    ref_bases: Vec::new(),
                    query_bases: Vec::new(),
                });
                run.ref_bases.push(ref_base);
                run.query_bases.push(query_base);
            }

            self.ref_pos += 1;
            self.query_offset += 1;
        }
    }

    fn insertion(&mut self, len: u64) {
        if len == 0 {
            return;
        }
        let first = self.query_pos(self.query_offset);
        let last = self.query_pos(self.query_offset + len - 1);
        let low = first.min(last);

        let slice = &self.query_seq[to_index(low)..to_index(low + len)];
        let bases = match self.segment.strand {
            Strand::Forward => slice.to_vec(),
            Strand::Reverse => reverse_complement(slice),
        };

        let record = DifferenceRecord::insertion(
            self.pair.clone(),
            Locus::new(&self.segment.query_contig, low),
            bases_string(&bases),
        );
        self.events.push((self.ref_pos, record));
        self.query_offset += len;
    }

    fn deletion(&mut self, len: u64) {
        let bases = &self.ref_seq[to_index(self.ref_pos)..to_index(self.ref_pos + len)];
        let record = DifferenceRecord::deletion(
            self.pair.clone(),
            Locus::new(&self.segment.reference_contig, self.ref_pos),
            bases_string(bases),
        );
        self.events.push((self.ref_pos, record));
        self.ref_pos += len;
    }

    fn flush_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };

        let len = run.ref_bases.len() as u64;
        let first = self.query_pos(run.query_offset_start);
        let last = self.query_pos(run.query_offset_start + len - 1);

        let record = DifferenceRecord {
            pair: self.pair.clone(),
            reference: Some(Locus::new(&self.segment.reference_contig, run.ref_start)),
            query: Some(Locus::new(&self.segment.query_contig, first.min(last))),
            operation: Operation::NRun,
            length: len,
            reference_bases: bases_string(&run.ref_bases),
            query_bases: bases_string(&run.query_bases),
        };
        self.events.push((run.ref_start, record));
    }
}

fn checked_sequence<'g>(
    genome: &'g Genome,
    contig: &str,
    declared_length: u64,
    end: u64,
) -> Result<&'g [u8], String> {
    let seq = genome
        .sequence(contig)
        .ok_or_else(|| format!("contig '{contig}' not found in genome '{}'", genome.id))?;

    let actual = seq.len() as u64;
    if actual != declared_length {
        return Err(format!(
            "contig '{contig}' of genome '{}' has length {actual}, alignment declares {declared_length}",
            genome.id
        ));
    }
    if end > actual {
        return Err(format!(
            "alignment end {end} lies beyond contig '{contig}' of length {actual}"
        ));
    }
    Ok(seq)
}

#[allow(clippy::cast_possible_truncation)]
fn to_index(pos: u64) -> usize {
    pos as usize
}

fn bases_string(bases: &[u8]) -> String {
    if bases.is_empty() {
        NO_BASES.to_string()
    } else {
        String::from_utf8_lossy(bases).to_ascii_uppercase()
    }
}

/// Records for every reference and query interval no segment covers.
///
/// Each uncovered stretch is split into maximal runs of ambiguous and other
/// bases. Ambiguous runs become one-sided `NRUN` records carrying their
/// bases; the remaining runs become `GAP` records when `emit_gaps` is set.
fn unaligned_records(
    pair: &PairId,
    reference: &Genome,
    query: &Genome,
    segments: &[AlignmentSegment],
    emit_gaps: bool,
) -> Vec<(SortKey, DifferenceRecord)> {
    let mut records = Vec::new();

    for (rank, genome) in [(0u8, reference), (1u8, query)] {
        let on_reference = rank == 0;

        for (idx, contig) in genome.contig_names.iter().enumerate() {
            let covered: Vec<(u64, u64)> = segments
                .iter()
                .filter_map(|s| {
                    let (name, start, end) = if on_reference {
                        (&s.reference_contig, s.reference_start, s.reference_end)
                    } else {
                        (&s.query_contig, s.query_start, s.query_end)
                    };
                    (name == contig && start < end).then_some((start, end))
                })
                .collect();
            let sequence = genome.sequence(contig).unwrap_or_default();

            for (start, end) in uncovered(covered, sequence.len() as u64) {
                for (run_start, run_end, ambiguous) in base_runs(sequence, start, end) {
                    if !ambiguous && !emit_gaps {
                        continue;
                    }

                    let locus = Some(Locus::new(contig, run_start));
                    let (ref_locus, query_locus) = if on_reference {
                        (locus, None)
                    } else {
                        (None, locus)
                    };
                    let record = if ambiguous {
                        let bases = &sequence[to_index(run_start)..to_index(run_end)];
                        DifferenceRecord::unaligned_n_run(
                            pair.clone(),
                            ref_locus,
                            query_locus,
                            bases_string(bases),
                        )
                    } else {
                        DifferenceRecord::gap(pair.clone(), ref_locus, query_locus, run_end - run_start)
                    };
                    records.push(((rank, idx, run_start), record));
                }
            }
        }
    }

    records
}

/// Split `sequence[start..end]` into maximal `(start, end, ambiguous)` runs
fn base_runs(sequence: &[u8], start: u64, end: u64) -> Vec<(u64, u64, bool)> {
    let mut runs: Vec<(u64, u64, bool)> = Vec::new();
    for (pos, &base) in (start..end).zip(&sequence[to_index(start)..to_index(end)]) {
        let ambiguous = is_ambiguous_base(base);
        match runs.last_mut() {
            Some(run) if run.2 == ambiguous => run.1 = pos + 1,
            _ => runs.push((pos, pos + 1, ambiguous)),
        }
    }
    runs
}

/// Complement of `covered` within `[0, length)`
fn uncovered(covered: Vec<(u64, u64)>, length: u64) -> Vec<(u64, u64)> {
    let mut gaps = Vec::new();
    let mut cursor = 0;

    for (start, end) in merge_ranges(covered) {
        if start > cursor {
            gaps.push((cursor, start.min(length)));
        }
        cursor = cursor.max(end);
    }
    if cursor < length {
        gaps.push((cursor, length));
    }

    gaps.retain(|(start, end)| start < end);
    gaps
}
