use std::collections::HashMap;

use crate::core::types::GenomeId;

/// An assembly loaded into memory: upper-case sequences keyed by contig name
#[derive(Debug, Clone)]
pub struct Genome {
    pub id: GenomeId,

    /// Contig names in file order
    pub contig_names: Vec<String>,

    sequences: HashMap<String, Vec<u8>>,
}

impl Genome {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: GenomeId::new(id),
            contig_names: Vec::new(),
            sequences: HashMap::new(),
        }
    }

    /// Add a contig; bases are upper-cased. Returns false if the name is already present.
    pub fn add_contig(&mut self, name: impl Into<String>, sequence: &[u8]) -> bool {
        let name = name.into();
        if self.sequences.contains_key(&name) {
            return false;
        }
        let upper: Vec<u8> = sequence.iter().map(u8::to_ascii_uppercase).collect();
        self.contig_names.push(name.clone());
        self.sequences.insert(name, upper);
        true
    }

    #[must_use]
    pub fn sequence(&self, contig: &str) -> Option<&[u8]> {
        self.sequences.get(contig).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contig_length(&self, contig: &str) -> Option<u64> {
        self.sequences.get(contig).map(|s| s.len() as u64)
    }

    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.sequences.values().map(|s| s.len() as u64).sum()
    }
}

/// True for the four unambiguous nucleotides
#[must_use]
pub fn is_unambiguous_base(base: u8) -> bool {
    matches!(base.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')
}

/// True for ambiguity markers: `N` and the other IUPAC codes
#[must_use]
pub fn is_ambiguous_base(base: u8) -> bool {
    matches!(
        base.to_ascii_uppercase(),
        b'N' | b'R' | b'Y' | b'S' | b'W' | b'K' | b'M' | b'B' | b'D' | b'H' | b'V'
    )
}

#[must_use]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        other => other,
    }
}

#[must_use]
pub fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases.iter().rev().map(|&b| complement(b)).collect()
}
