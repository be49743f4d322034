use serde::{Deserialize, Serialize};

/// Identifier of a genome assembly (the stem of its FASTA/BED file names)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomeId(pub String);

impl GenomeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GenomeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Joins the two genome ids in pair file names
pub const PAIR_SEPARATOR: char = '+';

/// A (reference, query) genome pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId {
    pub reference: GenomeId,
    pub query: GenomeId,
}

impl PairId {
    pub fn new(reference: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            reference: GenomeId::new(reference),
            query: GenomeId::new(query),
        }
    }

    /// Stem shared by every intermediate file of this pair.
    ///
    /// Genome ids cannot contain [`PAIR_SEPARATOR`], so distinct pairs of
    /// valid ids never share a stem.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}{PAIR_SEPARATOR}{}", self.reference, self.query)
    }
}

impl std::fmt::Display for PairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.reference, self.query)
    }
}

/// Alignment orientation of the query relative to the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Forward),
            "-" => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Raw operation type of a difference record, as emitted by the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "SNP")]
    Snp,
    #[serde(rename = "INS")]
    Insertion,
    #[serde(rename = "DEL")]
    Deletion,
    #[serde(rename = "NRUN")]
    NRun,
    #[serde(rename = "GAP")]
    Gap,
}

impl Operation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Snp => "SNP",
            Self::Insertion => "INS",
            Self::Deletion => "DEL",
            Self::NRun => "NRUN",
            Self::Gap => "GAP",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SNP" => Some(Self::Snp),
            "INS" => Some(Self::Insertion),
            "DEL" => Some(Self::Deletion),
            "NRUN" => Some(Self::NRun),
            "GAP" => Some(Self::Gap),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Variation scenario a difference record is counted under.
///
/// Declaration order is the canonical column order of count and summary tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scenario {
    #[serde(rename = "SNP")]
    Snp,
    Insertion,
    Deletion,
    #[serde(rename = "N_region")]
    NRegion,
    Gap,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Self::Snp,
        Self::Insertion,
        Self::Deletion,
        Self::NRegion,
        Self::Gap,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Snp => "SNP",
            Self::Insertion => "Insertion",
            Self::Deletion => "Deletion",
            Self::NRegion => "N_region",
            Self::Gap => "Gap",
        }
    }

    /// Parse a label; labels are case-sensitive
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scenario| scenario.label() == s)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_labels_are_case_sensitive() {
        assert_eq!(Scenario::parse("N_region"), Some(Scenario::NRegion));
        assert_eq!(Scenario::parse("SNP"), Some(Scenario::Snp));
        assert_eq!(Scenario::parse("snp"), None);
        assert_eq!(Scenario::parse("n_region"), None);
    }

    #[test]
    fn test_scenario_order_is_taxonomy_order() {
        let mut labels = vec![Scenario::Gap, Scenario::Snp, Scenario::NRegion];
        labels.sort();
        assert_eq!(
            labels,
            vec![Scenario::Snp, Scenario::NRegion, Scenario::Gap]
        );
    }

    #[test]
    fn test_operation_roundtrip_labels() {
        for op in [
            Operation::Snp,
            Operation::Insertion,
            Operation::Deletion,
            Operation::NRun,
            Operation::Gap,
        ] {
            assert_eq!(Operation::parse(op.label()), Some(op));
        }
        assert_eq!(Operation::parse("MATCH"), None);
    }

    #[test]
    fn test_pair_file_stem() {
        let pair = PairId::new("H37Rv", "L1");
        assert_eq!(pair.file_stem(), "H37Rv+L1");
        assert_eq!(pair.to_string(), "H37Rv vs L1");
    }

    #[test]
    fn test_file_stems_of_underscored_ids_differ() {
        let a = PairId::new("A_vs_B", "C");
        let b = PairId::new("A", "B_vs_C");
        let c = PairId::new("A", "vs_B_vs_C");
        assert_ne!(a.file_stem(), b.file_stem());
        assert_ne!(b.file_stem(), c.file_stem());
        assert_ne!(a.file_stem(), c.file_stem());
    }
}
