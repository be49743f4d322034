use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{PairId, Scenario};

/// Scenario counts for one (reference, query) pair.
///
/// Only observed scenarios are stored, so a pair whose records were all
/// masked has an empty map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCount {
    pub pair: PairId,
    pub counts: BTreeMap<Scenario, u64>,
}

impl ScenarioCount {
    #[must_use]
    pub fn new(pair: PairId) -> Self {
        Self {
            pair,
            counts: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, scenario: Scenario) {
        *self.counts.entry(scenario).or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, scenario: Scenario) -> u64 {
        self.counts.get(&scenario).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Whether a summary row carries counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Complete,
    /// The pair failed upstream; its cells are not zero but unknown
    Incomplete,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Incomplete => write!(f, "incomplete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub pair: PairId,
    pub status: RowStatus,

    /// One value per summary column; `None` for incomplete rows
    pub counts: Option<Vec<u64>>,
}

impl SummaryRow {
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.counts.as_ref().map(|c| c.iter().sum())
    }
}

/// Comparative table across pairs: one row per pair, one column per scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSummary {
    pub columns: Vec<Scenario>,
    pub rows: Vec<SummaryRow>,
}

impl MergedSummary {
    #[must_use]
    pub fn complete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == RowStatus::Complete)
            .count()
    }
}
