use imgm_scan::AgreementMatrix;
use imgm_types::{AnomalyEntry, Block, SectorIndex, SectorState};

// ---------------------------------------------------------------------------
// SectorBallot
// ---------------------------------------------------------------------------

/// Everything a selection rule may consult for one sector.
///
/// Captures are indexed `0..len()` in the order the inputs were given.
#[derive(Clone, Copy, Debug)]
pub struct SectorBallot<'a> {
    /// The sector being decided.
    pub sector: SectorIndex,
    /// One block per capture.
    pub blocks: &'a [Block],
    /// Classification of each block, same indexing as `blocks`.
    pub states: &'a [SectorState],
    /// Agreement across all captures, regardless of state.
    pub agreement: &'a AgreementMatrix,
}

impl<'a> SectorBallot<'a> {
    pub fn new(
        sector: SectorIndex,
        blocks: &'a [Block],
        states: &'a [SectorState],
        agreement: &'a AgreementMatrix,
    ) -> Self {
        debug_assert_eq!(blocks.len(), states.len());
        debug_assert_eq!(blocks.len(), agreement.len());
        Self {
            sector,
            blocks,
            states,
            agreement,
        }
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if there are no captures.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether every capture was classified as `state`.
    pub fn all_in(&self, state: SectorState) -> bool {
        self.states.iter().all(|&s| s == state)
    }
}

// ---------------------------------------------------------------------------
// RuleDecision
// ---------------------------------------------------------------------------

/// The outcome of a single rule evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleDecision {
    /// Write this capture's block; no later rule runs.
    Select { source: usize },
    /// The rule does not apply or could not decide; try the next rule.
    Abstain,
}

impl RuleDecision {
    /// Returns `true` if the decision is `Select`.
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select { .. })
    }
}

// ---------------------------------------------------------------------------
// SelectionRule trait
// ---------------------------------------------------------------------------

/// One step in the selection pipeline.
///
/// Rules run in order and the first to return [`RuleDecision::Select`] wins.
/// Later rules may assume every earlier rule abstained. A rule may append
/// anomaly entries whether or not it selects.
pub trait SelectionRule: Send + Sync {
    /// Short name used in diagnostics (e.g., "majority").
    fn name(&self) -> &'static str;

    /// Evaluate the ballot, appending any anomalies to `entries`.
    fn evaluate(&self, ballot: &SectorBallot<'_>, entries: &mut Vec<AnomalyEntry>) -> RuleDecision;
}
