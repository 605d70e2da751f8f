use imgm_scan::{AgreementMatrix, SectorClassifier};
use imgm_types::{AnomalyEntry, Block, SectorIndex, SectorState, SelectionOutcome};

use crate::rule::{RuleDecision, SectorBallot, SelectionRule};
use crate::rules::{IdenticalSuspectRule, MajorityRule, PairTiebreakRule, UniformShortcutRule};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The outcome of running one sector through the full rule pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Which capture to write, or `Unresolved`.
    pub outcome: SelectionOutcome,
    /// Anomalies in the order they were raised.
    pub entries: Vec<AnomalyEntry>,
    /// Name of the rule that selected, if any.
    pub decided_by: Option<&'static str>,
}

impl Selection {
    /// Returns `true` if a capture was selected.
    pub fn is_selected(&self) -> bool {
        !self.outcome.is_unresolved()
    }
}

// ---------------------------------------------------------------------------
// SectorSelector
// ---------------------------------------------------------------------------

/// An ordered pipeline of selection rules.
///
/// The first rule to select wins. When every rule abstains the sector is
/// unresolved and a 4000 entry is appended after whatever the rules logged.
pub struct SectorSelector {
    rules: Vec<Box<dyn SelectionRule>>,
}

impl Default for SectorSelector {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl SectorSelector {
    /// Create a selector with an empty pipeline.
    ///
    /// An empty pipeline leaves every sector unresolved.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a selector with the standard pipeline:
    /// all-zero -> all-fill -> majority -> pair-tiebreak -> identical-suspect
    pub fn with_default_rules() -> Self {
        let mut selector = Self::new();
        selector.add_rule(Box::new(UniformShortcutRule::all_zero()));
        selector.add_rule(Box::new(UniformShortcutRule::all_fill()));
        selector.add_rule(Box::new(MajorityRule));
        selector.add_rule(Box::new(PairTiebreakRule));
        selector.add_rule(Box::new(IdenticalSuspectRule));
        selector
    }

    /// Append a rule to the end of the pipeline.
    pub fn add_rule(&mut self, rule: Box<dyn SelectionRule>) {
        self.rules.push(rule);
    }

    /// Number of rules in the pipeline.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run a prepared ballot through the pipeline.
    pub fn select(&self, ballot: &SectorBallot<'_>) -> Selection {
        let mut entries = Vec::new();

        for rule in &self.rules {
            if let RuleDecision::Select { source } = rule.evaluate(ballot, &mut entries) {
                tracing::trace!(sector = %ballot.sector, rule = rule.name(), source, "sector selected");
                return Selection {
                    outcome: SelectionOutcome::Selected(source),
                    entries,
                    decided_by: Some(rule.name()),
                };
            }
        }

        entries.push(AnomalyEntry::no_selection(ballot.sector));
        Selection {
            outcome: SelectionOutcome::Unresolved,
            entries,
            decided_by: None,
        }
    }

    /// Classify, compare, and select in one call.
    pub fn assess(
        &self,
        sector: SectorIndex,
        blocks: &[Block],
        classifier: &SectorClassifier,
    ) -> Selection {
        let states: Vec<SectorState> = blocks.iter().map(|b| classifier.classify(b)).collect();
        let agreement = AgreementMatrix::compute(blocks);
        self.select(&SectorBallot::new(sector, blocks, &states, &agreement))
    }
}
