use imgm_types::AnomalyEntry;

use crate::rule::{RuleDecision, SectorBallot, SelectionRule};

/// Accepts suspect content when every capture holds the same bytes.
///
/// Identical repeated tails across independent reads are real content.
/// If any capture differs the sector stays open and 3100 is logged.
pub struct IdenticalSuspectRule;

impl SelectionRule for IdenticalSuspectRule {
    fn name(&self) -> &'static str {
        "identical-suspect"
    }

    fn evaluate(&self, ballot: &SectorBallot<'_>, entries: &mut Vec<AnomalyEntry>) -> RuleDecision {
        if !ballot.states.iter().all(|state| state.is_suspect()) {
            return RuleDecision::Abstain;
        }
        if ballot.agreement.is_unanimous() {
            return RuleDecision::Select { source: 0 };
        }
        entries.push(AnomalyEntry::suspect_mismatch(ballot.sector));
        RuleDecision::Abstain
    }
}
