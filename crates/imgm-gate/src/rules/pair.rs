use imgm_types::{AnomalyEntry, SectorState};

use crate::rule::{RuleDecision, SectorBallot, SelectionRule};

/// With exactly two captures, prefer a plausible block over a suspect one.
pub struct PairTiebreakRule;

impl SelectionRule for PairTiebreakRule {
    fn name(&self) -> &'static str {
        "pair-tiebreak"
    }

    fn evaluate(&self, ballot: &SectorBallot<'_>, entries: &mut Vec<AnomalyEntry>) -> RuleDecision {
        let source = match ballot.states {
            [SectorState::Plausible, SectorState::SuspectRepeatedTail] => 0,
            [SectorState::SuspectRepeatedTail, SectorState::Plausible] => 1,
            _ => return RuleDecision::Abstain,
        };
        entries.push(AnomalyEntry::pair_over_suspect(ballot.sector, source));
        RuleDecision::Select { source }
    }
}
