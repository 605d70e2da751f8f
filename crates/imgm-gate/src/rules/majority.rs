use imgm_types::AnomalyEntry;

use crate::rule::{RuleDecision, SectorBallot, SelectionRule};

/// Majority vote among plausible captures.
///
/// Plausible captures are visited in index order. Agreement is counted
/// against every capture, not only plausible ones. The first capture that
/// is unanimous (silent) or holds a strict majority (`matches > n / 2`,
/// logged as 1300) wins. Each plausible capture passed over is logged as 1400.
pub struct MajorityRule;

impl SelectionRule for MajorityRule {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn evaluate(&self, ballot: &SectorBallot<'_>, entries: &mut Vec<AnomalyEntry>) -> RuleDecision {
        let total = ballot.len();

        for (source, state) in ballot.states.iter().enumerate() {
            if !state.is_plausible() {
                continue;
            }

            let matches = ballot.agreement.matches(source);
            if matches == total {
                return RuleDecision::Select { source };
            }
            if matches > total / 2 {
                entries.push(AnomalyEntry::preferred(ballot.sector, source, matches));
                return RuleDecision::Select { source };
            }
            entries.push(AnomalyEntry::not_preferred(ballot.sector, source, matches));
        }

        RuleDecision::Abstain
    }
}
