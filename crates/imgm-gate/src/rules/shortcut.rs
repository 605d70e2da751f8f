use imgm_types::{AnomalyEntry, SectorState};

use crate::rule::{RuleDecision, SectorBallot, SelectionRule};

/// Selects capture 0 when every capture has the same uniform state.
///
/// Blank and erased regions are common, so this never logs.
pub struct UniformShortcutRule {
    state: SectorState,
    name: &'static str,
}

impl UniformShortcutRule {
    /// Every capture is all `0x00`.
    pub fn all_zero() -> Self {
        Self {
            state: SectorState::AllZero,
            name: "all-zero",
        }
    }

    /// Every capture is all `0xFF`.
    pub fn all_fill() -> Self {
        Self {
            state: SectorState::AllFill,
            name: "all-fill",
        }
    }
}

impl SelectionRule for UniformShortcutRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn evaluate(&self, ballot: &SectorBallot<'_>, _entries: &mut Vec<AnomalyEntry>) -> RuleDecision {
        if ballot.all_in(self.state) {
            RuleDecision::Select { source: 0 }
        } else {
            RuleDecision::Abstain
        }
    }
}
