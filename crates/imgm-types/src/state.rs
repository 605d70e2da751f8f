use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualitative classification of a single block.
///
/// Derived purely from one block's bytes; no cross-capture information.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorState {
    /// Not yet classified, or not a full sector.
    #[default]
    Unknown,
    /// Every byte is `0x00`.
    AllZero,
    /// Every byte is `0xFF`.
    AllFill,
    /// The block ends in a long run of one repeated byte.
    ///
    /// Payloads are expected to be high-entropy, so a long tail run usually
    /// means the transfer stopped mid-sector.
    SuspectRepeatedTail,
    /// Nothing anomalous was detected.
    Plausible,
}

impl SectorState {
    /// Returns `true` for [`SectorState::Plausible`].
    pub fn is_plausible(self) -> bool {
        matches!(self, Self::Plausible)
    }

    /// Returns `true` for [`SectorState::SuspectRepeatedTail`].
    pub fn is_suspect(self) -> bool {
        matches!(self, Self::SuspectRepeatedTail)
    }
}

impl fmt::Display for SectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::AllZero => write!(f, "all-zero"),
            Self::AllFill => write!(f, "all-fill"),
            Self::SuspectRepeatedTail => write!(f, "suspect-tail"),
            Self::Plausible => write!(f, "plausible"),
        }
    }
}

/// The decision reached for one sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionOutcome {
    /// The block from this capture index is written verbatim.
    Selected(usize),
    /// No rule produced a winner; the sentinel is written.
    Unresolved,
}

impl SelectionOutcome {
    /// The winning capture index, if any.
    pub fn source(self) -> Option<usize> {
        match self {
            Self::Selected(source) => Some(source),
            Self::Unresolved => None,
        }
    }

    /// Returns `true` if no capture was selected.
    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Unresolved)
    }
}

impl fmt::Display for SelectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected(source) => write!(f, "file {source}"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}
