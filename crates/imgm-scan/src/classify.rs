//! Per-capture sector classification.
//!
//! Captured payloads are expected to be encrypted and therefore
//! indistinguishable from random bytes. A block that is entirely `0x00` or
//! `0xFF`, or that ends in a long run of one byte value, is more likely a
//! transfer artifact than real content.

use serde::{Deserialize, Serialize};

use imgm_types::{SectorState, SECTOR_SIZE};

/// Tail runs longer than this many bytes mark a block as suspect.
pub const DEFAULT_SUSPECT_RUN_THRESHOLD: usize = 16;

/// Classifies blocks with a configurable tail-run threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorClassifier {
    /// A trailing run strictly longer than this is suspect.
    pub suspect_run_threshold: usize,
}

impl Default for SectorClassifier {
    fn default() -> Self {
        Self {
            suspect_run_threshold: DEFAULT_SUSPECT_RUN_THRESHOLD,
        }
    }
}

impl SectorClassifier {
    pub fn new(suspect_run_threshold: usize) -> Self {
        Self {
            suspect_run_threshold,
        }
    }

    /// Classify one block.
    ///
    /// Checks are ordered: all-zero, then all-fill, then the tail run.
    /// A slice that is not exactly one sector long is [`SectorState::Unknown`].
    pub fn classify(&self, block: &[u8]) -> SectorState {
        if block.len() != SECTOR_SIZE {
            return SectorState::Unknown;
        }
        if block.iter().all(|&b| b == 0x00) {
            return SectorState::AllZero;
        }
        if block.iter().all(|&b| b == 0xFF) {
            return SectorState::AllFill;
        }
        if trailing_run(block) > self.suspect_run_threshold {
            return SectorState::SuspectRepeatedTail;
        }
        SectorState::Plausible
    }
}

/// Classify with the default threshold.
pub fn classify(block: &[u8]) -> SectorState {
    SectorClassifier::default().classify(block)
}

/// Length of the run of bytes equal to the last byte, counted from the end.
///
/// Returns 0 for an empty slice.
pub fn trailing_run(block: &[u8]) -> usize {
    match block.last() {
        Some(&last) => block.iter().rev().take_while(|&&b| b == last).count(),
        None => 0,
    }
}
