//! Sector selection pipeline for imgmerge.
//!
//! Every sector is decided by running the captures' blocks through an
//! ordered pipeline of rules. The first rule that selects a capture wins;
//! if none does, the sector is unresolved. Rules and the selector also
//! produce the anomaly entries destined for the review log.
//!
//! # Quick Start
//!
//! ```rust
//! use imgm_gate::SectorSelector;
//! use imgm_scan::SectorClassifier;
//! use imgm_types::{SectorIndex, SelectionOutcome, SECTOR_SIZE};
//!
//! let selector = SectorSelector::with_default_rules();
//! let blank = [[0u8; SECTOR_SIZE]; 3];
//! let selection = selector.assess(SectorIndex(0), &blank, &SectorClassifier::default());
//! assert_eq!(selection.outcome, SelectionOutcome::Selected(0));
//! assert!(selection.entries.is_empty());
//! ```

pub mod rule;
pub mod rules;
pub mod selector;

// Re-exports for convenience.
pub use rule::{RuleDecision, SectorBallot, SelectionRule};
pub use rules::{IdenticalSuspectRule, MajorityRule, PairTiebreakRule, UniformShortcutRule};
pub use selector::{Selection, SectorSelector};
