//! Sector scanning for imgmerge.
//!
//! Pure, allocation-light analysis of the blocks read for one sector:
//! a per-capture classification and a cross-capture agreement table.
//! Nothing in this crate performs I/O.
//!
//! # Key Types
//!
//! - [`SectorClassifier`] -- Classifies one block into a [`SectorState`](imgm_types::SectorState)
//! - [`AgreementMatrix`] -- Pairwise byte-equality and per-capture match counts

pub mod agreement;
pub mod classify;

pub use agreement::AgreementMatrix;
pub use classify::{classify, trailing_run, SectorClassifier, DEFAULT_SUSPECT_RUN_THRESHOLD};
