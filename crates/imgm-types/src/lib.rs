//! Foundation types for imgmerge.
//!
//! imgmerge reconciles several same-length captures of one disk image into a
//! single merged image. Every other imgmerge crate depends on `imgm-types`.
//!
//! # Key Types
//!
//! - [`Block`] / [`SECTOR_SIZE`]: One 512-byte sector as read from a capture
//! - [`SectorIndex`]: Position of a sector within the image
//! - [`SectorState`]: Per-capture qualitative classification of a block
//! - [`SelectionOutcome`]: Which capture won a sector, if any
//! - [`AnomalyCode`] / [`AnomalyEntry`]: One line of the anomaly log

pub mod anomaly;
pub mod error;
pub mod sector;
pub mod state;

pub use anomaly::{AnomalyCode, AnomalyEntry};
pub use error::TypeError;
pub use sector::{sentinel_block, Block, SectorIndex, SECTOR_SIZE, SENTINEL_PATTERN};
pub use state::{SectorState, SelectionOutcome};
