use std::fmt;

use serde::{Deserialize, Serialize};

/// Size in bytes of one sector. All analysis happens on this boundary.
pub const SECTOR_SIZE: usize = 512;

/// One sector's worth of bytes from a single capture.
pub type Block = [u8; SECTOR_SIZE];

/// Two-byte pattern tiled across a sector that no rule could resolve.
pub const SENTINEL_PATTERN: [u8; 2] = [0xDE, 0xAD];

/// Build the block written in place of an unresolved sector.
pub fn sentinel_block() -> Block {
    let mut block = [0u8; SECTOR_SIZE];
    for pair in block.chunks_exact_mut(SENTINEL_PATTERN.len()) {
        pair.copy_from_slice(&SENTINEL_PATTERN);
    }
    block
}

/// Zero-based position of a sector within the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorIndex(pub u64);

impl SectorIndex {
    /// Byte offset of the first byte of this sector.
    pub fn byte_offset(self) -> u64 {
        self.0 * SECTOR_SIZE as u64
    }

    /// The sector that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Number of whole sectors in an image of `len` bytes.
    pub fn count_for_len(len: u64) -> u64 {
        len / SECTOR_SIZE as u64
    }
}

impl fmt::Display for SectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Honor width/alignment so log lines can pad the index.
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for SectorIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
