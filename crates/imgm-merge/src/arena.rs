//! Per-sector scratch buffers.

use imgm_types::{sentinel_block, Block, SelectionOutcome, SECTOR_SIZE};

/// Fixed set of sector buffers reused across the whole run.
///
/// Layout: one slot per input, then the output slot, then the sentinel.
/// Input slots are never aliased; each is cleared before it is refilled so
/// no bytes from a previous sector can leak into the next decision.
#[derive(Clone, Debug)]
pub struct SectorArena {
    buffers: Vec<Block>,
    inputs: usize,
}

impl SectorArena {
    /// Allocate `inputs + 2` buffers and tile the sentinel once.
    pub fn new(inputs: usize) -> Self {
        let mut buffers = vec![[0u8; SECTOR_SIZE]; inputs + 2];
        buffers[inputs + 1] = sentinel_block();
        Self { buffers, inputs }
    }

    /// Number of input slots.
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    /// Zero the slot for `input` and hand it out for refilling.
    pub fn clear_input(&mut self, input: usize) -> &mut Block {
        assert!(input < self.inputs, "input slot {input} out of range");
        let slot = &mut self.buffers[input];
        slot.fill(0);
        slot
    }

    /// The blocks currently held for every input, in input order.
    pub fn inputs(&self) -> &[Block] {
        &self.buffers[..self.inputs]
    }

    /// The unresolved-sector pattern.
    pub fn sentinel(&self) -> &Block {
        &self.buffers[self.inputs + 1]
    }

    /// Copy the winning block, or the sentinel, into the output slot.
    pub fn stage_output(&mut self, outcome: SelectionOutcome) -> &Block {
        let from = match outcome.source() {
            Some(input) => {
                assert!(input < self.inputs, "selected input {input} out of range");
                input
            }
            None => self.inputs + 1,
        };
        let out = self.inputs;
        self.buffers[out] = self.buffers[from];
        &self.buffers[out]
    }
}
