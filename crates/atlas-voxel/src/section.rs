//! Palette-compressed storage for one 16×16×16 chunk section.
//!
//! A section keeps a palette of distinct [`BlockId`]s and packed indices into
//! it. Sections holding one block type store no indices at all.

use serde::{Deserialize, Serialize};

use crate::packed::PackedIndices;
use crate::registry::BlockId;

/// Side length of a section in blocks.
pub const SECTION_SIZE: usize = 16;

/// Blocks per section (16³).
pub const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// One vertical slice of a chunk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
    palette: Vec<BlockId>,
    indices: PackedIndices,
    /// Count of non-air blocks.
    non_air: u16,
}

impl Section {
    /// A section filled with `block`.
    pub fn filled(block: BlockId) -> Self {
        Self {
            palette: vec![block],
            indices: PackedIndices::zeroed(SECTION_VOLUME),
            non_air: if block == BlockId::AIR {
                0
            } else {
                SECTION_VOLUME as u16
            },
        }
    }

    /// An all-air section.
    pub fn empty() -> Self {
        Self::filled(BlockId::AIR)
    }

    /// Block at local `(x, y, z)`, each in `0..16`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.palette[self.indices.get(Self::index(x, y, z)) as usize]
    }

    /// Replace the block at local `(x, y, z)`; returns the previous block.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockId) -> BlockId {
        let i = Self::index(x, y, z);
        let previous = self.palette[self.indices.get(i) as usize];
        if previous == block {
            return previous;
        }
        let slot = self.palette_slot(block);
        self.indices.set(i, slot);
        match (previous == BlockId::AIR, block == BlockId::AIR) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        previous
    }

    /// `true` if every block is air.
    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }

    /// Number of non-air blocks.
    pub fn non_air_count(&self) -> usize {
        self.non_air as usize
    }

    /// Distinct block types ever placed in this section.
    pub fn palette(&self) -> &[BlockId] {
        &self.palette
    }

    /// Bits per stored index.
    pub fn bit_width(&self) -> u8 {
        self.indices.bits()
    }

    /// y-major layout: a column's blocks are 256 entries apart.
    fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < SECTION_SIZE && y < SECTION_SIZE && z < SECTION_SIZE);
        (y * SECTION_SIZE + z) * SECTION_SIZE + x
    }

    fn palette_slot(&mut self, block: BlockId) -> u16 {
        if let Some(slot) = self.palette.iter().position(|&b| b == block) {
            return slot as u16;
        }
        let bits = PackedIndices::width_for(self.palette.len() + 1);
        if bits != self.indices.bits() {
            self.indices.widen(bits);
        }
        self.palette.push(block);
        (self.palette.len() - 1) as u16
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section_has_single_palette_entry() {
        let section = Section::empty();
        assert_eq!(section.palette(), &[BlockId::AIR]);
        assert_eq!(section.bit_width(), 0);
        assert!(section.is_empty());
    }

    #[test]
    fn test_set_grows_palette() {
        let mut section = Section::empty();
        section.set(3, 4, 5, BlockId(1));
        assert_eq!(section.palette().len(), 2);
        assert_eq!(section.bit_width(), 4);
        assert_eq!(section.get(3, 4, 5), BlockId(1));
        assert_eq!(section.get(4, 4, 5), BlockId::AIR);
        assert_eq!(section.non_air_count(), 1);
    }

    #[test]
    fn test_set_back_to_air_updates_count() {
        let mut section = Section::empty();
        section.set(0, 0, 0, BlockId(2));
        let previous = section.set(0, 0, 0, BlockId::AIR);
        assert_eq!(previous, BlockId(2));
        assert!(section.is_empty());
    }

    #[test]
    fn test_filled_section_counts_all_blocks() {
        let section = Section::filled(BlockId(1));
        assert_eq!(section.non_air_count(), SECTION_VOLUME);
        assert_eq!(section.get(15, 15, 15), BlockId(1));
    }

    #[test]
    fn test_many_types_upgrade_width() {
        let mut section = Section::empty();
        for i in 1..=20u16 {
            section.set(i as usize % 16, i as usize / 16, 0, BlockId(i));
        }
        assert_eq!(section.bit_width(), 8);
        for i in 1..=20u16 {
            assert_eq!(section.get(i as usize % 16, i as usize / 16, 0), BlockId(i));
        }
    }

    #[test]
    fn test_every_position_addressable() {
        let mut section = Section::empty();
        let types = [BlockId::AIR, BlockId(1), BlockId(2)];
        for y in 0..SECTION_SIZE {
            for z in 0..SECTION_SIZE {
                for x in 0..SECTION_SIZE {
                    section.set(x, y, z, types[(x + y + z) % 3]);
                }
            }
        }
        for y in 0..SECTION_SIZE {
            for z in 0..SECTION_SIZE {
                for x in 0..SECTION_SIZE {
                    assert_eq!(section.get(x, y, z), types[(x + y + z) % 3], "({x}, {y}, {z})");
                }
            }
        }
    }
}
