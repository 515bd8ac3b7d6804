//! Fixed-width palette indices packed into `u64` words.
//!
//! Widths are 0 (every index is zero, no storage), 4, 8 or 16 bits. An index
//! never straddles a word because all widths divide 64.

use serde::{Deserialize, Serialize};

/// Packed palette indices with a runtime bit width.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackedIndices {
    words: Vec<u64>,
    bits: u8,
    len: usize,
}

impl PackedIndices {
    /// `len` zeroed indices at width zero.
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: Vec::new(),
            bits: 0,
            len,
        }
    }

    /// Smallest supported width able to address `palette_len` entries.
    pub fn width_for(palette_len: usize) -> u8 {
        match palette_len {
            0 | 1 => 0,
            2..=16 => 4,
            17..=256 => 8,
            _ => 16,
        }
    }

    /// Current bits per index.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the array holds no indices.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of word storage.
    pub fn storage_bytes(&self) -> usize {
        self.words.len() * 8
    }

    /// Index stored at `i`.
    pub fn get(&self, i: usize) -> u16 {
        debug_assert!(i < self.len);
        if self.bits == 0 {
            return 0;
        }
        let (word, shift) = self.locate(i);
        ((self.words[word] >> shift) & self.mask()) as u16
    }

    /// Store `value` at `i`. The value must fit the current width.
    pub fn set(&mut self, i: usize, value: u16) {
        debug_assert!(i < self.len);
        if self.bits == 0 {
            debug_assert_eq!(value, 0, "width-zero array only stores zero");
            return;
        }
        debug_assert!(u64::from(value) <= self.mask());
        let (word, shift) = self.locate(i);
        let mask = self.mask();
        self.words[word] = (self.words[word] & !(mask << shift)) | (u64::from(value) << shift);
    }

    /// Re-pack at a wider width, keeping every stored index.
    pub fn widen(&mut self, bits: u8) {
        debug_assert!(matches!(bits, 4 | 8 | 16) && bits > self.bits);
        let per_word = 64 / bits as usize;
        let mut widened = Self {
            words: vec![0; self.len.div_ceil(per_word)],
            bits,
            len: self.len,
        };
        if self.bits > 0 {
            for i in 0..self.len {
                widened.set(i, self.get(i));
            }
        }
        *self = widened;
    }

    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }

    fn locate(&self, i: usize) -> (usize, u32) {
        let per_word = 64 / self.bits as usize;
        (i / per_word, ((i % per_word) * self.bits as usize) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_width_reads_zero() {
        let arr = PackedIndices::zeroed(4096);
        assert_eq!(arr.get(0), 0);
        assert_eq!(arr.get(4095), 0);
        assert_eq!(arr.storage_bytes(), 0);
    }

    #[test]
    fn test_widen_preserves_values() {
        let mut arr = PackedIndices::zeroed(100);
        arr.widen(4);
        for i in 0..100 {
            arr.set(i, (i % 16) as u16);
        }
        arr.widen(16);
        for i in 0..100 {
            assert_eq!(arr.get(i), (i % 16) as u16);
        }
        arr.set(7, 60_000);
        assert_eq!(arr.get(7), 60_000);
        assert_eq!(arr.get(8), 8);
    }

    #[test]
    fn test_width_for_palette_sizes() {
        assert_eq!(PackedIndices::width_for(1), 0);
        assert_eq!(PackedIndices::width_for(2), 4);
        assert_eq!(PackedIndices::width_for(16), 4);
        assert_eq!(PackedIndices::width_for(17), 8);
        assert_eq!(PackedIndices::width_for(257), 16);
    }

    #[test]
    fn test_section_storage_size() {
        let mut arr = PackedIndices::zeroed(4096);
        arr.widen(4);
        assert_eq!(arr.storage_bytes(), 2048);
        arr.widen(8);
        assert_eq!(arr.storage_bytes(), 4096);
    }
}
