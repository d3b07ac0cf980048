//! Bitboard implementation for fast pattern matching

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use super::{Pos, TOTAL_CELLS};

const WORDS: usize = 4;

/// Bitboard representation of a set of cells.
/// Uses 4 x u64 to represent 225 cells (4 * 64 = 256 >= 225)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    bits: [u64; WORDS],
}

impl Bitboard {
    /// Create empty bitboard
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    /// Bitboard with every on-board cell set
    pub fn full() -> Self {
        let mut bits = [u64::MAX; WORDS];
        // 225 = 3 * 64 + 33
        bits[WORDS - 1] = (1u64 << (TOTAL_CELLS - 64 * (WORDS - 1))) - 1;
        Self { bits }
    }

    /// Set a bit at position
    #[inline]
    pub fn set(&mut self, pos: Pos) {
        let idx = pos.to_index();
        self.bits[idx / 64] |= 1u64 << (idx % 64);
    }

    /// Clear a bit at position
    #[inline]
    pub fn clear(&mut self, pos: Pos) {
        let idx = pos.to_index();
        self.bits[idx / 64] &= !(1u64 << (idx % 64));
    }

    /// Check if bit is set at position
    #[inline]
    pub fn get(&self, pos: Pos) -> bool {
        let idx = pos.to_index();
        (self.bits[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Count total set bits (popcount)
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }

    /// Check if empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Raw words, used for exact board snapshots
    #[inline]
    pub fn words(&self) -> [u64; WORDS] {
        self.bits
    }

    /// Iterate over set bit positions
    pub fn iter_ones(&self) -> BitboardIter {
        BitboardIter {
            bits: self.bits,
            word_idx: 0,
            current_word: self.bits[0],
        }
    }
}

impl BitOr for Bitboard {
    type Output = Bitboard;

    fn bitor(mut self, rhs: Bitboard) -> Bitboard {
        self |= rhs;
        self
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Bitboard) {
        for (a, b) in self.bits.iter_mut().zip(rhs.bits) {
            *a |= b;
        }
    }
}

impl BitAnd for Bitboard {
    type Output = Bitboard;

    fn bitand(mut self, rhs: Bitboard) -> Bitboard {
        for (a, b) in self.bits.iter_mut().zip(rhs.bits) {
            *a &= b;
        }
        self
    }
}

impl Not for Bitboard {
    type Output = Bitboard;

    /// Complement restricted to on-board cells
    fn not(mut self) -> Bitboard {
        for b in self.bits.iter_mut() {
            *b = !*b;
        }
        self & Bitboard::full()
    }
}

impl FromIterator<Pos> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        let mut bb = Bitboard::new();
        for pos in iter {
            bb.set(pos);
        }
        bb
    }
}

/// Iterator over set bits in a Bitboard
pub struct BitboardIter {
    bits: [u64; WORDS],
    word_idx: usize,
    current_word: u64,
}

impl Iterator for BitboardIter {
    type Item = Pos;

    fn next(&mut self) -> Option<Self::Item> {
        // Find next set bit
        while self.current_word == 0 {
            self.word_idx += 1;
            if self.word_idx >= WORDS {
                return None;
            }
            self.current_word = self.bits[self.word_idx];
        }

        let bit_pos = self.current_word.trailing_zeros() as usize;
        let idx = self.word_idx * 64 + bit_pos;

        // Clear the bit we just found
        self.current_word &= self.current_word - 1;

        // Check if valid board position (225 cells, not 256)
        if idx < TOTAL_CELLS {
            Some(Pos::from_index(idx))
        } else {
            None
        }
    }
}
