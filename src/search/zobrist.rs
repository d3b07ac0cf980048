//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when playing and
//! undoing moves. The solver keys its transposition table with these hashes.
//!
//! # Example
//!
//! ```
//! use renju_vlm::board::{Board, Move, Pos};
//! use renju_vlm::search::ZOBRIST;
//!
//! let mut board = Board::new();
//! let hash1 = ZOBRIST.hash(&board);
//!
//! let mv = Move::Place(Pos::new(7, 7));
//! let hash_incremental = ZOBRIST.update(hash1, mv, board.side_to_move());
//! board.play(mv);
//!
//! // Incremental update is equivalent to full recomputation
//! assert_eq!(hash_incremental, ZOBRIST.hash(&board));
//! ```

use once_cell::sync::Lazy;

use crate::board::{Board, Move, Pos, Stone, TOTAL_CELLS};

/// Process-wide key table. Keys are deterministic, so every thread and
/// every run derives the same hashes.
pub static ZOBRIST: Lazy<ZobristTable> = Lazy::new(ZobristTable::new);

/// Zobrist hash table for position hashing.
///
/// Uses XOR-based hashing with precomputed random values for each
/// (position, stone color) combination plus one key for the side to move.
pub struct ZobristTable {
    /// Random values for black stones at each position
    black: [u64; TOTAL_CELLS],
    /// Random values for white stones at each position
    white: [u64; TOTAL_CELLS],
    /// Random value XORed when white is to move
    white_to_move: u64,
}

impl ZobristTable {
    /// Create a new Zobrist table with deterministic random values.
    ///
    /// Uses a linear congruential generator (LCG) with a fixed seed
    /// to ensure reproducible hashes across different runs.
    #[must_use]
    pub fn new() -> Self {
        // Constants from Knuth's MMIX LCG
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            seed
        };

        let mut black = [0u64; TOTAL_CELLS];
        let mut white = [0u64; TOTAL_CELLS];

        for i in 0..TOTAL_CELLS {
            black[i] = next_rand();
            white[i] = next_rand();
        }

        Self {
            black,
            white,
            white_to_move: next_rand(),
        }
    }

    #[inline]
    fn stone_key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone {
            Stone::Black => self.black[pos.to_index()],
            Stone::White => self.white[pos.to_index()],
            Stone::Empty => 0,
        }
    }

    /// Compute the full hash for a board position.
    #[must_use]
    pub fn hash(&self, board: &Board) -> u64 {
        let mut h = 0u64;

        for pos in board.black.iter_ones() {
            h ^= self.black[pos.to_index()];
        }

        for pos in board.white.iter_ones() {
            h ^= self.white[pos.to_index()];
        }

        if board.side_to_move() == Stone::White {
            h ^= self.white_to_move;
        }

        h
    }

    /// Hash after `mover` plays `mv`. A pass only toggles the side key.
    ///
    /// XOR is its own inverse, so the same call undoes the move.
    #[inline]
    #[must_use]
    pub fn update(&self, hash: u64, mv: Move, mover: Stone) -> u64 {
        let stone_hash = match mv {
            Move::Place(pos) => self.stone_key(pos, mover),
            Move::Pass => 0,
        };
        hash ^ stone_hash ^ self.white_to_move
    }

    /// Toggle the side-to-move component of the hash.
    #[inline]
    #[must_use]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.white_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_empty_board() {
        let zt = ZobristTable::new();
        let mut board = Board::new();
        assert_eq!(zt.hash(&board), 0);

        board.play(Move::Pass);
        assert_eq!(zt.hash(&board), zt.white_to_move);
    }

    #[test]
    fn test_zobrist_deterministic() {
        let mut board = Board::new();
        board.play(Move::Place(Pos::new(7, 7)));
        assert_eq!(ZobristTable::new().hash(&board), ZOBRIST.hash(&board));
    }

    #[test]
    fn test_zobrist_incremental_and_undo() {
        let zt = ZobristTable::new();
        let mut board = Board::new();
        let mut hash = zt.hash(&board);
        let start = hash;
        let moves = [
            Move::Place(Pos::new(7, 7)),
            Move::Place(Pos::new(6, 7)),
            Move::Pass,
            Move::Place(Pos::new(8, 8)),
        ];

        for mv in moves {
            hash = zt.update(hash, mv, board.side_to_move());
            board.play(mv);
            assert_eq!(hash, zt.hash(&board));
        }
        for mv in moves.into_iter().rev() {
            board.unplay(mv);
            hash = zt.update(hash, mv, board.side_to_move());
        }
        assert_eq!(hash, start);
    }

    #[test]
    fn test_zobrist_same_position_different_path() {
        let a = Board::from_moves_str("hhhgiiig").unwrap();
        let b = Board::from_moves_str("iiighhhg").unwrap();
        assert_eq!(ZOBRIST.hash(&a), ZOBRIST.hash(&b));
    }

    #[test]
    fn test_zobrist_side_matters() {
        let mut board = Board::new();
        board.place_stone(Pos::new(7, 7), Stone::Black);
        let h1 = ZOBRIST.hash(&board);
        board.play(Move::Pass);
        assert_ne!(h1, ZOBRIST.hash(&board));
    }

    #[test]
    fn test_zobrist_collision_resistance() {
        let zt = ZobristTable::new();
        let mut board1 = Board::new();
        let mut board2 = Board::new();

        board1.place_stone(Pos::new(7, 7), Stone::Black);
        board2.place_stone(Pos::new(7, 8), Stone::Black);

        assert_ne!(zt.hash(&board1), zt.hash(&board2));
    }
}
