//! Board representation for Renju

pub mod bitboard;
pub mod board;
pub mod move_list;
pub mod symmetry;


// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, BoardSnapshot};
pub use move_list::{MoveList, MoveParseError};
pub use symmetry::{board_symmetries, Symmetry};

use std::fmt;

/// Board size (15x15)
pub const BOARD_SIZE: usize = 15;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 225

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Step `k` cells along `(dr, dc)`, or `None` when that leaves the board.
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, k: i32) -> Option<Pos> {
        let r = self.row as i32 + dr * k;
        let c = self.col as i32 + dc * k;
        if Pos::is_valid(r, c) {
            Some(Pos::new(r as u8, c as u8))
        } else {
            None
        }
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

/// Column letter first, then row letter: `Pos::new(7, 7)` is `hh`.
impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, (b'a' + self.row) as char)
    }
}

/// A ply: a stone placement or the pass pseudo-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    Place(Pos),
    Pass,
}

impl Move {
    #[inline]
    pub fn pos(self) -> Option<Pos> {
        match self {
            Move::Place(pos) => Some(pos),
            Move::Pass => None,
        }
    }

    #[inline]
    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }
}

impl From<Pos> for Move {
    fn from(pos: Pos) -> Self {
        Move::Place(pos)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place(pos) => pos.fmt(f),
            Move::Pass => f.write_str("pp"),
        }
    }
}

impl serde::Serialize for Move {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];
