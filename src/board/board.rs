//! Board structure with side-to-move tracking

use std::fmt;

use super::bitboard::Bitboard;
use super::move_list::MoveList;
use super::{Move, Pos, Stone, BOARD_SIZE};
use crate::error::PositionError;
use crate::rules;

/// Game board: two stone bitboards and the side to move.
///
/// The board is `Copy`; it keeps no history. Callers that need to undo
/// moves keep their own sequence and call [`Board::unplay`] in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    /// Black stones bitboard
    pub black: Bitboard,
    /// White stones bitboard
    pub white: Bitboard,
    side: Stone,
}

/// Raw board state used for exact transposition verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub black: [u64; 4],
    pub white: [u64; 4],
    pub side: Stone,
}

impl Board {
    /// Empty board, black to move.
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
            side: Stone::Black,
        }
    }

    /// Build a position from a move sequence, checking that every move is
    /// legal and that the game is still undecided at the end.
    pub fn from_move_list(moves: &MoveList) -> Result<Self, PositionError> {
        let mut board = Board::new();
        for (ply, &mv) in moves.iter().enumerate() {
            let pos = match mv {
                Move::Pass => {
                    board.play(mv);
                    continue;
                }
                Move::Place(pos) => pos,
            };
            let side = board.side;
            if !board.is_empty(pos) {
                return Err(PositionError::Occupied { ply, mv: pos });
            }
            if side == Stone::Black && rules::is_forbidden(&board, pos) {
                return Err(PositionError::Forbidden { ply, mv: pos });
            }
            if rules::makes_five(&board, pos, side) {
                return Err(PositionError::AlreadyDecided { ply });
            }
            board.play(mv);
        }
        if board.empties().is_empty() {
            return Err(PositionError::AlreadyDecided { ply: moves.len() });
        }
        Ok(board)
    }

    /// Parse a move string and build the position in one step.
    pub fn from_moves_str(s: &str) -> Result<Self, PositionError> {
        let moves: MoveList = s.parse()?;
        Self::from_move_list(&moves)
    }

    #[inline]
    pub fn side_to_move(&self) -> Stone {
        self.side
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Get bitboard for a color (empty for `Stone::Empty`)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Bitboard {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => Bitboard::new(),
        }
    }

    /// All empty cells
    #[inline]
    pub fn empties(&self) -> Bitboard {
        !(self.black | self.white)
    }

    /// Place a stone without touching the side to move.
    #[inline]
    pub fn place_stone(&mut self, pos: Pos, stone: Stone) {
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => {}
        }
    }

    /// Remove a stone
    #[inline]
    pub fn remove_stone(&mut self, pos: Pos) {
        self.black.clear(pos);
        self.white.clear(pos);
    }

    /// Play a move for the side to move. A pass only hands over the turn.
    #[inline]
    pub fn play(&mut self, mv: Move) {
        debug_assert!(mv.pos().map_or(true, |p| self.is_empty(p)));
        if let Move::Place(pos) = mv {
            self.place_stone(pos, self.side);
        }
        self.side = self.side.opponent();
    }

    /// Exact inverse of [`Board::play`] for the same move.
    #[inline]
    pub fn unplay(&mut self, mv: Move) {
        self.side = self.side.opponent();
        if let Move::Place(pos) = mv {
            debug_assert_eq!(self.get(pos), self.side);
            self.remove_stone(pos);
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.black.count() + self.white.count()
    }

    #[inline]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            black: self.black.words(),
            white: self.white.words(),
            side: self.side,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Text diagram, row `a` on top, `X` for black and `O` for white.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for col in 0..BOARD_SIZE as u8 {
            write!(f, " {}", (b'a' + col) as char)?;
        }
        writeln!(f)?;
        for row in 0..BOARD_SIZE as u8 {
            write!(f, " {}", (b'a' + row) as char)?;
            for col in 0..BOARD_SIZE as u8 {
                let c = match self.get(Pos::new(row, col)) {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    Stone::Empty => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
