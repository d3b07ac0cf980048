//! Dihedral symmetries of the square board

use smallvec::SmallVec;

use super::board::Board;
use super::{Move, Pos, BOARD_SIZE};

const LAST: u8 = BOARD_SIZE as u8 - 1;

/// One of the 8 transforms of the square that keep the centre fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    MirrorColumns,
    MirrorRows,
    Transpose,
    AntiTranspose,
}

impl Symmetry {
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::MirrorColumns,
        Symmetry::MirrorRows,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    #[inline]
    pub fn apply(self, pos: Pos) -> Pos {
        let (r, c) = (pos.row, pos.col);
        let (row, col) = match self {
            Symmetry::Identity => (r, c),
            Symmetry::Rotate90 => (c, LAST - r),
            Symmetry::Rotate180 => (LAST - r, LAST - c),
            Symmetry::Rotate270 => (LAST - c, r),
            Symmetry::MirrorColumns => (r, LAST - c),
            Symmetry::MirrorRows => (LAST - r, c),
            Symmetry::Transpose => (c, r),
            Symmetry::AntiTranspose => (LAST - c, LAST - r),
        };
        Pos::new(row, col)
    }

    /// Map a move; a pass maps to itself.
    #[inline]
    pub fn apply_move(self, mv: Move) -> Move {
        match mv {
            Move::Place(pos) => Move::Place(self.apply(pos)),
            Move::Pass => Move::Pass,
        }
    }

    fn preserves(self, board: &Board) -> bool {
        board.black.iter_ones().all(|p| board.black.get(self.apply(p)))
            && board.white.iter_ones().all(|p| board.white.get(self.apply(p)))
    }
}

/// The transforms that map the position onto itself. Always contains
/// `Symmetry::Identity`.
pub fn board_symmetries(board: &Board) -> SmallVec<[Symmetry; 8]> {
    Symmetry::ALL
        .iter()
        .copied()
        .filter(|s| s.preserves(board))
        .collect()
}
