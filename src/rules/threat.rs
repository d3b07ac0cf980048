//! Tactical pattern bitsets used for candidate generation and move ordering
//!
//! Patterns are read off line windows that contain no opposing stone:
//!
//! | window | own stones | empty cells are            |
//! |--------|------------|----------------------------|
//! | 5      | 4          | five points                |
//! | 5      | 3          | four points                |
//! | 5      | 2          | sword points               |
//! | 5      | 1          | two (extension) points     |
//! | 6      | 2 inside, empty ends | three points     |
//!
//! Except for five points (exact for black) these are cheap over-approximations.
//! They only steer ordering, and where they prune moves they err on the side
//! of keeping more candidates.

use crate::board::{Bitboard, Board, Stone};

use super::forbidden::is_legal;
use super::win::five_points;
use super::window::{WINDOWS5, WINDOWS6};

/// Per-direction pattern points for one side.
#[derive(Debug, Clone, Default)]
pub struct ThreatMap {
    pub five: Bitboard,
    pub four: [Bitboard; 4],
    pub three: [Bitboard; 4],
    pub sword: [Bitboard; 4],
    pub two: [Bitboard; 4],
}

impl ThreatMap {
    /// Scan every window once for `color`.
    pub fn compute(board: &Board, color: Stone) -> Self {
        let mut map = ThreatMap {
            five: five_points(board, color),
            ..Default::default()
        };

        for w in WINDOWS5.iter() {
            let target = match w.own_count(board, color) {
                Some(3) => &mut map.four[w.dir],
                Some(2) => &mut map.sword[w.dir],
                Some(1) => &mut map.two[w.dir],
                _ => continue,
            };
            for &p in &w.cells {
                if board.is_empty(p) {
                    target.set(p);
                }
            }
        }

        for w in WINDOWS6.iter() {
            let [first, .., last] = w.cells;
            if !board.is_empty(first) || !board.is_empty(last) {
                continue;
            }
            if w.own_count(board, color) != Some(2) {
                continue;
            }
            for &p in &w.cells[1..5] {
                if board.is_empty(p) {
                    map.three[w.dir].set(p);
                }
            }
        }

        map
    }

    pub fn any_four(&self) -> Bitboard {
        union(&self.four)
    }

    pub fn any_three(&self) -> Bitboard {
        union(&self.three)
    }

    pub fn any_sword(&self) -> Bitboard {
        union(&self.sword)
    }

    pub fn any_two(&self) -> Bitboard {
        union(&self.two)
    }

    /// Points that are a four in one direction and a three in another.
    pub fn four_three(&self) -> Bitboard {
        cross(&self.four, &self.three)
    }

    /// Points where a four or three lines up with a sword in another
    /// direction.
    pub fn threat_with_sword(&self) -> Bitboard {
        cross(&self.four, &self.sword) | cross(&self.three, &self.sword)
    }

    /// "Mise" points: swords in two or more directions.
    pub fn mise(&self) -> Bitboard {
        cross(&self.sword, &self.sword)
    }
}

fn union(dirs: &[Bitboard; 4]) -> Bitboard {
    dirs.iter().fold(Bitboard::new(), |acc, &b| acc | b)
}

/// Cells in `a` for some direction and in `b` for a different direction.
fn cross(a: &[Bitboard; 4], b: &[Bitboard; 4]) -> Bitboard {
    let mut out = Bitboard::new();
    for i in 0..4 {
        for j in (0..4).filter(|&j| j != i) {
            out |= a[i] & b[j];
        }
    }
    out
}

/// Legal moves after which `color` has two or more five points.
pub fn open_four_points(board: &Board, color: Stone) -> Bitboard {
    open_four_points_from(board, color, &ThreatMap::compute(board, color))
}

/// Same as [`open_four_points`], reusing an already computed map.
pub fn open_four_points_from(board: &Board, color: Stone, map: &ThreatMap) -> Bitboard {
    let mut points = Bitboard::new();
    for p in map.any_four().iter_ones() {
        if !is_legal(board, p, color) {
            continue;
        }
        let mut next = *board;
        next.place_stone(p, color);
        if five_points(&next, color).count() >= 2 {
            points.set(p);
        }
    }
    points
}
