//! Win condition checking for Renju
//!
//! Win conditions:
//! 1. White wins with five or more stones in a row
//! 2. Black wins only with exactly five; six or more is an overline

use crate::board::{Bitboard, Board, Pos, Stone, DIRECTIONS};

use super::window::WINDOWS5;

/// Length of the `color` run through `pos` along `(dr, dc)`, counting `pos`
/// itself as a `color` stone.
#[inline]
pub(crate) fn run_length(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> usize {
    let mut count = 1;
    for sign in [1, -1] {
        let mut k = 1;
        while let Some(p) = pos.offset(dr * sign, dc * sign, k) {
            if board.get(p) != color {
                break;
            }
            count += 1;
            k += 1;
        }
    }
    count
}

#[inline]
fn is_winning_run(color: Stone, len: usize) -> bool {
    match color {
        Stone::Black => len == 5,
        _ => len >= 5,
    }
}

/// Would placing `color` at `pos` complete a winning line?
///
/// `pos` is assumed empty.
pub fn makes_five(board: &Board, pos: Pos, color: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| is_winning_run(color, run_length(board, pos, color, dr, dc)))
}

/// All empty cells where `color` would complete a winning line.
///
/// For black only exact fives count. The black five point is a winning
/// move even where it would otherwise be forbidden.
pub fn five_points(board: &Board, color: Stone) -> Bitboard {
    let mut points = Bitboard::new();
    if board.stones(color).count() < 4 {
        return points;
    }
    for w in WINDOWS5.iter() {
        if w.own_count(board, color) != Some(4) {
            continue;
        }
        if color == Stone::Black {
            let extends = |p: Option<Pos>| p.is_some_and(|p| board.get(p) == Stone::Black);
            if extends(w.before()) || extends(w.after()) {
                continue;
            }
        }
        if let Some(&empty) = w.cells.iter().find(|&&p| board.is_empty(p)) {
            points.set(empty);
        }
    }
    points
}

/// Check whether `color` already has a winning line on the board.
pub fn has_five(board: &Board, color: Stone) -> bool {
    let stones = board.stones(color);
    stones.iter_ones().any(|pos| {
        DIRECTIONS.iter().any(|&(dr, dc)| {
            // count only stones already placed
            let len = run_length(board, pos, color, dr, dc);
            is_winning_run(color, len)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(black: &[(u8, u8)], white: &[(u8, u8)]) -> Board {
        let mut board = Board::new();
        for &(r, c) in black {
            board.place_stone(Pos::new(r, c), Stone::Black);
        }
        for &(r, c) in white {
            board.place_stone(Pos::new(r, c), Stone::White);
        }
        board
    }

    #[test]
    fn test_makes_five_horizontal() {
        let board = board_with(&[(7, 3), (7, 4), (7, 5), (7, 6)], &[]);
        assert!(makes_five(&board, Pos::new(7, 7), Stone::Black));
        assert!(makes_five(&board, Pos::new(7, 2), Stone::Black));
        assert!(!makes_five(&board, Pos::new(7, 8), Stone::Black));
    }

    #[test]
    fn test_black_overline_is_not_five() {
        // X X X X _ X : filling the gap makes six
        let board = board_with(&[(7, 1), (7, 2), (7, 3), (7, 4), (7, 6)], &[]);
        assert!(!makes_five(&board, Pos::new(7, 5), Stone::Black));
        assert!(!five_points(&board, Stone::Black).get(Pos::new(7, 5)));
    }

    #[test]
    fn test_white_overline_is_five() {
        let board = board_with(&[], &[(7, 1), (7, 2), (7, 3), (7, 4), (7, 6)]);
        assert!(makes_five(&board, Pos::new(7, 5), Stone::White));
        assert!(five_points(&board, Stone::White).get(Pos::new(7, 5)));
    }

    #[test]
    fn test_five_points_open_four() {
        let board = board_with(&[(7, 4), (7, 5), (7, 6), (7, 7)], &[]);
        let points = five_points(&board, Stone::Black);
        assert_eq!(points.count(), 2);
        assert!(points.get(Pos::new(7, 3)));
        assert!(points.get(Pos::new(7, 8)));
    }

    #[test]
    fn test_five_points_blocked() {
        let board = board_with(&[(7, 4), (7, 5), (7, 6), (7, 7)], &[(7, 3)]);
        let points = five_points(&board, Stone::Black);
        assert_eq!(points.iter_ones().collect::<Vec<_>>(), vec![Pos::new(7, 8)]);
    }

    #[test]
    fn test_split_four_diagonal() {
        let board = board_with(&[(2, 2), (3, 3), (5, 5), (6, 6)], &[]);
        assert_eq!(
            five_points(&board, Stone::Black).iter_ones().collect::<Vec<_>>(),
            vec![Pos::new(4, 4)]
        );
    }

    #[test]
    fn test_has_five() {
        let board = board_with(&[], &[(0, 10), (1, 9), (2, 8), (3, 7), (4, 6)]);
        assert!(has_five(&board, Stone::White));
        assert!(!has_five(&board, Stone::Black));
    }
}
