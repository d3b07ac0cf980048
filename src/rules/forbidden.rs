//! Forbidden move rules for black in Renju
//!
//! A black move is forbidden when it creates an overline, two or more fours,
//! or two or more threes, unless the same move completes an exact five.
//!
//! Threes are checked one level deep: a three is a line that one more black
//! stone turns into a straight four. Whether that completing move would
//! itself be forbidden is not examined.

use smallvec::SmallVec;

use crate::board::{Bitboard, Board, Pos, Stone, DIRECTIONS};

const SPAN: usize = 11;
const MID: usize = SPAN / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Own,
    Block,
}

/// Eleven cells along one direction with the candidate move in the middle.
type Line = [Cell; SPAN];

fn extract_line(board: &Board, pos: Pos, (dr, dc): (i32, i32)) -> Line {
    let mut line = [Cell::Block; SPAN];
    for (i, cell) in line.iter_mut().enumerate() {
        let k = i as i32 - MID as i32;
        *cell = match pos.offset(dr, dc, k).map(|p| board.get(p)) {
            Some(Stone::Black) => Cell::Own,
            Some(Stone::Empty) => Cell::Empty,
            _ => Cell::Block,
        };
    }
    line[MID] = Cell::Own;
    line
}

fn run_at(line: &Line, at: usize) -> usize {
    let left = line[..at].iter().rev().take_while(|&&c| c == Cell::Own).count();
    let right = line[at + 1..].iter().take_while(|&&c| c == Cell::Own).count();
    left + 1 + right
}

/// Empty cells that would complete an exact five through the middle stone.
fn five_completions(line: &Line) -> SmallVec<[usize; 4]> {
    (1..SPAN - 1)
        .filter(|&i| line[i] == Cell::Empty)
        .filter(|&i| {
            let mut next = *line;
            next[i] = Cell::Own;
            run_at(&next, MID) == 5
        })
        .collect()
}

/// Number of fours through the middle stone. `.XXXX.` counts once, while
/// `X.XXX.X` style lines hold two fours in the same direction.
fn count_fours(line: &Line) -> usize {
    let completions = five_completions(line);
    match completions.as_slice() {
        [a, b] if b - a == 5 => 1,
        other => other.len(),
    }
}

fn is_straight_four(line: &Line) -> bool {
    matches!(five_completions(line).as_slice(), [a, b] if b - a == 5)
}

fn has_three(line: &Line) -> bool {
    (1..SPAN - 1).filter(|&i| line[i] == Cell::Empty).any(|i| {
        let mut next = *line;
        next[i] = Cell::Own;
        run_at(&next, MID) < 5 && is_straight_four(&next)
    })
}

/// Quick reject: forbidden shapes need at least four other black stones
/// within reach along the four lines through `pos`.
fn near_black_count(board: &Board, pos: Pos) -> usize {
    let mut count = 0;
    for &(dr, dc) in &DIRECTIONS {
        for k in (-4..=4).filter(|&k| k != 0) {
            if pos.offset(dr, dc, k).is_some_and(|p| board.get(p) == Stone::Black) {
                count += 1;
            }
        }
    }
    count
}

/// Check whether black playing at `pos` is forbidden.
///
/// `pos` must be empty. A move that completes an exact five is never
/// forbidden.
pub fn is_forbidden(board: &Board, pos: Pos) -> bool {
    if near_black_count(board, pos) < 4 {
        return false;
    }

    let lines: [Line; 4] = DIRECTIONS.map(|dir| extract_line(board, pos, dir));

    if lines.iter().any(|l| run_at(l, MID) == 5) {
        return false;
    }
    if lines.iter().any(|l| run_at(l, MID) > 5) {
        return true;
    }

    let mut fours = 0;
    let mut threes = 0;
    for line in &lines {
        let f = count_fours(line);
        if f > 0 {
            fours += f;
        } else if has_three(line) {
            threes += 1;
        }
    }
    fours >= 2 || threes >= 2
}

/// Whether `color` may play at `pos`: the cell is empty and, for black,
/// the move is not forbidden.
#[inline]
pub fn is_legal(board: &Board, pos: Pos, color: Stone) -> bool {
    board.is_empty(pos) && (color != Stone::Black || !is_forbidden(board, pos))
}

/// All empty cells where black is forbidden to play.
pub fn forbidden_points(board: &Board) -> Bitboard {
    board
        .empties()
        .iter_ones()
        .filter(|&p| is_forbidden(board, p))
        .collect()
}

/// All cells `color` may legally play.
pub fn legal_points(board: &Board, color: Stone) -> Bitboard {
    let empties = board.empties();
    if color == Stone::White {
        return empties;
    }
    empties
        .iter_ones()
        .filter(|&p| !is_forbidden(board, p))
        .collect()
}
