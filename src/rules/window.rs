//! Precomputed line windows shared by the pattern detectors
//!
//! A window is a run of consecutive on-board cells along one of the four
//! directions. Five-cell windows drive five/four/sword/two detection and
//! six-cell windows drive three detection.

use once_cell::sync::Lazy;

use crate::board::{Board, Pos, Stone, BOARD_SIZE, DIRECTIONS};

/// A window of `N` cells together with its direction index into `DIRECTIONS`.
#[derive(Debug, Clone, Copy)]
pub struct Window<const N: usize> {
    pub dir: usize,
    pub cells: [Pos; N],
}

impl<const N: usize> Window<N> {
    /// Cell just before the first cell, if on board.
    #[inline]
    pub fn before(&self) -> Option<Pos> {
        let (dr, dc) = DIRECTIONS[self.dir];
        self.cells[0].offset(dr, dc, -1)
    }

    /// Cell just after the last cell, if on board.
    #[inline]
    pub fn after(&self) -> Option<Pos> {
        let (dr, dc) = DIRECTIONS[self.dir];
        self.cells[N - 1].offset(dr, dc, 1)
    }

    /// Number of `color` stones, or `None` if the window holds an opposing stone.
    #[inline]
    pub fn own_count(&self, board: &Board, color: Stone) -> Option<usize> {
        let mut own = 0;
        for &p in &self.cells {
            match board.get(p) {
                Stone::Empty => {}
                s if s == color => own += 1,
                _ => return None,
            }
        }
        Some(own)
    }
}

fn build<const N: usize>() -> Vec<Window<N>> {
    let mut windows = Vec::new();
    for (dir, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
        for idx in 0..BOARD_SIZE * BOARD_SIZE {
            let start = Pos::from_index(idx);
            if start.offset(dr, dc, N as i32 - 1).is_none() {
                continue;
            }
            let mut cells = [start; N];
            for (k, cell) in cells.iter_mut().enumerate() {
                // bounds checked above
                *cell = start.offset(dr, dc, k as i32).unwrap_or(start);
            }
            windows.push(Window { dir, cells });
        }
    }
    windows
}

pub static WINDOWS5: Lazy<Vec<Window<5>>> = Lazy::new(build::<5>);
pub static WINDOWS6: Lazy<Vec<Window<6>>> = Lazy::new(build::<6>);
