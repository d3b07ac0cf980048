//! AND/OR forced-win search with iterative deepening
//!
//! The solver answers one question: can the side to move force five within
//! a given number of plies against any defence?
//!
//! - **OR nodes**: the attacker picks a move; proved if any child is proved.
//! - **AND nodes**: the defender replies (or passes); proved only if every
//!   reply is proved.
//!
//! Every node consults the shared [`TableHandle`] first and stores its
//! outcome on the way out. The root is deepened two plies at a time since a
//! win always lands on the attacker's own ply.
//!
//! # Example
//!
//! ```
//! use renju_vlm::board::MoveList;
//! use renju_vlm::config::SolverConfig;
//! use renju_vlm::search::VlmSolver;
//!
//! // Black open three hh ih jh, black to move
//! let moves: MoveList = "hhaaihabjhac".parse().unwrap();
//! let config = SolverConfig { table_size_mb: 1, ..SolverConfig::default() };
//! let mut solver = VlmSolver::new(&moves, config).unwrap();
//!
//! let result = solver.solve(5, false);
//! assert!(result.solved);
//! assert_eq!(result.search_depth, 3);
//! ```

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{debug, info, trace};
use serde::Serialize;

use super::manager::{SearchManager, SearchStats};
use super::ordering::{candidates_and, candidates_or, BlackTurn, Turn, WhiteTurn};
use super::proof::ProofTree;
use super::tt::{LocalTable, TableHandle};
use super::value::{SearchValue, MAX_PLY};
use super::zobrist::ZOBRIST;
use crate::board::{Bitboard, Board, Move, MoveList, Stone};
use crate::config::SolverConfig;
use crate::error::PositionError;

/// Per-call search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies left below this node
    pub remain: i16,
    /// Keep looking for equally short wins after the first proof
    pub detect_dual: bool,
    /// Order candidates; off for raw enumeration
    pub is_search: bool,
}

/// Final classification of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Solved,
    Disproved,
    Terminated,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Solved => "Solved",
            Outcome::Disproved => "Disproved",
            Outcome::Terminated => "Terminated",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    pub solved: bool,
    pub disproved: bool,
    /// A node or time limit or the cancel flag stopped the search
    pub interrupted: bool,
    /// Deepest fully searched bound
    pub search_depth: i16,
    pub proof_tree: ProofTree,
    pub dual_solution: bool,
    pub dual_tree: ProofTree,
    /// Principal line through the proof tree
    pub best_response: Vec<Move>,
    pub stats: SearchStats,
}

impl SearchResult {
    pub fn outcome(&self) -> Outcome {
        if self.solved {
            Outcome::Solved
        } else if self.disproved {
            Outcome::Disproved
        } else {
            Outcome::Terminated
        }
    }

    pub fn first_move(&self) -> Option<Move> {
        self.proof_tree.first_move()
    }
}

/// Forced-win solver for one start position.
///
/// The solver owns its board and move sequence; the transposition table is
/// shared with every other solver holding a clone of the same handle. With a
/// [`SharedTable`](super::tt::SharedTable) the solver is `Send` and solvers on
/// different threads may share one table.
pub struct VlmSolver<T: TableHandle = LocalTable> {
    pub(super) board: Board,
    pub(super) hash: u64,
    pub(super) sequence: MoveList,
    pub(super) table: T,
    pub(super) manager: SearchManager,
    pub(super) config: SolverConfig,
    root: MoveList,
}

impl VlmSolver {
    /// Solver with a private table sized from `config`.
    pub fn new(moves: &MoveList, config: SolverConfig) -> Result<Self, PositionError> {
        let table = LocalTable::new(config.table_size_mb, config.exact_board);
        Self::with_table(moves, config, table)
    }
}

impl<T: TableHandle> VlmSolver<T> {
    /// Solver using an existing table handle.
    pub fn with_table(moves: &MoveList, config: SolverConfig, table: T) -> Result<Self, PositionError> {
        let board = Board::from_move_list(moves)?;
        let mut solver = Self::from_board(board, config, table);
        solver.root = moves.clone();
        Ok(solver)
    }

    /// Solver for an arbitrary position. The caller vouches that it is legal
    /// and undecided.
    pub fn from_board(board: Board, config: SolverConfig, table: T) -> Self {
        info!("{} lock_mode={:?}", table.definition_info(), table.lock_mode());
        Self {
            board,
            hash: ZOBRIST.hash(&board),
            sequence: MoveList::new(),
            manager: SearchManager::new(config.limits, None),
            table,
            config,
            root: MoveList::new(),
        }
    }

    /// Stop the search cooperatively once `flag` is raised.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.manager = SearchManager::new(self.config.limits, Some(flag));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn manager(&self) -> &SearchManager {
        &self.manager
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    // =========================================================================
    // Move bookkeeping
    // =========================================================================

    pub(super) fn make_move(&mut self, mv: Move) {
        self.hash = ZOBRIST.update(self.hash, mv, self.board.side_to_move());
        self.board.play(mv);
        self.sequence.push(mv);
    }

    pub(super) fn undo_move(&mut self, mv: Move) {
        let popped = self.sequence.pop();
        debug_assert_eq!(popped, Some(mv));
        self.board.unplay(mv);
        self.hash = ZOBRIST.update(self.hash, mv, self.board.side_to_move());
    }

    #[inline]
    pub(super) fn probe(&self) -> Option<SearchValue> {
        self.table.lookup(self.hash, &self.board)
    }

    #[inline]
    pub(super) fn record(&self, value: SearchValue) {
        self.table.store(self.hash, &self.board, value);
    }

    // =========================================================================
    // Root
    // =========================================================================

    /// Search for a forced win within `max_depth` plies.
    ///
    /// The bound grows 1, 3, 5, ... and stops at the first proof, strong
    /// disproof or interruption. On success the proof tree is rebuilt from
    /// the table; with `detect_dual` the tree is also checked for cooks.
    pub fn solve(&mut self, max_depth: i16, detect_dual: bool) -> SearchResult {
        self.manager.reset();
        let max_depth = max_depth.clamp(1, MAX_PLY);
        info!(
            "solve: board={} side={:?} max_depth={} dual={}",
            self.root,
            self.board.side_to_move(),
            max_depth,
            detect_dual
        );

        let mut depth = 1;
        let value = loop {
            let search = SearchConfig {
                remain: depth,
                detect_dual,
                is_search: true,
            };
            let value = self.solve_root(&search);
            debug!(
                "depth {}: {} nodes={} elapsed={:?}",
                depth,
                value,
                self.manager.nodes(),
                self.manager.elapsed()
            );
            let settled =
                value.is_proved() || value.is_strong_disproved() || self.manager.is_terminated();
            if settled || depth + 2 > max_depth {
                break value;
            }
            depth += 2;
        };

        let interrupted = self.manager.is_terminated();
        let mut result = SearchResult {
            solved: value.is_proved(),
            disproved: value.is_strong_disproved(),
            interrupted,
            search_depth: if interrupted && depth >= 3 { depth - 2 } else { depth },
            ..SearchResult::default()
        };

        if result.solved {
            result.proof_tree = self
                .root_proof_tree(false)
                .expect("a proved root must be rebuildable from the table");
            result.best_response = result.proof_tree.principal_line();
            if detect_dual {
                if let Some(dual) = self.root_dual(&result.proof_tree) {
                    result.dual_solution = true;
                    result.dual_tree = dual;
                }
            }
        }

        result.stats = self.manager.stats();
        info!(
            "solve: {} depth={} nodes={} elapsed={:?}",
            result.outcome(),
            result.search_depth,
            result.stats.nodes,
            result.stats.elapsed
        );
        result
    }

    fn solve_root(&mut self, search: &SearchConfig) -> SearchValue {
        match self.board.side_to_move() {
            Stone::White => self.solve_or::<WhiteTurn>(search),
            _ => self.solve_or::<BlackTurn>(search),
        }
    }

    /// Proof tree of the current position, rebuilt from the table.
    pub fn root_proof_tree(&mut self, summarize: bool) -> Option<ProofTree> {
        match self.board.side_to_move() {
            Stone::White => self.proof_tree_or::<WhiteTurn>(summarize),
            _ => self.proof_tree_or::<BlackTurn>(summarize),
        }
    }

    fn root_dual(&mut self, tree: &ProofTree) -> Option<ProofTree> {
        match self.board.side_to_move() {
            Stone::White => self.find_dual_or::<WhiteTurn>(tree),
            _ => self.find_dual_or::<BlackTurn>(tree),
        }
    }

    // =========================================================================
    // Terminal checks
    // =========================================================================

    /// Attacker to move: a five point wins now; two defender five points,
    /// or one the attacker may not block, lose.
    fn terminal_or<P: Turn>(&self) -> Option<SearchValue> {
        if !P::five_points(&self.board).is_empty() {
            return Some(SearchValue::proved(1));
        }
        let defender_fives = <P::Opponent as Turn>::five_points(&self.board);
        match defender_fives.count() {
            0 => None,
            1 => defender_fives
                .iter_ones()
                .next()
                .filter(|&p| !P::is_legal(&self.board, p))
                .map(|_| SearchValue::STRONG_DISPROVED),
            _ => Some(SearchValue::STRONG_DISPROVED),
        }
    }

    /// Defender to move: a defender five point wins for the defender.
    fn terminal_and<P: Turn>(&self) -> Option<SearchValue> {
        let defender_fives = <P::Opponent as Turn>::five_points(&self.board);
        (!defender_fives.is_empty()).then_some(SearchValue::STRONG_DISPROVED)
    }

    // =========================================================================
    // OR node
    // =========================================================================

    pub(super) fn solve_or<P: Turn>(&mut self, search: &SearchConfig) -> SearchValue {
        if self.manager.visit() {
            return SearchValue::ABORTED;
        }
        let remain = search.remain;

        let first_visit = match self.probe() {
            Some(v) if v.is_reusable(remain) => return v,
            Some(_) => false,
            None => {
                if let Some(v) = self.terminal_or::<P>() {
                    self.record(v);
                    return v;
                }
                true
            }
        };

        if remain <= 1 {
            let v = SearchValue::weak(1);
            self.record(v);
            return v;
        }

        let moves = candidates_or::<P>(&self.board, remain, &self.config, search.is_search);

        // Cheap probe of every child before committing to the full depth
        let mut refuted = Bitboard::new();
        let shallow_depth = self.config.shallow_depth;
        if first_visit && search.is_search && remain >= shallow_depth + 3 {
            let shallow = SearchConfig {
                remain: shallow_depth,
                ..*search
            };
            for &mv in &moves {
                self.make_move(mv);
                let v = self.solve_and::<P>(&shallow).step_up();
                self.undo_move(mv);

                if self.manager.is_terminated() {
                    return SearchValue::ABORTED;
                }
                if v.is_strong_disproved() {
                    if let Some(pos) = mv.pos() {
                        refuted.set(pos);
                    }
                } else if v.is_proved() && !search.detect_dual {
                    self.record(v);
                    return v;
                }
            }
        }

        let mut best = SearchValue::STRONG_DISPROVED;
        let mut child = SearchConfig {
            remain: remain - 1,
            ..*search
        };
        for &mv in &moves {
            if mv.pos().is_some_and(|p| refuted.get(p)) {
                continue;
            }
            self.make_move(mv);
            let v = self.solve_and::<P>(&child).step_up();
            self.undo_move(mv);

            best = best.max(v);
            if self.manager.is_terminated() {
                break;
            }
            if v.is_proved() {
                if !search.detect_dual {
                    break;
                }
                // A longer alternative is not a cook
                child.remain = child.remain.min(best.distance() - 1);
            }
        }

        // A proof found before the stop is still sound
        if self.manager.is_terminated() && !best.is_proved() {
            return SearchValue::ABORTED;
        }

        let v = best.settle(remain);
        self.record(v);
        v
    }

    // =========================================================================
    // AND node
    // =========================================================================

    pub(super) fn solve_and<P: Turn>(&mut self, search: &SearchConfig) -> SearchValue {
        if self.manager.visit() {
            return SearchValue::ABORTED;
        }
        let remain = search.remain;

        match self.probe() {
            Some(v) if v.is_reusable(remain) => return v,
            Some(_) => {}
            None => {
                if let Some(v) = self.terminal_and::<P>() {
                    self.record(v);
                    return v;
                }
            }
        }

        if remain <= 2 && P::five_points(&self.board).is_empty() {
            let v = SearchValue::weak(remain.max(1));
            self.record(v);
            return v;
        }

        let replies = candidates_and::<P>(&self.board, remain, &self.config, search.is_search);
        let mut worst = if replies.implicit_loss {
            SearchValue::proved(4)
        } else {
            SearchValue::proved(1)
        };

        let child = SearchConfig {
            remain: remain - 1,
            ..*search
        };
        let use_simulation = self.config.use_simulation && search.is_search;
        let mut cached: Option<ProofTree> = None;
        let mut tried_proof_tree = false;

        for &mv in &replies.moves {
            self.make_move(mv);

            let mut value = None;
            if let Some(tree) = &cached {
                let simulated = self.simulate_or::<P>(tree, child.remain);
                trace!("simulation after {mv}: {simulated:?}");
                self.manager.record_simulation(simulated.is_some());
                value = simulated;
            }
            let v = match value {
                Some(v) => v,
                None => self.solve_or::<P>(&child),
            };

            if use_simulation && !tried_proof_tree && v.is_proved() {
                tried_proof_tree = true;
                cached = self.proof_tree_or::<P>(false);
                trace!("proof tree after {mv}: {}", cached.is_some());
                self.manager.record_proof_tree(cached.is_some());
            }

            self.undo_move(mv);

            let v = v.step_up();
            worst = worst.min(v);
            if !v.is_proved() || self.manager.is_terminated() {
                break;
            }
        }

        if self.manager.is_terminated() {
            return SearchValue::ABORTED;
        }

        let v = worst.settle(remain);
        self.record(v);
        v
    }
}
