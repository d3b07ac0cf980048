//! Renju VLM solver
//!
//! Decides whether the side to move can force five within a bounded number
//! of plies, where every attacker move must be a threat ("VLM", victory by
//! limited moves). Renju rules apply: Black wins with exactly five and may
//! not play overline, double-four or double-three.
//!
//! # Architecture
//!
//! - [`board`]: Board representation with bitboards, move strings, symmetry
//! - [`rules`]: Win detection, forbidden points and threat patterns
//! - [`search`]: AND/OR solver, transposition table, proof trees, duals
//! - [`batch`]: Problem database and the multi-threaded batch driver
//! - [`report`]: Interactive, CSV and JSON rendering of results
//! - [`config`]: Solver configuration, loadable from TOML
//!
//! # Quick Start
//!
//! ```
//! use renju_vlm::{MoveList, SolverConfig, VlmSolver};
//!
//! // Black has an open three on the centre row
//! let moves: MoveList = "hhaaihabjhac".parse().unwrap();
//! let config = SolverConfig { table_size_mb: 1, ..SolverConfig::default() };
//! let mut solver = VlmSolver::new(&moves, config).unwrap();
//!
//! let result = solver.solve(7, false);
//! assert!(result.solved);
//! println!("win in {} plies: {}", result.search_depth, result.proof_tree);
//! ```

pub mod batch;
pub mod board;
pub mod config;
pub mod error;
pub mod report;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Move, MoveList, Pos, Stone, BOARD_SIZE};
pub use config::SolverConfig;
pub use error::{ConfigError, PositionError, ProblemDbError};
pub use search::{Outcome, ProofTree, SearchResult, VlmSolver};
