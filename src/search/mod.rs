//! Forced-win search
//!
//! Contains:
//! - Search values and their ordering
//! - Zobrist hashing for position identification
//! - Transposition table with collision-safe proof storage
//! - Candidate generation and move ordering
//! - AND/OR solver with iterative deepening
//! - Proof tree reconstruction and cached re-verification
//! - Dual solution detection

mod dual;
pub mod manager;
pub mod ordering;
pub mod proof;
pub mod solver;
pub mod tt;
pub mod value;
pub mod zobrist;

pub use manager::{SearchLimits, SearchManager, SearchStats};
pub use ordering::{candidates_and, candidates_or, AndCandidates, BlackTurn, Turn, WhiteTurn};
pub use proof::{ProofEdge, ProofTree};
pub use solver::{Outcome, SearchConfig, SearchResult, VlmSolver};
pub use tt::{LocalTable, LockMode, SharedTable, TTStats, TableEntry, TableHandle, TranspositionTable};
pub use value::{SearchValue, MAX_PLY};
pub use zobrist::{ZobristTable, ZOBRIST};
