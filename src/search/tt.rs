//! Transposition Table for caching solver outcomes
//!
//! The table stores one [`SearchValue`] per position, indexed by Zobrist
//! hash. Each slot can also keep a verbatim board snapshot so that two
//! positions sharing a hash are never confused.
//!
//! Proofs are precious: a proof tree is rebuilt from table contents after the
//! search, so a proved entry is never replaced by data for another position.
//! A second proof that lands on an occupied proved slot goes to a displaced
//! list instead, and a non-proved value for a different position is dropped.
//!
//! # Example
//!
//! ```
//! use renju_vlm::board::Board;
//! use renju_vlm::search::{SearchValue, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1, true); // 1 MB
//! let board = Board::new();
//!
//! tt.store(0x1234, &board, SearchValue::proved(3));
//! assert_eq!(tt.lookup(0x1234, &board), Some(SearchValue::proved(3)));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::value::SearchValue;
use crate::board::{Board, BoardSnapshot};

/// Table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// Zobrist hash of the position
    pub hash: u64,
    pub value: SearchValue,
    /// Exact position, present when the table verifies boards
    pub board: Option<BoardSnapshot>,
}

/// Hash-indexed outcome cache with collision-safe proof storage.
pub struct TranspositionTable {
    entries: Vec<Option<TableEntry>>,
    displaced: Vec<TableEntry>,
    size: usize,
    exact: bool,
}

impl TranspositionTable {
    /// Create a table using roughly `size_mb` megabytes of slots.
    ///
    /// With `exact` set, every entry carries a board snapshot and a hit
    /// requires the snapshot to match.
    #[must_use]
    pub fn new(size_mb: usize, exact: bool) -> Self {
        let entry_size = std::mem::size_of::<Option<TableEntry>>();
        let size = (size_mb * 1024 * 1024) / entry_size;

        // Ensure at least some entries
        Self::with_slots(size.max(1024), exact)
    }

    /// Create a table with an exact slot count.
    #[must_use]
    pub fn with_slots(size: usize, exact: bool) -> Self {
        assert!(size > 0, "table needs at least one slot");
        Self {
            entries: vec![None; size],
            displaced: Vec::new(),
            size,
            exact,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    #[inline]
    fn matches(&self, entry: &TableEntry, hash: u64, board: &Board) -> bool {
        entry.hash == hash && (!self.exact || entry.board == Some(board.snapshot()))
    }

    fn make_entry(&self, hash: u64, board: &Board, value: SearchValue) -> TableEntry {
        TableEntry {
            hash,
            value,
            board: self.exact.then(|| board.snapshot()),
        }
    }

    /// Probe the table for a position.
    ///
    /// The primary slot is checked first. When it holds a proof for some
    /// other position, the displaced list is scanned.
    #[must_use]
    pub fn lookup(&self, hash: u64, board: &Board) -> Option<SearchValue> {
        let entry = self.entries[self.slot(hash)].as_ref()?;

        if self.matches(entry, hash, board) {
            return Some(entry.value);
        }
        if !entry.value.is_proved() {
            return None;
        }
        self.displaced
            .iter()
            .find(|e| self.matches(e, hash, board))
            .map(|e| e.value)
    }

    /// Store a position in the table.
    ///
    /// | slot holds                | new value  | effect              |
    /// |---------------------------|------------|---------------------|
    /// | nothing / same position   | any        | write slot          |
    /// | same position, proved     | any        | keep the shorter win |
    /// | other position, proved    | proved     | add to displaced    |
    /// | other position, proved    | not proved | no-op               |
    /// | other position, unproved  | any        | replace             |
    pub fn store(&mut self, hash: u64, board: &Board, value: SearchValue) {
        let idx = self.slot(hash);
        let new_entry = self.make_entry(hash, board, value);

        let Some(existing) = self.entries[idx] else {
            self.entries[idx] = Some(new_entry);
            return;
        };

        if self.matches(&existing, hash, board) {
            if !existing.value.is_proved() || value > existing.value {
                self.entries[idx] = Some(new_entry);
            }
            return;
        }

        if !existing.value.is_proved() {
            self.entries[idx] = Some(new_entry);
            return;
        }

        if !value.is_proved() {
            return;
        }

        match self
            .displaced
            .iter()
            .position(|e| self.matches(e, hash, board))
        {
            Some(i) if value > self.displaced[i].value => self.displaced[i] = new_entry,
            Some(_) => {}
            None => self.displaced.push(new_entry),
        }
    }

    /// Clear all entries in the table.
    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.displaced.clear();
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            displaced: self.displaced.len(),
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }

    /// One-line description of the table layout.
    #[must_use]
    pub fn definition_info(&self) -> String {
        let entry_size = std::mem::size_of::<Option<TableEntry>>();
        let space_mb = (entry_size * self.size) as f64 / (1024.0 * 1024.0);
        format!(
            "TranspositionTable: value=i16, exact_board={}, entry={} bytes, slots={}, space={:.1} MB",
            self.exact, entry_size, self.size, space_mb
        )
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Proofs kept outside their primary slot
    pub displaced: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}

// =============================================================================
// Shared handle
// =============================================================================

/// How solvers holding the same table synchronize. Selects between
/// [`LocalTable`] and [`SharedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Single owner thread, no locking.
    #[default]
    LockFree,
    /// Guarded by a mutex; the handle may cross threads.
    Mutex,
}

/// Access to a reference-counted table. Clones share one table.
///
/// [`LocalTable`] stays on the thread that created it and costs nothing to
/// access. [`SharedTable`] takes a `parking_lot` mutex on every probe and is
/// `Send + Sync`, so solvers on different threads can hold clones of it.
pub trait TableHandle: Clone {
    const LOCK_MODE: LockMode;

    fn from_table(table: TranspositionTable) -> Self;

    fn with<R>(&self, f: impl FnOnce(&mut TranspositionTable) -> R) -> R;

    fn new(size_mb: usize, exact: bool) -> Self {
        Self::from_table(TranspositionTable::new(size_mb, exact))
    }

    fn lock_mode(&self) -> LockMode {
        Self::LOCK_MODE
    }

    #[inline]
    fn lookup(&self, hash: u64, board: &Board) -> Option<SearchValue> {
        self.with(|t| t.lookup(hash, board))
    }

    #[inline]
    fn store(&self, hash: u64, board: &Board, value: SearchValue) {
        self.with(|t| t.store(hash, board, value))
    }

    fn clear(&self) {
        self.with(|t| t.clear())
    }

    fn stats(&self) -> TTStats {
        self.with(|t| t.stats())
    }

    fn definition_info(&self) -> String {
        self.with(|t| t.definition_info())
    }
}

/// Single-threaded handle.
#[derive(Clone)]
pub struct LocalTable(Rc<RefCell<TranspositionTable>>);

impl TableHandle for LocalTable {
    const LOCK_MODE: LockMode = LockMode::LockFree;

    fn from_table(table: TranspositionTable) -> Self {
        Self(Rc::new(RefCell::new(table)))
    }

    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut TranspositionTable) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

/// Mutex-guarded handle for tables shared across threads.
#[derive(Clone)]
pub struct SharedTable(Arc<Mutex<TranspositionTable>>);

impl TableHandle for SharedTable {
    const LOCK_MODE: LockMode = LockMode::Mutex;

    fn from_table(table: TranspositionTable) -> Self {
        Self(Arc::new(Mutex::new(table)))
    }

    #[inline]
    fn with<R>(&self, f: impl FnOnce(&mut TranspositionTable) -> R) -> R {
        f(&mut self.0.lock())
    }
}

impl fmt::Debug for LocalTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTable").field("stats", &self.stats()).finish()
    }
}

impl fmt::Debug for SharedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTable").field("stats", &self.stats()).finish()
    }
}
