//! Solver configuration
//!
//! All tuning knobs live in one immutable [`SolverConfig`] handed to the
//! solver at construction. The CLIs start from [`SolverConfig::default`] and
//! optionally overlay a TOML file:
//!
//! ```toml
//! table_size_mb = 256
//! exact_board = true
//! lock_mode = "lock_free"
//! shallow_depth = 4
//!
//! [limits]
//! time_limit_ms = 60000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::search::{LockMode, SearchLimits};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Transposition table size in megabytes
    pub table_size_mb: usize,
    /// Keep a board snapshot per entry and verify it on every hit
    pub exact_board: bool,
    /// Batch workers each own a table, or all share one behind a mutex
    pub lock_mode: LockMode,
    /// Remaining depth of the probe pass an OR node runs before its full pass
    pub shallow_depth: i16,
    /// Remaining depth from which OR ordering uses sword, mise and two points
    pub ordering_depth: i16,
    /// Remaining depth from which AND replies are ordered
    pub and_ordering_depth: i16,
    /// Try replaying a sibling's proof before fully searching an AND reply
    pub use_simulation: bool,
    pub limits: SearchLimits,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            table_size_mb: 64,
            exact_board: true,
            lock_mode: LockMode::LockFree,
            shallow_depth: 4,
            ordering_depth: 5,
            and_ordering_depth: 4,
            use_simulation: true,
            limits: SearchLimits::default(),
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = SolverConfig::from_toml_str("table_size_mb = 8\nlock_mode = \"mutex\"\n").unwrap();
        assert_eq!(cfg.table_size_mb, 8);
        assert_eq!(cfg.lock_mode, LockMode::Mutex);
        assert_eq!(cfg.shallow_depth, 4);
        assert!(cfg.exact_board);
    }

    #[test]
    fn test_limits_table() {
        let cfg = SolverConfig::from_toml_str("[limits]\nmax_nodes = 1000\n").unwrap();
        assert_eq!(cfg.limits.max_nodes, Some(1000));
        assert_eq!(cfg.limits.time_limit_ms, None);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            SolverConfig::from_toml_str("table_size_mb = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solver.toml");
        std::fs::write(&path, "use_simulation = false\n").unwrap();
        let cfg = SolverConfig::load_or_default(Some(&path)).unwrap();
        assert!(!cfg.use_simulation);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            SolverConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(SolverConfig::load_or_default(None).unwrap(), SolverConfig::default());
    }
}
