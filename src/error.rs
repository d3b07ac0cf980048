//! Error types for position setup, problem databases and configuration

use std::path::PathBuf;

use thiserror::Error;

use crate::board::{MoveParseError, Pos};

/// A move sequence that cannot be used as a start position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error(transparent)]
    Parse(#[from] MoveParseError),
    #[error("move {ply} ({mv}) is played on an occupied cell")]
    Occupied { ply: usize, mv: Pos },
    #[error("move {ply} ({mv}) is forbidden for black")]
    Forbidden { ply: usize, mv: Pos },
    #[error("the game is already decided at move {ply}")]
    AlreadyDecided { ply: usize },
}

#[derive(Debug, Error)]
pub enum ProblemDbError {
    #[error("failed to read problem db {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid problem db: {0}")]
    Csv(#[from] csv::Error),
    #[error("problem db has no header row")]
    Empty,
    #[error("problem db is missing the '{0}' column")]
    MissingColumn(&'static str),
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
