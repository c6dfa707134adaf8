use std::io;

use crate::engine::Violation;

/// Errors from constructing or editing a [`Board`](crate::engine::Board).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board snapshot ({} violation(s)): {}", .0.len(), join_violations(.0))]
    Invalid(Vec<Violation>),
    #[error("board size {size} outside 3..=8")]
    InvalidSize { size: usize },
    #[error("cell ({row}, {col}) outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
    #[error("invalid tile value: {value}")]
    InvalidTile { value: u32 },
}

impl BoardError {
    /// Violations carried by an [`BoardError::Invalid`] error, empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            BoardError::Invalid(v) => v,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Errors from loading or validating a [`Config`](crate::config::Config).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
