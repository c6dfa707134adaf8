//! Board state, move engine, rules and tile spawning.
//!
//! Everything in here except [`spawn`] and [`game`] is pure: a [`Board`] is an
//! immutable value and every transition returns a new one.
//!
//! ```
//! use ai_2048_core::engine::{Board, Direction};
//!
//! let board = Board::from_grid(
//!     &[vec![2, 2, 0, 0], vec![4, 4, 8, 0], vec![0; 4], vec![0; 4]],
//!     0,
//! ).unwrap();
//! let outcome = board.apply(Direction::Left);
//! assert!(outcome.changed);
//! assert_eq!(outcome.score_gained, 12);
//! assert_eq!(outcome.next.rows().next(), Some(&[4, 0, 0, 0][..]));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod game;
pub mod rules;
pub mod shift;
pub mod spawn;
pub mod state;

pub use game::{Game, StepResult};
pub use rules::Violation;
pub use shift::{apply, MoveOutcome};
pub use spawn::TileSpawner;
pub use state::{Board, Position};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order searches break ties.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Index into [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Inverse of [`Direction::index`].
    pub fn from_index(idx: usize) -> Option<Direction> { Direction::ALL.get(idx).copied() }

    /// True for `Left`/`Right`, whose lines are rows.
    #[inline]
    pub fn is_horizontal(self) -> bool { matches!(self, Direction::Left | Direction::Right) }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_index_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_index(dir.index()), Some(dir));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn direction_parse() {
        assert_eq!("LEFT".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(" up ".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("s".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!("d".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!("right".parse::<Direction>(), Ok(Direction::Right));
        assert!("diagonal".parse::<Direction>().is_err());
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Down.to_string(), "DOWN");
    }
}
