//! ai-2048-core: a sliding-tile merge engine (2048 rules) plus an
//! Expectimax move selector.
//!
//! This crate provides:
//! - An immutable `Board` value type for square grids from 3x3 to 8x8
//!   (`engine` module), with pure move/merge logic and rule queries
//! - Tile spawning behind an injected random source (`engine::spawn`)
//! - A weighted multi-term board evaluator and depth-bounded Expectimax
//!   search, single-threaded and parallel (`expectimax` module)
//! - Cheaper move policies behind a common trait (`policy` module)
//! - JSON configuration (`config` module)
//!
//! Quick start:
//! ```
//! use ai_2048_core::engine::{Board, Direction};
//! use ai_2048_core::expectimax::Expectimax;
//!
//! let grid = vec![vec![2, 2, 0, 0], vec![4, 4, 8, 0], vec![0; 4], vec![0; 4]];
//! let board = Board::from_grid(&grid, 0).unwrap();
//! let out = board.apply(Direction::Left);
//! assert_eq!(out.next.to_grid()[1], vec![8, 8, 0, 0]);
//! assert_eq!(out.score_gained, 12);
//!
//! let mut ex = Expectimax::new();
//! assert!(ex.best_move(&board).is_some());
//! ```
//!
//! Search never draws randomness: only `TileSpawner` does, and it takes its
//! RNG from the caller. Seed it when you need reproducible games.
pub mod config;
pub mod engine;
pub mod error;
pub mod expectimax;
pub mod policy;

pub use config::Config;
pub use engine::{Board, Direction};
pub use error::{BoardError, ConfigError};
