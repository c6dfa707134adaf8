use rand::rngs::StdRng;
use rand::Rng;

use crate::error::BoardError;

use super::rules;
use super::shift;
use super::spawn::TileSpawner;
use super::state::Board;
use super::Direction;

/// Result of [`Game::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub score_gained: u64,
    /// No legal moves remain.
    pub done: bool,
    /// Max tile is at or above the target.
    pub won: bool,
}

/// A running game: the current board plus the spawner that feeds it.
///
/// ```
/// use ai_2048_core::engine::{Direction, Game};
/// let mut game = Game::seeded(4, 2048, 42).unwrap();
/// assert_eq!(game.board().count_empty(), 14);
/// let res = game.step(Direction::Left);
/// assert!(res.changed || !game.board().can_move(Direction::Left));
/// ```
#[derive(Debug, Clone)]
pub struct Game<R = StdRng> {
    board: Board,
    spawner: TileSpawner<R>,
    target_tile: u32,
    moves: u64,
}

impl Game<StdRng> {
    /// New `size x size` game with two spawned tiles and a seeded spawner.
    pub fn seeded(size: usize, target_tile: u32, seed: u64) -> Result<Self, BoardError> {
        Game::new(size, target_tile, TileSpawner::seeded(seed))
    }
}

impl<R: Rng> Game<R> {
    pub fn new(size: usize, target_tile: u32, mut spawner: TileSpawner<R>) -> Result<Self, BoardError> {
        let mut board = Board::new(size)?;
        for _ in 0..2 {
            if let Some(next) = spawner.spawn(&board) {
                board = next;
            }
        }
        Ok(Game { board, spawner, target_tile, moves: 0 })
    }

    /// Resume from an existing board (e.g. an ingested snapshot).
    pub fn from_board(board: Board, target_tile: u32, spawner: TileSpawner<R>) -> Self {
        Game { board, spawner, target_tile, moves: 0 }
    }

    /// Apply `direction`; spawn a tile only if the board changed.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        let outcome = shift::apply(&self.board, direction);
        if outcome.changed {
            self.board = self.spawner.spawn(&outcome.next).unwrap_or(outcome.next);
            self.moves += 1;
        }
        StepResult {
            changed: outcome.changed,
            score_gained: outcome.score_gained,
            done: self.is_over(),
            won: self.has_won(),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }

    #[inline]
    pub fn score(&self) -> u64 { self.board.score() }

    /// Moves that changed the board.
    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    #[inline]
    pub fn target_tile(&self) -> u32 { self.target_tile }

    pub fn is_over(&self) -> bool { rules::is_game_over(&self.board) }

    pub fn has_won(&self) -> bool { rules::has_won(&self.board, self.target_tile) }
}
