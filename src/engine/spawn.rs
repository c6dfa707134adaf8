//! Random tile generation. The only place in the crate that draws randomness.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::state::{Board, Position};

/// Spawned tile values and their probabilities.
///
/// Search enumerates this table analytically instead of sampling it.
pub const SPAWN_DISTRIBUTION: [(u32, f64); 2] = [(2, 0.9), (4, 0.1)];

/// Draw a tile value by cumulative probability against a uniform `[0, 1)` draw.
pub fn sample_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let draw: f64 = rng.gen();
    let mut cumulative = 0.0;
    for &(value, probability) in &SPAWN_DISTRIBUTION {
        cumulative += probability;
        if draw < cumulative {
            return value;
        }
    }
    SPAWN_DISTRIBUTION[0].0
}

/// Uniformly chosen empty cell, `None` when the board is full.
pub fn sample_position<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Position> {
    board.empty_cells().choose(rng).copied()
}

/// Place a sampled tile at a sampled empty cell.
pub(crate) fn spawn_tile<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<Board> {
    let pos = sample_position(board, rng)?;
    let value = sample_value(rng);
    Some(board.place(board.index(pos), value))
}

/// Tile spawner over an injected random source.
///
/// ```
/// use ai_2048_core::engine::{Board, TileSpawner};
/// let mut a = TileSpawner::seeded(7);
/// let mut b = TileSpawner::seeded(7);
/// let board = Board::default();
/// assert_eq!(a.spawn(&board), b.spawn(&board));
/// ```
#[derive(Debug, Clone)]
pub struct TileSpawner<R = StdRng> {
    rng: R,
}

impl TileSpawner<StdRng> {
    /// Deterministic spawner seeded with `seed`.
    pub fn seeded(seed: u64) -> Self { TileSpawner { rng: StdRng::seed_from_u64(seed) } }

    /// Spawner seeded from OS entropy.
    pub fn from_entropy() -> Self { TileSpawner { rng: StdRng::from_entropy() } }
}

impl<R: Rng> TileSpawner<R> {
    pub fn new(rng: R) -> Self { TileSpawner { rng } }

    /// 2 with probability 0.9, else 4.
    pub fn sample_value(&mut self) -> u32 { sample_value(&mut self.rng) }

    pub fn sample_position(&mut self, board: &Board) -> Option<Position> { sample_position(board, &mut self.rng) }

    /// New board with one spawned tile, `None` if `board` is full.
    pub fn spawn(&mut self, board: &Board) -> Option<Board> { spawn_tile(board, &mut self.rng) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_sum_to_one() {
        let total: f64 = SPAWN_DISTRIBUTION.iter().map(|&(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn value_distribution_is_roughly_nine_to_one() {
        let mut spawner = TileSpawner::seeded(2024);
        let n = 20_000;
        let twos = (0..n).filter(|_| spawner.sample_value() == 2).count();
        let fours = n - twos;
        let ratio = twos as f64 / n as f64;
        assert!((0.88..0.92).contains(&ratio), "ratio {ratio}");
        assert!(fours > 0);
    }

    #[test]
    fn only_two_or_four() {
        let mut spawner = TileSpawner::seeded(1);
        assert!((0..1000).all(|_| matches!(spawner.sample_value(), 2 | 4)));
    }

    #[test]
    fn seeded_spawners_agree() {
        let mut a = TileSpawner::seeded(99);
        let mut b = TileSpawner::seeded(99);
        let mut board_a = Board::default();
        let mut board_b = Board::default();
        for _ in 0..10 {
            board_a = a.spawn(&board_a).unwrap();
            board_b = b.spawn(&board_b).unwrap();
        }
        assert_eq!(board_a, board_b);
        assert_eq!(board_a.count_empty(), 6);
    }

    #[test]
    fn position_is_empty_cell() {
        let grid = vec![vec![2, 4, 2], vec![4, 0, 4], vec![2, 4, 2]];
        let board = Board::from_grid(&grid, 0).unwrap();
        let mut spawner = TileSpawner::seeded(3);
        for _ in 0..20 {
            assert_eq!(spawner.sample_position(&board), Some(Position::new(1, 1)));
        }
    }

    #[test]
    fn injected_rng_drives_every_draw() {
        let board = Board::new(5).unwrap();
        let mut spawner = TileSpawner::new(StdRng::seed_from_u64(11));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(spawner.sample_value(), sample_value(&mut rng));
            assert_eq!(spawner.sample_position(&board), sample_position(&board, &mut rng));
        }
        assert_eq!(spawner.spawn(&board), spawn_tile(&board, &mut rng));
    }

    #[test]
    fn full_board_has_no_position() {
        let grid = vec![vec![2, 4, 2], vec![4, 2, 4], vec![2, 4, 2]];
        let board = Board::from_grid(&grid, 0).unwrap();
        let mut spawner = TileSpawner::seeded(3);
        assert_eq!(spawner.sample_position(&board), None);
        assert_eq!(spawner.spawn(&board), None);
    }

    #[test]
    fn spawn_does_not_touch_score() {
        let grid = vec![vec![2, 0, 0], vec![0; 3], vec![0; 3]];
        let board = Board::from_grid(&grid, 40).unwrap();
        let next = TileSpawner::seeded(8).spawn(&board).unwrap();
        assert_eq!(next.score(), 40);
        assert_eq!(next.count_empty(), 7);
        assert_eq!(board.count_empty(), 8);
    }
}
