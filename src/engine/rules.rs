//! Legality, terminal conditions and structural validation.

use std::fmt;

use super::shift::{self, line_indices};
use super::state::Board;
use super::Direction;

pub const DEFAULT_TARGET_TILE: u32 = 2048;
pub const DEFAULT_BOARD_SIZE: usize = 4;
pub const MIN_BOARD_SIZE: usize = 3;
pub const MAX_BOARD_SIZE: usize = 8;
pub const MIN_TILE_VALUE: u32 = 2;
/// Largest tile accepted from a snapshot or by `Board::with_tile` (2^17).
///
/// Play can merge past it on 5x5 and larger boards, so boards produced by
/// the move engine are only required to hold powers of two; see [`validate`].
pub const MAX_TILE_VALUE: u32 = 131_072;

/// One structural problem found in a board snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    BoardSize { size: usize },
    RowLength { row: usize, len: usize, expected: usize },
    TileValue { row: usize, col: usize, value: i64 },
    NegativeScore { score: i64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BoardSize { size } => write!(f, "Invalid board size: {}", size),
            Violation::RowLength { row, len, expected } => {
                write!(f, "Invalid row length at row {}: {} (expected {})", row, len, expected)
            }
            Violation::TileValue { row, col, value } => write!(f, "Invalid tile value at ({}, {}): {}", row, col, value),
            Violation::NegativeScore { score } => write!(f, "Invalid negative score: {}", score),
        }
    }
}

/// A merge a leftward pass over a line would perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePair {
    /// Index (in the uncompacted line) of the first tile of the pair.
    pub index: usize,
    pub value: u32,
    pub score: u64,
}

#[inline]
pub fn is_valid_board_size(size: usize) -> bool { (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) }

/// Zero, or a power of two within `[MIN_TILE_VALUE, MAX_TILE_VALUE]`.
#[inline]
pub fn is_valid_tile_value(value: i64) -> bool {
    if value == 0 {
        return true;
    }
    value >= i64::from(MIN_TILE_VALUE) && value <= i64::from(MAX_TILE_VALUE) && (value & (value - 1)) == 0
}

/// True iff applying `dir` would change `board`.
///
/// Checks line by line and stops at the first line that would change; no
/// score is accumulated and no new board is built.
pub fn can_move(board: &Board, dir: Direction) -> bool {
    let size = board.size();
    let cells = board.cells();
    let mut line = Vec::with_capacity(size);
    (0..size).any(|line_idx| {
        line.clear();
        line.extend(line_indices(size, line_idx, dir).map(|idx| cells[idx]));
        shift::line_changes(&line)
    })
}

/// No empty cell and no direction changes anything.
pub fn is_game_over(board: &Board) -> bool {
    if board.cells().iter().any(|&v| v == 0) {
        return false;
    }
    Direction::ALL.iter().all(|&dir| !can_move(board, dir))
}

/// Max tile has reached `target_tile`. Says nothing about whether play can continue.
#[inline]
pub fn has_won(board: &Board, target_tile: u32) -> bool { board.max_tile() >= target_tile }

/// Legal directions in [`Direction::ALL`] order.
pub fn possible_moves(board: &Board) -> Vec<Direction> {
    Direction::ALL.iter().copied().filter(|&dir| can_move(board, dir)).collect()
}

/// A move request is valid only while the game is running and the move changes the board.
pub fn validate_move(board: &Board, dir: Direction) -> bool { !is_game_over(board) && can_move(board, dir) }

pub fn can_continue_after_victory(board: &Board, target_tile: u32) -> bool {
    has_won(board, target_tile) && !is_game_over(board)
}

/// `0` once the game is over, otherwise the number of legal directions.
pub fn moves_until_game_over(board: &Board) -> usize {
    if is_game_over(board) {
        return 0;
    }
    possible_moves(board).len()
}

/// Tile value a board may hold after play: zero or any power of two from 2 up.
#[inline]
pub fn is_reachable_tile_value(value: u32) -> bool { value == 0 || (value >= MIN_TILE_VALUE && value.is_power_of_two()) }

/// Structural check of an existing board.
///
/// Unlike [`validate_grid`], tiles above [`MAX_TILE_VALUE`] pass: the engine
/// produces them by merging two capped tiles.
pub fn validate(board: &Board) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !is_valid_board_size(board.size()) {
        violations.push(Violation::BoardSize { size: board.size() });
    }
    for (idx, &value) in board.cells().iter().enumerate() {
        if !is_reachable_tile_value(value) {
            let pos = board.position(idx);
            violations.push(Violation::TileValue { row: pos.row, col: pos.col, value: i64::from(value) });
        }
    }
    violations
}

/// Structural check of a raw snapshot. Collects every violation.
pub fn validate_grid(grid: &[Vec<i64>], score: i64) -> Vec<Violation> {
    let mut violations = Vec::new();
    let size = grid.len();
    if !is_valid_board_size(size) {
        violations.push(Violation::BoardSize { size });
    }
    for (row, cells) in grid.iter().enumerate() {
        if cells.len() != size {
            violations.push(Violation::RowLength { row, len: cells.len(), expected: size });
        }
        for (col, &value) in cells.iter().enumerate() {
            if !is_valid_tile_value(value) {
                violations.push(Violation::TileValue { row, col, value });
            }
        }
    }
    if score < 0 {
        violations.push(Violation::NegativeScore { score });
    }
    violations
}

/// Merges a move toward index 0 would perform on `line`.
///
/// ```
/// use ai_2048_core::engine::rules::{merge_pairs, MergePair};
/// assert_eq!(
///     merge_pairs(&[2, 0, 2, 4]),
///     vec![MergePair { index: 0, value: 4, score: 4 }]
/// );
/// ```
pub fn merge_pairs(line: &[u32]) -> Vec<MergePair> {
    let tiles: Vec<(usize, u32)> = line.iter().copied().enumerate().filter(|&(_, v)| v != 0).collect();
    let mut pairs = Vec::new();
    let mut i = 0;
    while i + 1 < tiles.len() {
        let (index, value) = tiles[i];
        if value == tiles[i + 1].1 {
            let merged = value * 2;
            pairs.push(MergePair { index, value: merged, score: u64::from(merged) });
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs
}

/// Loose placement check: the max tile sits in any of the four corners.
///
/// Used for risk assessment. The evaluator's preferred-corner bonus is a
/// separate, stricter check.
pub fn is_optimal_board_state(board: &Board) -> bool {
    let max = board.max_tile();
    let n = board.size();
    let cells = board.cells();
    [0, n - 1, n * (n - 1), n * n - 1].iter().any(|&idx| cells[idx] == max)
}

/// Occupied fraction of the board, in `[0, 1]`.
pub fn board_density(board: &Board) -> f64 {
    let total = board.cells().len();
    (total - board.count_empty()) as f64 / total as f64
}

/// Rough upper bound on the score needed to build `target_tile`, assuming
/// half the board is merged at every tile level from 4 upward.
pub fn max_possible_score(size: usize, target_tile: u32) -> u64 {
    let tiles_needed = (size * size / 2) as u64;
    let mut score = 0;
    let mut tile = u64::from(MIN_TILE_VALUE) * 2;
    while tile <= u64::from(target_tile) {
        score += tile * tiles_needed;
        tile *= 2;
    }
    score
}

/// A move is risky if it leaves at most one empty cell, or if it pulls an
/// unchanged max tile out of every corner.
pub fn is_risky_move(board: &Board, dir: Direction) -> bool {
    let next = shift::apply(board, dir).next;
    if next.count_empty() <= 1 {
        return true;
    }
    board.max_tile() == next.max_tile() && !is_optimal_board_state(&next)
}
