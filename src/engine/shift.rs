//! Slide/merge logic. Pure and total: no input can make it fail.

use super::state::Board;
use super::Direction;

/// Result of applying a direction to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Board after the move. Equal to the input when `changed` is false.
    pub next: Board,
    /// Sum of every tile produced by a merge during this move.
    pub score_gained: u64,
    /// Whether any cell differs from the input.
    pub changed: bool,
}

impl MoveOutcome {
    fn unchanged(board: &Board) -> Self { MoveOutcome { next: board.clone(), score_gained: 0, changed: false } }
}

/// Slide/merge tiles of `board` in `direction`. No randomness.
///
/// ```
/// use ai_2048_core::engine::{shift, Board, Direction};
/// let b = Board::from_grid(&[vec![2, 2, 2, 2], vec![0; 4], vec![0; 4], vec![0; 4]], 0).unwrap();
/// let out = shift::apply(&b, Direction::Left);
/// assert_eq!(out.next.to_grid()[0], vec![4, 4, 0, 0]);
/// assert_eq!(out.score_gained, 8);
/// ```
pub fn apply(board: &Board, direction: Direction) -> MoveOutcome {
    let size = board.size();
    let src = board.cells();
    let mut cells = src.to_vec().into_boxed_slice();
    let mut score_gained = 0;
    let mut line = Vec::with_capacity(size);
    for line_idx in 0..size {
        line.clear();
        line.extend(line_indices(size, line_idx, direction).map(|idx| src[idx]));
        let (merged, gained) = merge_line(&line);
        for (slot, idx) in line_indices(size, line_idx, direction).enumerate() {
            cells[idx] = merged[slot];
        }
        score_gained += gained;
    }
    if cells[..] == src[..] {
        return MoveOutcome::unchanged(board);
    }
    MoveOutcome {
        next: Board::from_parts(size, cells, board.score() + score_gained),
        score_gained,
        changed: true,
    }
}

/// Flat indices of line `line_idx`, ordered so that index 0 is the cell tiles
/// slide toward.
///
/// Right and Down walk their line backwards, which is the same as reversing
/// the line, merging toward the front and reversing the result back.
#[inline]
pub(crate) fn line_indices(size: usize, line_idx: usize, direction: Direction) -> impl Iterator<Item = usize> {
    (0..size).map(move |k| match direction {
        Direction::Left => line_idx * size + k,
        Direction::Right => line_idx * size + (size - 1 - k),
        Direction::Up => k * size + line_idx,
        Direction::Down => (size - 1 - k) * size + line_idx,
    })
}

/// Compact and merge one line toward index 0.
///
/// Single pass, left-biased: a tile produced by a merge is never merged
/// again in the same pass. Returns the new line (same length) and the
/// points scored.
///
/// ```
/// use ai_2048_core::engine::shift::merge_line;
/// assert_eq!(merge_line(&[2, 2, 2, 2]), (vec![4, 4, 0, 0], 8));
/// assert_eq!(merge_line(&[0, 4, 2, 2]), (vec![4, 4, 0, 0], 4));
/// ```
pub fn merge_line(line: &[u32]) -> (Vec<u32>, u64) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&t| t != 0).collect();
    let mut merged = Vec::with_capacity(line.len());
    let mut score = 0u64;
    let mut i = 0;
    while i < tiles.len() {
        if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
            let doubled = tiles[i] * 2;
            merged.push(doubled);
            score += u64::from(doubled);
            i += 2;
        } else {
            merged.push(tiles[i]);
            i += 1;
        }
    }
    merged.resize(line.len(), 0);
    (merged, score)
}

/// Whether merging `line` toward index 0 would change it.
///
/// Short-circuits without building the merged line: a line changes iff a
/// tile sits behind a gap, or two tiles meet with nothing between them
/// that are equal.
#[inline]
pub fn line_changes(line: &[u32]) -> bool {
    let mut prev = 0;
    let mut gap = false;
    for &tile in line {
        if tile == 0 {
            gap = true;
            continue;
        }
        if gap || tile == prev {
            return true;
        }
        prev = tile;
    }
    false
}
