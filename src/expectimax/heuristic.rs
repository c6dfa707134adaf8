//! Board evaluation: a weighted sum of independent heuristic terms.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::engine::rules::MAX_BOARD_SIZE;
use crate::engine::{Board, Position};

/// Board corner, used for placement bonuses and the positional gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::TopLeft, Corner::TopRight, Corner::BottomLeft, Corner::BottomRight];

    pub fn position(self, size: usize) -> Position {
        let last = size - 1;
        match self {
            Corner::TopLeft => Position::new(0, 0),
            Corner::TopRight => Position::new(0, last),
            Corner::BottomLeft => Position::new(last, 0),
            Corner::BottomRight => Position::new(last, last),
        }
    }
}

/// How the empty-cell count enters the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyScaling {
    Linear,
    Quadratic,
}

/// Per-term weights. One evaluator, many strategies: swap the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeuristicWeights {
    pub empty: f64,
    pub empty_scaling: EmptyScaling,
    /// Max tile in any corner.
    pub corner: f64,
    /// Max tile in `preferred_corner`, on top of `corner`.
    pub preferred_corner_bonus: f64,
    pub preferred_corner: Corner,
    pub monotonicity: f64,
    pub smoothness: f64,
    pub positional: f64,
    pub edge: f64,
    pub merge_potential: f64,
    pub max_tile: f64,
    /// Accumulated game score; keep small, it only breaks ties.
    pub score: f64,
}

impl HeuristicWeights {
    /// Full multi-term weighting used by the expectimax searchers.
    pub fn expectimax() -> Self {
        Self {
            empty: 1000.0,
            empty_scaling: EmptyScaling::Quadratic,
            corner: 5000.0,
            preferred_corner_bonus: 2500.0,
            preferred_corner: Corner::BottomLeft,
            monotonicity: 100.0,
            smoothness: 10.0,
            positional: 1.0,
            edge: 0.0,
            merge_potential: 5.0,
            max_tile: 100.0,
            score: 0.1,
        }
    }

    /// Corner-hugging weights for one-ply greedy play.
    pub fn corner() -> Self {
        Self {
            empty: 1000.0,
            empty_scaling: EmptyScaling::Linear,
            corner: 10_000.0,
            preferred_corner_bonus: 5000.0,
            preferred_corner: Corner::BottomLeft,
            monotonicity: 100.0,
            smoothness: 10.0,
            positional: 0.0,
            edge: 50.0,
            merge_potential: 0.0,
            max_tile: 0.0,
            score: 1.0,
        }
    }

    /// Empty cells, corner placement and monotonicity only.
    pub fn simple() -> Self {
        Self {
            empty: 100.0,
            empty_scaling: EmptyScaling::Linear,
            corner: 1000.0,
            preferred_corner_bonus: 0.0,
            preferred_corner: Corner::BottomLeft,
            monotonicity: 50.0,
            smoothness: 0.0,
            positional: 0.0,
            edge: 0.0,
            merge_potential: 0.0,
            max_tile: 0.0,
            score: 0.0,
        }
    }
}

impl Default for HeuristicWeights {
    fn default() -> Self { Self::expectimax() }
}

/// Raw (unweighted) value of every term for one board.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeuristicTerms {
    /// Empty cells, already scaled per `empty_scaling`.
    pub empty: f64,
    /// 1 if the max tile is in a corner.
    pub corner: f64,
    /// 1 if the max tile is in the preferred corner.
    pub preferred_corner: f64,
    /// Non-positive; 0 when every row and column is monotone.
    pub monotonicity: f64,
    /// Non-positive; minus the summed log2 gaps between neighbours.
    pub smoothness: f64,
    pub positional: f64,
    pub edge: f64,
    pub merge_potential: f64,
    pub max_tile: f64,
    pub score: f64,
}

impl HeuristicTerms {
    pub fn weighted(&self, w: &HeuristicWeights) -> f64 {
        w.empty * self.empty
            + w.corner * self.corner
            + w.preferred_corner_bonus * self.preferred_corner
            + w.monotonicity * self.monotonicity
            + w.smoothness * self.smoothness
            + w.positional * self.positional
            + w.edge * self.edge
            + w.merge_potential * self.merge_potential
            + w.max_tile * self.max_tile
            + w.score * self.score
    }
}

/// Deterministic board evaluator. Higher is better.
///
/// ```
/// use ai_2048_core::engine::Board;
/// use ai_2048_core::expectimax::Evaluator;
/// let grid = vec![vec![0, 0, 0, 0], vec![0, 0, 0, 0], vec![4, 0, 0, 0], vec![16, 8, 2, 0]];
/// let board = Board::from_grid(&grid, 24).unwrap();
/// let eval = Evaluator::default();
/// assert_eq!(eval.score(&board), eval.score(&board));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    weights: HeuristicWeights,
    // snake gradients, built lazily per board size
    gradients: [OnceLock<Box<[f64]>>; MAX_BOARD_SIZE + 1],
}

impl Evaluator {
    pub fn new(weights: HeuristicWeights) -> Self { Self { weights, gradients: Default::default() } }

    #[inline]
    pub fn weights(&self) -> &HeuristicWeights { &self.weights }

    pub fn score(&self, board: &Board) -> f64 { self.terms(board).weighted(&self.weights) }

    pub fn terms(&self, board: &Board) -> HeuristicTerms {
        let empty = board.count_empty() as f64;
        let (corner, preferred_corner) = corner_terms(board, self.weights.preferred_corner);
        HeuristicTerms {
            empty: match self.weights.empty_scaling {
                EmptyScaling::Linear => empty,
                EmptyScaling::Quadratic => empty * empty,
            },
            corner,
            preferred_corner,
            monotonicity: monotonicity(board),
            smoothness: smoothness(board),
            positional: self.positional(board),
            edge: edge(board),
            merge_potential: merge_potential(board),
            max_tile: log2(board.max_tile()),
            score: board.score() as f64,
        }
    }

    fn positional(&self, board: &Board) -> f64 {
        let size = board.size();
        let Some(slot) = self.gradients.get(size) else {
            return 0.0;
        };
        let weights = slot.get_or_init(|| snake_gradient(size, self.weights.preferred_corner));
        board
            .cells()
            .iter()
            .zip(weights.iter())
            .filter(|(&v, _)| v != 0)
            .map(|(&v, &w)| w * f64::from(v) * log2(v))
            .sum()
    }
}

/// log2 of a tile value; 0 for an empty cell.
#[inline]
fn log2(value: u32) -> f64 {
    if value == 0 {
        0.0
    } else {
        f64::from(value.trailing_zeros())
    }
}

fn corner_terms(board: &Board, preferred: Corner) -> (f64, f64) {
    let max = board.max_tile();
    if max == 0 {
        return (0.0, 0.0);
    }
    let at = |corner: Corner| board.cell(corner.position(board.size())) == Some(max);
    let any = Corner::ALL.iter().any(|&c| at(c));
    (f64::from(u8::from(any)), f64::from(u8::from(at(preferred))))
}

/// Snake-shaped weights, `size² - 1` at `corner` down to 0 at the far end.
pub(crate) fn snake_gradient(size: usize, corner: Corner) -> Box<[f64]> {
    let top = size * size - 1;
    let mut out = vec![0.0; size * size];
    for row in 0..size {
        for col in 0..size {
            // row/col as seen from the top-left corner
            let r = match corner {
                Corner::TopLeft | Corner::TopRight => row,
                Corner::BottomLeft | Corner::BottomRight => size - 1 - row,
            };
            let c = match corner {
                Corner::TopLeft | Corner::BottomLeft => col,
                Corner::TopRight | Corner::BottomRight => size - 1 - col,
            };
            let base = top - r * size;
            let w = if r % 2 == 0 { base - c } else { base - (size - 1 - c) };
            out[row * size + col] = w as f64;
        }
    }
    out.into_boxed_slice()
}

/// Per line, log2 rises and falls between consecutive non-empty tiles.
fn line_violations<I: Iterator<Item = u32>>(line: I) -> (f64, f64) {
    let mut rises = 0.0;
    let mut falls = 0.0;
    let mut prev: Option<f64> = None;
    for tile in line.filter(|&v| v != 0) {
        let cur = log2(tile);
        if let Some(p) = prev {
            if cur > p {
                rises += cur - p;
            } else {
                falls += p - cur;
            }
        }
        prev = Some(cur);
    }
    (rises, falls)
}

fn monotonicity(board: &Board) -> f64 {
    let n = board.size();
    let cells = board.cells();
    let (mut row_rises, mut row_falls) = (0.0, 0.0);
    let (mut col_rises, mut col_falls) = (0.0, 0.0);
    for i in 0..n {
        let (r, f) = line_violations((0..n).map(|j| cells[i * n + j]));
        row_rises += r;
        row_falls += f;
        let (r, f) = line_violations((0..n).map(|j| cells[j * n + i]));
        col_rises += r;
        col_falls += f;
    }
    // rises break a descending order and falls break an ascending one;
    // keep the better orientation on each axis
    -(row_rises.min(row_falls) + col_rises.min(col_falls))
}

fn smoothness(board: &Board) -> f64 {
    let n = board.size();
    let cells = board.cells();
    let mut penalty = 0.0;
    for row in 0..n {
        for col in 0..n {
            let v = cells[row * n + col];
            if v == 0 {
                continue;
            }
            if col + 1 < n && cells[row * n + col + 1] != 0 {
                penalty += (log2(v) - log2(cells[row * n + col + 1])).abs();
            }
            if row + 1 < n && cells[(row + 1) * n + col] != 0 {
                penalty += (log2(v) - log2(cells[(row + 1) * n + col])).abs();
            }
        }
    }
    -penalty
}

fn edge(board: &Board) -> f64 {
    let n = board.size();
    board
        .cells()
        .iter()
        .enumerate()
        .filter(|&(idx, _)| {
            let (row, col) = (idx / n, idx % n);
            row == 0 || col == 0 || row == n - 1 || col == n - 1
        })
        .map(|(_, &v)| f64::from(v))
        .sum()
}

fn merge_potential(board: &Board) -> f64 {
    let n = board.size();
    let cells = board.cells();
    let mut potential = 0.0;
    for row in 0..n {
        for col in 0..n {
            let v = cells[row * n + col];
            if v == 0 {
                continue;
            }
            if col + 1 < n && cells[row * n + col + 1] == v {
                potential += f64::from(v);
            }
            if row + 1 < n && cells[(row + 1) * n + col] == v {
                potential += f64::from(v);
            }
        }
    }
    potential
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&[i64]], score: i64) -> Board {
        let grid: Vec<Vec<i64>> = rows.iter().map(|r| r.to_vec()).collect();
        Board::from_grid(&grid, score).unwrap()
    }

    fn only(weights: impl FnOnce(&mut HeuristicWeights)) -> Evaluator {
        let mut w = HeuristicWeights {
            empty: 0.0,
            corner: 0.0,
            preferred_corner_bonus: 0.0,
            monotonicity: 0.0,
            smoothness: 0.0,
            positional: 0.0,
            edge: 0.0,
            merge_potential: 0.0,
            max_tile: 0.0,
            score: 0.0,
            ..HeuristicWeights::expectimax()
        };
        weights(&mut w);
        Evaluator::new(w)
    }

    #[test]
    fn deterministic() {
        let b = board(&[&[2, 4, 8, 16], &[0, 2, 0, 4], &[0; 4], &[2, 0, 0, 128]], 300);
        let eval = Evaluator::default();
        assert_eq!(eval.score(&b), eval.score(&b));
        assert_eq!(eval.terms(&b), eval.terms(&b));
    }

    #[test]
    fn empty_term_scaling() {
        let b = board(&[&[2, 0, 0], &[0, 0, 0], &[0, 0, 4]], 0);
        let linear = only(|w| {
            w.empty = 1.0;
            w.empty_scaling = EmptyScaling::Linear;
        });
        let quadratic = only(|w| {
            w.empty = 1.0;
            w.empty_scaling = EmptyScaling::Quadratic;
        });
        assert_eq!(linear.score(&b), 7.0);
        assert_eq!(quadratic.score(&b), 49.0);
    }

    #[test]
    fn corner_terms_any_and_preferred() {
        let eval = Evaluator::default();
        let bl = board(&[&[2, 0, 0], &[0, 0, 0], &[64, 0, 0]], 0);
        let tr = board(&[&[0, 0, 64], &[0, 0, 0], &[2, 0, 0]], 0);
        let mid = board(&[&[0, 0, 0], &[0, 64, 0], &[2, 0, 0]], 0);
        let t = eval.terms(&bl);
        assert_eq!((t.corner, t.preferred_corner), (1.0, 1.0));
        let t = eval.terms(&tr);
        assert_eq!((t.corner, t.preferred_corner), (1.0, 0.0));
        let t = eval.terms(&mid);
        assert_eq!((t.corner, t.preferred_corner), (0.0, 0.0));
        assert_eq!(eval.terms(&Board::new(3).unwrap()).corner, 0.0);
    }

    #[test]
    fn monotone_board_has_zero_penalty() {
        let eval = Evaluator::default();
        let b = board(&[&[2, 4, 8], &[4, 8, 16], &[8, 16, 32]], 0);
        assert_eq!(eval.terms(&b).monotonicity, 0.0);
        // zeros are skipped, not treated as a drop
        let b = board(&[&[2, 0, 8], &[0, 0, 0], &[0, 0, 32]], 0);
        assert_eq!(eval.terms(&b).monotonicity, 0.0);
    }

    #[test]
    fn monotonicity_penalises_zigzag() {
        let eval = Evaluator::default();
        // row: 2 8 2 -> rises 2, falls 2 -> penalty 2 on rows; cols single tiles
        let b = board(&[&[2, 8, 2], &[0, 0, 0], &[0, 0, 0]], 0);
        assert_eq!(eval.terms(&b).monotonicity, -2.0);
    }

    #[test]
    fn smoothness_uses_log_gaps() {
        let eval = Evaluator::default();
        let close = board(&[&[2, 4, 0], &[0; 3], &[0; 3]], 0);
        let far = board(&[&[2, 1024, 0], &[0; 3], &[0; 3]], 0);
        assert_eq!(eval.terms(&close).smoothness, -1.0);
        assert_eq!(eval.terms(&far).smoothness, -9.0);
        let gapped = board(&[&[2, 0, 1024], &[0; 3], &[0; 3]], 0);
        assert_eq!(eval.terms(&gapped).smoothness, 0.0);
    }

    #[test]
    fn gradient_peaks_at_corner() {
        let g = snake_gradient(4, Corner::TopLeft);
        assert_eq!(&g[..4], &[15.0, 14.0, 13.0, 12.0]);
        assert_eq!(&g[4..8], &[8.0, 9.0, 10.0, 11.0]);
        assert_eq!(&g[12..], &[0.0, 1.0, 2.0, 3.0]);
        let g = snake_gradient(4, Corner::BottomLeft);
        assert_eq!(g[12], 15.0);
        assert_eq!(&g[..4], &[0.0, 1.0, 2.0, 3.0]);
        let g = snake_gradient(3, Corner::BottomRight);
        assert_eq!(g[8], 8.0);
        assert_eq!(g.iter().copied().fold(0.0, f64::max), 8.0);
    }

    #[test]
    fn positional_prefers_big_tile_in_preferred_corner() {
        let eval = only(|w| w.positional = 1.0);
        let good = board(&[&[0, 0, 0, 0], &[0; 4], &[0; 4], &[256, 0, 0, 2]], 0);
        let bad = board(&[&[256, 0, 0, 0], &[0; 4], &[0; 4], &[2, 0, 0, 0]], 0);
        assert!(eval.score(&good) > eval.score(&bad));
        // 256 * 8 * 15 + 2 * 1 * 12
        assert_eq!(eval.score(&good), 30_720.0 + 24.0);
    }

    #[test]
    fn edge_and_merge_terms() {
        let eval = Evaluator::default();
        let b = board(&[&[2, 2, 0], &[0, 8, 0], &[4, 0, 0]], 0);
        let t = eval.terms(&b);
        assert_eq!(t.edge, 8.0);
        assert_eq!(t.merge_potential, 2.0);
        assert_eq!(t.max_tile, 3.0);
    }

    #[test]
    fn score_is_a_small_tiebreaker() {
        let eval = Evaluator::default();
        let a = board(&[&[2, 0, 0], &[0; 3], &[0; 3]], 0);
        let b = board(&[&[2, 0, 0], &[0; 3], &[0; 3]], 100);
        let diff = eval.score(&b) - eval.score(&a);
        assert!((diff - 10.0).abs() < 1e-9);
    }

    #[test]
    fn presets_differ() {
        assert_ne!(HeuristicWeights::expectimax(), HeuristicWeights::corner());
        assert_ne!(HeuristicWeights::corner(), HeuristicWeights::simple());
        assert_eq!(HeuristicWeights::default(), HeuristicWeights::expectimax());
    }

    #[test]
    fn weights_deserialize_with_defaults() {
        let w: HeuristicWeights = serde_json::from_str(r#"{"empty": 5.0, "preferredCorner": "topRight", "emptyScaling": "linear"}"#).unwrap();
        assert_eq!(w.empty, 5.0);
        assert_eq!(w.preferred_corner, Corner::TopRight);
        assert_eq!(w.empty_scaling, EmptyScaling::Linear);
        let json = serde_json::to_value(HeuristicWeights::expectimax()).unwrap();
        assert_eq!(json["preferredCorner"], "bottomLeft");
        assert_eq!(json["emptyScaling"], "quadratic");
        assert_eq!(w.smoothness, HeuristicWeights::expectimax().smoothness);
    }
}
