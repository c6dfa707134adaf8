//! Expectimax move selection (single-threaded and parallel).
//!
//! This module provides two searchers with the same public surface:
//! - [`Expectimax`]: single-threaded expectimax.
//! - [`ExpectimaxParallel`]: rayon-based expectimax sharing one memo table.
//!
//! Both are deterministic: chance nodes enumerate every spawn outcome
//! analytically, so no randomness is drawn during search. For the same
//! board and config the two return the same move.
//!
//! Quick start
//! ```
//! use ai_2048_core::engine::{Board, TileSpawner};
//! use ai_2048_core::expectimax::{Expectimax, ExpectimaxConfig, ExpectimaxParallel};
//!
//! let mut spawner = TileSpawner::seeded(123);
//! let b0 = Board::default();
//! let b0 = spawner.spawn(&b0).unwrap();
//! let b0 = spawner.spawn(&b0).unwrap();
//!
//! let cfg = ExpectimaxConfig { depth: 3, ..ExpectimaxConfig::default() };
//! let mut ex = Expectimax::with_config(cfg.clone());
//! let mut ex_par = ExpectimaxParallel::with_config(cfg);
//! let m = ex.best_move(&b0);
//! assert!(m.is_some());
//! assert_eq!(m, ex_par.best_move(&b0));
//! ```

use crate::engine::{Board, Direction};

pub mod heuristic;
mod search_par;
mod search_seq;

pub use heuristic::{Corner, EmptyScaling, Evaluator, HeuristicTerms, HeuristicWeights};
pub use search_par::ExpectimaxParallel;
pub use search_seq::Expectimax;

/// Default search depth in plies (decision and chance levels each count one).
pub const DEFAULT_DEPTH: u32 = 4;

/// Configurable knobs shared by both searchers.
///
/// `empty_cell_cap` limits how many empty cells a chance node expands: the
/// first `cap` empties in row-major order. Any cap below the number of
/// empty cells changes the computed expectation; `None` keeps it exact.
/// `Some(0)` is treated as `Some(1)`.
#[derive(Debug, Clone)]
pub struct ExpectimaxConfig {
    /// Depth bound, at least 1.
    pub depth: u32,
    pub empty_cell_cap: Option<usize>,
    /// Enable/disable the memo table.
    pub cache_enabled: bool,
    pub weights: HeuristicWeights,
    /// Thresholds used only by the parallel implementation.
    pub par_thresholds: ParThresholds,
}

impl ExpectimaxConfig {
    #[inline]
    pub(crate) fn effective_depth(&self) -> u32 { self.depth.max(1) }

    #[inline]
    pub(crate) fn effective_cap(&self) -> Option<usize> { self.empty_cell_cap.map(|cap| cap.max(1)) }
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            empty_cell_cap: None,
            cache_enabled: true,
            weights: HeuristicWeights::default(),
            par_thresholds: ParThresholds::default(),
        }
    }
}

/// Thresholds that keep rayon overhead off small subtrees.
///
/// Only affect scheduling and caching, never the computed values.
#[derive(Debug, Clone, Copy)]
pub struct ParThresholds {
    /// Chance nodes at or above this remaining depth fan out in parallel.
    pub par_depth: u32,
    /// Minimum considered cells before a chance node fans out.
    pub par_slots: usize,
    /// Nodes below this remaining depth skip the shared table.
    pub cache_min_depth: u32,
}

impl Default for ParThresholds {
    fn default() -> Self { Self { par_depth: 2, par_slots: 4, cache_min_depth: 2 } }
}

/// Per-branch expected value at the root.
///
/// - `ev` is the expected value for taking `dir` from the current board.
/// - `legal` is false when the move is a no-op; `ev` is then 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Direction,
    pub ev: f64,
    pub legal: bool,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Node {
    Max,
    Chance,
}

/// Memo key. Depth is part of the key so lookups are exact.
pub(crate) type MemoKey = (Board, u32, Node);

/// Root branches in `Direction::ALL` order, all marked illegal.
pub(crate) fn illegal_branches() -> [BranchEval; 4] {
    Direction::ALL.map(|dir| BranchEval { dir, ev: 0.0, legal: false })
}

/// Strictly greatest legal branch; the earliest wins ties.
pub(crate) fn pick_best(branches: &[BranchEval; 4]) -> Option<Direction> {
    let mut best: Option<&BranchEval> = None;
    for branch in branches.iter().filter(|b| b.legal) {
        if best.map_or(true, |b| branch.ev > b.ev) {
            best = Some(branch);
        }
    }
    best.map(|b| b.dir)
}

/// Empty cells a chance node expands, row-major, truncated to `cap`.
pub(crate) fn considered_cells(board: &Board, cap: Option<usize>) -> Vec<usize> {
    board.empty_indices().take(cap.unwrap_or(usize::MAX)).collect()
}

/// Per-branch EVs at trace level, search summary at debug level.
pub(crate) fn log_search(kind: &str, branches: &[BranchEval; 4], best: Option<Direction>, stats: SearchStats) {
    for b in branches.iter().filter(|b| b.legal) {
        log::trace!("{kind}: {} ev={:.3}", b.dir, b.ev);
    }
    log::debug!("{kind}: best={best:?} nodes={} peak={}", stats.nodes, stats.peak_nodes);
}
