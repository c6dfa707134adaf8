use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState as AHasher;
use dashmap::DashMap;
use rayon::prelude::*;

use crate::engine::spawn::SPAWN_DISTRIBUTION;
use crate::engine::{rules, shift, Board, Direction};

use super::heuristic::Evaluator;
use super::{
    considered_cells, illegal_branches, log_search, pick_best, BranchEval, ExpectimaxConfig, MemoKey, Node, ParThresholds,
    SearchStats,
};

type SharedMemo = DashMap<MemoKey, f64, AHasher>;

/// Per-call search state shared across rayon workers.
struct Search<'a> {
    cfg: &'a ExpectimaxConfig,
    eval: &'a Evaluator,
    memo: SharedMemo,
    nodes: AtomicU64,
}

impl Search<'_> {
    fn value(&self, board: &Board, node: Node, depth: u32) -> f64 {
        self.nodes.fetch_add(1, Ordering::Relaxed);
        if depth == 0 || rules::is_game_over(board) {
            return self.eval.score(board);
        }
        let ParThresholds { cache_min_depth, .. } = self.cfg.par_thresholds;
        let key = (self.cfg.cache_enabled && depth >= cache_min_depth).then(|| (board.clone(), depth, node));
        if let Some(k) = &key {
            if let Some(v) = self.memo.get(k) {
                return *v;
            }
        }
        let v = match node {
            Node::Max => self.evaluate_max(board, depth),
            Node::Chance => self.evaluate_chance(board, depth),
        };
        if let Some(k) = key {
            self.memo.insert(k, v);
        }
        v
    }

    fn evaluate_max(&self, board: &Board, depth: u32) -> f64 {
        let child = |dir: Direction| {
            let outcome = shift::apply(board, dir);
            outcome.changed.then(|| self.value(&outcome.next, Node::Chance, depth - 1))
        };
        let values: Vec<Option<f64>> = if depth >= self.cfg.par_thresholds.par_depth {
            Direction::ALL.par_iter().map(|&dir| child(dir)).collect()
        } else {
            Direction::ALL.iter().map(|&dir| child(dir)).collect()
        };
        values
            .into_iter()
            .flatten()
            .reduce(f64::max)
            .unwrap_or_else(|| self.eval.score(board))
    }

    fn evaluate_chance(&self, board: &Board, depth: u32) -> f64 {
        let cells = considered_cells(board, self.cfg.effective_cap());
        if cells.is_empty() {
            return self.eval.score(board);
        }
        let cell_ev = |idx: usize| {
            SPAWN_DISTRIBUTION
                .iter()
                .fold(0.0, |acc, &(tile, p)| acc + p * self.value(&board.place(idx, tile), Node::Max, depth - 1))
        };
        let ParThresholds { par_depth, par_slots, .. } = self.cfg.par_thresholds;
        // collect in cell order and sum serially so the result is bit-identical
        // to the single-threaded search
        let evs: Vec<f64> = if depth >= par_depth && cells.len() >= par_slots {
            cells.par_iter().map(|&idx| cell_ev(idx)).collect()
        } else {
            cells.iter().map(|&idx| cell_ev(idx)).collect()
        };
        evs.iter().fold(0.0, |acc, v| acc + v) / cells.len() as f64
    }
}

/// Parallel Expectimax using rayon and a shared `DashMap` memo table.
///
/// Computes exactly the values [`super::Expectimax`] computes; the
/// thresholds in [`ParThresholds`] only decide where work is split.
#[derive(Debug, Clone)]
pub struct ExpectimaxParallel {
    cfg: ExpectimaxConfig,
    eval: Evaluator,
    stats: SearchStats,
}

impl ExpectimaxParallel {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        let eval = Evaluator::new(cfg.weights.clone());
        Self { cfg, eval, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Compute the best move using parallel expectimax.
    ///
    /// Thin wrapper around [`Self::branch_evals`].
    pub fn best_move(&mut self, board: &Board) -> Option<Direction> { self.best_move_with_branches(board).0 }

    /// Best move together with every branch evaluation, from one search.
    pub fn best_move_with_branches(&mut self, board: &Board) -> (Option<Direction>, [BranchEval; 4]) {
        let branches = self.branch_evals(board);
        let best = pick_best(&branches);
        log_search("expectimax-par", &branches, best, self.stats);
        (best, branches)
    }

    /// EV for each direction in `[Up, Down, Left, Right]` order, root
    /// branches evaluated in parallel.
    pub fn branch_evals(&mut self, board: &Board) -> [BranchEval; 4] {
        let depth = self.cfg.effective_depth();
        let search = self.search();
        let evaluated: Vec<BranchEval> = Direction::ALL
            .par_iter()
            .map(|&dir| {
                let outcome = shift::apply(board, dir);
                if outcome.changed {
                    let ev = search.value(&outcome.next, Node::Chance, depth - 1);
                    BranchEval { dir, ev, legal: true }
                } else {
                    BranchEval { dir, ev: 0.0, legal: false }
                }
            })
            .collect();
        let mut out = illegal_branches();
        for (slot, be) in out.iter_mut().zip(evaluated) {
            *slot = be;
        }
        let nodes = search.nodes.into_inner();
        self.record(nodes);
        out
    }

    /// EV at the root decision node.
    pub fn state_value(&mut self, board: &Board) -> f64 {
        let depth = self.cfg.effective_depth();
        let search = self.search();
        let v = search.value(board, Node::Max, depth);
        let nodes = search.nodes.into_inner();
        self.record(nodes);
        v
    }

    /// Statistics collected from the last call to [`Self::best_move`],
    /// [`Self::branch_evals`] or [`Self::state_value`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn search(&self) -> Search<'_> {
        Search { cfg: &self.cfg, eval: &self.eval, memo: DashMap::with_hasher(AHasher::new()), nodes: AtomicU64::new(0) }
    }

    fn record(&mut self, nodes: u64) {
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
    }
}

impl Default for ExpectimaxParallel {
    fn default() -> Self { Self::new() }
}
