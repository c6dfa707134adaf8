use std::collections::HashMap;

use crate::engine::spawn::SPAWN_DISTRIBUTION;
use crate::engine::{rules, shift, Board, Direction};

use super::heuristic::Evaluator;
use super::{considered_cells, illegal_branches, log_search, pick_best, BranchEval, ExpectimaxConfig, MemoKey, Node, SearchStats};

/// Per-call search state: memo table and node counter.
struct Search<'a> {
    cfg: &'a ExpectimaxConfig,
    eval: &'a Evaluator,
    memo: HashMap<MemoKey, f64>,
    nodes: u64,
}

impl Search<'_> {
    fn value(&mut self, board: &Board, node: Node, depth: u32) -> f64 {
        self.nodes += 1;
        if depth == 0 || rules::is_game_over(board) {
            return self.eval.score(board);
        }
        let key = self.cfg.cache_enabled.then(|| (board.clone(), depth, node));
        if let Some(&v) = key.as_ref().and_then(|k| self.memo.get(k)) {
            return v;
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

    fn evaluate_max(&mut self, board: &Board, depth: u32) -> f64 {
        let mut best: Option<f64> = None;
        for dir in Direction::ALL {
            let outcome = shift::apply(board, dir);
            if outcome.changed {
                let v = self.value(&outcome.next, Node::Chance, depth - 1);
                best = Some(best.map_or(v, |b| b.max(v)));
            }
        }
        best.unwrap_or_else(|| self.eval.score(board))
    }

    fn evaluate_chance(&mut self, board: &Board, depth: u32) -> f64 {
        let cells = considered_cells(board, self.cfg.effective_cap());
        if cells.is_empty() {
            return self.eval.score(board);
        }
        let mut sum = 0.0;
        for &idx in &cells {
            let mut cell_ev = 0.0;
            for &(tile, p) in &SPAWN_DISTRIBUTION {
                cell_ev += p * self.value(&board.place(idx, tile), Node::Max, depth - 1);
            }
            sum += cell_ev;
        }
        sum / cells.len() as f64
    }
}

/// Single-threaded Expectimax search.
///
/// Each call builds a fresh memo table; nothing carries over between boards.
#[derive(Debug, Clone)]
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    eval: Evaluator,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        let eval = Evaluator::new(cfg.weights.clone());
        Self { cfg, eval, stats: SearchStats::default() }
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Compute the best move using expectimax, `None` if no move is legal.
    ///
    /// Example
    /// ```
    /// use ai_2048_core::engine::{Board, Direction};
    /// use ai_2048_core::expectimax::Expectimax;
    /// let grid = vec![vec![2, 2, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]];
    /// let b = Board::from_grid(&grid, 0).unwrap();
    /// let mut ex = Expectimax::new();
    /// assert!(ex.best_move(&b).is_some());
    /// let full = Board::from_grid(&[vec![2, 4, 2], vec![4, 2, 4], vec![2, 4, 2]], 0).unwrap();
    /// assert_eq!(ex.best_move(&full), None);
    /// ```
    pub fn best_move(&mut self, board: &Board) -> Option<Direction> {
        let branches = self.branch_evals(board);
        let best = pick_best(&branches);
        log_search("expectimax", &branches, best, self.stats);
        best
    }

    /// EV for each direction, in `[Up, Down, Left, Right]` order.
    ///
    /// Illegal moves are marked `legal=false` with `ev` 0.
    ///
    /// Example
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use ai_2048_core::expectimax::Expectimax;
    /// let b = Board::from_grid(&[vec![2, 0, 0], vec![0; 3], vec![0; 3]], 0).unwrap();
    /// let mut ex = Expectimax::new();
    /// let branches = ex.branch_evals(&b);
    /// assert!(!branches[0].legal && branches[1].legal);
    /// ```
    pub fn branch_evals(&mut self, board: &Board) -> [BranchEval; 4] {
        let depth = self.cfg.effective_depth();
        let mut search = self.search();
        let mut out = illegal_branches();
        for (slot, dir) in out.iter_mut().zip(Direction::ALL) {
            let outcome = shift::apply(board, dir);
            if outcome.changed {
                let ev = search.value(&outcome.next, Node::Chance, depth - 1);
                *slot = BranchEval { dir, ev, legal: true };
            }
        }
        let nodes = search.nodes;
        self.record(nodes);
        out
    }

    /// EV at the root decision node: the best branch EV, or the evaluator
    /// score when no move is legal.
    pub fn state_value(&mut self, board: &Board) -> f64 {
        let depth = self.cfg.effective_depth();
        let mut search = self.search();
        let v = search.value(board, Node::Max, depth);
        let nodes = search.nodes;
        self.record(nodes);
        v
    }

    /// Statistics collected from the last call to [`Self::best_move`],
    /// [`Self::branch_evals`] or [`Self::state_value`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn search(&self) -> Search<'_> { Search { cfg: &self.cfg, eval: &self.eval, memo: HashMap::new(), nodes: 0 } }

    fn record(&mut self, nodes: u64) {
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
    }
}

impl Default for Expectimax {
    fn default() -> Self { Self::new() }
}
