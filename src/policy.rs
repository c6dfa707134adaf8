//! Move policies behind one trait, from a fixed priority list up to full search.

use crate::engine::{shift, Board, Direction};
use crate::expectimax::{Evaluator, Expectimax, ExpectimaxParallel, HeuristicWeights};

/// Anything that picks a move for a board. `None` means no legal move.
pub trait Policy {
    fn next_move(&mut self, board: &Board) -> Option<Direction>;

    fn name(&self) -> &'static str;
}

/// First legal move in a fixed order, Left > Down > Right > Up by default.
#[derive(Debug, Clone)]
pub struct PriorityPolicy {
    order: [Direction; 4],
}

impl PriorityPolicy {
    pub const DEFAULT_ORDER: [Direction; 4] = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];

    pub fn new(order: [Direction; 4]) -> Self { PriorityPolicy { order } }
}

impl Default for PriorityPolicy {
    fn default() -> Self { Self::new(Self::DEFAULT_ORDER) }
}

impl Policy for PriorityPolicy {
    fn next_move(&mut self, board: &Board) -> Option<Direction> { self.order.iter().copied().find(|&d| board.can_move(d)) }

    fn name(&self) -> &'static str { "priority" }
}

/// One-ply lookahead: the legal move whose result the evaluator scores
/// highest. Uses the corner preset unless given other weights.
///
/// ```
/// use ai_2048_core::engine::{Board, Direction};
/// use ai_2048_core::policy::{GreedyPolicy, Policy};
/// let b = Board::from_grid(&[vec![0, 0, 0], vec![0; 3], vec![2, 2, 0]], 0).unwrap();
/// let dir = GreedyPolicy::default().next_move(&b).unwrap();
/// assert!(b.can_move(dir));
/// ```
#[derive(Debug, Clone)]
pub struct GreedyPolicy {
    eval: Evaluator,
}

impl GreedyPolicy {
    pub fn new(weights: HeuristicWeights) -> Self { GreedyPolicy { eval: Evaluator::new(weights) } }
}

impl Default for GreedyPolicy {
    fn default() -> Self { Self::new(HeuristicWeights::corner()) }
}

impl Policy for GreedyPolicy {
    fn next_move(&mut self, board: &Board) -> Option<Direction> {
        let mut best: Option<(Direction, f64)> = None;
        for dir in Direction::ALL {
            let outcome = shift::apply(board, dir);
            if !outcome.changed {
                continue;
            }
            let score = self.eval.score(&outcome.next);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((dir, score));
            }
        }
        best.map(|(dir, _)| dir)
    }

    fn name(&self) -> &'static str { "greedy" }
}

impl Policy for Expectimax {
    fn next_move(&mut self, board: &Board) -> Option<Direction> { self.best_move(board) }

    fn name(&self) -> &'static str { "expectimax" }
}

impl Policy for ExpectimaxParallel {
    fn next_move(&mut self, board: &Board) -> Option<Direction> { self.best_move(board) }

    fn name(&self) -> &'static str { "parallel" }
}
