use ai_2048_core::engine::{Board, Direction};
use ai_2048_core::expectimax::{Evaluator, HeuristicWeights};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(1337);
    let mut boards = vec![Board::default()];
    let mut b = Board::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b.clone());
    for i in 0..24 {
        let out = b.apply(Direction::ALL[i % 4]);
        if out.changed {
            b = out.next.with_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_heuristic(c: &mut Criterion) {
    let boards = corpus();
    for (name, weights) in [
        ("expectimax", HeuristicWeights::expectimax()),
        ("corner", HeuristicWeights::corner()),
        ("simple", HeuristicWeights::simple()),
    ] {
        let eval = Evaluator::new(weights);
        c.bench_function(&format!("heuristic/{name}"), |bch| {
            bch.iter(|| {
                let mut acc = 0f64;
                for bd in &boards {
                    acc = acc.mul_add(1.000_000_1, eval.score(bd));
                }
                black_box(acc)
            })
        });
    }
}

criterion_group!(heuristic, bench_heuristic);
criterion_main!(heuristic);
