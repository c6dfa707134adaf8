use ai_2048_core::engine::{Board, Direction, Game};
use ai_2048_core::expectimax::{Expectimax, ExpectimaxConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut boards = Vec::new();
    let mut b = Board::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b.clone());
    for i in 0..32 {
        let out = b.apply(Direction::ALL[i % 4]);
        if out.changed {
            b = out.next.with_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_seq_depths(c: &mut Criterion) {
    let boards = corpus();
    let mut group = c.benchmark_group("expectimax_seq/best_move");
    group.sample_size(10);
    for depth in [2, 3, 4] {
        let mut ex = Expectimax::with_config(ExpectimaxConfig { depth, ..Default::default() });
        group.bench_with_input(BenchmarkId::from_parameter(depth), &boards, |bch, boards| {
            bch.iter(|| {
                let mut acc = 0usize;
                for bd in boards {
                    acc += ex.best_move(bd).map_or(4, |d| d.index());
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

fn bench_cap(c: &mut Criterion) {
    let boards = corpus();
    let mut group = c.benchmark_group("expectimax_seq/cap");
    group.sample_size(10);
    for cap in [Some(2), Some(4), None] {
        let mut ex = Expectimax::with_config(ExpectimaxConfig { empty_cell_cap: cap, ..Default::default() });
        let label = cap.map_or_else(|| "none".to_string(), |c| c.to_string());
        group.bench_with_input(BenchmarkId::from_parameter(label), &boards, |bch, boards| {
            bch.iter(|| black_box(boards.iter().map(|bd| ex.state_value(bd)).sum::<f64>()))
        });
    }
    group.finish();
}

fn bench_seq_e2e(c: &mut Criterion) {
    let mut ex = Expectimax::with_config(ExpectimaxConfig { depth: 3, ..Default::default() });
    c.bench_function("e2e_seq/64_moves", |bch| {
        bch.iter(|| {
            let Ok(mut game) = Game::seeded(4, 2048, 13) else { return black_box(0) };
            while game.moves() < 64 && !game.is_over() {
                match ex.best_move(game.board()) {
                    Some(dir) => {
                        game.step(dir);
                    }
                    None => break,
                }
            }
            black_box(game.score())
        })
    });
}

criterion_group!(expectimax_seq, bench_seq_depths, bench_cap, bench_seq_e2e);
criterion_main!(expectimax_seq);
