use ai_2048_core::engine::{Board, Direction, Game};
use ai_2048_core::expectimax::{ExpectimaxConfig, ExpectimaxParallel};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use rayon::ThreadPoolBuilder;
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut boards = Vec::new();
    let mut b = Board::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b.clone());
    for i in 0..64 {
        let out = b.apply(Direction::ALL[i % 4]);
        if out.changed {
            b = out.next.with_random_tile(&mut rng);
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_par_branch_and_value(c: &mut Criterion) {
    // Pin a small pool for stability
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let boards = corpus();
    let mut ex = ExpectimaxParallel::with_config(ExpectimaxConfig::default());

    let mut group = c.benchmark_group("expectimax_par");
    group.sample_size(10);
    group.bench_function("branch_evals", |bch| {
        bch.iter(|| {
            pool.install(|| {
                let mut acc = 0.0;
                for bd in &boards {
                    for be in ex.branch_evals(bd) {
                        if be.legal {
                            acc += be.ev;
                        }
                    }
                }
                black_box(acc)
            })
        })
    });
    group.bench_function("state_value", |bch| {
        bch.iter(|| pool.install(|| black_box(boards.iter().map(|bd| ex.state_value(bd)).sum::<f64>())))
    });
    group.finish();
}

fn bench_par_e2e(c: &mut Criterion) {
    let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let mut ex = ExpectimaxParallel::with_config(ExpectimaxConfig::default());
    let mut group = c.benchmark_group("e2e_par");
    group.sample_size(10);
    group.bench_function("64_moves", |bch| {
        bch.iter(|| {
            pool.install(|| {
                let Ok(mut game) = Game::seeded(4, 2048, 13) else { return black_box(0) };
                while game.moves() < 64 && !game.is_over() {
                    let Some(dir) = ex.best_move(game.board()) else { break };
                    game.step(dir);
                }
                black_box(game.score())
            })
        })
    });
    group.finish();
}

criterion_group!(expectimax_par, bench_par_branch_and_value, bench_par_e2e);
criterion_main!(expectimax_par);
