use std::path::PathBuf;
use std::time::{Duration, Instant};

use ai_2048_core::config::{Config, HeuristicPreset};
use ai_2048_core::engine::{Game, TileSpawner};
use ai_2048_core::expectimax::{Expectimax, ExpectimaxParallel};
use ai_2048_core::policy::{GreedyPolicy, Policy, PriorityPolicy};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    Expectimax,
    Parallel,
    Greedy,
    Priority,
}

/// Headless self-play: drive a move policy over seeded games.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board side length (3..=8)
    #[arg(long)]
    size: Option<usize>,

    /// Tile that counts as a win
    #[arg(long)]
    target: Option<u32>,

    /// Search depth in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Max empty cells expanded per chance node
    #[arg(long)]
    cap: Option<usize>,

    /// Evaluator weight preset
    #[arg(long, value_enum)]
    heuristic: Option<Preset>,

    #[arg(long, value_enum, default_value = "parallel")]
    policy: PolicyKind,

    /// Seed for the first game; game i uses seed + i. Entropy when absent
    #[arg(long)]
    seed: Option<u64>,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Stop each game after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Stop each game once the highest tile reaches this value
    #[arg(long)]
    stop_tile: Option<u32>,

    /// Keep playing after reaching the target tile
    #[arg(long)]
    continue_after_win: bool,

    /// Suppress board printing and the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Expectimax,
    Corner,
    Simple,
}

impl From<Preset> for HeuristicPreset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Expectimax => HeuristicPreset::Expectimax,
            Preset::Corner => HeuristicPreset::Corner,
            Preset::Simple => HeuristicPreset::Simple,
        }
    }
}

#[derive(Debug, Default)]
struct GameSummary {
    score: u64,
    max_tile: u32,
    moves: u64,
    won: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(size) = args.size {
        cfg.board_size = size;
    }
    if let Some(target) = args.target {
        cfg.target_tile = target;
    }
    if let Some(depth) = args.depth {
        cfg.search_depth = depth;
    }
    if let Some(cap) = args.cap {
        cfg.empty_cell_sample_cap = Some(cap);
    }
    if let Some(preset) = args.heuristic {
        cfg.heuristic = preset.into();
    }
    cfg.validate().context("invalid configuration")?;
    if args.games == 0 {
        bail!("--games must be at least 1");
    }

    let mut policy = build_policy(args.policy, &cfg);
    log::info!(
        "policy={} size={} target={} depth={} cap={:?}",
        policy.name(),
        cfg.board_size,
        cfg.target_tile,
        cfg.search_depth,
        cfg.empty_cell_sample_cap
    );

    let pb = (args.games > 1 && !args.quiet).then(|| {
        let pb = ProgressBar::new(u64::from(args.games));
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:30}] {pos}/{len} | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let start = Instant::now();
    let mut summaries = Vec::with_capacity(args.games as usize);
    for g in 0..args.games {
        let spawner = match args.seed {
            Some(seed) => TileSpawner::seeded(seed.wrapping_add(u64::from(g))),
            None => TileSpawner::from_entropy(),
        };
        let mut game = Game::new(cfg.board_size, cfg.target_tile, spawner)?;
        let summary = play(&mut game, policy.as_mut(), &args);
        if !args.quiet && args.games == 1 {
            println!("{}", game.board());
        }
        log::info!(
            "game {}: score={} max_tile={} moves={} won={}",
            g + 1,
            summary.score,
            summary.max_tile,
            summary.moves,
            summary.won
        );
        if let Some(pb) = &pb {
            pb.inc(1);
            pb.set_message(format!("last score: {} | max tile: {}", summary.score, summary.max_tile));
        }
        summaries.push(summary);
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let wins = summaries.iter().filter(|s| s.won).count();
    let best = summaries.iter().map(|s| s.score).max().unwrap_or(0);
    let mean = summaries.iter().map(|s| s.score as f64).sum::<f64>() / summaries.len() as f64;
    let total_moves: u64 = summaries.iter().map(|s| s.moves).sum();
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    println!(
        "Games: {}, wins: {}, best score: {}, mean score: {:.1}, moves: {}, moves/sec: {:.1}",
        summaries.len(),
        wins,
        best,
        mean,
        total_moves,
        total_moves as f64 / elapsed
    );
    Ok(())
}

fn build_policy(kind: PolicyKind, cfg: &Config) -> Box<dyn Policy> {
    match kind {
        PolicyKind::Expectimax => Box::new(Expectimax::with_config(cfg.search_config())),
        PolicyKind::Parallel => Box::new(ExpectimaxParallel::with_config(cfg.search_config())),
        // greedy keeps its corner preset unless weights were set explicitly
        PolicyKind::Greedy => match &cfg.weights {
            Some(w) => Box::new(GreedyPolicy::new(w.clone())),
            None => Box::new(GreedyPolicy::default()),
        },
        PolicyKind::Priority => Box::new(PriorityPolicy::default()),
    }
}

fn play(game: &mut Game, policy: &mut dyn Policy, args: &Args) -> GameSummary {
    let mut won = false;
    let mut milestone = 0;
    while !game.is_over() {
        if args.steps.map_or(false, |limit| game.moves() >= limit) {
            log::debug!("step limit reached");
            break;
        }
        let Some(dir) = policy.next_move(game.board()) else {
            break;
        };
        let res = game.step(dir);
        let max_tile = game.board().max_tile();
        if max_tile >= 512 && max_tile > milestone {
            milestone = max_tile;
            log::info!("reached {} after {} moves (score {})", max_tile, game.moves(), game.score());
        }
        if args.stop_tile.map_or(false, |t| max_tile >= t) {
            log::debug!("stop tile {} reached", max_tile);
            break;
        }
        if res.won && !won {
            won = true;
            if !args.continue_after_win {
                break;
            }
        }
    }
    GameSummary { score: game.score(), max_tile: game.board().max_tile(), moves: game.moves(), won: won || game.has_won() }
}
