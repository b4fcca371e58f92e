use clap::Parser;
use mcts::games::infexion::InfexionState;
use mcts::{GameState, Mcts, MctsConfig, SearchStatistics};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search duration in seconds (default: 5)
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Random opening moves played before the searched position (default: 12)
    #[arg(long, default_value_t = 12)]
    opening_moves: usize,

    /// Number of threads for parallel playouts (default: number of CPUs)
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Playouts per leaf for the parallel benchmark (default: 8)
    #[arg(long, default_value_t = 8)]
    rollouts_per_leaf: usize,

    /// Seed for the opening and both searches
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run only the sequential benchmark.
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    sequential_only: bool,
}

fn opening_position(moves: usize, seed: u64) -> InfexionState {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut state = InfexionState::new();
    for _ in 0..moves {
        if state.is_terminal() {
            break;
        }
        match state.random_move(&mut rng) {
            Some(mv) => state.make_move(&mv),
            None => break,
        }
    }
    state
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("Infexion MCTS - Benchmark Tool");
    println!("==============================");
    println!("Duration: {} seconds", args.duration);
    println!("Opening Moves: {}", args.opening_moves);
    println!("Parallel Threads: {}", args.threads);
    println!("Rollouts Per Leaf: {}", args.rollouts_per_leaf);
    println!("Seed: {}", args.seed);
    println!("------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let state = opening_position(args.opening_moves, args.seed);
    if state.is_terminal() {
        anyhow::bail!("opening ended the game; try fewer opening moves");
    }
    println!("\nSearched position (turn {}):\n{}", state.turn_count(), state);

    // Use a large number of iterations so the time limit controls the duration
    let iterations = 100_000_000;
    let base = MctsConfig::default()
        .with_iterations(iterations)
        .with_seed(args.seed)
        .with_time_limit(Duration::from_secs(args.duration));

    println!("\nRunning Sequential Benchmark...");
    let mut sequential = Mcts::new(base.clone())?;
    let start = Instant::now();
    let (mv, stats) = sequential.search(&state, iterations)?;
    let duration = start.elapsed();
    print_stats("Sequential", &stats, duration, 1);
    println!("  Chosen Move: {}", mv);

    if !args.sequential_only && args.rollouts_per_leaf > 1 {
        println!("\nRunning Leaf-Parallel Benchmark...");
        let config = base.with_parallel_rollouts(args.rollouts_per_leaf, args.threads);
        let mut parallel = Mcts::new(config)?;
        let start = Instant::now();
        let (mv, stats) = parallel.search(&state, iterations)?;
        let duration = start.elapsed();
        print_stats("Leaf-Parallel", &stats, duration, args.rollouts_per_leaf);
        println!("  Chosen Move: {}", mv);
    }

    Ok(())
}

fn print_stats(name: &str, stats: &SearchStatistics, duration: Duration, rollouts_per_leaf: usize) {
    let secs = duration.as_secs_f64();
    let nps = stats.total_nodes as f64 / secs;
    let ips = stats.iterations as f64 / secs;
    let pps = (stats.iterations as usize * rollouts_per_leaf) as f64 / secs;

    println!("{} Results:", name);
    println!("  Total Nodes: {}", stats.total_nodes);
    println!("  Max Depth: {}", stats.max_depth);
    println!("  Time: {:.3}s", secs);
    println!("  NPS: {:.0} nodes/sec", nps);
    println!("  IPS: {:.0} iterations/sec", ips);
    println!("  PPS: {:.0} playouts/sec", pps);
    println!("  Root Visits: {}", stats.root_visits);
    println!("  Best Mean: {:.3}", stats.best_mean);
}
