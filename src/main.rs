//! # Infexion Self-Play
//!
//! Runs a full Infexion match between two MCTS agents, with a referee-side
//! `GameController` validating and recording every move.
//!
//! ## Usage
//! Run with `cargo run --release -- --red-iterations 200 --blue-iterations 2000`.
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=mcts=debug`).

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use mcts::game_controller::{GameController, GameStatus};
use mcts::games::infexion::{player_name, HexPos, InfexionState, BLUE, BOARD_N, RED};
use mcts::{Agent, MctsConfig};
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play Infexion between two MCTS agents", long_about = None)]
struct Args {
    /// Search iterations per move for Red
    #[arg(long, default_value_t = 500)]
    red_iterations: u32,

    /// Search iterations per move for Blue
    #[arg(long, default_value_t = 500)]
    blue_iterations: u32,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = mcts::config::DEFAULT_EXPLORATION)]
    exploration: f64,

    /// Reward for a drawn playout, strictly between 0 and 1
    #[arg(long, default_value_t = mcts::config::DEFAULT_DRAW_REWARD)]
    draw_reward: f64,

    /// Parallel playouts per selected leaf
    #[arg(long, default_value_t = 1)]
    rollouts_per_leaf: usize,

    /// Worker threads for parallel playouts (default: number of CPUs)
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Seed for reproducible matches (Blue uses seed + 1)
    #[arg(long)]
    seed: Option<u64>,

    /// Rebuild the search tree from scratch every move
    #[arg(long, default_value_t = false)]
    no_reuse: bool,

    /// Print the board after every move
    #[arg(long, default_value_t = false)]
    show_board: bool,

    /// Print the full move history at the end
    #[arg(long, default_value_t = false)]
    history: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn agent_config(args: &Args, iterations: u32, seed_offset: u64) -> MctsConfig {
    let config = MctsConfig::default()
        .with_iterations(iterations)
        .with_exploration(args.exploration)
        .with_draw_reward(args.draw_reward)
        .with_parallel_rollouts(args.rollouts_per_leaf, args.threads)
        .with_tree_reuse(!args.no_reuse);
    match args.seed {
        Some(seed) => config.with_seed(seed.wrapping_add(seed_offset)),
        None => config,
    }
}

fn colored_name(player: i32) -> colored::ColoredString {
    if player == RED {
        player_name(player).red().bold()
    } else {
        player_name(player).blue().bold()
    }
}

fn render_board(state: &InfexionState) {
    for r in (0..BOARD_N as u8).rev() {
        let mut line = " ".repeat(r as usize * 2);
        for q in 0..BOARD_N as u8 {
            let cell = HexPos::new(r, q).and_then(|pos| state.cell(pos));
            let text = match cell {
                Some((owner, power)) if owner == RED => format!("r{}", power).red().bold(),
                Some((_, power)) => format!("b{}", power).blue().bold(),
                None => " .".dimmed(),
            };
            line.push_str(&format!("{}  ", text));
        }
        println!("{}", line);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Searches will be significantly slower.\nUse --release for real matches.\n");

    let mut controller = GameController::new(InfexionState::new());
    let mut agents = [
        Agent::new(RED, InfexionState::new(), agent_config(&args, args.red_iterations, 0))
            .context("failed to create Red agent")?,
        Agent::new(BLUE, InfexionState::new(), agent_config(&args, args.blue_iterations, 1))
            .context("failed to create Blue agent")?,
    ];
    info!(
        red_iterations = args.red_iterations,
        blue_iterations = args.blue_iterations,
        exploration = args.exploration,
        reuse = !args.no_reuse,
        "starting match"
    );

    let start = Instant::now();
    while !controller.is_game_over() {
        let mover = controller.get_current_player();
        let agent = agents
            .iter_mut()
            .find(|a| a.player() == mover)
            .context("no agent for the player to move")?;

        let mv = agent.action().context("search failed")?;
        let outcome = controller
            .try_make_move(mv)
            .context("agent proposed an illegal move")?;
        for agent in agents.iter_mut() {
            agent.turn(outcome.player, &outcome.move_made);
        }

        println!(
            "{:>3}. {:<5} {}",
            controller.move_count(),
            colored_name(outcome.player),
            outcome.move_made
        );
        if args.show_board {
            render_board(controller.state());
            println!();
        }
    }

    let state = controller.state();
    println!();
    render_board(state);
    println!(
        "\nFinal power: {} {} - {} {}",
        colored_name(RED),
        state.color_power(RED),
        state.color_power(BLUE),
        colored_name(BLUE)
    );
    match controller.get_status() {
        GameStatus::Win(winner) => println!("Result: {} wins", colored_name(winner)),
        GameStatus::Draw => println!("Result: Draw"),
        GameStatus::InProgress => println!("Result: unfinished"),
    }
    println!(
        "{} moves in {:.1}s",
        controller.move_count(),
        start.elapsed().as_secs_f64()
    );

    if args.history {
        println!(
            "\n{}",
            controller.format_history("Infexion", |p| player_name(p).to_string())
        );
    }
    Ok(())
}
