//! Blokus-Rust: Blokus Duo engine with alpha-beta search.
//!
//! ## Usage
//!
//! - `blokus-rust` - Show a demo
//! - `blokus-rust protocol` - Start the text protocol on stdin/stdout
//! - `blokus-rust selfplay` - Play full games between bots
//! - `blokus-rust demo` - Play a few searched moves and a random finish

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blokus_rust::bot::{AlphaBetaBot, Bot, RandomBot};
use blokus_rust::game::{DuoGame, DuoState};
use blokus_rust::minimax::{SearchConfig, Traversal};
use blokus_rust::playout::{play_game, random_playout};
use blokus_rust::protocol::ProtocolEngine;
use blokus_rust::state::{Game, State};

/// Blokus-Rust: Blokus Duo engine with alpha-beta search
#[derive(Parser)]
#[command(name = "blokus-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Search time budget per move, in seconds
    #[arg(long, global = true)]
    time: Option<f64>,

    /// Maximum iterative-deepening depth
    #[arg(long, global = true)]
    depth: Option<u32>,

    /// Search on cloned states instead of apply/undo
    #[arg(long = "clone", global = true)]
    clone_states: bool,

    /// Seed for random playouts and random bots
    #[arg(long, global = true, default_value_t = 1)]
    seed: u64,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server on stdin/stdout
    Protocol,
    /// Play complete games between two bots
    Selfplay {
        /// Number of games
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Let the second player move at random
        #[arg(long)]
        random_opponent: bool,
    },
    /// Run a simple demo of the engine
    Demo,
}

impl Cli {
    fn search_config(&self) -> Result<SearchConfig> {
        let mut config = SearchConfig::default();
        if let Some(secs) = self.time {
            let limit = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid --time value {secs}"))?;
            config = config.with_time_limit(limit);
        }
        if let Some(depth) = self.depth {
            anyhow::ensure!(depth > 0, "--depth must be at least 1");
            config = config.with_depth_limit(depth);
        }
        if self.clone_states {
            config = config.with_traversal(Traversal::Clone);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.search_config()?;
    let game = DuoGame::new();

    match cli.command {
        Some(Commands::Protocol) => {
            let mut engine = ProtocolEngine::new(game, config);
            engine.run()
        }
        Some(Commands::Selfplay {
            games,
            random_opponent,
        }) => run_selfplay(&game, config, cli.seed, games, random_opponent),
        Some(Commands::Demo) | None => run_demo(&game, config, cli.seed),
    }
}

fn run_selfplay(
    game: &DuoGame,
    config: SearchConfig,
    seed: u64,
    games: u32,
    random_opponent: bool,
) -> Result<()> {
    let mut wins = [0u32; 2];
    for i in 0..games {
        let mut first = AlphaBetaBot::new(game.clone(), config);
        let record = if random_opponent {
            let mut second = RandomBot::with_seed(seed.wrapping_add(u64::from(i)));
            let mut bots: [&mut dyn Bot<DuoState>; 2] = [&mut first, &mut second];
            play_game(game, &mut bots)?
        } else {
            let mut second = AlphaBetaBot::new(game.clone(), config);
            let mut bots: [&mut dyn Bot<DuoState>; 2] = [&mut first, &mut second];
            play_game(game, &mut bots)?
        };

        let mut replay = game.new_initial_state();
        for &action in &record.actions {
            replay.apply_action(action)?;
        }
        println!(
            "Game {}: {} plies, score {}-{}, returns {:?}",
            i + 1,
            record.actions.len(),
            replay.placed_cells(0),
            replay.placed_cells(1),
            record.returns
        );
        for (player, &r) in record.returns.iter().enumerate() {
            if r > 0.0 {
                wins[player] += 1;
            }
        }
    }
    println!("Wins: P0 {} / P1 {} / draws {}", wins[0], wins[1], games - wins[0] - wins[1]);
    Ok(())
}

fn run_demo(game: &DuoGame, config: SearchConfig, seed: u64) -> Result<()> {
    println!("Blokus-Rust: Blokus Duo with alpha-beta search\n");
    println!(
        "{} placements, {} distinct actions\n",
        game.catalog().len(),
        game.num_distinct_actions()
    );

    let mut state: DuoState = game.new_initial_state();
    println!("{state}");

    println!("=== Searched opening ===");
    let mut bot = AlphaBetaBot::new(game.clone(), config);
    for _ in 0..4 {
        let Some(player) = state.current_player().player() else {
            break;
        };
        let action = bot.step(&state)?;
        println!("{}", game.action_to_string(player, action));
        state.apply_action(action)?;
    }
    println!("{state}");

    println!("=== Random finish ===");
    let mut rng = fastrand::Rng::with_seed(seed);
    let plies = random_playout(&mut state, &mut rng);
    println!("{plies} random plies");
    println!("{state}");
    println!(
        "Final score: P0 {} / P1 {}",
        state.placed_cells(0),
        state.placed_cells(1)
    );
    Ok(())
}
