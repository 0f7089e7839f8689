//! Headless Batch Runner
//!
//! Plays a scripted user strategy against the adaptive opponent and prints
//! the final snapshot plus per-move outcome tallies.

use clap::Parser;
use netrsim::core::{Move, SimConfig};
use netrsim::simulation::{SeededSource, SimulationContext, Snapshot, UserStrategy};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Headless Batch Runner - scripted strategy vs. adaptive opponent
#[derive(Parser, Debug)]
#[command(name = "batch_runner")]
#[command(about = "Play a scripted strategy against the opponent model and report the outcome")]
struct Args {
    /// Number of turns to play
    #[arg(long, default_value_t = 100)]
    turns: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// User strategy
    #[arg(long, value_enum, default_value_t = UserStrategy::Cycle)]
    strategy: UserStrategy,

    /// TOML config file overriding the default rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every turn to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Outcomes for one user move
#[derive(Serialize, Default)]
struct MoveTally {
    played: usize,
    chaos: usize,
    total_reward: i64,
}

/// JSON output structure
#[derive(Serialize)]
struct BatchResult {
    strategy: UserStrategy,
    seed: u64,
    snapshot: Snapshot,
    negotiate: MoveTally,
    hold: MoveTally,
    escalate: MoveTally,
    tense_turns: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netrsim=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);

    let config = match &args.config {
        Some(path) => SimConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config {:?}: {}", path, e);
            eprintln!("Using default rules");
            SimConfig::default()
        }),
        None => SimConfig::default(),
    };

    // Opponent and player draw from independent streams
    let mut ctx = SimulationContext::new(&config, SeededSource::new(seed));
    let mut player_rng = SeededSource::new(seed.wrapping_add(1));

    for _ in 0..args.turns {
        let turn = args
            .strategy
            .next_move(ctx.turns(), &mut player_rng)
            .and_then(|mv| ctx.take_turn(mv));
        match turn {
            Ok(turn) => {
                if args.verbose {
                    eprintln!(
                        "{:>4} {:<9} vs {:<9} chaos={:<5} reward={:+} -> {}",
                        turn.index,
                        turn.user_move.name(),
                        turn.opponent_move.name(),
                        turn.chaos_injected,
                        turn.reward,
                        ctx.current_state()
                    );
                }
            }
            Err(e) => {
                eprintln!("Turn failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let tally = |mv: Move| {
        ctx.turns()
            .iter()
            .filter(|t| t.user_move == mv)
            .fold(MoveTally::default(), |mut acc, t| {
                acc.played += 1;
                acc.chaos += t.chaos_injected as usize;
                acc.total_reward += t.reward;
                acc
            })
    };

    let snapshot = ctx.snapshot();
    let tense_turns = ctx
        .session()
        .state_history()
        .iter()
        .filter(|s| **s == netrsim::core::ConflictState::Tense)
        .count();

    let result = BatchResult {
        strategy: args.strategy,
        seed,
        negotiate: tally(Move::Negotiate),
        hold: tally(Move::Hold),
        escalate: tally(Move::Escalate),
        snapshot,
        tense_turns,
    };

    match args.format.as_str() {
        "json" => print_json(&result),
        "text" => {
            println!("Batch Result");
            println!("============");
            println!("Strategy: {:?}", result.strategy);
            println!("{}", result.snapshot.summary());
            println!("Turns ending Tense: {}", result.tense_turns);
            println!();
            for (name, t) in [
                ("Negotiate", &result.negotiate),
                ("Hold", &result.hold),
                ("Escalate", &result.escalate),
            ] {
                println!(
                    "{:<10} played {:>4}  chaos {:>4}  reward {:>+5}",
                    name, t.played, t.chaos, t.total_reward
                );
            }
            println!();
            println!("Seed: {}", result.seed);
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            print_json(&result);
        }
    }
}

fn print_json(result: &BatchResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}
