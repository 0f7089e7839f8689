//! NetrSim - Entry Point
//!
//! Interactive console session: the player types a move each turn and the
//! adaptive opponent answers. Advisory prose is fetched in the background so
//! a slow or failing service never holds up a turn.

use clap::Parser;
use netrsim::core::error::Result;
use netrsim::core::SimConfig;
use netrsim::llm::{request_advice, AdvisoryKind, AdvisoryRequest, LlmClient};
use netrsim::simulation::{load_session, save_session, SavedSession, SeededSource, SimulationContext};

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Peace vs. chaos negotiation simulator
#[derive(Parser, Debug)]
#[command(name = "netrsim")]
#[command(about = "Turn-based peace vs. chaos negotiation simulator")]
struct Args {
    /// Random seed for a reproducible session (default: OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config file overriding the default rules
    #[arg(long)]
    config: Option<PathBuf>,
}

type AdviceReply = (AdvisoryKind, Result<String>);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netrsim=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let source = match args.seed {
        Some(seed) => SeededSource::new(seed),
        None => SeededSource::from_entropy(),
    };
    let mut ctx = SimulationContext::new(&config, source);
    let mut config = config;
    let mut session_id = Uuid::new_v4();
    tracing::info!(session = %session_id, seed = ?args.seed, "NetrSim starting...");

    // Runtime for advisory calls only; turns never run on it
    let rt = Runtime::new()?;
    let (advice_tx, mut advice_rx) = mpsc::unbounded_channel::<AdviceReply>();

    // Advisory is optional - the game works without it
    let advisor = match LlmClient::from_config(&config.advisory) {
        Ok(client) => Some(Arc::new(client)),
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - running without advisory text");
            None
        }
    };

    print_welcome(advisor.is_some());

    loop {
        while let Ok((kind, reply)) = advice_rx.try_recv() {
            print_advice(kind, reply);
        }

        display_status(&ctx);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "quit" | "q" => break,
            "status" | "s" => display_detailed_status(&ctx),
            "history" => display_history(&ctx),
            "reset" => {
                ctx.reset();
                session_id = Uuid::new_v4();
                println!("Session reset.");
            }
            "save" => {
                if rest.is_empty() {
                    println!("Usage: save <path>");
                    continue;
                }
                let saved = SavedSession::new(session_id, config.clone(), ctx.session().clone());
                match save_session(Path::new(rest), &saved) {
                    Ok(()) => println!("Saved {} turns to {}", saved.saved_at_turn, rest),
                    Err(e) => println!("Could not save: {}", e),
                }
            }
            "load" => {
                if rest.is_empty() {
                    println!("Usage: load <path>");
                    continue;
                }
                match load_session(Path::new(rest)) {
                    Ok(saved) => {
                        // The current session stays live until the loaded one is accepted.
                        let mut loaded = SimulationContext::new(&saved.config, SeededSource::from_entropy());
                        if let Err(e) = loaded.restore(saved.session) {
                            println!("Could not load: {}", e);
                            continue;
                        }
                        ctx = loaded;
                        config = saved.config;
                        session_id = saved.id;
                        println!("Loaded session {} ({} turns).", session_id, saved.saved_at_turn);
                    }
                    Err(e) => println!("Could not load: {}", e),
                }
            }
            "advise" => {
                let Some(client) = &advisor else {
                    println!("Advisory text is unavailable (LLM_API_KEY not set).");
                    continue;
                };
                let Some((kind, scenario)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: advise <strategy|brief|legal> <describe the conflict>");
                    continue;
                };
                let kind = match AdvisoryKind::parse(kind) {
                    Ok(kind) => kind,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                let request = AdvisoryRequest::new(kind, scenario).with_snapshot(ctx.snapshot());
                let client = Arc::clone(client);
                let tx = advice_tx.clone();
                rt.spawn(async move {
                    let reply = request_advice(client.as_ref(), &request).await;
                    let _ = tx.send((kind, reply));
                });
                println!("Requested {} advice; it will appear when ready.", kind);
            }
            _ => match ctx.submit(input) {
                Ok(turn) => {
                    println!(
                        "Turn {}: you {} / opponent {}{} -> reward {:+}",
                        turn.index,
                        turn.user_move,
                        turn.opponent_move,
                        if turn.chaos_injected { " (chaos!)" } else { "" },
                        turn.reward
                    );
                }
                Err(e) => println!("{}", e),
            },
        }
    }

    let snapshot = ctx.snapshot();
    println!(
        "\nGoodbye! Final peace score {} after {} turns ({:.0}% chaos).",
        snapshot.running_score,
        snapshot.turns_played,
        snapshot.chaos_ratio * 100.0
    );
    Ok(())
}

fn print_welcome(advisory: bool) {
    println!("\n=== NETRSIM ===");
    println!("Keep the peace against an opponent that learns your habits");
    println!();
    println!("Commands:");
    println!("  negotiate / n   - Offer to negotiate");
    println!("  hold / h        - Hold your position");
    println!("  escalate / e    - Escalate the conflict");
    println!("  status / s      - Show detailed status");
    println!("  history         - List all turns");
    println!("  reset           - Start a new session");
    println!("  save <path>     - Save the session to a file");
    println!("  load <path>     - Load a saved session");
    if advisory {
        println!("  advise <strategy|brief|legal> <text> - Ask for advisory text");
    }
    println!("  quit / q        - Exit");
    println!();
}

fn print_advice(kind: AdvisoryKind, reply: Result<String>) {
    println!();
    match reply {
        Ok(text) => {
            println!("--- Advisory ({}) ---", kind);
            println!("{}", text);
        }
        Err(e) => println!("Advisory ({}) failed: {}", kind, e),
    }
}

/// Display a brief status summary
fn display_status(ctx: &SimulationContext) {
    let snapshot = ctx.snapshot();
    println!();
    println!(
        "--- Turn {} | {} | Peace score: {} | Chaos: {:.0}% ---",
        snapshot.turns_played + 1,
        snapshot.current_state,
        snapshot.running_score,
        snapshot.chaos_ratio * 100.0
    );
}

/// Display detailed status including the opponent's current chaos odds
fn display_detailed_status(ctx: &SimulationContext) {
    let snapshot = ctx.snapshot();
    println!();
    println!("{}", snapshot.summary());
    println!("Chaos odds if you play next:");
    for mv in netrsim::core::Move::ALL {
        println!(
            "  {:<10} {:>5.1}%  (played {} times)",
            mv.name(),
            ctx.next_chaos_probability(mv).min(1.0) * 100.0,
            ctx.profile().count(mv)
        );
    }
}

fn display_history(ctx: &SimulationContext) {
    if ctx.turns().is_empty() {
        println!("No turns played yet.");
        return;
    }
    println!();
    println!(" #   Before     You        Opponent   Chaos  Reward");
    for turn in ctx.turns() {
        println!(
            "{:>3}  {:<9}  {:<9}  {:<9}  {:<5}  {:>+4}",
            turn.index,
            turn.state_before.to_string(),
            turn.user_move.name(),
            turn.opponent_move.name(),
            if turn.chaos_injected { "yes" } else { "no" },
            turn.reward
        );
    }
}
