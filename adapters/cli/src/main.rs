#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line entry point that plays one Blastfield seat over stdin/stdout.

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use blastfield_cli::{
    config::{AgentConfig, Strategy},
    input::TurnReader,
    output::Command,
    policy::Agent,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Plays one seat of a Blastfield match, reading turns from stdin and
/// answering on stdout.
#[derive(Debug, Parser)]
#[command(name = "blastfield", about = "Bomb-placing grid game agent")]
struct Args {
    /// Planner used to choose each move.
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,
    /// Wall-clock allowance per turn for the annealing planner.
    #[arg(long)]
    budget_ms: Option<u64>,
    /// TOML file with agent settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.budget_ms.is_some() {
        config.annealing.budget_ms = args.budget_ms;
    }

    let stdin = io::stdin();
    let mut reader = TurnReader::new(stdin.lock()).context("failed to read the match header")?;
    let header = reader.header();
    tracing::info!(
        player = header.player().get(),
        columns = header.grid().columns(),
        rows = header.grid().rows(),
        strategy = ?config.strategy,
        "match started"
    );

    let mut agent = Agent::new(header.player(), config);
    let mut stdout = io::stdout().lock();
    while let Some(board) = reader.next_turn().context("failed to read turn")? {
        let started = Instant::now();
        let action = agent.decide(&board);
        let command = Command::for_action(&board, agent.player(), action);
        writeln!(stdout, "{command}").context("failed to write command")?;
        stdout.flush().context("failed to flush command")?;
        tracing::debug!(
            turn = board.turn(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            %command,
            "turn played"
        );
    }

    tracing::info!("match finished");
    Ok(())
}
