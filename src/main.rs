//! Grand Prix - race runner CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use grandprix::{DriverKind, DriversConfig, GrandPrixConfig, RaceDirector, simulate};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_grandprix=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Race {
            seed,
            max_turns,
            driver,
            no_delay,
            output,
        } => {
            let config = load_config(&cli.config, driver)?;
            run_race(config, seed, max_turns, no_delay, output).await
        }
        Command::Simulate {
            games,
            seed,
            driver,
        } => {
            let config = load_config(&cli.config, driver)?;
            run_simulation(config, games, seed).await
        }
        Command::Config => print_default_config(),
    }
}

/// Loads the config file (or defaults) and applies a driver override.
#[instrument]
fn load_config(path: &Path, driver: Option<DriverKind>) -> Result<GrandPrixConfig> {
    let config = GrandPrixConfig::load_or_default(path)?;
    Ok(match driver {
        Some(kind) => config.with_drivers(DriversConfig::uniform(kind)),
        None => config,
    })
}

/// Runs one race and logs its events as they happen.
#[instrument(skip(config))]
async fn run_race(
    config: GrandPrixConfig,
    seed: Option<u64>,
    max_turns: Option<u32>,
    no_delay: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut race = config.race().clone();
    if let Some(seed) = seed {
        race = race.with_seed(seed);
    }
    if let Some(max_turns) = max_turns {
        race = race.with_max_turns(max_turns);
    }
    if no_delay {
        race = race.without_delays();
    }
    let config = config.with_race(race);
    config.validate()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let commentator = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!(%event, detail = ?event, "Race event");
        }
    });

    let summary = {
        let mut director = RaceDirector::from_config(&config).with_events(event_tx);
        director.run().await?
    };
    commentator.await.context("Event logger task failed")?;

    info!(
        winner = ?summary.winner(),
        turn = summary.turn_number(),
        knockouts = summary.knockouts(),
        "Race finished"
    );

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(summary.final_state())?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "Final snapshot written");
    }
    Ok(())
}

/// Runs a batch and prints the report.
#[instrument(skip(config))]
async fn run_simulation(config: GrandPrixConfig, games: u32, seed: u64) -> Result<()> {
    let report = simulate(&config, games, seed).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_default_config() -> Result<()> {
    print!("{}", GrandPrixConfig::default().to_toml()?);
    Ok(())
}
