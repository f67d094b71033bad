//! Command-line interface for grandprix.

use clap::{Parser, Subcommand};
use grandprix::DriverKind;
use std::path::PathBuf;

/// Grand Prix - four teams, sixteen cars, one dice
#[derive(Parser, Debug)]
#[command(name = "grandprix")]
#[command(about = "Run Grand Prix races between automated drivers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = grandprix::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one race with real delays, logging every event
    Race {
        /// Dice seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Turn limit (overrides the config file)
        #[arg(long)]
        max_turns: Option<u32>,

        /// Use this policy for every team (overrides the config file)
        #[arg(long, value_enum)]
        driver: Option<DriverKind>,

        /// Skip all delays
        #[arg(long)]
        no_delay: bool,

        /// Write the final snapshot as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a headless batch of races and print aggregate JSON
    Simulate {
        /// Number of races
        #[arg(short, long, default_value = "100")]
        games: u32,

        /// Seed of the first race
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Use this policy for every team (overrides the config file)
        #[arg(long, value_enum)]
        driver: Option<DriverKind>,
    },

    /// Print the default configuration as TOML
    Config,
}
