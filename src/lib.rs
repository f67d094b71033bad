//! Grand Prix race runner.
//!
//! Wraps the pure [`strictly_grandprix`] engine with everything a real race
//! needs around it.
//!
//! # Architecture
//!
//! - **Config**: `grandprix.toml` with race pacing and driver policies
//! - **Drivers**: automated players choosing among legal options
//! - **Director**: real-time caller of the engine's two-step roll and advance
//! - **Simulation**: headless batches with aggregate statistics
//!
//! # Example
//!
//! ```no_run
//! use grandprix::{GrandPrixConfig, RaceDirector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GrandPrixConfig::load_or_default("grandprix.toml")?;
//! let summary = RaceDirector::from_config(&config).run().await?;
//! println!("winner: {:?}", summary.winner());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod director;
mod drivers;
mod simulation;

pub use config::{ConfigError, DEFAULT_CONFIG_FILE, DriversConfig, GrandPrixConfig, RaceConfig};
pub use director::{DirectorError, RaceDirector, RaceSummary, Timing};
pub use drivers::{AggressiveDriver, Driver, DriverKind, FirstLegalDriver, RandomDriver};
pub use simulation::{SimulationReport, simulate};
