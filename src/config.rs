//! Race configuration loaded from `grandprix.toml`.

use crate::drivers::DriverKind;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_grandprix::{PLAYER_COUNT, Team};
use tracing::{debug, info, instrument, warn};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "grandprix.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Getters, Serialize, Deserialize)]
pub struct GrandPrixConfig {
    /// Race pacing and limits.
    #[serde(default)]
    race: RaceConfig,

    /// Driver policy for each team.
    #[serde(default)]
    drivers: DriversConfig,
}

/// `[race]` section.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Dice seed. Absent means a fresh seed from the OS.
    #[serde(default)]
    seed: Option<u64>,

    /// Stop after this many full turns.
    #[serde(default = "default_max_turns")]
    max_turns: u32,

    /// Delay between beginning and committing a roll.
    #[serde(default = "default_roll_delay_ms")]
    roll_delay_ms: u64,

    /// Delay before handing the turn to the next player.
    #[serde(default = "default_advance_delay_ms")]
    advance_delay_ms: u64,

    /// End the race as soon as a player wins.
    #[serde(default = "default_stop_on_winner")]
    stop_on_winner: bool,
}

fn default_max_turns() -> u32 {
    200
}

fn default_roll_delay_ms() -> u64 {
    1000
}

fn default_advance_delay_ms() -> u64 {
    1500
}

fn default_stop_on_winner() -> bool {
    true
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_turns: default_max_turns(),
            roll_delay_ms: default_roll_delay_ms(),
            advance_delay_ms: default_advance_delay_ms(),
            stop_on_winner: default_stop_on_winner(),
        }
    }
}

impl RaceConfig {
    /// Returns a copy with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns a copy with both delays set to zero.
    pub fn without_delays(mut self) -> Self {
        self.roll_delay_ms = 0;
        self.advance_delay_ms = 0;
        self
    }

    /// Returns a copy with a different turn limit.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// `[drivers]` section: one policy per team.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct DriversConfig {
    /// Seat 0.
    #[serde(default = "default_driver")]
    ferrari: DriverKind,
    /// Seat 1.
    #[serde(default = "default_driver")]
    mercedes: DriverKind,
    /// Seat 2.
    #[serde(default = "default_driver")]
    mclaren: DriverKind,
    /// Seat 3.
    #[serde(default = "default_driver")]
    williams: DriverKind,
}

fn default_driver() -> DriverKind {
    DriverKind::Random
}

impl Default for DriversConfig {
    fn default() -> Self {
        Self::uniform(default_driver())
    }
}

impl DriversConfig {
    /// Every team uses the same policy.
    pub fn uniform(kind: DriverKind) -> Self {
        Self {
            ferrari: kind,
            mercedes: kind,
            mclaren: kind,
            williams: kind,
        }
    }

    /// Policies in seating order.
    pub fn seats(&self) -> [DriverKind; PLAYER_COUNT] {
        [self.ferrari, self.mercedes, self.mclaren, self.williams]
    }

    /// Policy for a team.
    pub fn for_team(&self, team: Team) -> DriverKind {
        match team {
            Team::Ferrari => self.ferrari,
            Team::Mercedes => self.mercedes,
            Team::McLaren => self.mclaren,
            Team::Williams => self.williams,
        }
    }
}

impl GrandPrixConfig {
    /// Creates a configuration from its sections.
    pub fn new(race: RaceConfig, drivers: DriversConfig) -> Self {
        Self { race, drivers }
    }

    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            max_turns = config.race.max_turns,
            seed = ?config.race.seed,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Parses and validates TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }

    /// Rejects values no race can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.race.max_turns == 0 {
            return Err(ConfigError::new("race.max_turns must be at least 1"));
        }
        Ok(())
    }

    /// Returns a copy with the `[race]` section replaced.
    pub fn with_race(mut self, race: RaceConfig) -> Self {
        self.race = race;
        self
    }

    /// Returns a copy with the `[drivers]` section replaced.
    pub fn with_drivers(mut self, drivers: DriversConfig) -> Self {
        self.drivers = drivers;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = GrandPrixConfig::from_toml("").unwrap();
        assert_eq!(config, GrandPrixConfig::default());
        assert_eq!(*config.race().max_turns(), 200);
        assert_eq!(config.drivers().seats(), [DriverKind::Random; 4]);
    }

    #[test]
    fn test_partial_sections() {
        let config = GrandPrixConfig::from_toml(
            r#"
            [race]
            seed = 7
            roll_delay_ms = 0

            [drivers]
            williams = "aggressive"
            "#,
        )
        .unwrap();
        assert_eq!(*config.race().seed(), Some(7));
        assert_eq!(*config.race().roll_delay_ms(), 0);
        assert_eq!(*config.race().advance_delay_ms(), 1500);
        assert_eq!(config.drivers().for_team(Team::Williams), DriverKind::Aggressive);
        assert_eq!(config.drivers().for_team(Team::Ferrari), DriverKind::Random);
    }

    #[test]
    fn test_zero_turns_rejected() {
        let err = GrandPrixConfig::from_toml("[race]\nmax_turns = 0").unwrap_err();
        assert!(err.message.contains("max_turns"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(GrandPrixConfig::from_toml("[drivers]\nferrari = \"reckless\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GrandPrixConfig::default().with_race(RaceConfig::default().with_seed(5));
        let text = config.to_toml().unwrap();
        assert_eq!(GrandPrixConfig::from_toml(&text).unwrap(), config);
    }
}
