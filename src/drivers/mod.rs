//! Driver trait and implementations.
//!
//! A driver picks one of the legal options the engine offers after a roll.
//! Drivers never see the engine itself, only a snapshot and the candidates.

mod aggressive;
mod first;
mod random;

pub use aggressive::AggressiveDriver;
pub use first::FirstLegalDriver;
pub use random::RandomDriver;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strictly_grandprix::{GameState, MoveCandidate};

/// Trait for automated players.
#[async_trait::async_trait]
pub trait Driver: Send {
    /// Picks one of `candidates` for the current player.
    ///
    /// Returns `None` only when `candidates` is empty.
    async fn choose(
        &mut self,
        state: &GameState,
        candidates: &[MoveCandidate],
    ) -> Result<Option<MoveCandidate>>;

    /// Returns the driver's display name.
    fn name(&self) -> &str;
}

/// Driver policies selectable from config and the command line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DriverKind {
    /// Always takes the first option offered.
    First,
    /// Picks uniformly among the options.
    Random,
    /// Knockouts first, then spawns, then the car furthest from its spawn.
    Aggressive,
}

impl DriverKind {
    /// Builds a driver of this kind. `seed` feeds random policies.
    pub fn build(self, seed: u64) -> Box<dyn Driver> {
        match self {
            DriverKind::First => Box::new(FirstLegalDriver::new()),
            DriverKind::Random => Box::new(RandomDriver::seeded(seed)),
            DriverKind::Aggressive => Box::new(AggressiveDriver::new()),
        }
    }
}
