//! Commands accepted by the engine.
//!
//! Commands carry only the ids they name. The engine reads the current player
//! from its own state and refuses commands naming anyone else.

use crate::{CarId, PlayerId};
use serde::{Deserialize, Serialize};

/// Every caller → engine command. Fully serializable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(tag = "type")]
pub enum Command {
    /// Begin a dice roll for the current player.
    RollDice,
    /// Commit the roll in flight and compute the next phase.
    CommitRoll,
    /// Bring a garage car onto the player's spawn cell.
    SpawnCar {
        /// Acting player.
        player: PlayerId,
        /// Car leaving the garage.
        car: CarId,
    },
    /// Move an on-track car by the committed dice value.
    MoveCar {
        /// Acting player.
        player: PlayerId,
        /// Car to move.
        car: CarId,
    },
    /// Hand the turn to the next player.
    AdvanceTurn,
    /// Discard the race and start over.
    Reset,
}

impl Command {
    /// Returns the acting player named by the command, if it names one.
    pub fn actor(&self) -> Option<PlayerId> {
        match self {
            Command::SpawnCar { player, .. } | Command::MoveCar { player, .. } => Some(*player),
            _ => None,
        }
    }

    /// Returns the car named by the command, if it names one.
    pub fn car(&self) -> Option<CarId> {
        match self {
            Command::SpawnCar { car, .. } | Command::MoveCar { car, .. } => Some(*car),
            _ => None,
        }
    }
}
