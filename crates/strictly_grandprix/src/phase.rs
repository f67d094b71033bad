//! Turn phases.
//!
//! A turn walks `WaitingForRoll` → (`WaitingForSpawn` | `WaitingForMove`)? →
//! `TurnComplete`, and `TurnComplete` is always followed by an advance to the
//! next player's `WaitingForRoll`.

use serde::{Deserialize, Serialize};

/// Current step of the acting player's turn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
pub enum GamePhase {
    /// The current player must roll the dice.
    #[default]
    WaitingForRoll,
    /// The current player rolled a six and must bring a car out of the garage.
    WaitingForSpawn,
    /// The current player must pick an on-track car to move.
    WaitingForMove,
    /// The turn is over; the next command must advance to the next player.
    TurnComplete,
}

impl GamePhase {
    /// Returns true if the phase expects a car choice (spawn or move).
    pub fn awaits_car_choice(&self) -> bool {
        matches!(self, GamePhase::WaitingForSpawn | GamePhase::WaitingForMove)
    }
}
