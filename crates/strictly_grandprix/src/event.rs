//! Domain events emitted alongside each snapshot.
//!
//! Events describe what a command did so observers can react (log, animate,
//! tally) without diffing snapshots.

use crate::dice::DieFace;
use crate::movement::ArrivalOutcome;
use crate::track::Occupant;
use crate::{CarId, PlayerId};
use serde::{Deserialize, Serialize};

/// Something that happened while applying a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A roll entered its in-flight window.
    RollStarted {
        /// Rolling player.
        player: PlayerId,
    },
    /// A roll was committed.
    DiceRolled {
        /// Rolling player.
        player: PlayerId,
        /// Committed face.
        value: DieFace,
    },
    /// The roll left the player nothing to do.
    TurnSkipped {
        /// Player whose turn ends.
        player: PlayerId,
        /// Face that could not be used.
        value: DieFace,
    },
    /// A car left the garage.
    CarSpawned {
        /// Owning player.
        player: PlayerId,
        /// Spawned car.
        car: CarId,
        /// Spawn cell.
        position: usize,
        /// Car previously recorded at the spawn cell, overwritten without a knockout.
        displaced: Option<Occupant>,
    },
    /// A car moved (onto an empty cell, a teammate, or an opponent).
    CarMoved {
        /// Owning player.
        player: PlayerId,
        /// Moved car.
        car: CarId,
        /// Starting cell.
        from: usize,
        /// Final cell.
        to: usize,
        /// How the arrival resolved.
        outcome: ArrivalOutcome,
    },
    /// A move was refused by an opponent on a safe cell; the car stayed put.
    MoveBlocked {
        /// Owning player.
        player: PlayerId,
        /// Car that tried to move.
        car: CarId,
        /// Cell the car stayed on.
        at: usize,
        /// Safe cell it could not enter.
        target: usize,
    },
    /// A car was sent back to its garage.
    CarKnockedOut {
        /// Owner of the knocked-out car.
        player: PlayerId,
        /// Knocked-out car.
        car: CarId,
        /// Cell it was knocked off.
        position: usize,
        /// Player whose car arrived.
        by: PlayerId,
    },
    /// The turn passed to the next player.
    TurnAdvanced {
        /// Player now to act.
        player: PlayerId,
        /// Turn number after advancing.
        turn_number: u32,
    },
    /// A player had all four cars on the track for the first time.
    PlayerWon {
        /// Winning player.
        player: PlayerId,
    },
    /// The race was restarted.
    GameReset,
}
