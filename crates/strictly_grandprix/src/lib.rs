//! Strictly Grand Prix - pure race-board game logic.
//!
//! Four teams each race four cars around a 52-cell circular track. Cars leave
//! the garage on a six, move by dice value, and knock opposing cars back to
//! their garage when landing on them anywhere except the four safe cells.
//!
//! # Architecture
//!
//! - **Dice**: injected face source, two-phase roll (begin, commit), bounded history
//! - **Track**: canonical cell occupancy map
//! - **Movement**: destination arithmetic and collision resolution
//! - **Turn**: phase graph and legal actions
//! - **Engine**: composition root; commands in, snapshots and events out;
//!   races save and restore together with their track
//!
//! # Example
//!
//! ```
//! use strictly_grandprix::{GameEngine, GamePhase, ScriptedFaces};
//!
//! # fn example() -> Result<(), strictly_grandprix::EngineError> {
//! let mut engine = GameEngine::new(ScriptedFaces::from_values(&[6])?);
//! engine.roll_dice()?;
//! let transition = engine.commit_roll()?;
//! assert_eq!(transition.snapshot.phase(), GamePhase::WaitingForSpawn);
//!
//! let transition = engine.spawn_car(0, 0)?;
//! assert_eq!(transition.snapshot.phase(), GamePhase::TurnComplete);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod command;
mod contracts;
mod dice;
mod engine;
mod error;
mod event;
pub mod invariants;
mod movement;
mod phase;
mod track;
mod turn;
mod types;

pub use command::Command;
pub use contracts::{
    ActorIsCurrent, CarInGarage, CarOnTrack, CommandContract, Contract, KnownReferences,
    PhaseAllows, RollWindow,
};
pub use dice::{
    Dice, DieFace, FaceSource, HISTORY_LIMIT, RandomFaces, RollStatistics, ScriptedFaces,
};
pub use engine::{GameEngine, SavedRace, Transition};
pub use error::EngineError;
pub use event::GameEvent;
pub use invariants::EngineView;
pub use movement::{
    ArrivalOutcome, CandidateKind, MoveCandidate, MoveResult, MovementResolver, destination,
    legal_moves, peek_arrival, spawn_position,
};
pub use phase::GamePhase;
pub use track::{
    Occupant, SAFE_CELLS, TRACK_LENGTH, Track, TrackGeometry, TrackPoint, is_safe_cell,
};
pub use turn::{TurnStateMachine, legal_actions};
pub use types::{
    CARS_PER_PLAYER, Car, CarId, CarLocation, GameState, PLAYER_COUNT, Player, PlayerId, Team,
};
