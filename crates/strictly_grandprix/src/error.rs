//! Engine error types.
//!
//! Every rejected command leaves the engine exactly as it was; the error only
//! describes why the command was refused.

use crate::{CarId, Command, GamePhase, PlayerId};

/// Error returned when a command or query cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// The command is not legal in the current phase (or its car guard failed).
    #[display("Cannot apply {} during {}", command, phase)]
    InvalidPhaseTransition {
        /// Phase the engine was in.
        phase: GamePhase,
        /// The refused command.
        command: Command,
    },

    /// The command names a player other than the one whose turn it is.
    #[display("Player {} acted out of turn (current player is {})", actor, current)]
    NotCurrentPlayer {
        /// Player named by the command.
        actor: PlayerId,
        /// Player whose turn it is.
        current: PlayerId,
    },

    /// A roll was requested while another roll is still in flight.
    #[display("A dice roll is already in flight")]
    AlreadyRolling,

    /// A commit was requested but no roll is in flight.
    #[display("No dice roll is in flight")]
    NoRollInFlight,

    /// Unknown player or car id.
    #[display("Unknown player {} or car {:?}", player, car)]
    InvalidReference {
        /// Player id named by the caller.
        player: PlayerId,
        /// Car id named by the caller, if any.
        car: Option<CarId>,
    },

    /// A track position outside `0..52`.
    #[display("Track position {} is out of range", _0)]
    OutOfRange(usize),

    /// A die value outside `1..=6`.
    #[display("Die face {} is outside 1..=6", _0)]
    InvalidDieFace(u8),

    /// A scripted face source was built with no faces.
    #[display("Scripted dice need at least one face")]
    EmptyFaceScript,

    /// A postcondition failed after applying a command.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),

    /// A snapshot handed to `restore` is not a reachable engine state.
    #[display("Invalid snapshot: {}", _0)]
    InvalidSnapshot(String),
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_error_display() {
        let err = EngineError::InvalidPhaseTransition {
            phase: GamePhase::WaitingForRoll,
            command: Command::AdvanceTurn,
        };
        assert_eq!(err.to_string(), "Cannot apply AdvanceTurn during WaitingForRoll");
    }

    #[test]
    fn test_reference_error_display() {
        let err = EngineError::InvalidReference {
            player: 7,
            car: Some(2),
        };
        assert_eq!(err.to_string(), "Unknown player 7 or car Some(2)");
    }
}
