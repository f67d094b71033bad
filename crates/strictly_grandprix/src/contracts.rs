//! Contract-based validation for Grand Prix commands.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} command {Q}. Preconditions are small named checks composed in a fixed
//! order, so the first failing check decides the error a caller sees.

use crate::invariants::{EngineInvariants, EngineView, InvariantSet};
use crate::turn::TurnStateMachine;
use crate::types::{CARS_PER_PLAYER, PLAYER_COUNT};
use crate::{Command, EngineError, GamePhase};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} must hold before applying the action
/// - Postcondition: {Q(before, after)} must hold after applying it
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), EngineError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), EngineError>;
}

// ─────────────────────────────────────────────────────────────
//  Command Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: player and car ids named by the command exist.
pub struct KnownReferences;

impl KnownReferences {
    /// Rejects unknown ids with `InvalidReference`.
    pub fn check(command: &Command) -> Result<(), EngineError> {
        match (command.actor(), command.car()) {
            (Some(player), Some(car)) if player >= PLAYER_COUNT || car >= CARS_PER_PLAYER => {
                Err(EngineError::InvalidReference {
                    player,
                    car: Some(car),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Precondition: the command belongs to the current phase.
pub struct PhaseAllows;

impl PhaseAllows {
    /// Rejects out-of-phase commands with `InvalidPhaseTransition`.
    pub fn check(view: &EngineView<'_>, command: &Command) -> Result<(), EngineError> {
        let phase = view.state.phase();
        match TurnStateMachine::required_phase(command) {
            Some(required) if required != phase => {
                Err(EngineError::InvalidPhaseTransition {
                    phase,
                    command: *command,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Precondition: at most one roll is in flight, and a commit needs one.
pub struct RollWindow;

impl RollWindow {
    /// Rejects a second roll with `AlreadyRolling` and a bare commit with
    /// `NoRollInFlight`.
    pub fn check(view: &EngineView<'_>, command: &Command) -> Result<(), EngineError> {
        let rolling = view.state.dice_rolling();
        match command {
            Command::RollDice if rolling => Err(EngineError::AlreadyRolling),
            Command::CommitRoll if !rolling => Err(EngineError::NoRollInFlight),
            _ => Ok(()),
        }
    }
}

/// Precondition: the command is issued by the player whose turn it is.
pub struct ActorIsCurrent;

impl ActorIsCurrent {
    /// Rejects other players with `NotCurrentPlayer`.
    pub fn check(view: &EngineView<'_>, command: &Command) -> Result<(), EngineError> {
        let current = view.state.current_turn_index();
        match command.actor() {
            Some(actor) if actor != current => {
                Err(EngineError::NotCurrentPlayer { actor, current })
            }
            _ => Ok(()),
        }
    }
}

/// Precondition: a spawned car is still in its garage.
pub struct CarInGarage;

impl CarInGarage {
    /// Rejects spawning an on-track car with `InvalidPhaseTransition`.
    pub fn check(view: &EngineView<'_>, command: &Command) -> Result<(), EngineError> {
        let Command::SpawnCar { player, car } = *command else {
            return Ok(());
        };
        let in_garage = view
            .state
            .player(player)
            .and_then(|p| p.car(car))
            .is_some_and(|c| c.is_in_garage());
        guard(in_garage, view.state.phase(), command)
    }
}

/// Precondition: a moved car is on the track.
pub struct CarOnTrack;

impl CarOnTrack {
    /// Rejects moving a garage car with `InvalidPhaseTransition`.
    pub fn check(view: &EngineView<'_>, command: &Command) -> Result<(), EngineError> {
        let Command::MoveCar { player, car } = *command else {
            return Ok(());
        };
        let on_track = view
            .state
            .player(player)
            .and_then(|p| p.car(car))
            .is_some_and(|c| c.is_active());
        guard(on_track, view.state.phase(), command)
    }
}

fn guard(ok: bool, phase: GamePhase, command: &Command) -> Result<(), EngineError> {
    if ok {
        Ok(())
    } else {
        Err(EngineError::InvalidPhaseTransition {
            phase,
            command: *command,
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  Command Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for every engine command.
///
/// Preconditions, in order:
/// - Ids are known
/// - Phase accepts the command
/// - Roll window is respected
/// - Actor is the current player
/// - Car location matches the command
///
/// Postconditions:
/// - Every engine invariant holds
/// - Turn number never decreases, except when the race restarts
pub struct CommandContract;

impl<'a> Contract<EngineView<'a>, Command> for CommandContract {
    #[instrument(skip(view), fields(phase = %view.state.phase()))]
    fn pre(view: &EngineView<'a>, command: &Command) -> Result<(), EngineError> {
        KnownReferences::check(command)?;
        PhaseAllows::check(view, command)?;
        RollWindow::check(view, command)?;
        ActorIsCurrent::check(view, command)?;
        CarInGarage::check(view, command)?;
        CarOnTrack::check(view, command)?;
        Ok(())
    }

    fn post(before: &EngineView<'a>, after: &EngineView<'a>) -> Result<(), EngineError> {
        EngineInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Postcondition failed");
            EngineError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })?;

        let restarted = after.state.turn_number() == 1 && after.track.occupied_count() == 0;
        if after.state.turn_number() < before.state.turn_number() && !restarted {
            return Err(EngineError::InvariantViolation(format!(
                "Turn number went backwards: {} -> {}",
                before.state.turn_number(),
                after.state.turn_number()
            )));
        }
        Ok(())
    }
}
