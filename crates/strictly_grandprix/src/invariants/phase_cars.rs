//! Phase/cars invariant: a phase that waits for a car choice always has a car
//! to choose.

use super::{EngineView, Invariant};
use crate::GamePhase;

/// Invariant: the current player can act on the phase they are in.
///
/// - `WaitingForSpawn` needs a car in the garage.
/// - `WaitingForMove` needs a car on the track.
pub struct PhaseMatchesCars;

impl<'a> Invariant<EngineView<'a>> for PhaseMatchesCars {
    fn holds(view: &EngineView<'a>) -> bool {
        let state = view.state;
        let Some(player) = state.player(state.current_turn_index()) else {
            // Seat range belongs to TurnOrderInRange.
            return true;
        };
        match state.phase() {
            GamePhase::WaitingForSpawn => player.has_garage_car(),
            GamePhase::WaitingForMove => player.has_car_on_track(),
            GamePhase::WaitingForRoll | GamePhase::TurnComplete => true,
        }
    }

    fn description() -> &'static str {
        "A spawn or move phase leaves the current player a car to choose"
    }
}
