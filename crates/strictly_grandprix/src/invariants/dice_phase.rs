//! Dice/phase invariant: a committed dice value exists exactly when the
//! current player is past the roll.

use super::{EngineView, Invariant};
use crate::GamePhase;

/// Invariant: the dice value and rolling flag agree with the phase.
///
/// - `WaitingForRoll` has no committed value; every other phase has one.
/// - A roll can only be in flight during `WaitingForRoll`.
/// - `WaitingForSpawn` is only reachable with a six.
pub struct DiceMatchesPhase;

impl<'a> Invariant<EngineView<'a>> for DiceMatchesPhase {
    fn holds(view: &EngineView<'a>) -> bool {
        let state = view.state;
        let dice = state.last_dice_value();
        match state.phase() {
            GamePhase::WaitingForRoll => dice.is_none(),
            GamePhase::WaitingForSpawn => {
                !state.dice_rolling() && dice.is_some_and(|face| face.is_six())
            }
            GamePhase::WaitingForMove | GamePhase::TurnComplete => {
                !state.dice_rolling() && dice.is_some()
            }
        }
    }

    fn description() -> &'static str {
        "Dice value is committed exactly when the roll is over, and rolling only while waiting for it"
    }
}
