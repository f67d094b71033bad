//! Turn order invariant: the seat, turn number and winner always name real
//! players and counts.

use super::{EngineView, Invariant};
use crate::types::PLAYER_COUNT;

/// Invariant: the current seat and any winner are valid player ids, and the
/// turn number starts at 1.
pub struct TurnOrderInRange;

impl<'a> Invariant<EngineView<'a>> for TurnOrderInRange {
    fn holds(view: &EngineView<'a>) -> bool {
        let state = view.state;
        state.current_turn_index() < PLAYER_COUNT
            && state.turn_number() >= 1
            && state.winner().is_none_or(|w| w < PLAYER_COUNT)
    }

    fn description() -> &'static str {
        "Current seat and winner are valid players; turn number is at least 1"
    }
}
