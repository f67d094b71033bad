//! Track consistency invariant: every recorded occupant is a real car sitting
//! on that cell.
//!
//! The converse does not hold. A teammate overwritten by a stack, or an
//! opponent overwritten by a spawn, stays on the track without a cell entry.

use super::{EngineView, Invariant};
use crate::types::CarLocation;

/// Invariant: each occupied cell names a car whose location is that cell.
pub struct TrackMatchesCars;

impl<'a> Invariant<EngineView<'a>> for TrackMatchesCars {
    fn holds(view: &EngineView<'a>) -> bool {
        view.track.occupied().all(|(position, occupant)| {
            view.state
                .player(occupant.player)
                .and_then(|player| player.car(occupant.car))
                .is_some_and(|car| car.location() == CarLocation::OnTrack(position))
        })
    }

    fn description() -> &'static str {
        "Every occupied track cell names a car located on that cell"
    }
}
