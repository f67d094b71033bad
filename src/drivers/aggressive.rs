//! Driver that hunts opponents.

use super::Driver;
use anyhow::Result;
use strictly_grandprix::{
    CandidateKind, GameState, MoveCandidate, TRACK_LENGTH, spawn_position,
};

/// Prefers knockouts, then spawns, then moving the car that has travelled
/// furthest from its spawn cell. Stacking is the last resort.
#[derive(Debug, Clone, Default, derive_new::new)]
pub struct AggressiveDriver;

fn rank(candidate: &MoveCandidate, spawn: usize) -> (u8, usize) {
    let travelled = candidate
        .from
        .map(|from| (from + TRACK_LENGTH - spawn) % TRACK_LENGTH)
        .unwrap_or_default();
    let priority = match candidate.kind {
        CandidateKind::KnockoutMove => 3,
        CandidateKind::Spawn => 2,
        CandidateKind::Move => 1,
        CandidateKind::Stack => 0,
    };
    (priority, travelled)
}

#[async_trait::async_trait]
impl Driver for AggressiveDriver {
    async fn choose(
        &mut self,
        state: &GameState,
        candidates: &[MoveCandidate],
    ) -> Result<Option<MoveCandidate>> {
        let spawn = spawn_position(state.current_turn_index());
        // max_by_key keeps the last maximum; reverse so ties go to the lowest car id.
        Ok(candidates
            .iter()
            .rev()
            .max_by_key(|candidate| rank(candidate, spawn))
            .copied())
    }

    fn name(&self) -> &str {
        "aggressive"
    }
}
