//! Driver that takes the first option offered.

use super::Driver;
use anyhow::Result;
use strictly_grandprix::{GameState, MoveCandidate};

/// Picks the first candidate: spawns before moves, lower car ids first.
#[derive(Debug, Clone, Default, derive_new::new)]
pub struct FirstLegalDriver;

#[async_trait::async_trait]
impl Driver for FirstLegalDriver {
    async fn choose(
        &mut self,
        _state: &GameState,
        candidates: &[MoveCandidate],
    ) -> Result<Option<MoveCandidate>> {
        Ok(candidates.first().copied())
    }

    fn name(&self) -> &str {
        "first"
    }
}
