//! Driver that picks uniformly at random.

use super::Driver;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use strictly_grandprix::{GameState, MoveCandidate};
use tracing::trace;

/// Picks a candidate uniformly from its own seeded generator.
#[derive(Debug, Clone)]
pub struct RandomDriver {
    rng: StdRng,
}

impl RandomDriver {
    /// Creates a driver with a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

#[async_trait::async_trait]
impl Driver for RandomDriver {
    async fn choose(
        &mut self,
        _state: &GameState,
        candidates: &[MoveCandidate],
    ) -> Result<Option<MoveCandidate>> {
        let choice = candidates.choose(&mut self.rng).copied();
        trace!(options = candidates.len(), ?choice, "Random pick");
        Ok(choice)
    }

    fn name(&self) -> &str {
        "random"
    }
}
