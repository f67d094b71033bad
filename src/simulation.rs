//! Headless batches of races.

use crate::config::GrandPrixConfig;
use crate::director::{DirectorError, RaceDirector, RaceSummary};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strictly_grandprix::Team;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument};

/// Aggregate results of a batch.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Races played.
    games: u32,
    /// Seed of the first race; race `i` uses `seed + i`.
    seed: u64,
    /// Wins per team name.
    wins: BTreeMap<String, u32>,
    /// Races that hit the turn limit without a winner.
    unfinished: u32,
    /// Mean final turn number, rounded to two decimals.
    mean_turns: f64,
    /// Total knockouts.
    knockouts: u64,
    /// Total blocked moves.
    blocked_moves: u64,
    /// Total skipped turns.
    skipped_turns: u64,
}

impl SimulationReport {
    fn tally(games: u32, seed: u64, summaries: &[RaceSummary]) -> Self {
        let mut wins: BTreeMap<String, u32> = Team::iter().map(|t| (t.to_string(), 0)).collect();
        let mut unfinished = 0;
        let mut turns = 0_u64;
        let (mut knockouts, mut blocked_moves, mut skipped_turns) = (0_u64, 0_u64, 0_u64);

        for summary in summaries {
            match summary.winner().and_then(Team::for_player) {
                Some(team) => *wins.entry(team.to_string()).or_default() += 1,
                None => unfinished += 1,
            }
            turns += u64::from(*summary.turn_number());
            knockouts += u64::from(*summary.knockouts());
            blocked_moves += u64::from(*summary.blocked_moves());
            skipped_turns += u64::from(*summary.skipped_turns());
        }

        let mean_turns = if summaries.is_empty() {
            0.0
        } else {
            (turns as f64 / summaries.len() as f64 * 100.0).round() / 100.0
        };

        Self {
            games,
            seed,
            wins,
            unfinished,
            mean_turns,
            knockouts,
            blocked_moves,
            skipped_turns,
        }
    }
}

/// Plays `games` races without delays, seeding race `i` with `seed + i`.
///
/// Driver policies, turn limit and the stop rule come from `config`; its seed
/// and delays are ignored.
#[instrument(skip(config))]
pub async fn simulate(
    config: &GrandPrixConfig,
    games: u32,
    seed: u64,
) -> Result<SimulationReport, DirectorError> {
    let mut summaries = Vec::with_capacity(games as usize);
    for game in 0..games {
        let race_seed = seed.wrapping_add(u64::from(game));
        let race = config.race().clone().with_seed(race_seed).without_delays();
        let mut director = RaceDirector::from_config(&config.clone().with_race(race));
        let summary = director.run().await?;
        debug!(game, winner = ?summary.winner(), turn = summary.turn_number(), "Race finished");
        summaries.push(summary);
    }

    let report = SimulationReport::tally(games, seed, &summaries);
    info!(games, unfinished = report.unfinished, mean_turns = report.mean_turns, "Simulation complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        let report = SimulationReport::tally(0, 1, &[]);
        assert_eq!(report.mean_turns, 0.0);
        assert_eq!(report.wins.len(), 4);
        assert!(report.wins.values().all(|&w| w == 0));
    }
}
