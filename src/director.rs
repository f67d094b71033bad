//! Race director: drives a race in real time.
//!
//! The engine never sleeps. The director is the caller that puts the roll
//! delay between beginning and committing a roll, asks drivers for a choice,
//! and waits before handing the turn on. Every event goes out on an optional
//! channel for observers.

use crate::config::{GrandPrixConfig, RaceConfig};
use crate::drivers::Driver;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strictly_grandprix::{
    CandidateKind, Command, EngineError, GameEngine, GameEvent, GamePhase, GameState,
    MoveCandidate, PLAYER_COUNT, PlayerId, Transition,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Real-time pacing of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, derive_new::new)]
pub struct Timing {
    /// Wait between beginning and committing a roll.
    roll_delay: Duration,
    /// Wait before advancing to the next player.
    advance_delay: Duration,
}

impl Timing {
    /// No waiting at all, for simulations and tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl From<&RaceConfig> for Timing {
    fn from(race: &RaceConfig) -> Self {
        Self::new(
            Duration::from_millis(*race.roll_delay_ms()),
            Duration::from_millis(*race.advance_delay_ms()),
        )
    }
}

/// What happened over a whole race.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct RaceSummary {
    /// Winning player, if anyone won.
    winner: Option<PlayerId>,
    /// Turn number of the final snapshot.
    turn_number: u32,
    /// Commands the engine accepted.
    commands: usize,
    /// Cars sent back to a garage.
    knockouts: u32,
    /// Moves refused by a guarded safe cell.
    blocked_moves: u32,
    /// Rolls that left the player nothing to do.
    skipped_turns: u32,
    /// Snapshot the race ended on.
    final_state: GameState,
}

/// Director error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Director error: {} at {}:{}", message, file, line)]
pub struct DirectorError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DirectorError {
    /// Creates a new director error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<EngineError> for DirectorError {
    #[track_caller]
    fn from(err: EngineError) -> Self {
        Self::new(format!("Engine refused command: {}", err))
    }
}

impl From<anyhow::Error> for DirectorError {
    #[track_caller]
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("Driver failed: {}", err))
    }
}

#[derive(Debug, Default)]
struct Tally {
    commands: usize,
    knockouts: u32,
    blocked_moves: u32,
    skipped_turns: u32,
}

impl Tally {
    fn record(&mut self, events: &[GameEvent]) {
        self.commands += 1;
        for event in events {
            match event {
                GameEvent::CarKnockedOut { .. } => self.knockouts += 1,
                GameEvent::MoveBlocked { .. } => self.blocked_moves += 1,
                GameEvent::TurnSkipped { .. } => self.skipped_turns += 1,
                _ => {}
            }
        }
    }
}

/// Runs one race between four drivers.
pub struct RaceDirector {
    engine: GameEngine,
    drivers: [Box<dyn Driver>; PLAYER_COUNT],
    timing: Timing,
    max_turns: u32,
    stop_on_winner: bool,
    event_tx: Option<mpsc::UnboundedSender<GameEvent>>,
    tally: Tally,
}

impl RaceDirector {
    /// Creates a director over an engine and one driver per seat.
    pub fn new(
        engine: GameEngine,
        drivers: [Box<dyn Driver>; PLAYER_COUNT],
        timing: Timing,
        max_turns: u32,
        stop_on_winner: bool,
    ) -> Self {
        Self {
            engine,
            drivers,
            timing,
            max_turns,
            stop_on_winner,
            event_tx: None,
            tally: Tally::default(),
        }
    }

    /// Builds engine and drivers from configuration.
    ///
    /// A missing seed is drawn from the OS and logged so the race can be
    /// replayed.
    #[instrument(skip(config))]
    pub fn from_config(config: &GrandPrixConfig) -> Self {
        let race = config.race();
        let seed = race.seed().unwrap_or_else(rand::random);
        info!(seed, "Race seed");
        let kinds = config.drivers().seats();
        let drivers = std::array::from_fn(|seat| {
            kinds[seat].build(seed.wrapping_add(seat as u64 + 1))
        });
        Self::new(
            GameEngine::seeded(seed),
            drivers,
            Timing::from(race),
            *race.max_turns(),
            *race.stop_on_winner(),
        )
    }

    /// Publishes every event on `event_tx`.
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Borrows the engine.
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Runs turns until a winner (when configured to stop) or the turn limit.
    #[instrument(skip(self), fields(max_turns = self.max_turns))]
    pub async fn run(&mut self) -> Result<RaceSummary, DirectorError> {
        info!("Starting race");
        loop {
            let state = self.engine.state();
            if self.stop_on_winner && state.winner().is_some() {
                info!(winner = ?state.winner(), turn = state.turn_number(), "Race won");
                break;
            }
            if state.turn_number() > self.max_turns {
                info!(turn = state.turn_number(), "Turn limit reached");
                break;
            }
            self.play_turn().await?;
        }

        let final_state = self.engine.snapshot();
        Ok(RaceSummary {
            winner: final_state.winner(),
            turn_number: final_state.turn_number(),
            commands: self.tally.commands,
            knockouts: self.tally.knockouts,
            blocked_moves: self.tally.blocked_moves,
            skipped_turns: self.tally.skipped_turns,
            final_state,
        })
    }

    /// Plays the current player's turn from roll to advance.
    #[instrument(skip(self), fields(player = self.engine.state().current_turn_index()))]
    pub async fn play_turn(&mut self) -> Result<(), DirectorError> {
        let started = self.engine.roll_dice()?;
        self.publish(started);
        pause(self.timing.roll_delay).await;
        let committed = self.engine.commit_roll()?;
        self.publish(committed);

        let phase = self.engine.state().phase();
        match phase {
            phase if phase.awaits_car_choice() => {
                let command = self.decide(phase).await?;
                let acted = self.engine.apply(command)?;
                self.publish(acted);
            }
            GamePhase::WaitingForRoll => {
                return Err(DirectorError::new("Roll committed but phase did not advance"));
            }
            _ => {}
        }

        pause(self.timing.advance_delay).await;
        let advanced = self.engine.advance_turn()?;
        self.publish(advanced);
        Ok(())
    }

    async fn decide(&mut self, phase: GamePhase) -> Result<Command, DirectorError> {
        let player = self.engine.state().current_turn_index();
        let candidates: Vec<MoveCandidate> = self
            .engine
            .legal_moves(player)?
            .into_iter()
            .filter(|c| (c.kind == CandidateKind::Spawn) == (phase == GamePhase::WaitingForSpawn))
            .collect();

        let driver = &mut self.drivers[player];
        let choice = driver.choose(self.engine.state(), &candidates).await?;
        debug!(driver = driver.name(), options = candidates.len(), ?choice, "Driver decided");

        match choice {
            Some(candidate) if candidate.kind == CandidateKind::Spawn => Ok(Command::SpawnCar {
                player,
                car: candidate.car,
            }),
            Some(candidate) => Ok(Command::MoveCar {
                player,
                car: candidate.car,
            }),
            // Every on-track car is blocked; moving one resolves as blocked.
            None => self
                .engine
                .available_actions()
                .into_iter()
                .next()
                .ok_or_else(|| DirectorError::new("No action available after roll")),
        }
    }

    fn publish(&mut self, transition: Transition) {
        self.tally.record(&transition.events);
        let Some(tx) = &self.event_tx else {
            return;
        };
        for event in transition.events {
            if tx.send(event).is_err() {
                warn!("Event receiver dropped, no longer publishing");
                self.event_tx = None;
                return;
            }
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::FirstLegalDriver;
    use strictly_grandprix::{Occupant, ScriptedFaces};

    fn first_drivers() -> [Box<dyn Driver>; PLAYER_COUNT] {
        std::array::from_fn(|_| Box::new(FirstLegalDriver::new()) as Box<dyn Driver>)
    }

    #[tokio::test]
    async fn test_blocked_turn_still_completes() {
        let lineup = GameState::initial()
            .with_car_on_track(0, 0, 48)
            .unwrap()
            .with_car_on_track(1, 0, 0)
            .unwrap();
        let engine =
            GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[4]).unwrap()).unwrap();
        let mut director = RaceDirector::new(engine, first_drivers(), Timing::instant(), 1, true);

        director.play_turn().await.unwrap();
        assert_eq!(director.tally.blocked_moves, 1);
        assert_eq!(director.engine().state().current_turn_index(), 1);
    }

    #[tokio::test]
    async fn test_six_turn_asks_driver_to_spawn() {
        let engine = GameEngine::new(ScriptedFaces::from_values(&[6]).unwrap());
        let mut director = RaceDirector::new(engine, first_drivers(), Timing::instant(), 1, true);

        director.play_turn().await.unwrap();
        let ferrari = director.engine().state().player(0).unwrap();
        assert_eq!(ferrari.track_cars().count(), 1);
        assert_eq!(director.engine().track_occupancy()[0], Some(Occupant::new(0, 0)));
        assert_eq!(director.engine().state().current_turn_index(), 1);
    }

    #[tokio::test]
    async fn test_turn_limit_stops_race() {
        let engine = GameEngine::new(ScriptedFaces::from_values(&[2]).unwrap());
        let mut director = RaceDirector::new(engine, first_drivers(), Timing::instant(), 3, true);
        let summary = director.run().await.unwrap();
        assert_eq!(*summary.turn_number(), 4);
        assert_eq!(*summary.skipped_turns(), 12);
        assert_eq!(*summary.winner(), None);
    }
}
