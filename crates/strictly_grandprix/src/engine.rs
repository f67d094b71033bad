//! Game engine: the composition root.
//!
//! The engine owns the snapshot, the track and the dice. Every command is
//! checked against [`CommandContract`], applied to copies, verified, and only
//! then committed, so a rejected command leaves the engine untouched.

use crate::contracts::{CommandContract, Contract};
use crate::dice::{Dice, DieFace, FaceSource, RandomFaces, RollStatistics};
use crate::invariants::{EngineInvariants, EngineView, InvariantSet};
use crate::movement::{
    ArrivalOutcome, MoveCandidate, MovementResolver, destination, legal_moves, spawn_position,
};
use crate::track::{Occupant, TRACK_LENGTH, Track};
use crate::turn::{TurnStateMachine, legal_actions};
use crate::types::{CarId, CarLocation, GameState, PlayerId};
use crate::{Command, EngineError, GameEvent, GamePhase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Outcome of an accepted command: the new snapshot and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Snapshot after the command.
    pub snapshot: GameState,
    /// Events in the order they occurred.
    pub events: Vec<GameEvent>,
}

/// A race as persisted: the snapshot plus who is recorded on each cell.
///
/// Two cars of one player can share a cell while only one is recorded, so
/// the snapshot alone does not determine which car a knockout removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRace {
    /// Snapshot of the race.
    pub state: GameState,
    /// Recorded occupant of each cell.
    pub track: Track,
}

/// Single-writer race engine.
#[derive(Debug)]
pub struct GameEngine {
    state: GameState,
    track: Track,
    dice: Dice,
}

impl GameEngine {
    /// Creates an engine at the starting snapshot, drawing faces from `source`.
    pub fn new(source: impl FaceSource + 'static) -> Self {
        Self {
            state: GameState::initial(),
            track: Track::new(),
            dice: Dice::new(source),
        }
    }

    /// Creates an engine with uniformly random dice seeded from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RandomFaces::seeded(seed))
    }

    /// Captures the snapshot together with the exact track occupancy.
    pub fn save(&self) -> SavedRace {
        SavedRace {
            state: self.state.clone(),
            track: self.track.clone(),
        }
    }

    /// Rebuilds an engine from a saved race, loading its track as recorded.
    ///
    /// Dice history starts empty; the committed face is carried over.
    ///
    /// # Errors
    ///
    /// `InvalidSnapshot` if the snapshot has a roll in flight, mismatched ids,
    /// off-track positions, or the pair breaks an engine invariant.
    #[instrument(skip(saved, source), fields(phase = %saved.state.phase()))]
    pub fn restore(
        saved: SavedRace,
        source: impl FaceSource + 'static,
    ) -> Result<Self, EngineError> {
        let SavedRace { state, track } = saved;
        let placed = on_track_cars(&state)?;
        debug!(cars_on_track = placed.len(), "Saved lineup validated");
        Self::checked(state, track, source)
    }

    /// Builds an engine from a hand-made lineup with no recorded track.
    ///
    /// On-track cars are placed in player then car order, so for a shared
    /// cell the highest car id is recorded.
    ///
    /// # Errors
    ///
    /// Same as [`restore`](GameEngine::restore).
    #[instrument(skip(lineup, source), fields(phase = %lineup.phase()))]
    pub fn from_lineup(
        lineup: GameState,
        source: impl FaceSource + 'static,
    ) -> Result<Self, EngineError> {
        let mut track = Track::new();
        for (position, player, car) in on_track_cars(&lineup)? {
            track.set(position, Occupant::new(player, car));
        }
        Self::checked(lineup, track, source)
    }

    fn checked(
        state: GameState,
        track: Track,
        source: impl FaceSource + 'static,
    ) -> Result<Self, EngineError> {
        if state.dice_rolling() {
            return Err(EngineError::InvalidSnapshot(
                "a dice roll is in flight".to_string(),
            ));
        }

        EngineInvariants::check_all(&EngineView::new(&state, &track)).map_err(|violations| {
            EngineError::InvalidSnapshot(
                violations
                    .iter()
                    .map(|v| v.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        let mut dice = Dice::new(source);
        dice.resume(state.last_dice_value());
        info!(
            turn = state.turn_number(),
            cars_on_track = track.occupied_count(),
            "Engine restored"
        );
        Ok(Self { state, track, dice })
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Borrows the current snapshot.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns a copy of every track cell.
    pub fn track_occupancy(&self) -> [Option<Occupant>; TRACK_LENGTH] {
        self.track.cells()
    }

    /// Statistics over the retained roll history.
    pub fn roll_statistics(&self) -> RollStatistics {
        self.dice.statistics()
    }

    /// Retained roll history, oldest first.
    pub fn roll_history(&self) -> Vec<DieFace> {
        self.dice.history()
    }

    /// Legal options for `player` with the committed dice value.
    ///
    /// Empty when no value is committed.
    ///
    /// # Errors
    ///
    /// `InvalidReference` for an unknown player.
    pub fn legal_moves(&self, player: PlayerId) -> Result<Vec<MoveCandidate>, EngineError> {
        let p = self
            .state
            .player(player)
            .ok_or(EngineError::InvalidReference { player, car: None })?;
        Ok(self
            .state
            .last_dice_value()
            .map(|dice| legal_moves(&self.track, p, dice))
            .unwrap_or_default())
    }

    /// Commands the current player may issue right now.
    pub fn available_actions(&self) -> Vec<Command> {
        if self.state.dice_rolling() {
            return vec![Command::CommitRoll];
        }
        legal_actions(
            self.state.phase(),
            self.state.current_player(),
            self.state.last_dice_value(),
        )
    }

    // ─────────────────────────────────────────────────────────────
    //  Commands
    // ─────────────────────────────────────────────────────────────

    /// Begins a roll for the current player.
    pub fn roll_dice(&mut self) -> Result<Transition, EngineError> {
        self.apply(Command::RollDice)
    }

    /// Commits the roll in flight and computes the next phase.
    pub fn commit_roll(&mut self) -> Result<Transition, EngineError> {
        self.apply(Command::CommitRoll)
    }

    /// Brings a garage car onto the player's spawn cell.
    pub fn spawn_car(&mut self, player: PlayerId, car: CarId) -> Result<Transition, EngineError> {
        self.apply(Command::SpawnCar { player, car })
    }

    /// Moves an on-track car by the committed dice value.
    pub fn move_car(&mut self, player: PlayerId, car: CarId) -> Result<Transition, EngineError> {
        self.apply(Command::MoveCar { player, car })
    }

    /// Hands the turn to the next player.
    pub fn advance_turn(&mut self) -> Result<Transition, EngineError> {
        self.apply(Command::AdvanceTurn)
    }

    /// Restarts the race, keeping names, colors and the face source.
    pub fn reset(&mut self) -> Result<Transition, EngineError> {
        self.apply(Command::Reset)
    }

    /// Applies a command atomically.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]; the engine is unchanged on error.
    #[instrument(
        skip(self),
        fields(current = self.state.current_turn_index(), phase = %self.state.phase())
    )]
    pub fn apply(&mut self, command: Command) -> Result<Transition, EngineError> {
        CommandContract::pre(&EngineView::new(&self.state, &self.track), &command).inspect_err(
            |error| debug!(%error, "Command rejected"),
        )?;

        let mut next = self.state.clone();
        let mut track = self.track.clone();
        let events = match command {
            Command::RollDice => {
                next.dice_rolling = true;
                vec![GameEvent::RollStarted {
                    player: next.current_turn_index(),
                }]
            }
            Command::CommitRoll => {
                let face = self.dice.pending().ok_or(EngineError::NoRollInFlight)?;
                resolve_roll(&mut next, face)
            }
            Command::SpawnCar { player, car } => resolve_spawn(&mut next, &mut track, player, car)?,
            Command::MoveCar { player, car } => resolve_move(&mut next, &mut track, player, car)?,
            Command::AdvanceTurn => resolve_advance(&mut next),
            Command::Reset => {
                next = self.state.restarted();
                track = Track::new();
                vec![GameEvent::GameReset]
            }
        };

        #[cfg(debug_assertions)]
        CommandContract::post(
            &EngineView::new(&self.state, &self.track),
            &EngineView::new(&next, &track),
        )?;

        match command {
            Command::RollDice => {
                self.dice.begin_roll()?;
            }
            Command::CommitRoll => {
                self.dice.commit_roll()?;
            }
            Command::Reset => self.dice.reset(),
            _ => {}
        }

        self.state = next;
        self.track = track;
        debug!(phase = %self.state.phase(), events = events.len(), "Command applied");
        Ok(Transition {
            snapshot: self.state.clone(),
            events,
        })
    }
}

/// Lists `(position, player, car)` for every car on track, checking seat and
/// car ids and that positions lie on the loop.
fn on_track_cars(state: &GameState) -> Result<Vec<(usize, PlayerId, CarId)>, EngineError> {
    let mut placed = Vec::new();
    for (index, player) in state.players().iter().enumerate() {
        if player.id() != index {
            return Err(EngineError::InvalidSnapshot(format!(
                "player at seat {} has id {}",
                index,
                player.id()
            )));
        }
        for (car_index, car) in player.cars().iter().enumerate() {
            if car.id() != car_index {
                return Err(EngineError::InvalidSnapshot(format!(
                    "car {} of player {} has id {}",
                    car_index,
                    index,
                    car.id()
                )));
            }
            if let CarLocation::OnTrack(position) = car.location() {
                if position >= TRACK_LENGTH {
                    return Err(EngineError::InvalidSnapshot(format!(
                        "car {} of player {} is at cell {}",
                        car_index, index, position
                    )));
                }
                placed.push((position, index, car_index));
            }
        }
    }
    Ok(placed)
}

fn resolve_roll(next: &mut GameState, face: DieFace) -> Vec<GameEvent> {
    let player = next.current_turn_index();
    let phase = TurnStateMachine::after_roll(face, next.current_player());
    next.dice_rolling = false;
    next.last_dice_value = Some(face);
    next.phase = phase;

    let mut events = vec![GameEvent::DiceRolled {
        player,
        value: face,
    }];
    if phase == GamePhase::TurnComplete {
        debug!(player, face = face.value(), "Nothing to play, turn skipped");
        events.push(GameEvent::TurnSkipped {
            player,
            value: face,
        });
    }
    events
}

fn resolve_spawn(
    next: &mut GameState,
    track: &mut Track,
    player: PlayerId,
    car: CarId,
) -> Result<Vec<GameEvent>, EngineError> {
    let position = spawn_position(player);
    next.car_mut(player, car)
        .ok_or(EngineError::InvalidReference {
            player,
            car: Some(car),
        })?
        .place(position);
    let displaced = MovementResolver::new(track).spawn_car(player, car, position);
    next.phase = TurnStateMachine::after_car_action();

    let mut events = vec![GameEvent::CarSpawned {
        player,
        car,
        position,
        displaced,
    }];
    record_winner(next, player, &mut events);
    Ok(events)
}

fn resolve_move(
    next: &mut GameState,
    track: &mut Track,
    player: PlayerId,
    car: CarId,
) -> Result<Vec<GameEvent>, EngineError> {
    let face = next.last_dice_value().ok_or(EngineError::InvalidPhaseTransition {
        phase: next.phase(),
        command: Command::MoveCar { player, car },
    })?;
    let origin = next
        .player(player)
        .and_then(|p| p.car(car))
        .and_then(|c| c.track_position())
        .ok_or(EngineError::InvalidReference {
            player,
            car: Some(car),
        })?;
    let steps = usize::from(face.value());

    let result = MovementResolver::new(track).move_car(Occupant::new(player, car), origin, steps);
    let mut events = Vec::new();
    if result.outcome == ArrivalOutcome::Blocked {
        events.push(GameEvent::MoveBlocked {
            player,
            car,
            at: origin,
            target: destination(origin, steps),
        });
    } else {
        next.car_mut(player, car)
            .ok_or(EngineError::InvalidReference {
                player,
                car: Some(car),
            })?
            .place(result.position);
        events.push(GameEvent::CarMoved {
            player,
            car,
            from: origin,
            to: result.position,
            outcome: result.outcome,
        });
        if let Some(victim) = result.knocked_out {
            next.car_mut(victim.player, victim.car)
                .ok_or(EngineError::InvalidReference {
                    player: victim.player,
                    car: Some(victim.car),
                })?
                .send_to_garage();
            info!(
                victim = victim.player,
                victim_car = victim.car,
                by = player,
                position = result.position,
                "Car knocked out"
            );
            events.push(GameEvent::CarKnockedOut {
                player: victim.player,
                car: victim.car,
                position: result.position,
                by: player,
            });
        }
    }

    next.phase = TurnStateMachine::after_car_action();
    record_winner(next, player, &mut events);
    Ok(events)
}

fn resolve_advance(next: &mut GameState) -> Vec<GameEvent> {
    let (player, turn_number) =
        TurnStateMachine::advance(next.current_turn_index(), next.turn_number());
    next.current_turn_index = player;
    next.turn_number = turn_number;
    next.phase = GamePhase::WaitingForRoll;
    next.last_dice_value = None;
    vec![GameEvent::TurnAdvanced {
        player,
        turn_number,
    }]
}

fn record_winner(next: &mut GameState, player: PlayerId, events: &mut Vec<GameEvent>) {
    if next.winner().is_some() {
        return;
    }
    if next.player(player).is_some_and(TurnStateMachine::has_won) {
        info!(player, "Player has every car on track");
        next.winner = Some(player);
        events.push(GameEvent::PlayerWon { player });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedFaces;
    use crate::invariants::{Invariant, PhaseMatchesCars};

    fn scripted(values: &[u8]) -> GameEngine {
        GameEngine::new(ScriptedFaces::from_values(values).unwrap())
    }

    #[test]
    fn test_roll_window() {
        let mut engine = scripted(&[4]);
        let started = engine.roll_dice().unwrap();
        assert!(started.snapshot.dice_rolling());
        assert_eq!(started.events, vec![GameEvent::RollStarted { player: 0 }]);
        assert_eq!(engine.available_actions(), vec![Command::CommitRoll]);
        assert_eq!(engine.roll_dice(), Err(EngineError::AlreadyRolling));

        let committed = engine.commit_roll().unwrap();
        assert!(!committed.snapshot.dice_rolling());
        assert_eq!(committed.snapshot.last_dice_value().map(DieFace::value), Some(4));
        assert_eq!(committed.snapshot.phase(), GamePhase::TurnComplete);
        assert_eq!(engine.roll_history().len(), 1);
    }

    #[test]
    fn test_rejection_leaves_engine_untouched() {
        let mut engine = scripted(&[2]);
        let before = engine.snapshot();
        assert!(engine.move_car(0, 0).is_err());
        assert!(engine.advance_turn().is_err());
        assert_eq!(engine.snapshot(), before);
        assert!(engine.roll_history().is_empty());
    }

    #[test]
    fn test_reset_mid_roll_discards_pending() {
        let mut engine = scripted(&[6]);
        engine.roll_dice().unwrap();
        let reset = engine.reset().unwrap();
        assert_eq!(reset.events, vec![GameEvent::GameReset]);
        assert!(!reset.snapshot.dice_rolling());
        assert_eq!(engine.commit_roll(), Err(EngineError::NoRollInFlight));
    }

    #[test]
    fn test_winner_is_sticky() {
        let mut lineup = GameState::initial();
        for car in 0..3 {
            lineup = lineup.with_car_on_track(0, car, 20 + car).unwrap();
        }
        let mut engine =
            GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[6]).unwrap()).unwrap();
        engine.roll_dice().unwrap();
        engine.commit_roll().unwrap();
        let spawned = engine.spawn_car(0, 3).unwrap();
        assert_eq!(spawned.snapshot.winner(), Some(0));
        assert!(spawned.events.contains(&GameEvent::PlayerWon { player: 0 }));
        assert_eq!(spawned.snapshot.phase(), GamePhase::TurnComplete);
    }

    #[test]
    fn test_restore_rejects_rolling_snapshot() {
        let mut engine = scripted(&[1]);
        engine.roll_dice().unwrap();
        assert!(matches!(
            GameEngine::restore(engine.save(), ScriptedFaces::from_values(&[1]).unwrap()),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_restore_keeps_recorded_stack_car() {
        // Car 0 stacked onto car 1 at cell 5: the track records car 0.
        let lineup = GameState::initial()
            .with_car_on_track(0, 0, 3)
            .unwrap()
            .with_car_on_track(0, 1, 5)
            .unwrap();
        let mut engine =
            GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[2]).unwrap()).unwrap();
        engine.roll_dice().unwrap();
        engine.commit_roll().unwrap();
        engine.move_car(0, 0).unwrap();
        assert_eq!(engine.track_occupancy()[5], Some(Occupant::new(0, 0)));

        let restored =
            GameEngine::restore(engine.save(), ScriptedFaces::from_values(&[1]).unwrap()).unwrap();
        assert_eq!(restored.track_occupancy(), engine.track_occupancy());
        assert_eq!(restored.snapshot(), engine.snapshot());
    }

    #[test]
    fn test_restore_rejects_track_naming_misplaced_car() {
        let mut saved = scripted(&[1]).save();
        saved.track.set(9, Occupant::new(1, 2));
        assert!(matches!(
            GameEngine::restore(saved, ScriptedFaces::from_values(&[1]).unwrap()),
            Err(EngineError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_restore_rejects_spawn_phase_without_garage_car() {
        let mut lineup = GameState::initial();
        for car in 0..4 {
            lineup = lineup.with_car_on_track(0, car, 2 + car).unwrap();
        }
        lineup.phase = GamePhase::WaitingForSpawn;
        lineup.last_dice_value = Some(DieFace::SIX);
        let result = GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[1]).unwrap());
        let Err(EngineError::InvalidSnapshot(reason)) = result else {
            panic!("stranded spawn phase accepted");
        };
        assert!(reason.contains(PhaseMatchesCars::description()));
    }

    #[test]
    fn test_legal_moves_unknown_player() {
        let engine = scripted(&[1]);
        assert_eq!(
            engine.legal_moves(9),
            Err(EngineError::InvalidReference { player: 9, car: None })
        );
        assert!(engine.legal_moves(0).unwrap().is_empty());
    }
}
