//! Every command outside the phase graph is refused without touching state.

use strictly_grandprix::{Command, GameEngine, GamePhase, GameState, ScriptedFaces};

const EVERY_COMMAND: [Command; 5] = [
    Command::RollDice,
    Command::CommitRoll,
    Command::SpawnCar { player: 0, car: 0 },
    Command::MoveCar { player: 0, car: 1 },
    Command::AdvanceTurn,
];

/// Builds an engine parked in the requested situation, with car 1 of player 0
/// on the track and car 0 in the garage.
fn engine_in(face: u8, rolling: bool, commit: bool) -> GameEngine {
    let lineup = GameState::initial().with_car_on_track(0, 1, 10).unwrap();
    let mut engine =
        GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[face]).unwrap()).unwrap();
    if rolling {
        engine.roll_dice().unwrap();
    }
    if commit {
        engine.commit_roll().unwrap();
    }
    engine
}

fn assert_only(engine: &mut GameEngine, accepted: &[Command]) {
    for command in EVERY_COMMAND {
        let snapshot = engine.snapshot();
        let track = engine.track_occupancy();
        let history = engine.roll_history();

        if accepted.contains(&command) {
            continue;
        }

        assert!(
            engine.apply(command).is_err(),
            "{command} must be rejected during {}",
            snapshot.phase()
        );
        assert_eq!(engine.snapshot(), snapshot);
        assert_eq!(engine.track_occupancy(), track);
        assert_eq!(engine.roll_history(), history);
    }
}

#[test]
fn test_waiting_for_roll() {
    let mut engine = engine_in(3, false, false);
    assert_eq!(engine.state().phase(), GamePhase::WaitingForRoll);
    assert_only(&mut engine, &[Command::RollDice]);
}

#[test]
fn test_roll_in_flight() {
    let mut engine = engine_in(3, true, false);
    assert!(engine.state().dice_rolling());
    assert_only(&mut engine, &[Command::CommitRoll]);
    assert!(engine.commit_roll().is_ok());
}

#[test]
fn test_waiting_for_spawn() {
    let mut engine = engine_in(6, true, true);
    assert_eq!(engine.state().phase(), GamePhase::WaitingForSpawn);
    assert_only(&mut engine, &[Command::SpawnCar { player: 0, car: 0 }]);
    assert!(engine.spawn_car(0, 0).is_ok());
}

#[test]
fn test_waiting_for_move() {
    let mut engine = engine_in(3, true, true);
    assert_eq!(engine.state().phase(), GamePhase::WaitingForMove);
    assert_only(&mut engine, &[Command::MoveCar { player: 0, car: 1 }]);
    assert!(engine.move_car(0, 1).is_ok());
}

#[test]
fn test_turn_complete() {
    let mut engine = engine_in(3, true, true);
    engine.move_car(0, 1).unwrap();
    assert_eq!(engine.state().phase(), GamePhase::TurnComplete);
    assert_only(&mut engine, &[Command::AdvanceTurn]);
    assert!(engine.advance_turn().is_ok());
}

#[test]
fn test_other_players_are_refused() {
    let mut engine = engine_in(3, true, true);
    let before = engine.snapshot();
    for player in 1..4 {
        assert!(engine.move_car(player, 0).is_err());
    }
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_reset_accepted_in_every_phase() {
    let situations = [
        (3, false, false),
        (3, true, false),
        (6, true, true),
        (3, true, true),
    ];
    for (face, rolling, commit) in situations {
        let mut engine = engine_in(face, rolling, commit);
        let transition = engine.reset().unwrap();
        assert_eq!(transition.snapshot, GameState::initial());
        assert!(engine.track_occupancy().iter().all(Option::is_none));
    }
}
