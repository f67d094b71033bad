//! Whole-race properties over seeded random dice, plus snapshot persistence.

use strictly_grandprix::{
    CarLocation, Command, GameEngine, GameEvent, GamePhase, GameState, Occupant, PLAYER_COUNT,
    SavedRace, ScriptedFaces, TRACK_LENGTH, is_safe_cell,
};

/// Plays the first available action until `steps` commands were applied.
fn play(engine: &mut GameEngine, steps: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..steps {
        let actions = engine.available_actions();
        let command = actions
            .first()
            .copied()
            .expect("every phase offers an action");
        let transition = engine.apply(command).expect("available actions are accepted");
        events.extend(transition.events);
    }
    events
}

#[test]
fn test_knockouts_never_happen_on_safe_cells() {
    for seed in 0..8 {
        let mut engine = GameEngine::seeded(seed);
        let events = play(&mut engine, 2_000);
        for event in &events {
            match event {
                GameEvent::CarKnockedOut { position, .. } => {
                    assert!(!is_safe_cell(*position), "knockout on safe cell {position}");
                }
                GameEvent::MoveBlocked { target, .. } => {
                    assert!(is_safe_cell(*target), "block on unsafe cell {target}");
                }
                _ => {}
            }
        }
    }
}

#[test]
fn test_knocked_out_car_is_in_garage() {
    let mut engine = GameEngine::seeded(42);
    for _ in 0..4_000 {
        let command = engine.available_actions()[0];
        let transition = engine.apply(command).unwrap();
        for event in &transition.events {
            if let GameEvent::CarKnockedOut { player, car, position, by } = event {
                let snapshot = &transition.snapshot;
                let victim = snapshot.player(*player).unwrap().car(*car).unwrap();
                assert_eq!(victim.location(), CarLocation::InGarage);
                assert!(!victim.is_active());
                assert_eq!(engine.track_occupancy()[*position].map(|o| o.player), Some(*by));
            }
        }
    }
}

#[test]
fn test_snapshots_stay_in_bounds() {
    let mut engine = GameEngine::seeded(7);
    for _ in 0..3_000 {
        let command = engine.available_actions()[0];
        let snapshot = engine.apply(command).unwrap().snapshot;
        assert!(snapshot.current_turn_index() < PLAYER_COUNT);
        assert!(snapshot.turn_number() >= 1);
        for car in snapshot.players().iter().flat_map(|p| p.cars()) {
            if let Some(position) = car.track_position() {
                assert!(position < TRACK_LENGTH);
            }
        }
        if snapshot.dice_rolling() {
            assert_eq!(snapshot.phase(), GamePhase::WaitingForRoll);
        }
    }
}

#[test]
fn test_same_seed_same_race() {
    let mut first = GameEngine::seeded(99);
    let mut second = GameEngine::seeded(99);
    assert_eq!(play(&mut first, 500), play(&mut second, 500));
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_roll_history_is_bounded() {
    let mut engine = GameEngine::seeded(3);
    play(&mut engine, 400);
    let stats = engine.roll_statistics();
    assert_eq!(stats.count, 10);
    assert_eq!(stats.distribution.iter().sum::<u32>(), 10);
    assert!((1.0..=6.0).contains(&stats.average));
}

fn through_json(saved: &SavedRace) -> SavedRace {
    let json = serde_json::to_string(saved).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_snapshot_json_restores_same_race() {
    let mut engine = GameEngine::seeded(11);
    play(&mut engine, 301);
    while engine.state().dice_rolling() {
        engine.commit_roll().unwrap();
    }

    let saved = through_json(&engine.save());
    let restored = GameEngine::restore(saved, ScriptedFaces::from_values(&[1]).unwrap()).unwrap();

    assert_eq!(restored.snapshot(), engine.snapshot());
    assert_eq!(restored.track_occupancy(), engine.track_occupancy());
    assert_eq!(restored.available_actions(), engine.available_actions());
}

#[test]
fn test_restored_race_knocks_out_same_car() {
    // Player 0 stacks car 0 from cell 3 onto car 1 at cell 5, so cell 5
    // records car 0. Player 1 then lands on cell 5 from cell 2.
    let lineup = GameState::initial()
        .with_car_on_track(0, 0, 3)
        .unwrap()
        .with_car_on_track(0, 1, 5)
        .unwrap()
        .with_car_on_track(1, 0, 2)
        .unwrap();
    let mut live =
        GameEngine::from_lineup(lineup, ScriptedFaces::from_values(&[2, 3]).unwrap()).unwrap();
    live.roll_dice().unwrap();
    live.commit_roll().unwrap();
    live.move_car(0, 0).unwrap();
    live.advance_turn().unwrap();
    assert_eq!(live.track_occupancy()[5], Some(Occupant::new(0, 0)));

    let saved = through_json(&live.save());
    let mut restored =
        GameEngine::restore(saved, ScriptedFaces::from_values(&[3]).unwrap()).unwrap();
    assert_eq!(restored.track_occupancy()[5], Some(Occupant::new(0, 0)));

    let mut knockouts = Vec::new();
    for engine in [&mut live, &mut restored] {
        engine.roll_dice().unwrap();
        engine.commit_roll().unwrap();
        let moved = engine.move_car(1, 0).unwrap();
        knockouts.push(moved.events.last().cloned());
    }

    let expected = GameEvent::CarKnockedOut {
        player: 0,
        car: 0,
        position: 5,
        by: 1,
    };
    assert_eq!(knockouts, vec![Some(expected.clone()), Some(expected)]);
    assert_eq!(restored.snapshot(), live.snapshot());
}

#[test]
fn test_restore_rejects_tampered_json() {
    let json = serde_json::to_value(GameEngine::seeded(1).save()).unwrap();

    let mut bad_dice = json.clone();
    bad_dice["state"]["last_dice_value"] = serde_json::json!(9);
    assert!(serde_json::from_value::<SavedRace>(bad_dice).is_err());

    let mut short_track = json.clone();
    short_track["track"] = serde_json::json!([null, null]);
    assert!(serde_json::from_value::<SavedRace>(short_track).is_err());

    let mut bad_phase = json.clone();
    bad_phase["state"]["phase"] = serde_json::json!("WaitingForMove");
    let saved: SavedRace = serde_json::from_value(bad_phase).unwrap();
    assert!(GameEngine::restore(saved, ScriptedFaces::from_values(&[1]).unwrap()).is_err());

    let mut ghost_car = json;
    ghost_car["track"][20] = serde_json::json!({ "player": 2, "car": 1 });
    let saved: SavedRace = serde_json::from_value(ghost_car).unwrap();
    assert!(GameEngine::restore(saved, ScriptedFaces::from_values(&[1]).unwrap()).is_err());
}

#[test]
fn test_commands_round_trip_through_apply() {
    let script = [
        Command::RollDice,
        Command::CommitRoll,
        Command::SpawnCar { player: 0, car: 2 },
        Command::AdvanceTurn,
    ];
    let json = serde_json::to_string(&script).unwrap();
    let commands: Vec<Command> = serde_json::from_str(&json).unwrap();

    let mut engine = GameEngine::new(ScriptedFaces::from_values(&[6]).unwrap());
    for command in commands {
        engine.apply(command).unwrap();
    }
    assert_eq!(
        engine.state().player(0).unwrap().car(2).unwrap().location(),
        CarLocation::OnTrack(0)
    );
    assert_eq!(engine.state().current_turn_index(), 1);
}
