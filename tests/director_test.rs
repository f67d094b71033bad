//! Race director integration tests with zero delays.

use grandprix::{
    Driver, DriverKind, DriversConfig, FirstLegalDriver, GrandPrixConfig, RaceConfig,
    RaceDirector, Timing,
};
use strictly_grandprix::{GameEngine, GameEvent, PLAYER_COUNT, ScriptedFaces};
use tokio::sync::mpsc;

fn instant_config(seed: u64, kind: DriverKind) -> GrandPrixConfig {
    GrandPrixConfig::new(
        RaceConfig::default().with_seed(seed).without_delays(),
        DriversConfig::uniform(kind),
    )
}

#[tokio::test]
async fn test_race_publishes_events_in_order() {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut director =
        RaceDirector::from_config(&instant_config(5, DriverKind::First)).with_events(event_tx);
    let summary = director.run().await.unwrap();
    drop(director);

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(GameEvent::RollStarted { player: 0 })));
    let advances = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TurnAdvanced { .. }))
        .count();
    let rolls = events
        .iter()
        .filter(|e| matches!(e, GameEvent::DiceRolled { .. }))
        .count();
    assert_eq!(advances, rolls);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::CarKnockedOut { .. }))
            .count() as u32,
        *summary.knockouts()
    );
}

#[tokio::test]
async fn test_race_ends_on_winner_or_limit() {
    for kind in [DriverKind::First, DriverKind::Random, DriverKind::Aggressive] {
        let config = instant_config(17, kind);
        let summary = RaceDirector::from_config(&config).run().await.unwrap();
        match summary.winner() {
            Some(player) => {
                let winner = summary.final_state().player(*player).unwrap();
                assert!(winner.all_on_track());
            }
            None => assert!(*summary.turn_number() > *config.race().max_turns()),
        }
    }
}

#[tokio::test]
async fn test_same_seed_same_summary() {
    let config = instant_config(23, DriverKind::Random);
    let first = RaceDirector::from_config(&config).run().await.unwrap();
    let second = RaceDirector::from_config(&config).run().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_always_six_fills_the_grid() {
    let engine = GameEngine::new(ScriptedFaces::from_values(&[6]).unwrap());
    let drivers: [Box<dyn Driver>; PLAYER_COUNT] =
        std::array::from_fn(|_| Box::new(FirstLegalDriver::new()) as Box<dyn Driver>);
    let mut director = RaceDirector::new(engine, drivers, Timing::instant(), 10, true);

    let summary = director.run().await.unwrap();
    // Every seat spawns once per cycle, so seat 0 fills its garage first.
    assert_eq!(*summary.winner(), Some(0));
    assert_eq!(*summary.turn_number(), 4);
}
