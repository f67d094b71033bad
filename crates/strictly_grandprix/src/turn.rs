//! Turn state machine.
//!
//! | From            | Trigger  | Guard                              | To              |
//! |-----------------|----------|------------------------------------|-----------------|
//! | WaitingForRoll  | roll(v)  | v is six and a car is in garage    | WaitingForSpawn |
//! | WaitingForRoll  | roll(v)  | otherwise, a car is on track       | WaitingForMove  |
//! | WaitingForRoll  | roll(v)  | neither                            | TurnComplete    |
//! | WaitingForSpawn | spawn    | car in garage, current player      | TurnComplete    |
//! | WaitingForMove  | move     | car on track, current player       | TurnComplete    |
//! | TurnComplete    | advance  |                                    | WaitingForRoll  |

use crate::dice::DieFace;
use crate::types::{PLAYER_COUNT, Player, PlayerId};
use crate::{Command, GamePhase};
use tracing::{debug, instrument};

/// Phase transition rules. Stateless; the engine owns the state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnStateMachine;

impl TurnStateMachine {
    /// Phase after the current player commits a roll.
    #[instrument(skip(player), fields(player = player.id()))]
    pub fn after_roll(face: DieFace, player: &Player) -> GamePhase {
        let next = if face.is_six() && player.has_garage_car() {
            GamePhase::WaitingForSpawn
        } else if player.has_car_on_track() {
            GamePhase::WaitingForMove
        } else {
            GamePhase::TurnComplete
        };
        debug!(face = face.value(), %next, "Roll resolved");
        next
    }

    /// Phase after a spawn or a move.
    pub fn after_car_action() -> GamePhase {
        GamePhase::TurnComplete
    }

    /// Seat and turn number after advancing from `current`.
    ///
    /// The turn number grows by one each time play wraps back to seat 0.
    pub fn advance(current: PlayerId, turn_number: u32) -> (PlayerId, u32) {
        let next = (current + 1) % PLAYER_COUNT;
        let turn_number = if next == 0 {
            turn_number + 1
        } else {
            turn_number
        };
        (next, turn_number)
    }

    /// Phase a command must be issued in. `None` means any phase.
    pub fn required_phase(command: &Command) -> Option<GamePhase> {
        match command {
            Command::RollDice | Command::CommitRoll => Some(GamePhase::WaitingForRoll),
            Command::SpawnCar { .. } => Some(GamePhase::WaitingForSpawn),
            Command::MoveCar { .. } => Some(GamePhase::WaitingForMove),
            Command::AdvanceTurn => Some(GamePhase::TurnComplete),
            Command::Reset => None,
        }
    }

    /// Returns true once every car of the player is on the track.
    pub fn has_won(player: &Player) -> bool {
        player.all_on_track()
    }
}

/// Lists the commands a player may issue in a phase.
///
/// Spawn options require the dice to show six. Move options list every
/// on-track car; a move onto an opponent's safe cell is still accepted and
/// resolves as blocked.
pub fn legal_actions(phase: GamePhase, player: &Player, dice: Option<DieFace>) -> Vec<Command> {
    match phase {
        GamePhase::WaitingForRoll => vec![Command::RollDice],
        GamePhase::WaitingForSpawn => {
            if dice.is_some_and(DieFace::is_six) {
                player
                    .garage_cars()
                    .map(|car| Command::SpawnCar {
                        player: player.id(),
                        car: car.id(),
                    })
                    .collect()
            } else {
                Vec::new()
            }
        }
        GamePhase::WaitingForMove => player
            .track_cars()
            .map(|car| Command::MoveCar {
                player: player.id(),
                car: car.id(),
            })
            .collect(),
        GamePhase::TurnComplete => vec![Command::AdvanceTurn],
    }
}
