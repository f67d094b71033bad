//! Movement and collision resolution.
//!
//! Destinations are plain modular arithmetic over the 52-cell loop. Arrivals
//! are classified against the [`Track`] as a move onto an empty cell, a stack
//! onto a teammate, a block by an opponent sitting on a safe cell, or a
//! knockout of an opponent anywhere else.

use crate::dice::DieFace;
use crate::track::{Occupant, TRACK_LENGTH, Track, is_safe_cell};
use crate::types::{CarId, PLAYER_COUNT, Player, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Cells between consecutive spawn points.
const SPAWN_SPACING: usize = TRACK_LENGTH / PLAYER_COUNT;

/// Returns the cell reached after moving `steps` cells from `origin`.
pub fn destination(origin: usize, steps: usize) -> usize {
    (origin + steps) % TRACK_LENGTH
}

/// Returns the cell where a player's cars enter the track.
pub fn spawn_position(player: PlayerId) -> usize {
    (player * SPAWN_SPACING) % TRACK_LENGTH
}

/// Classification of a car arriving at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ArrivalOutcome {
    /// The cell was empty.
    Move,
    /// The cell held a car of the same player.
    Stack,
    /// An opponent holds the cell and it is safe; the move is reverted.
    Blocked,
    /// An opponent holds an unsafe cell and goes back to their garage.
    Knockout,
}

/// Classifies an arrival without touching the track.
///
/// Returns the outcome and the occupant found at the destination, if any.
pub fn peek_arrival(
    track: &Track,
    destination: usize,
    mover: PlayerId,
) -> (ArrivalOutcome, Option<Occupant>) {
    let occupant = track.occupant(destination);
    let outcome = match occupant {
        None => ArrivalOutcome::Move,
        Some(o) if o.player == mover => ArrivalOutcome::Stack,
        Some(_) if is_safe_cell(destination) => ArrivalOutcome::Blocked,
        Some(_) => ArrivalOutcome::Knockout,
    };
    (outcome, occupant)
}

/// Result of moving a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// Cell the car started from.
    pub origin: usize,
    /// Cell the car ends on (equal to `origin` when blocked).
    pub position: usize,
    /// How the arrival was resolved.
    pub outcome: ArrivalOutcome,
    /// The car sent back to its garage, for a knockout.
    pub knocked_out: Option<Occupant>,
}

/// Applies movement and spawns to a track.
#[derive(Debug)]
pub struct MovementResolver<'a> {
    track: &'a mut Track,
}

impl<'a> MovementResolver<'a> {
    /// Creates a resolver over the given track.
    pub fn new(track: &'a mut Track) -> Self {
        Self { track }
    }

    /// Resolves a car arriving at `destination`, updating the track.
    ///
    /// On `Blocked` the track is left untouched. On `Knockout` the opponent's
    /// cell entry is cleared before the mover takes it; the caller must send
    /// the returned occupant's car back to its garage.
    #[instrument(skip(self))]
    pub fn resolve_arrival(
        &mut self,
        destination: usize,
        mover: Occupant,
    ) -> (ArrivalOutcome, Option<Occupant>) {
        let (outcome, occupant) = peek_arrival(self.track, destination, mover.player);
        match outcome {
            ArrivalOutcome::Blocked => {
                debug!(destination, "Arrival blocked by opponent on safe cell");
            }
            ArrivalOutcome::Knockout => {
                self.track.clear(destination);
                self.track.set(destination, mover);
            }
            ArrivalOutcome::Move | ArrivalOutcome::Stack => {
                self.track.set(destination, mover);
            }
        }
        (outcome, occupant)
    }

    /// Moves a car `steps` cells from `origin`.
    ///
    /// The origin cell is emptied first if it records the mover; a blocked
    /// move puts the record back. A car whose record was overwritten (by a
    /// stacking teammate or a spawn) leaves the current record alone.
    #[instrument(skip(self))]
    pub fn move_car(&mut self, mover: Occupant, origin: usize, steps: usize) -> MoveResult {
        let vacated = self.track.occupant(origin) == Some(mover);
        if vacated {
            self.track.clear(origin);
        }
        let target = destination(origin, steps);
        let (outcome, occupant) = self.resolve_arrival(target, mover);

        let (position, knocked_out) = match outcome {
            ArrivalOutcome::Blocked => {
                if vacated {
                    self.track.set(origin, mover);
                }
                (origin, None)
            }
            ArrivalOutcome::Knockout => (target, occupant),
            ArrivalOutcome::Move | ArrivalOutcome::Stack => (target, None),
        };

        debug!(origin, position, %outcome, "Car moved");
        MoveResult {
            origin,
            position,
            outcome,
            knocked_out,
        }
    }

    /// Puts a car on its spawn cell, overwriting whoever is recorded there.
    ///
    /// Spawning never knocks anyone out. The displaced occupant, if any, is
    /// returned so the caller can report it.
    #[instrument(skip(self))]
    pub fn spawn_car(&mut self, player: PlayerId, car: CarId, position: usize) -> Option<Occupant> {
        let displaced = self.track.clear(position);
        if let Some(other) = displaced.filter(|o| o.player != player) {
            warn!(
                position,
                displaced_player = other.player,
                displaced_car = other.car,
                "Spawn overwrote an opposing car without a knockout"
            );
        }
        self.track.set(position, Occupant::new(player, car));
        displaced
    }
}

/// Kind of a legal move candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum CandidateKind {
    /// Bring a garage car onto the spawn cell.
    Spawn,
    /// Move onto an empty cell.
    Move,
    /// Move onto a teammate.
    Stack,
    /// Move onto an opponent, knocking them out.
    KnockoutMove,
}

/// One legal option for a player holding a dice value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCandidate {
    /// What the option does.
    pub kind: CandidateKind,
    /// Car that would act.
    pub car: CarId,
    /// Cell the car leaves (`None` when leaving the garage).
    pub from: Option<usize>,
    /// Cell the car reaches.
    pub to: usize,
    /// Opponent that would be knocked out.
    pub knocks_out: Option<Occupant>,
}

/// Lists legal options for a player holding `dice`.
///
/// A six offers every garage car a spawn. Every on-track car is offered a move
/// unless an opponent holds its destination on a safe cell.
pub fn legal_moves(track: &Track, player: &Player, dice: DieFace) -> Vec<MoveCandidate> {
    let steps = usize::from(dice.value());
    let mut candidates = Vec::new();

    if dice.is_six() {
        let to = spawn_position(player.id());
        candidates.extend(player.garage_cars().map(|car| MoveCandidate {
            kind: CandidateKind::Spawn,
            car: car.id(),
            from: None,
            to,
            knocks_out: None,
        }));
    }

    for car in player.track_cars() {
        let Some(from) = car.track_position() else {
            continue;
        };
        let to = destination(from, steps);
        let (outcome, occupant) = peek_arrival(track, to, player.id());
        let kind = match outcome {
            ArrivalOutcome::Blocked => continue,
            ArrivalOutcome::Move => CandidateKind::Move,
            ArrivalOutcome::Stack => CandidateKind::Stack,
            ArrivalOutcome::Knockout => CandidateKind::KnockoutMove,
        };
        candidates.push(MoveCandidate {
            kind,
            car: car.id(),
            from: Some(from),
            to,
            knocks_out: occupant.filter(|_| kind == CandidateKind::KnockoutMove),
        });
    }

    candidates
}
