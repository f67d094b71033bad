//! Core domain types for Grand Prix.

use crate::dice::DieFace;
use crate::{EngineError, GamePhase, TRACK_LENGTH};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Index into the players array: 0..PLAYER_COUNT.
pub type PlayerId = usize;

/// Index into a player's cars: 0..CARS_PER_PLAYER.
pub type CarId = usize;

/// Number of players in every race.
pub const PLAYER_COUNT: usize = 4;

/// Number of cars each player races.
pub const CARS_PER_PLAYER: usize = 4;

/// The four teams, in fixed seating order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[repr(usize)]
pub enum Team {
    /// Seat 0.
    Ferrari = 0,
    /// Seat 1.
    Mercedes = 1,
    /// Seat 2.
    McLaren = 2,
    /// Seat 3.
    Williams = 3,
}

impl Team {
    /// Returns the player id this team is seated at.
    pub fn seat(self) -> PlayerId {
        self as PlayerId
    }

    /// Returns the team seated at the given player id.
    pub fn for_player(id: PlayerId) -> Option<Team> {
        Team::iter().nth(id)
    }

    /// Returns the team's display color. Opaque to the engine.
    pub fn color(self) -> &'static str {
        match self {
            Team::Ferrari => "#DC143C",
            Team::Mercedes => "#00D2BE",
            Team::McLaren => "#FF8700",
            Team::Williams => "#00FF00",
        }
    }
}

/// Where a car currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarLocation {
    /// Waiting in the owner's garage.
    InGarage,
    /// On the track at the given cell.
    OnTrack(usize),
}

/// A single car. A car is active exactly when it is on the track; the flag is
/// derived from the location so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Car {
    id: CarId,
    location: CarLocation,
}

impl Car {
    /// Creates a car parked in the garage.
    pub fn new(id: CarId) -> Self {
        Self {
            id,
            location: CarLocation::InGarage,
        }
    }

    /// Returns the car id.
    pub fn id(&self) -> CarId {
        self.id
    }

    /// Returns the car location.
    pub fn location(&self) -> CarLocation {
        self.location
    }

    /// Returns true if the car is on the track.
    pub fn is_active(&self) -> bool {
        matches!(self.location, CarLocation::OnTrack(_))
    }

    /// Returns true if the car is in the garage.
    pub fn is_in_garage(&self) -> bool {
        self.location == CarLocation::InGarage
    }

    /// Returns the track cell, if the car is on the track.
    pub fn track_position(&self) -> Option<usize> {
        match self.location {
            CarLocation::OnTrack(position) => Some(position),
            CarLocation::InGarage => None,
        }
    }

    pub(crate) fn place(&mut self, position: usize) {
        debug_assert!(position < TRACK_LENGTH);
        self.location = CarLocation::OnTrack(position);
    }

    pub(crate) fn send_to_garage(&mut self) {
        self.location = CarLocation::InGarage;
    }
}

/// A player (team) and their four cars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    color: String,
    cars: [Car; CARS_PER_PLAYER],
}

impl Player {
    /// Creates a player with all cars in the garage.
    pub fn new(id: PlayerId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            cars: std::array::from_fn(Car::new),
        }
    }

    /// Creates the default player for a team seat.
    pub fn for_team(team: Team) -> Self {
        Self::new(team.seat(), team.to_string(), team.color())
    }

    /// Returns the player id.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Returns all four cars.
    pub fn cars(&self) -> &[Car; CARS_PER_PLAYER] {
        &self.cars
    }

    /// Returns a car by id.
    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id)
    }

    pub(crate) fn car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.get_mut(id)
    }

    /// Iterates over cars still in the garage.
    pub fn garage_cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.iter().filter(|car| car.is_in_garage())
    }

    /// Iterates over cars on the track.
    pub fn track_cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.iter().filter(|car| car.is_active())
    }

    /// Returns true if at least one car is in the garage.
    pub fn has_garage_car(&self) -> bool {
        self.garage_cars().next().is_some()
    }

    /// Returns true if at least one car is on the track.
    pub fn has_car_on_track(&self) -> bool {
        self.track_cars().next().is_some()
    }

    /// Returns true if every car is on the track at once.
    pub fn all_on_track(&self) -> bool {
        self.cars.iter().all(Car::is_active)
    }

    fn parked(&self) -> Self {
        Self::new(self.id, self.name.clone(), self.color.clone())
    }
}

/// Immutable snapshot of a race.
///
/// Snapshots never alias engine internals; every command hands out a fresh
/// copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) players: [Player; PLAYER_COUNT],
    pub(crate) current_turn_index: PlayerId,
    pub(crate) phase: GamePhase,
    pub(crate) last_dice_value: Option<DieFace>,
    pub(crate) turn_number: u32,
    pub(crate) dice_rolling: bool,
    pub(crate) winner: Option<PlayerId>,
}

impl GameState {
    /// Creates the starting snapshot: default teams, every car in its garage.
    pub fn initial() -> Self {
        Self {
            players: std::array::from_fn(|id| {
                let team = Team::for_player(id).unwrap_or(Team::Ferrari);
                Player::new(id, team.to_string(), team.color())
            }),
            current_turn_index: 0,
            phase: GamePhase::WaitingForRoll,
            last_dice_value: None,
            turn_number: 1,
            dice_rolling: false,
            winner: None,
        }
    }

    /// Places a car on the track before play starts (lineups, restores, tests).
    ///
    /// # Errors
    ///
    /// `InvalidReference` for unknown ids, `OutOfRange` for a cell outside the track.
    pub fn with_car_on_track(
        mut self,
        player: PlayerId,
        car: CarId,
        position: usize,
    ) -> Result<Self, EngineError> {
        if position >= TRACK_LENGTH {
            return Err(EngineError::OutOfRange(position));
        }
        self.players
            .get_mut(player)
            .and_then(|p| p.car_mut(car))
            .ok_or(EngineError::InvalidReference {
                player,
                car: Some(car),
            })?
            .place(position);
        Ok(self)
    }

    /// Hands the opening turn to the given player.
    ///
    /// # Errors
    ///
    /// `InvalidReference` for an unknown player.
    pub fn with_current_turn(mut self, player: PlayerId) -> Result<Self, EngineError> {
        if player >= PLAYER_COUNT {
            return Err(EngineError::InvalidReference { player, car: None });
        }
        self.current_turn_index = player;
        Ok(self)
    }

    /// Returns all players in seating order.
    pub fn players(&self) -> &[Player; PLAYER_COUNT] {
        &self.players
    }

    /// Returns a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Returns the player whose turn it is.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn_index]
    }

    /// Returns the index of the player whose turn it is.
    pub fn current_turn_index(&self) -> PlayerId {
        self.current_turn_index
    }

    /// Returns the phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Returns the committed dice value for this turn, if any.
    pub fn last_dice_value(&self) -> Option<DieFace> {
        self.last_dice_value
    }

    /// Returns the turn number (one full cycle of all four players per turn).
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// Returns true while a roll is in flight.
    pub fn dice_rolling(&self) -> bool {
        self.dice_rolling
    }

    /// Returns the winner, once a player has had all four cars on the track.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub(crate) fn car_mut(&mut self, player: PlayerId, car: CarId) -> Option<&mut Car> {
        self.players.get_mut(player).and_then(|p| p.car_mut(car))
    }

    pub(crate) fn restarted(&self) -> Self {
        Self {
            players: std::array::from_fn(|id| self.players[id].parked()),
            ..Self::initial()
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = GameState::initial();
        assert_eq!(state.current_turn_index(), 0);
        assert_eq!(state.turn_number(), 1);
        assert_eq!(state.phase(), GamePhase::WaitingForRoll);
        assert!(state.last_dice_value().is_none());
        assert!(!state.dice_rolling());
        assert!(
            state
                .players()
                .iter()
                .flat_map(|p| p.cars())
                .all(|car| car.is_in_garage() && !car.is_active())
        );
    }

    #[test]
    fn test_default_roster() {
        let state = GameState::initial();
        let names: Vec<_> = state.players().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["Ferrari", "Mercedes", "McLaren", "Williams"]);
        assert_eq!(state.player(1).map(|p| p.color()), Some("#00D2BE"));
    }

    #[test]
    fn test_for_team_seats() {
        assert_eq!(Player::for_team(Team::McLaren).id(), 2);
        assert_eq!(Team::for_player(3), Some(Team::Williams));
        assert_eq!(Team::for_player(4), None);
    }

    #[test]
    fn test_every_team_has_its_own_seat() {
        for (index, team) in Team::iter().enumerate() {
            assert_eq!(team.seat(), index);
            assert_eq!(Team::for_player(team.seat()), Some(team));
            assert_eq!(Player::for_team(team).id(), team.seat());
        }
    }

    #[test]
    fn test_with_car_on_track() {
        let state = GameState::initial().with_car_on_track(2, 1, 15).unwrap();
        let car = state.player(2).unwrap().car(1).unwrap();
        assert_eq!(car.location(), CarLocation::OnTrack(15));
        assert!(car.is_active());
        assert_eq!(car.track_position(), Some(15));
    }

    #[test]
    fn test_with_car_on_track_rejects_bad_input() {
        assert_eq!(
            GameState::initial().with_car_on_track(0, 0, 52),
            Err(EngineError::OutOfRange(52))
        );
        assert_eq!(
            GameState::initial().with_car_on_track(0, 4, 3),
            Err(EngineError::InvalidReference {
                player: 0,
                car: Some(4)
            })
        );
    }

    #[test]
    fn test_restarted_keeps_identity() {
        let mut state = GameState::initial().with_car_on_track(1, 0, 20).unwrap();
        state.players[1] = Player::new(1, "Team 1", "#000001");
        let fresh = state.restarted();
        assert_eq!(fresh.player(1).unwrap().name(), "Team 1");
        assert!(!fresh.player(1).unwrap().has_car_on_track());
        assert_eq!(fresh.turn_number(), 1);
    }

    #[test]
    fn test_all_on_track() {
        let mut state = GameState::initial();
        for car in 0..CARS_PER_PLAYER {
            state = state.with_car_on_track(0, car, car * 3).unwrap();
        }
        assert!(state.player(0).unwrap().all_on_track());
        assert!(!state.player(0).unwrap().has_garage_car());
    }
}
