//! Track occupancy.
//!
//! The track is a loop of 52 cells. Each cell records at most one occupant;
//! when two cars of the same player share a cell only the most recent arrival
//! is recorded.

use crate::{CarId, EngineError, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Number of cells on the loop.
pub const TRACK_LENGTH: usize = 52;

/// Cells where an opposing car can never be knocked out. They are also the
/// four spawn cells.
pub const SAFE_CELLS: [usize; 4] = [0, 13, 26, 39];

/// Returns true if the cell is a safe cell.
pub fn is_safe_cell(position: usize) -> bool {
    SAFE_CELLS.contains(&position)
}

/// The car recorded at a cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new,
)]
pub struct Occupant {
    /// Owning player.
    pub player: PlayerId,
    /// Car id within the owner's cars.
    pub car: CarId,
}

/// Canonical map from track cell to occupant.
///
/// Positions are always engine-computed, so an out-of-range position is a
/// programming error and panics. Serializes as a list of 52 cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Occupant>>", into = "Vec<Option<Occupant>>")]
pub struct Track {
    cells: [Option<Occupant>; TRACK_LENGTH],
}

impl Track {
    /// Creates an empty track.
    pub fn new() -> Self {
        Self {
            cells: [None; TRACK_LENGTH],
        }
    }

    /// Returns the occupant of a cell.
    pub fn occupant(&self, position: usize) -> Option<Occupant> {
        Self::check_bounds(position);
        self.cells[position]
    }

    /// Records an occupant, replacing any previous one.
    pub fn set(&mut self, position: usize, occupant: Occupant) {
        Self::check_bounds(position);
        trace!(position, player = occupant.player, car = occupant.car, "Cell set");
        self.cells[position] = Some(occupant);
    }

    /// Empties a cell, returning whoever was recorded there.
    pub fn clear(&mut self, position: usize) -> Option<Occupant> {
        Self::check_bounds(position);
        trace!(position, "Cell cleared");
        self.cells[position].take()
    }

    /// Returns true if any car is recorded at the cell.
    pub fn is_occupied(&self, position: usize) -> bool {
        self.occupant(position).is_some()
    }

    /// Returns true if a car of another player is recorded at the cell.
    pub fn is_occupied_by_opponent(&self, position: usize, player: PlayerId) -> bool {
        self.occupant(position)
            .is_some_and(|occupant| occupant.player != player)
    }

    /// Returns a copy of every cell.
    pub fn cells(&self) -> [Option<Occupant>; TRACK_LENGTH] {
        self.cells
    }

    /// Iterates over occupied cells as `(position, occupant)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Occupant)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(position, cell)| cell.map(|occupant| (position, occupant)))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    fn check_bounds(position: usize) {
        assert!(
            position < TRACK_LENGTH,
            "track position {position} outside 0..{TRACK_LENGTH}"
        );
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Track> for Vec<Option<Occupant>> {
    fn from(track: Track) -> Self {
        track.cells.to_vec()
    }
}

impl TryFrom<Vec<Option<Occupant>>> for Track {
    type Error = EngineError;

    fn try_from(cells: Vec<Option<Occupant>>) -> Result<Self, Self::Error> {
        let count = cells.len();
        let cells: [Option<Occupant>; TRACK_LENGTH] = cells.try_into().map_err(|_| {
            EngineError::InvalidSnapshot(format!(
                "track has {count} cells, expected {TRACK_LENGTH}"
            ))
        })?;
        Ok(Self { cells })
    }
}

/// Screen placement of a track cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate (grows downward).
    pub y: f64,
    /// Direction of travel in degrees, for rotating a car token.
    pub heading_degrees: f64,
}

/// Circle the track is drawn on. Used by presentation layers only; nothing in
/// the game logic depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// Centre x.
    pub center_x: f64,
    /// Centre y.
    pub center_y: f64,
    /// Circle radius.
    pub radius: f64,
}

impl TrackGeometry {
    /// Angle of a cell in radians; cell 0 sits at the top of the circle.
    pub fn angle(position: usize) -> f64 {
        (position as f64 / TRACK_LENGTH as f64) * std::f64::consts::TAU
            - std::f64::consts::FRAC_PI_2
    }

    /// Maps a track cell to its point on the circle.
    pub fn point(&self, position: usize) -> TrackPoint {
        let angle = Self::angle(position);
        TrackPoint {
            x: self.center_x + self.radius * angle.cos(),
            y: self.center_y + self.radius * angle.sin(),
            heading_degrees: angle.to_degrees() + 90.0,
        }
    }
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            center_x: 250.0,
            center_y: 250.0,
            radius: 200.0,
        }
    }
}
