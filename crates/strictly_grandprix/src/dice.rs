//! Dice subsystem.
//!
//! A roll has two steps: `begin_roll` draws a face and marks the dice as
//! rolling, `commit_roll` records it. Callers put their presentation delay
//! between the two; the dice never sleep.

use crate::EngineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Number of committed rolls kept in history.
pub const HISTORY_LIMIT: usize = 10;

/// A single die value, always in `1..=6`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct DieFace(u8);

impl DieFace {
    /// The face that lets a car leave the garage.
    pub const SIX: DieFace = DieFace(6);

    /// Creates a face.
    ///
    /// # Errors
    ///
    /// `InvalidDieFace` if `value` is not in `1..=6`.
    pub fn new(value: u8) -> Result<Self, EngineError> {
        if (1..=6).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidDieFace(value))
        }
    }

    /// Returns the numeric value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns true for a six.
    pub fn is_six(self) -> bool {
        self == Self::SIX
    }

    /// Returns the Unicode die glyph for presentation layers.
    pub fn glyph(self) -> char {
        const GLYPHS: [char; 6] = ['⚀', '⚁', '⚂', '⚃', '⚄', '⚅'];
        GLYPHS[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for DieFace {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DieFace> for u8 {
    fn from(face: DieFace) -> Self {
        face.0
    }
}

impl std::fmt::Display for DieFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of die faces. Injected so races can be replayed exactly.
pub trait FaceSource: Send {
    /// Draws the next face.
    fn next_face(&mut self) -> DieFace;
}

/// Uniform faces drawn from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomFaces<R> {
    rng: R,
}

impl<R> RandomFaces<R> {
    /// Wraps a generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomFaces<StdRng> {
    /// Creates a reproducible source from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> FaceSource for RandomFaces<R> {
    fn next_face(&mut self) -> DieFace {
        DieFace(self.rng.gen_range(1..=6))
    }
}

/// A fixed list of faces replayed in order, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedFaces {
    faces: Vec<DieFace>,
    cursor: usize,
}

impl ScriptedFaces {
    /// Creates a script from raw values.
    ///
    /// # Errors
    ///
    /// `EmptyFaceScript` for an empty list, `InvalidDieFace` for values outside `1..=6`.
    pub fn from_values(values: &[u8]) -> Result<Self, EngineError> {
        if values.is_empty() {
            return Err(EngineError::EmptyFaceScript);
        }
        let faces = values
            .iter()
            .map(|&v| DieFace::new(v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { faces, cursor: 0 })
    }
}

impl FaceSource for ScriptedFaces {
    fn next_face(&mut self) -> DieFace {
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}

/// Aggregate statistics over the retained roll history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollStatistics {
    /// Number of rolls in history.
    pub count: usize,
    /// Arithmetic mean, rounded to two decimals (0 for an empty history).
    pub average: f64,
    /// Frequency of each face; index 0 counts ones.
    pub distribution: [u32; 6],
}

impl RollStatistics {
    /// Returns how often a face appears in history.
    pub fn frequency(&self, face: DieFace) -> u32 {
        self.distribution[usize::from(face.value() - 1)]
    }
}

/// The dice: face source, roll in flight, current value, bounded history.
pub struct Dice {
    source: Box<dyn FaceSource>,
    pending: Option<DieFace>,
    current: Option<DieFace>,
    history: VecDeque<DieFace>,
}

impl Dice {
    /// Creates dice drawing from the given source.
    pub fn new(source: impl FaceSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            pending: None,
            current: None,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Draws a face and enters the rolling state.
    ///
    /// # Errors
    ///
    /// `AlreadyRolling` if a roll is in flight; nothing changes.
    #[instrument(skip(self))]
    pub fn begin_roll(&mut self) -> Result<DieFace, EngineError> {
        if self.pending.is_some() {
            return Err(EngineError::AlreadyRolling);
        }
        let face = self.source.next_face();
        debug!(face = face.value(), "Dice rolling");
        self.pending = Some(face);
        Ok(face)
    }

    /// Commits the roll in flight: records it in history and makes it current.
    ///
    /// # Errors
    ///
    /// `NoRollInFlight` if `begin_roll` was not called first.
    #[instrument(skip(self))]
    pub fn commit_roll(&mut self) -> Result<DieFace, EngineError> {
        let face = self.pending.take().ok_or(EngineError::NoRollInFlight)?;
        self.history.push_back(face);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.current = Some(face);
        debug!(face = face.value(), history = self.history.len(), "Dice committed");
        Ok(face)
    }

    /// Begins and commits a roll in one step.
    ///
    /// # Errors
    ///
    /// `AlreadyRolling` if a roll is in flight.
    pub fn quick_roll(&mut self) -> Result<DieFace, EngineError> {
        self.begin_roll()?;
        self.commit_roll()
    }

    /// Returns the face drawn by the roll in flight.
    pub fn pending(&self) -> Option<DieFace> {
        self.pending
    }

    /// Returns true while a roll is in flight.
    pub fn is_rolling(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the last committed face.
    pub fn current(&self) -> Option<DieFace> {
        self.current
    }

    /// Returns the retained history, oldest first.
    pub fn history(&self) -> Vec<DieFace> {
        self.history.iter().copied().collect()
    }

    /// Computes statistics over the retained history.
    pub fn statistics(&self) -> RollStatistics {
        let mut distribution = [0_u32; 6];
        let mut sum = 0_u32;
        for face in &self.history {
            distribution[usize::from(face.value() - 1)] += 1;
            sum += u32::from(face.value());
        }
        let count = self.history.len();
        let average = if count == 0 {
            0.0
        } else {
            (f64::from(sum) / count as f64 * 100.0).round() / 100.0
        };
        RollStatistics {
            count,
            average,
            distribution,
        }
    }

    /// Clears history, current value and any roll in flight. The source is kept.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.pending = None;
        self.current = None;
        self.history.clear();
    }

    pub(crate) fn resume(&mut self, current: Option<DieFace>) {
        self.reset();
        self.current = current;
    }
}

impl std::fmt::Debug for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dice")
            .field("pending", &self.pending)
            .field("current", &self.current)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
