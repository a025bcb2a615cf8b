use thiserror::Error;

use crate::{Direction, Position};

/// Errors that can occur when validating a [`SearchRange`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("step must be nonzero")]
    ZeroStep,

    #[error("step {step} points away from end {end} (start {start})")]
    StepAgainstRange {
        start: Position,
        end: Position,
        step: i64,
    },

    #[error("range {start}..={end} leaves calibration bounds {min}..={max}")]
    OutOfBounds {
        start: Position,
        end: Position,
        min: Position,
        max: Position,
    },

    #[error("step magnitude {step} is smaller than the slope probe {slope_step}")]
    StepBelowProbe { step: i64, slope_step: i64 },

    #[error("range arithmetic overflows a position")]
    Overflow,
}

/// The span and step of a focus search.
///
/// `end` may be below `start`, in which case the search runs toward lower
/// positions. A positive `step` is read as a magnitude and follows the range;
/// a negative `step` is an explicit signed increment and must point from
/// `start` toward `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRange"))]
pub struct SearchRange {
    start: Position,
    end: Position,
    step: i64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRange {
    start: Position,
    end: Position,
    step: i64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRange> for SearchRange {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end, raw.step)
    }
}

impl SearchRange {
    /// Creates a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ZeroStep`] if `step` is zero, or
    /// [`RangeError::StepAgainstRange`] if a negative `step` points away from
    /// `end`, or [`RangeError::Overflow`] if the step magnitude or the span
    /// does not fit in a position.
    pub fn new(start: Position, end: Position, step: i64) -> Result<Self, RangeError> {
        if step == 0 {
            return Err(RangeError::ZeroStep);
        }
        if step.checked_abs().is_none() || end.checked_sub(start).is_none() {
            return Err(RangeError::Overflow);
        }
        if step < 0 && end > start {
            return Err(RangeError::StepAgainstRange { start, end, step });
        }
        Ok(Self { start, end, step })
    }

    /// Returns the first position of the range.
    #[must_use]
    pub fn start(&self) -> Position {
        self.start
    }

    /// Returns the last position of the range.
    #[must_use]
    pub fn end(&self) -> Position {
        self.end
    }

    /// Returns the step as supplied.
    #[must_use]
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Returns the magnitude of the step.
    #[must_use]
    pub fn step_magnitude(&self) -> i64 {
        self.step.abs()
    }

    /// Returns the direction from `start` toward `end`.
    ///
    /// A single-position range reports [`Direction::Positive`].
    #[must_use]
    pub fn direction(&self) -> Direction {
        Direction::between(self.start, self.end).unwrap_or(Direction::Positive)
    }

    /// Returns the signed increment between consecutive positions.
    #[must_use]
    pub fn increment(&self) -> i64 {
        self.direction().times(self.step_magnitude())
    }

    /// Returns the number of positions visited by a sweep over this range.
    #[must_use]
    pub fn len(&self) -> usize {
        let span = self.end.abs_diff(self.start);
        let count = span / self.step.unsigned_abs() + 1;
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Always false: a valid range visits at least its start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the positions from `start` toward `end`, never passing `end`.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let increment = self.increment();
        (0..self.len()).map(move |k| self.start + increment * k as i64)
    }

    /// Checks that both ends lie within `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::OutOfBounds`] if either end is outside the bounds.
    pub fn check_within(&self, min: Position, max: Position) -> Result<(), RangeError> {
        let inside = |p: Position| (min..=max).contains(&p);
        if inside(self.start) && inside(self.end) {
            Ok(())
        } else {
            Err(RangeError::OutOfBounds {
                start: self.start,
                end: self.end,
                min,
                max,
            })
        }
    }
}
