use focus_core::{ContrastSample, Direction};

use crate::SlopeEstimate;

/// Events emitted by the hill-climbing strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A slope probe completed and the next move has been decided.
    Probed {
        /// Iteration number; the initial direction-finding probe is `0`.
        iter: usize,

        /// The probe result.
        estimate: SlopeEstimate,

        /// Direction the climb will move next.
        direction: Direction,

        /// Step magnitude after this probe's adaptation.
        move_step: i64,

        /// Slope reversals seen so far.
        turns: usize,
    },
}

impl Event {
    /// Returns the sharper of the two probe samples.
    #[must_use]
    pub fn sample(&self) -> ContrastSample {
        match self {
            Self::Probed { estimate, .. } => estimate.sharper(),
        }
    }

    #[must_use]
    pub fn iter(&self) -> usize {
        match self {
            Self::Probed { iter, .. } => *iter,
        }
    }

    #[must_use]
    pub fn slope(&self) -> f64 {
        match self {
            Self::Probed { estimate, .. } => estimate.slope,
        }
    }

    /// Returns the step magnitude the climb will use next.
    #[must_use]
    pub fn move_step(&self) -> i64 {
        match self {
            Self::Probed { move_step, .. } => *move_step,
        }
    }
}
