use std::{error::Error as StdError, time::Duration};

use focus_core::{Position, RangeError};
use thiserror::Error;

use crate::ConfigError;

/// Errors that end a focus search.
///
/// Configuration and range errors are raised before the actuator moves.
/// Every other variant is a terminal failure of a running session.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid search range: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("image source failed")]
    Image(#[source] Box<dyn StdError + Send + Sync>),

    #[error("actuator failed")]
    Actuator(#[source] Box<dyn StdError + Send + Sync>),

    #[error("device store failed")]
    Store(#[source] Box<dyn StdError + Send + Sync>),

    #[error("no frame became available within {0:?}")]
    FrameTimeout(Duration),

    #[error("search was cancelled")]
    Cancelled,

    #[error("search exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("actuator reports position {reported}, expected {expected}")]
    PositionDiverged { expected: Position, reported: Position },

    #[error("no peak after {0} iterations")]
    MaxIters(usize),

    #[error("contrast is flat around position {0}")]
    FlatContrast(Position),

    #[error("every sample was discarded")]
    NoPeak,
}

impl Error {
    pub(crate) fn image<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Image(Box::new(err))
    }

    pub(crate) fn actuator<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Actuator(Box::new(err))
    }

    pub(crate) fn store<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Store(Box::new(err))
    }
}
