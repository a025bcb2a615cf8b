//! Named search strategies behind one interface.

use focus_core::{Actuator, DeviceStore, ImageSource, SearchRange};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Session, Solution, hill_climb, sweep};

/// A way of finding the sharpest position over a range.
///
/// Implementations run unobserved; call [`hill_climb::search`] or
/// [`sweep::search`] directly to attach an observer.
pub trait Strategy {
    /// Runs a session to completion.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session.
    fn run<I, A, S>(&self, session: Session<I, A, S>, range: &SearchRange) -> Result<Solution, Error>
    where
        I: ImageSource,
        A: Actuator,
        S: DeviceStore;
}

/// Adaptive-step hill climbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HillClimb {
    pub policy: hill_climb::Policy,
}

impl Strategy for HillClimb {
    fn run<I, A, S>(&self, session: Session<I, A, S>, range: &SearchRange) -> Result<Solution, Error>
    where
        I: ImageSource,
        A: Actuator,
        S: DeviceStore,
    {
        hill_climb::search_unobserved(session, range, self.policy)
    }
}

/// Exhaustive stepped sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep;

impl Strategy for Sweep {
    fn run<I, A, S>(&self, session: Session<I, A, S>, range: &SearchRange) -> Result<Solution, Error>
    where
        I: ImageSource,
        A: Actuator,
        S: DeviceStore,
    {
        sweep::search_unobserved(session, range)
    }
}

/// A strategy chosen at runtime, for example from a profile file.
///
/// In TOML: `{ kind = "hill_climb", policy = "step_floor" }` or
/// `{ kind = "sweep" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StrategyKind {
    HillClimb {
        #[cfg_attr(feature = "serde", serde(default))]
        policy: hill_climb::Policy,
    },
    Sweep,
}

impl Strategy for StrategyKind {
    fn run<I, A, S>(&self, session: Session<I, A, S>, range: &SearchRange) -> Result<Solution, Error>
    where
        I: ImageSource,
        A: Actuator,
        S: DeviceStore,
    {
        match *self {
            Self::HillClimb { policy } => HillClimb { policy }.run(session, range),
            Self::Sweep => Sweep.run(session, range),
        }
    }
}

impl From<HillClimb> for StrategyKind {
    fn from(strategy: HillClimb) -> Self {
        Self::HillClimb {
            policy: strategy.policy,
        }
    }
}

impl From<Sweep> for StrategyKind {
    fn from(_: Sweep) -> Self {
        Self::Sweep
    }
}
