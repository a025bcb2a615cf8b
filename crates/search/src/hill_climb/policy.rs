#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When a hill climb commits to a final position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Policy {
    /// Finish one iteration after the first reversal, or immediately on a
    /// second reversal.
    #[default]
    ConfirmTurns,

    /// Halve the step on every reversal and finish once half the step falls
    /// below the slope probe.
    StepFloor,
}
