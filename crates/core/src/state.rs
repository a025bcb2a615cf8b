/// Progress of a focus search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchState {
    /// No iteration has run yet.
    #[default]
    NotFound,

    /// The search is moving toward the peak.
    Finding,

    /// A sweep is stepping through its range.
    FoundAndMoving,

    /// The actuator has been moved to the detected peak.
    Success,
}

impl SearchState {
    /// Returns true for the terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Success
    }
}
