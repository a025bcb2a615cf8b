use focus_core::{ContrastSample, Position, SearchState};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Found the peak and moved onto it.
    Converged,

    /// The peak lies at or beyond a calibration bound; the actuator was left there.
    ///
    /// A hill climb only reports this when the bound is within one
    /// `slope_step` of its sharpest sample.
    ReachedBound,

    /// Stopped early due to an observer decision.
    StoppedByObserver,
}

/// The result of a focus search.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Final search status.
    pub status: Status,

    /// Session state when the search ended.
    pub state: SearchState,

    /// Position the actuator was left at.
    pub position: Position,

    /// Sharpest sample measured during the search.
    ///
    /// This is a measurement, not necessarily where the actuator ended up:
    /// a hill climb finishes with a corrective move that is never sampled.
    /// A successful hill climb ends within one `slope_step` of it.
    pub best: Option<ContrastSample>,

    /// Iteration count when the search finished.
    pub iters: usize,

    /// Actuator moves issued, including probes.
    pub moves: usize,
}
