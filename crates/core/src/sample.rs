use crate::Position;

/// One sharpness measurement tagged with the position it was taken at.
///
/// Samples are produced fresh by every sampling call and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContrastSample {
    /// The actuator's reported position when the frame was measured.
    pub position: Position,

    /// The scaled contrast metric. Higher means sharper.
    pub metric: f64,
}

impl ContrastSample {
    /// Creates a new sample.
    #[must_use]
    pub fn new(position: Position, metric: f64) -> Self {
        Self { position, metric }
    }

    /// Returns true if this sample is strictly sharper than `other`.
    ///
    /// Ties are not improvements, so the earlier of two equal samples wins.
    #[must_use]
    pub fn is_sharper_than(&self, other: &Self) -> bool {
        self.metric > other.metric
    }
}
