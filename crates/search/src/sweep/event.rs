use focus_core::ContrastSample;

/// Events emitted by the sweep strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A position of the range was sampled.
    Sampled {
        /// Zero-based index of the position within the range.
        index: usize,

        /// The sample taken there.
        sample: ContrastSample,

        /// Sharpest kept sample before this one, if any.
        best: Option<ContrastSample>,
    },
}

impl Event {
    /// Returns the sample this event reports.
    #[must_use]
    pub fn sample(&self) -> ContrastSample {
        match self {
            Self::Sampled { sample, .. } => *sample,
        }
    }

    /// Returns the sharpest kept sample before this one.
    #[must_use]
    pub fn best(&self) -> Option<ContrastSample> {
        match self {
            Self::Sampled { best, .. } => *best,
        }
    }
}
