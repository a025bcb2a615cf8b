use focus_core::{ContrastSample, Observer};

use crate::traits::{HasMetric, HasPosition};

/// Keeps every sample a search reports, in order.
///
/// Never acts on the search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    samples: Vec<ContrastSample>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn samples(&self) -> &[ContrastSample] {
        &self.samples
    }

    /// Returns the sharpest recorded sample, the earliest one on ties.
    #[must_use]
    pub fn best(&self) -> Option<ContrastSample> {
        self.samples.iter().copied().reduce(|best, sample| {
            if sample.is_sharper_than(&best) {
                sample
            } else {
                best
            }
        })
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<ContrastSample> {
        self.samples
    }
}

impl<E: HasMetric + HasPosition, A> Observer<E, A> for Recorder {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.samples
            .push(ContrastSample::new(event.position(), event.metric()));
        None
    }
}

/// Lets a search borrow the recorder, so its samples can be read afterwards.
impl<E: HasMetric + HasPosition, A> Observer<E, A> for &mut Recorder {
    fn observe(&mut self, event: &E) -> Option<A> {
        (*self).observe(event)
    }
}
