use focus_core::Observer;

use crate::traits::{CanStopEarly, HasMetric};

/// Stops a search once the metric reaches a target.
///
/// The first `min_events` events are never acted on, so a lucky early frame
/// cannot end the search before it has looked around.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTarget {
    target: f64,
    min_events: usize,
    seen: usize,
}

impl MetricTarget {
    #[must_use]
    pub fn new(target: f64, min_events: usize) -> Self {
        Self {
            target,
            min_events,
            seen: 0,
        }
    }

    /// Returns the number of events observed so far.
    #[must_use]
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl<E: HasMetric, A: CanStopEarly> Observer<E, A> for MetricTarget {
    fn observe(&mut self, event: &E) -> Option<A> {
        self.seen += 1;
        let metric = event.metric();
        if self.seen > self.min_events && metric >= self.target {
            log::debug!(
                "metric {metric} reached target {} after {} events",
                self.target,
                self.seen
            );
            return Some(A::stop_early());
        }
        None
    }
}
