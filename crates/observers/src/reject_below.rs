use focus_core::Observer;

use crate::traits::{CanDiscard, HasMetric};

/// Discards samples whose metric falls below a floor.
///
/// Useful for frames that are known to be unusable, such as a dark capture
/// between illumination pulses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectBelow {
    pub floor: f64,
}

impl<E: HasMetric, A: CanDiscard> Observer<E, A> for RejectBelow {
    fn observe(&mut self, event: &E) -> Option<A> {
        let metric = event.metric();
        if metric < self.floor {
            log::debug!("discarding sample with metric {metric} below {}", self.floor);
            return Some(A::discard());
        }
        None
    }
}
