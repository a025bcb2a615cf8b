//! Exhaustive stepped sweep with arg-max selection.
//!
//! # Algorithm
//!
//! The sweep moves to the range's `start`, then samples contrast at every
//! position toward `end` in increments of the range step, never passing
//! `end`. Once the range is exhausted it moves the actuator to the sharpest
//! sample. The first maximum wins on ties.
//!
//! Unlike hill climbing, the sweep makes no assumption that contrast is
//! unimodal, at the cost of one move and one sample per position. It suits a
//! coarse first pass or a landscape with several local maxima.
//!
//! # Observer Events
//!
//! The sweep emits one [`Event::Sampled`] per visited position. Observers can
//! return [`Action::Discard`] to exclude that sample from peak selection, or
//! [`Action::StopEarly`] to stop where the actuator is.

mod action;
mod event;


pub use action::Action;
pub use event::Event;

use focus_core::{
    Actuator, ContrastSample, DeviceStore, ImageSource, Observer, SearchRange, SearchState,
};

use crate::{Error, Session, Solution, Status};

/// Samples every position of `range` and moves to the sharpest one.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] before any move if the range leaves the
/// calibration bounds, [`Error::NoPeak`] if the observer discarded every
/// sample, and any device, cancellation, or deadline error raised while
/// running.
pub fn search<I, A, S, Obs>(
    mut session: Session<I, A, S>,
    range: &SearchRange,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
    Obs: Observer<Event, Action>,
{
    let config = *session.config();
    let bounds = config.bounds();
    range.check_within(bounds.min(), bounds.max())?;

    session.check_live()?;
    session.begin()?;
    log::debug!(
        "sweeping {}..={} by {} ({} positions)",
        range.start(),
        range.end(),
        range.increment(),
        range.len()
    );

    session.move_absolute(range.start())?;
    let mut state = SearchState::Finding;
    let mut peak = Peak::default();

    for (index, _) in range.positions().enumerate() {
        session.check_live()?;
        if index > 0 {
            session.move_relative(range.increment())?;
            state = SearchState::FoundAndMoving;
        }
        session.settle(config.timing().sweep_settle);

        let sample = session.sample()?;
        let event = Event::Sampled {
            index,
            sample,
            best: peak.get(),
        };
        match observer.observe(&event) {
            Some(Action::StopEarly) => {
                let iters = index + 1;
                return Ok(session.finish(Status::StoppedByObserver, state, peak.get(), iters));
            }
            Some(Action::Discard) => {
                log::debug!("discarded sample at {}", sample.position);
            }
            None => peak.offer(sample),
        }
    }

    let Some(best) = peak.get() else {
        log::error!("sweep finished without a usable sample");
        return Err(Error::NoPeak);
    };
    log::debug!("peak {:.4} at {}", best.metric, best.position);

    session.move_absolute(best.position)?;
    session.settle(config.timing().move_settle);
    Ok(session.finish(Status::Converged, SearchState::Success, Some(best), range.len()))
}

/// Samples every position of `range` without observer support.
///
/// This is a convenience wrapper around [`search`] that uses a no-op observer.
///
/// # Errors
///
/// Returns the same errors as [`search`].
pub fn search_unobserved<I, A, S>(
    session: Session<I, A, S>,
    range: &SearchRange,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    search(session, range, ())
}

/// Running arg-max over the kept samples.
#[derive(Debug, Default)]
struct Peak(Option<ContrastSample>);

impl Peak {
    /// Keeps `sample` only if it is strictly sharper, so the first maximum wins.
    fn offer(&mut self, sample: ContrastSample) {
        match self.0 {
            Some(best) if !sample.is_sharper_than(&best) => {}
            _ => self.0 = Some(sample),
        }
    }

    fn get(&self) -> Option<ContrastSample> {
        self.0
    }
}
