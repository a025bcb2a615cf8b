//! Adaptive-step hill climbing toward the sharpest focus position.
//!
//! # Algorithm
//!
//! Each iteration probes the local slope of the contrast metric, moves one
//! step uphill, and watches for the slope to change sign. A sign change means
//! the peak has been crossed: the direction flips and the step and settle
//! delay are halved. The step never grows within a session.
//!
//! 1. Clamp the actuator into the calibration bounds if it starts outside.
//! 2. Probe once toward the range's end to pick an initial uphill direction,
//!    then take the first full step.
//! 3. Probe, compare the slope sign with the previous probe, adapt, and move.
//!    Stop according to the [`Policy`].
//!
//! Steps are measured from where each probe started. The probe displacement
//! is subtracted from the move that follows it, so a step of `s` in the probe
//! direction issues `s − slope_step` and a step against it issues
//! `s + slope_step`.
//!
//! # Termination
//!
//! A single sign change is not trusted on its own, since measurement noise
//! can flip a slope near the peak. Two policies decide when to commit:
//!
//! - [`Policy::ConfirmTurns`] waits one further iteration after the first
//!   reversal. If the slope holds, the peak lies ahead and the step is halved
//!   once more for a final `direction * (step − slope_step)` move; if it
//!   reverses again immediately, a final `direction * (step + slope_step)`
//!   move splits the difference.
//! - [`Policy::StepFloor`] halves the step on every reversal and finishes
//!   with one last step once half the step falls below the probe displacement.
//!
//! A climb that is clamped against a calibration bound twice without
//! reversing ends at that bound.
//!
//! A converged climb always ends within one `slope_step` of the sharpest
//! sample it measured. A final move that would land farther away goes to that
//! sample instead, and so does a climb pinned at a bound it never found sharp.
//! If the first two slope estimates are both zero the contrast is flat:
//! the actuator returns to where it started and the climb fails with
//! [`Error::FlatContrast`].
//!
//! # Observer Events
//!
//! The strategy emits one [`Event::Probed`] per slope estimate, including the
//! initial probe. Observers can return [`Action::StopEarly`] to leave the
//! actuator where it is and return immediately.

mod action;
mod event;
mod policy;
mod state;


pub use action::Action;
pub use event::Event;
pub use policy::Policy;

use focus_core::{
    Actuator, ContrastSample, DeviceStore, ImageSource, Observer, Position, RangeError,
    SearchRange, SearchState,
};

use crate::{Bounds, Error, Session, SlopeEstimate, Solution, Status};

use state::{State, Step};

/// Climbs to the contrast peak starting from the actuator's current position.
///
/// The range supplies the initial probe direction (from `start` toward `end`)
/// and the initial step magnitude. The climb itself is bounded by the
/// calibration bounds in the session config.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] before any move if the step is smaller than
/// the slope probe, [`Error::FlatContrast`] if the first two estimates see no
/// slope, [`Error::MaxIters`] if no peak is found within the
/// configured iteration limit, and any device, cancellation, or deadline error
/// raised while running.
pub fn search<I, A, S, Obs>(
    mut session: Session<I, A, S>,
    range: &SearchRange,
    policy: Policy,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
    Obs: Observer<Event, Action>,
{
    let config = *session.config();
    let slope_step = config.slope_step();
    let initial_step = range.step_magnitude();
    if initial_step < slope_step {
        return Err(RangeError::StepBelowProbe {
            step: initial_step,
            slope_step,
        }
        .into());
    }

    session.check_live()?;
    let start = session.begin()?;
    let bounds = config.bounds();
    if !bounds.contains(start) {
        let clamped = bounds.clamp(start);
        log::warn!("start {start} outside calibration bounds, moving to {clamped}");
        session.move_absolute(clamped)?;
    }
    session.settle(config.timing().move_settle);

    let mut best = Best::default();

    // First iteration: pick a direction and take the first step.
    let probe_direction = range.direction();
    let estimate = session.estimate_slope(probe_direction)?;
    best.offer(&estimate);

    let mut state = State::new(
        estimate.uphill(),
        initial_step,
        config.timing().move_settle,
        estimate.slope,
    );
    log::debug!("initial slope {:.6}, climbing {:?}", estimate.slope, state.direction());

    let event = Event::Probed {
        iter: 0,
        estimate,
        direction: state.direction(),
        move_step: state.move_step(),
        turns: state.turns(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(session.finish(Status::StoppedByObserver, SearchState::NotFound, best.get(), 0));
    }

    session.move_relative(
        state
            .direction()
            .times(initial_step)
            .saturating_sub(estimate.displacement),
    )?;
    session.settle(state.delay());

    for iter in 1..=config.max_iters() {
        session.check_live()?;

        let estimate = session.estimate_slope(state.direction())?;
        best.offer(&estimate);

        let step = state.advance(estimate.slope, policy, slope_step);
        log::debug!(
            "iter {iter}: slope {:.6}, {:?} step {} (turns {})",
            estimate.slope,
            state.direction(),
            state.move_step(),
            state.turns()
        );

        let event = Event::Probed {
            iter,
            estimate,
            direction: state.direction(),
            move_step: state.move_step(),
            turns: state.turns(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(session.finish(
                Status::StoppedByObserver,
                SearchState::Finding,
                best.get(),
                iter,
            ));
        }

        match step {
            Step::Flat => {
                let start = best.get().map_or(session.expected_position(), |b| b.position);
                log::warn!("contrast is flat around {start}, returning there");
                session.move_relative(start - session.expected_position())?;
                return Err(Error::FlatContrast(start));
            }
            Step::Finish(step) => {
                let planned = step.saturating_sub(estimate.displacement);
                let expected = session.expected_position();
                let delta = landing(expected, planned, best.get(), bounds, slope_step);
                if delta != planned {
                    log::debug!("final move of {planned} misses the sharpest sample, moving {delta}");
                }
                session.move_relative(delta)?;
                session.settle(state.delay());
                return Ok(session.finish(
                    Status::Converged,
                    SearchState::Success,
                    best.get(),
                    iter,
                ));
            }
            Step::Move(step) => {
                let delta = step.saturating_sub(estimate.displacement);
                let moved = session.move_relative(delta)?;
                if moved != delta && state.pin() {
                    let expected = session.expected_position();
                    let back = landing(expected, 0, best.get(), bounds, slope_step);
                    let status = if back == 0 {
                        log::info!("peak lies at or beyond calibration bound");
                        Status::ReachedBound
                    } else {
                        log::info!("pinned away from the sharpest sample, moving {back}");
                        session.move_relative(back)?;
                        Status::Converged
                    };
                    session.settle(state.delay());
                    return Ok(session.finish(status, SearchState::Success, best.get(), iter));
                }
                session.settle(state.delay());
            }
        }
    }

    log::error!("no peak after {} iterations", config.max_iters());
    Err(Error::MaxIters(config.max_iters()))
}

/// Climbs to the contrast peak without observer support.
///
/// This is a convenience wrapper around [`search`] that uses a no-op observer.
///
/// # Errors
///
/// Returns the same errors as [`search`].
pub fn search_unobserved<I, A, S>(
    session: Session<I, A, S>,
    range: &SearchRange,
    policy: Policy,
) -> Result<Solution, Error>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    search(session, range, policy, ())
}

/// Adjusts a final `planned` move so it ends within `slope_step` of `best`.
fn landing(
    expected: Position,
    planned: i64,
    best: Option<ContrastSample>,
    bounds: Bounds,
    slope_step: i64,
) -> i64 {
    let target = bounds.clamp(expected.saturating_add(planned));
    match best {
        Some(best) if (target - best.position).abs() > slope_step => best.position - expected,
        _ => planned,
    }
}

/// Sharpest sample seen by the climb.
#[derive(Debug, Default)]
struct Best(Option<ContrastSample>);

impl Best {
    fn offer(&mut self, estimate: &SlopeEstimate) {
        let candidate = estimate.sharper();
        match self.0 {
            Some(best) if !candidate.is_sharper_than(&best) => {}
            _ => self.0 = Some(candidate),
        }
    }

    fn get(&self) -> Option<ContrastSample> {
        self.0
    }
}
