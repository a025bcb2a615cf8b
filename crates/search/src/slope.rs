//! Local slope of the contrast metric from a two-sample probe.

use focus_core::{Actuator, ContrastSample, DeviceStore, Direction, ImageSource};

use crate::{Error, Session};

/// The result of one slope probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeEstimate {
    /// `Δmetric / Δposition` over the probe.
    ///
    /// Positive when contrast increases toward higher positions, regardless
    /// of which way the probe moved.
    pub slope: f64,

    /// Sample taken before the probe move.
    pub before: ContrastSample,

    /// Sample taken after the probe move.
    pub after: ContrastSample,

    /// Signed displacement the probe commanded.
    ///
    /// Normally `direction * slope_step`. Near a calibration bound the probe is
    /// shortened, or reflected if it cannot move forward at all.
    pub displacement: i64,
}

impl SlopeEstimate {
    /// Returns the direction in which contrast increases.
    #[must_use]
    pub fn uphill(&self) -> Direction {
        Direction::of(self.slope)
    }

    /// Returns the sharper of the two samples, preferring `before` on ties.
    #[must_use]
    pub fn sharper(&self) -> ContrastSample {
        if self.after.is_sharper_than(&self.before) {
            self.after
        } else {
            self.before
        }
    }
}

impl<I, A, S> Session<I, A, S>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    /// Estimates the local slope by probing `slope_step` in `direction`.
    ///
    /// Samples at the current position, moves by the probe displacement, waits
    /// the probe settle delay, and samples again. The actuator is left at the
    /// probed position: the displacement is part of the caller's motion, not
    /// free.
    ///
    /// # Errors
    ///
    /// Returns an error if sampling or the probe move fails.
    pub fn estimate_slope(&mut self, direction: Direction) -> Result<SlopeEstimate, Error> {
        let slope_step = self.config.slope_step();
        let before = self.sample()?;

        let mut displacement = self.move_relative(direction.times(slope_step))?;
        if displacement == 0 {
            log::debug!("probe blocked at {}, reflecting", self.expected_position());
            displacement = self.move_relative(direction.reversed().times(slope_step))?;
        }
        self.settle(self.config.timing().probe_settle);

        let after = self.sample()?;
        let slope = (after.metric - before.metric) / displacement as f64;
        log::debug!(
            "slope {slope:.6} over {displacement} ({:.4} -> {:.4})",
            before.metric,
            after.metric
        );

        Ok(SlopeEstimate {
            slope,
            before,
            after,
            displacement,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use focus_core::Direction;
    use focus_sim::{Move, Rig, curves};

    use crate::{Bounds, Config, Session, Timing};

    fn session_at(rig: &Rig) -> Session<focus_sim::Camera, focus_sim::Motor, focus_sim::Store> {
        let config = Config::new(Bounds::new(0, 10_000).expect("bounds"), 100)
            .and_then(|c| c.with_timing(Timing::immediate()))
            .and_then(|c| c.with_metric_scale(1.0))
            .expect("config");
        let (camera, motor, store) = rig.parts();
        let mut session = Session::new(camera, motor, store, config);
        session.begin().expect("begin");
        session
    }

    #[test]
    fn slope_is_a_derivative_in_either_probe_direction() {
        let rig = Rig::new(curves::linear(2.0), 5_000);
        let mut session = session_at(&rig);

        let forward = session.estimate_slope(Direction::Positive).expect("probe");
        let backward = session.estimate_slope(Direction::Negative).expect("probe");

        assert_relative_eq!(forward.slope, 2.0);
        assert_relative_eq!(backward.slope, 2.0);
        assert_eq!(forward.uphill(), Direction::Positive);
        assert_eq!(rig.position(), 5_000);
    }

    #[test]
    fn probe_moves_exactly_one_slope_step() {
        let rig = Rig::new(curves::parabola(3_000, 1.0), 5_000);
        let mut session = session_at(&rig);

        let estimate = session.estimate_slope(Direction::Negative).expect("probe");

        assert_eq!(estimate.displacement, -100);
        assert_eq!(estimate.before.position, 5_000);
        assert_eq!(estimate.after.position, 4_900);
        assert_eq!(rig.moves(), vec![Move::Relative(-100)]);
        assert!(estimate.slope < 0.0);
        assert_eq!(estimate.sharper(), estimate.after);
    }

    #[test]
    fn probe_reflects_at_bound() {
        let rig = Rig::new(curves::linear(-1.0), 10_000);
        let mut session = session_at(&rig);

        let estimate = session.estimate_slope(Direction::Positive).expect("probe");

        assert_eq!(estimate.displacement, -100);
        assert_relative_eq!(estimate.slope, -1.0);
        assert_eq!(rig.position(), 9_900);
        // The blocked forward move never reaches the motor.
        assert_eq!(rig.moves(), vec![Move::Relative(-100)]);
        assert_eq!(session.moves(), 1);
    }
}
