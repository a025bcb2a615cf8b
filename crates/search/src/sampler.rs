//! Contrast sampling: one frame, one metric, one position readback.

use std::time::{Duration, Instant};

use focus_core::{Actuator, ContrastSample, DeviceStore, ImageSource};

use crate::{Error, Session};

/// Frame waits longer than this are logged once.
const SLOW_FRAME: Duration = Duration::from_secs(1);

impl<I, A, S> Session<I, A, S>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    /// Measures contrast at the actuator's current position.
    ///
    /// Waits for a frame if none is available yet, reduces it to a scalar with
    /// the image source's sharpness filter, applies the configured metric
    /// scale, and tags the result with the position read back from the store.
    /// Does not move the actuator.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is cancelled or times out while waiting,
    /// if a device fails, or if the reported position has diverged from the
    /// commanded one beyond the configured tolerance.
    pub fn sample(&mut self) -> Result<ContrastSample, Error> {
        let frame = self.wait_for_frame()?;
        let metric = self.image.extract_contrast(&frame) * self.config.metric_scale();
        let position = self
            .store
            .read_current_position()
            .map_err(Error::store)?;
        self.verify_position(position)?;

        let sample = ContrastSample::new(position, metric);
        log::trace!("sampled {metric:.4} at {position}");
        Ok(sample)
    }

    /// Polls the image source until a frame is available.
    fn wait_for_frame(&mut self) -> Result<I::Frame, Error> {
        let timing = *self.config.timing();
        let started = Instant::now();
        let mut warned = false;

        loop {
            self.check_live()?;
            if let Some(frame) = self.image.capture_frame().map_err(Error::image)? {
                return Ok(frame);
            }

            let waited = started.elapsed();
            if let Some(limit) = timing.frame_timeout {
                if waited >= limit {
                    log::error!("no frame available after {waited:?}");
                    return Err(Error::FrameTimeout(limit));
                }
            }
            if !warned && waited >= SLOW_FRAME {
                log::warn!("still waiting for a frame after {waited:?}");
                warned = true;
            }
            std::thread::sleep(timing.frame_poll);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use focus_core::CancelToken;
    use focus_sim::{Rig, curves};

    use crate::{Bounds, Config, Error, Session, Timing};

    fn config() -> Config {
        Config::new(Bounds::new(0, 10_000).expect("bounds"), 100)
            .and_then(|c| c.with_timing(Timing::immediate()))
            .expect("config")
    }

    #[test]
    fn sample_scales_metric_and_tags_position() {
        let rig = Rig::new(curves::parabola(5_000, 1.0), 4_000);
        let (camera, motor, store) = rig.parts();
        let mut session = Session::new(camera, motor, store, config());

        let sample = session.sample().expect("sample");

        assert_eq!(sample.position, 4_000);
        assert_relative_eq!(sample.metric, -1_000_000.0 * 100.0);
        assert!(rig.moves().is_empty());
    }

    #[test]
    fn empty_frames_are_waited_out() {
        let rig = Rig::new(curves::parabola(5_000, 1.0), 5_000).with_empty_frames(25);
        let (camera, motor, store) = rig.parts();
        let mut session = Session::new(camera, motor, store, config());

        let sample = session.sample().expect("sample");

        assert_relative_eq!(sample.metric, 0.0);
        assert_eq!(rig.captures(), 26);
    }

    #[test]
    fn frame_timeout_ends_wait() {
        let rig = Rig::new(curves::parabola(5_000, 1.0), 5_000).with_empty_frames(usize::MAX);
        let (camera, motor, store) = rig.parts();
        let timing = Timing {
            frame_poll: Duration::from_millis(1),
            frame_timeout: Some(Duration::from_millis(10)),
            ..Timing::immediate()
        };
        let config = config().with_timing(timing).expect("timing");
        let mut session = Session::new(camera, motor, store, config);

        let err = session.sample().expect_err("should time out");

        assert!(matches!(err, Error::FrameTimeout(_)));
    }

    #[test]
    fn cancellation_interrupts_wait() {
        let rig = Rig::new(curves::parabola(5_000, 1.0), 5_000).with_empty_frames(usize::MAX);
        let (camera, motor, store) = rig.parts();
        let cancel = CancelToken::new();
        let mut session = Session::new(camera, motor, store, config()).with_cancel(cancel.clone());

        cancel.cancel();
        let err = session.sample().expect_err("should be cancelled");

        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn diverged_position_is_reported() {
        let rig = Rig::new(curves::parabola(5_000, 1.0), 5_000).with_jam_after(0);
        let (camera, motor, store) = rig.parts();
        let config = config().with_position_tolerance(Some(50)).expect("tolerance");
        let mut session = Session::new(camera, motor, store, config);
        session.begin().expect("begin");
        session.move_relative(-200).expect("move");

        let err = session.sample().expect_err("should diverge");

        assert!(matches!(err, Error::PositionDiverged { .. }));
    }
}
