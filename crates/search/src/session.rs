use std::time::{Duration, Instant};

use focus_core::{
    Actuator, CancelToken, ContrastSample, DeviceStore, ImageSource, Position, SearchState,
};

use crate::{Config, Error, Solution, Status};

/// Exclusive ownership of the focus devices for the duration of one search.
///
/// A session is constructed fresh for every search and consumed by the
/// strategy that runs it, so no state carries over between searches. The
/// caller must ensure nothing else moves the actuator while a session exists.
///
/// The session tracks the position it expects the actuator to be at: the
/// readback taken when the search begins plus every delta it has commanded.
pub struct Session<I, A, S> {
    pub(crate) image: I,
    pub(crate) actuator: A,
    pub(crate) store: S,
    pub(crate) config: Config,
    cancel: CancelToken,
    started: Option<Instant>,
    expected: Position,
    moves: usize,
}

impl<I, A, S> Session<I, A, S>
where
    I: ImageSource,
    A: Actuator,
    S: DeviceStore,
{
    /// Creates a session over the given devices.
    pub fn new(image: I, actuator: A, store: S, config: Config) -> Self {
        Self {
            image,
            actuator,
            store,
            config,
            cancel: CancelToken::new(),
            started: None,
            expected: 0,
            moves: 0,
        }
    }

    /// Attaches a token that can cancel the search from another thread.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the position the session expects the actuator to be at.
    #[must_use]
    pub fn expected_position(&self) -> Position {
        self.expected
    }

    /// Returns the number of actuator moves issued so far.
    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Reads an integer value from the device store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot provide the key.
    pub fn read_config(&self, key: &str) -> Result<i64, Error> {
        self.store.read_config(key).map_err(Error::store)
    }

    /// Starts the session clock and syncs the expected position with the device.
    pub(crate) fn begin(&mut self) -> Result<Position, Error> {
        self.started = Some(Instant::now());
        self.expected = self
            .store
            .read_current_position()
            .map_err(Error::store)?;
        log::info!("autofocus session started at position {}", self.expected);
        Ok(self.expected)
    }

    /// Fails if the session has been cancelled or has run past its deadline.
    pub(crate) fn check_live(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            log::warn!("autofocus cancelled at position {}", self.expected);
            return Err(Error::Cancelled);
        }
        if let (Some(limit), Some(started)) = (self.config.timing().session_timeout, self.started)
        {
            if started.elapsed() > limit {
                log::warn!("autofocus deadline of {limit:?} exceeded");
                return Err(Error::DeadlineExceeded(limit));
            }
        }
        Ok(())
    }

    /// Waits for the actuator to settle.
    pub(crate) fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    /// Moves by `delta`, limited so the actuator stays within the calibration bounds.
    ///
    /// Returns the displacement actually commanded. A move clamped to nothing
    /// is not sent to the actuator.
    pub(crate) fn move_relative(&mut self, delta: i64) -> Result<i64, Error> {
        let bounds = self.config.bounds();
        let target = bounds.clamp(self.expected.saturating_add(delta));
        let actual = target - self.expected;
        if actual != delta {
            log::warn!(
                "move of {delta} from {} clamped to {actual} by bounds {}..={}",
                self.expected,
                bounds.min(),
                bounds.max()
            );
        }
        if actual == 0 {
            return Ok(0);
        }
        self.actuator
            .move_relative(actual)
            .map_err(Error::actuator)?;
        self.expected = target;
        self.moves += 1;
        Ok(actual)
    }

    /// Moves to an absolute position.
    pub(crate) fn move_absolute(&mut self, position: Position) -> Result<(), Error> {
        self.actuator
            .move_absolute(position)
            .map_err(Error::actuator)?;
        self.expected = position;
        self.moves += 1;
        Ok(())
    }

    /// Fails if the reported position has drifted from the expected one.
    pub(crate) fn verify_position(&self, reported: Position) -> Result<(), Error> {
        match self.config.position_tolerance() {
            Some(tolerance) if (reported - self.expected).abs() > tolerance => {
                log::error!(
                    "actuator reports {reported} but {} was commanded",
                    self.expected
                );
                Err(Error::PositionDiverged {
                    expected: self.expected,
                    reported,
                })
            }
            _ => Ok(()),
        }
    }

    /// Ends the session and reports where the actuator was left.
    pub(crate) fn finish(
        self,
        status: Status,
        state: SearchState,
        best: Option<ContrastSample>,
        iters: usize,
    ) -> Solution {
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        log::info!(
            "autofocus finished in {elapsed:?}: {status:?} at position {} after {} moves",
            self.expected,
            self.moves
        );
        Solution {
            status,
            state,
            position: self.expected,
            best,
            iters,
            moves: self.moves,
        }
    }
}
