use std::time::Duration;

use focus_core::{DeviceStore, Position, keys};
use thiserror::Error;

use crate::Error;

/// Errors that can occur when validating a search config.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("calibration bounds must satisfy min < max (got {min}..={max})")]
    Bounds { min: Position, max: Position },

    #[error("slope_step must be positive (got {0})")]
    SlopeStep(i64),

    #[error("metric_scale must be finite and positive (got {0})")]
    MetricScale(f64),

    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("frame_poll must be nonzero")]
    FramePoll,

    #[error("position_tolerance must be non-negative (got {0})")]
    PositionTolerance(i64),
}

/// Calibration bounds of the actuator, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    min: Position,
    max: Position,
}

impl Bounds {
    /// Creates validated bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Bounds`] unless `min < max`.
    pub fn new(min: Position, max: Position) -> Result<Self, ConfigError> {
        if min >= max {
            return Err(ConfigError::Bounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Reads the bounds from the `af_min` and `af_max` store keys.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be read or the values are invalid.
    pub fn from_store<S: DeviceStore>(store: &S) -> Result<Self, Error> {
        let min = store.read_config(keys::AF_MIN).map_err(Error::store)?;
        let max = store.read_config(keys::AF_MAX).map_err(Error::store)?;
        Ok(Self::new(min, max)?)
    }

    #[must_use]
    pub fn min(&self) -> Position {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Position {
        self.max
    }

    /// Returns true if `position` lies within the bounds.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min..=self.max).contains(&position)
    }

    /// Returns `position` limited to the bounds.
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        position.clamp(self.min, self.max)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: 40_500,
            max: 60_000,
        }
    }
}

/// Settle delays and wait limits used by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after a slope probe move.
    pub probe_settle: Duration,

    /// Initial wait after a hill-climbing step. Halved on every reversal.
    pub move_settle: Duration,

    /// Wait after each sweep move.
    pub sweep_settle: Duration,

    /// Sleep between frame polls while no frame is available.
    pub frame_poll: Duration,

    /// Longest wait for a single frame. `None` waits indefinitely.
    pub frame_timeout: Option<Duration>,

    /// Deadline for a whole session, measured from its first iteration.
    pub session_timeout: Option<Duration>,
}

impl Timing {
    /// Timing with no settle delays, for simulated devices.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            probe_settle: Duration::ZERO,
            move_settle: Duration::ZERO,
            sweep_settle: Duration::ZERO,
            frame_poll: Duration::from_micros(1),
            frame_timeout: None,
            session_timeout: None,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            probe_settle: Duration::from_millis(20),
            move_settle: Duration::from_millis(500),
            sweep_settle: Duration::from_millis(20),
            frame_poll: Duration::from_millis(1),
            frame_timeout: None,
            session_timeout: None,
        }
    }
}

/// Configuration for a focus search session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "file::ConfigFile"))]
pub struct Config {
    bounds: Bounds,
    slope_step: i64,
    timing: Timing,
    metric_scale: f64,
    max_iters: usize,
    position_tolerance: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            slope_step: 500,
            timing: Timing::default(),
            metric_scale: 100.0,
            max_iters: 100,
            position_tolerance: None,
        }
    }
}

impl Config {
    /// Creates a config with the given bounds and probe displacement.
    ///
    /// Other settings take their defaults and can be changed with the
    /// `with_*` methods.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SlopeStep`] if `slope_step` is not positive.
    pub fn new(bounds: Bounds, slope_step: i64) -> Result<Self, ConfigError> {
        if slope_step <= 0 {
            return Err(ConfigError::SlopeStep(slope_step));
        }
        Ok(Self {
            bounds,
            slope_step,
            ..Self::default()
        })
    }

    /// Replaces the timing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FramePoll`] if the frame poll interval is zero.
    pub fn with_timing(mut self, timing: Timing) -> Result<Self, ConfigError> {
        if timing.frame_poll.is_zero() {
            return Err(ConfigError::FramePoll);
        }
        self.timing = timing;
        Ok(self)
    }

    /// Sets the factor applied to the raw contrast value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MetricScale`] unless `scale` is finite and positive.
    pub fn with_metric_scale(mut self, scale: f64) -> Result<Self, ConfigError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::MetricScale(scale));
        }
        self.metric_scale = scale;
        Ok(self)
    }

    /// Sets the hill-climbing iteration limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxIters`] if `max_iters` is zero.
    pub fn with_max_iters(mut self, max_iters: usize) -> Result<Self, ConfigError> {
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        self.max_iters = max_iters;
        Ok(self)
    }

    /// Enables the check that reported positions match commanded positions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PositionTolerance`] if `tolerance` is negative.
    pub fn with_position_tolerance(mut self, tolerance: Option<i64>) -> Result<Self, ConfigError> {
        if let Some(t) = tolerance.filter(|t| *t < 0) {
            return Err(ConfigError::PositionTolerance(t));
        }
        self.position_tolerance = tolerance;
        Ok(self)
    }

    /// Returns the actuator calibration bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the probe displacement used for slope estimation.
    #[must_use]
    pub fn slope_step(&self) -> i64 {
        self.slope_step
    }

    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Returns the factor applied to the raw contrast value.
    #[must_use]
    pub fn metric_scale(&self) -> f64 {
        self.metric_scale
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the allowed gap between reported and commanded position.
    #[must_use]
    pub fn position_tolerance(&self) -> Option<i64> {
        self.position_tolerance
    }

    /// Parses a config from TOML.
    ///
    /// Missing fields take their defaults. Durations are in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value fails validation.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(feature = "serde")]
mod file {
    use std::time::Duration;

    use serde::Deserialize;

    use super::{Bounds, Config, ConfigError, Timing};

    /// On-disk form of [`Config`], with durations in milliseconds.
    #[derive(Debug, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    pub(super) struct ConfigFile {
        min: i64,
        max: i64,
        slope_step: i64,
        probe_settle_ms: u64,
        move_settle_ms: u64,
        sweep_settle_ms: u64,
        frame_poll_ms: u64,
        frame_timeout_ms: Option<u64>,
        session_timeout_ms: Option<u64>,
        metric_scale: f64,
        max_iters: usize,
        position_tolerance: Option<i64>,
    }

    impl Default for ConfigFile {
        fn default() -> Self {
            let config = Config::default();
            let timing = config.timing();
            Self {
                min: config.bounds().min(),
                max: config.bounds().max(),
                slope_step: config.slope_step(),
                probe_settle_ms: millis(timing.probe_settle),
                move_settle_ms: millis(timing.move_settle),
                sweep_settle_ms: millis(timing.sweep_settle),
                frame_poll_ms: millis(timing.frame_poll),
                frame_timeout_ms: None,
                session_timeout_ms: None,
                metric_scale: config.metric_scale(),
                max_iters: config.max_iters(),
                position_tolerance: None,
            }
        }
    }

    impl TryFrom<ConfigFile> for Config {
        type Error = ConfigError;

        fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
            let timing = Timing {
                probe_settle: Duration::from_millis(file.probe_settle_ms),
                move_settle: Duration::from_millis(file.move_settle_ms),
                sweep_settle: Duration::from_millis(file.sweep_settle_ms),
                frame_poll: Duration::from_millis(file.frame_poll_ms),
                frame_timeout: file.frame_timeout_ms.map(Duration::from_millis),
                session_timeout: file.session_timeout_ms.map(Duration::from_millis),
            };
            Config::new(Bounds::new(file.min, file.max)?, file.slope_step)?
                .with_timing(timing)?
                .with_metric_scale(file.metric_scale)?
                .with_max_iters(file.max_iters)?
                .with_position_tolerance(file.position_tolerance)
        }
    }

    fn millis(duration: Duration) -> u64 {
        u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_calibration() {
        let config = Config::default();
        assert_eq!(config.bounds().min(), 40_500);
        assert_eq!(config.bounds().max(), 60_000);
        assert_eq!(config.slope_step(), 500);
        assert_eq!(config.max_iters(), 100);
        assert_eq!(config.timing().move_settle, Duration::from_millis(500));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(Bounds::new(10, 10), Err(ConfigError::Bounds { .. })));
        assert_eq!(
            Config::new(Bounds::default(), 0),
            Err(ConfigError::SlopeStep(0))
        );

        let config = Config::default();
        assert!(config.with_metric_scale(f64::NAN).is_err());
        assert!(config.with_metric_scale(-1.0).is_err());
        assert_eq!(config.with_max_iters(0), Err(ConfigError::MaxIters));
        assert_eq!(
            config.with_position_tolerance(Some(-1)),
            Err(ConfigError::PositionTolerance(-1))
        );

        let timing = Timing {
            frame_poll: Duration::ZERO,
            ..Timing::default()
        };
        assert_eq!(config.with_timing(timing), Err(ConfigError::FramePoll));
    }

    #[test]
    fn bounds_clamp() {
        let bounds = Bounds::new(0, 100).expect("valid bounds");
        assert_eq!(bounds.clamp(-5), 0);
        assert_eq!(bounds.clamp(105), 100);
        assert_eq!(bounds.clamp(50), 50);
        assert!(bounds.contains(100));
        assert!(!bounds.contains(101));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn loads_toml_with_defaults() {
        let config = Config::from_toml_str(
            r"
            min = 1000
            max = 9000
            slope_step = 250
            move_settle_ms = 100
            frame_timeout_ms = 2000
            ",
        )
        .expect("valid config");

        assert_eq!(config.bounds(), Bounds::new(1000, 9000).expect("valid bounds"));
        assert_eq!(config.slope_step(), 250);
        assert_eq!(config.timing().move_settle, Duration::from_millis(100));
        assert_eq!(config.timing().probe_settle, Duration::from_millis(20));
        assert_eq!(config.timing().frame_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.max_iters(), 100);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn toml_validation_errors_surface() {
        assert!(Config::from_toml_str("min = 10\nmax = 5").is_err());
        assert!(Config::from_toml_str("slope_step = -3").is_err());
        assert!(Config::from_toml_str("unknown = 1").is_err());
    }
}
