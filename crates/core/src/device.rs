use crate::Position;

/// Well-known keys understood by a [`DeviceStore`].
pub mod keys {
    /// Base focus position used as the start of a pupil search.
    pub const AF_BASE: &str = "af_base";

    /// Focus position last reported by the actuator.
    pub const AF_CURR: &str = "af_curr";

    /// Lower calibration bound of the actuator.
    pub const AF_MIN: &str = "af_min";

    /// Upper calibration bound of the actuator.
    pub const AF_MAX: &str = "af_max";
}

/// A source of frames and the sharpness reduction applied to them.
///
/// Capture is non-blocking: `Ok(None)` means no frame is available yet and the
/// caller should retry. It is not an error.
pub trait ImageSource {
    type Frame;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the latest frame, or `None` if no frame is available yet.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the source has failed, as opposed to merely
    /// not having a frame ready.
    fn capture_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error>;

    /// Reduces a frame to a scalar sharpness value.
    ///
    /// Higher values mean better focus. The reduction must be deterministic.
    fn extract_contrast(&self, frame: &Self::Frame) -> f64;
}

/// A single-axis focus actuator.
///
/// Moves are treated as synchronous once the caller's settle delay elapses.
pub trait Actuator {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Moves by `delta` motor steps from the current position.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the move could not be issued.
    fn move_relative(&mut self, delta: i64) -> Result<(), Self::Error>;

    /// Moves to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the move could not be issued.
    fn move_absolute(&mut self, position: Position) -> Result<(), Self::Error>;
}

/// Device state and calibration storage.
pub trait DeviceStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the actuator's reported current position.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the position cannot be read.
    fn read_current_position(&self) -> Result<Position, Self::Error>;

    /// Reads an integer configuration value, such as a calibration constant.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the key is missing or cannot be read.
    fn read_config(&self, key: &str) -> Result<i64, Self::Error>;
}

impl<T: ImageSource + ?Sized> ImageSource for &mut T {
    type Frame = T::Frame;
    type Error = T::Error;

    fn capture_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error> {
        (**self).capture_frame()
    }

    fn extract_contrast(&self, frame: &Self::Frame) -> f64 {
        (**self).extract_contrast(frame)
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    type Error = T::Error;

    fn move_relative(&mut self, delta: i64) -> Result<(), Self::Error> {
        (**self).move_relative(delta)
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), Self::Error> {
        (**self).move_absolute(position)
    }
}

impl<T: DeviceStore + ?Sized> DeviceStore for &T {
    type Error = T::Error;

    fn read_current_position(&self) -> Result<Position, Self::Error> {
        (**self).read_current_position()
    }

    fn read_config(&self, key: &str) -> Result<i64, Self::Error> {
        (**self).read_config(key)
    }
}

impl<T: DeviceStore + ?Sized> DeviceStore for &mut T {
    type Error = T::Error;

    fn read_current_position(&self) -> Result<Position, Self::Error> {
        (**self).read_current_position()
    }

    fn read_config(&self, key: &str) -> Result<i64, Self::Error> {
        (**self).read_config(key)
    }
}
