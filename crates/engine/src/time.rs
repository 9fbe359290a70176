use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Scene frame rate in whole frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Fps(u32);

impl Fps {
    /// Default scene rate used when a project does not set one.
    pub const DEFAULT: Self = Self(24);

    /// Creates a validated frame rate.
    ///
    /// # Example
    /// ```
    /// use sequencer::Fps;
    ///
    /// let fps = Fps::new(30).expect("valid");
    /// assert_eq!(fps.get(), 30);
    /// assert!(Fps::new(0).is_err());
    /// ```
    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(EngineError::InvalidFps(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration(self) -> f64 {
        1.0 / f64::from(self.0)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Fps {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Fps> for u32 {
    fn from(value: Fps) -> Self {
        value.0
    }
}

/// Converts seconds to a frame number, rounding to nearest with ties away
/// from zero.
///
/// Every time-based operation goes through this function.
///
/// # Example
/// ```
/// use sequencer::{Fps, seconds_to_frame};
///
/// let fps = Fps::new(24).expect("valid");
/// assert_eq!(seconds_to_frame(2.0, fps), 48);
/// assert_eq!(seconds_to_frame(0.0625, fps), 2);
/// assert_eq!(seconds_to_frame(-0.0625, fps), -2);
/// ```
pub fn seconds_to_frame(seconds: f64, fps: Fps) -> i64 {
    (seconds * f64::from(fps.get())).round() as i64
}

/// Converts a frame number back to seconds.
pub fn frame_to_seconds(frame: i64, fps: Fps) -> f64 {
    frame as f64 / f64::from(fps.get())
}
