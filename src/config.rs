//! Serializable stimulus defaults.

use serde::{Deserialize, Serialize};

use crate::stimulus::{DEFAULT_DURATION, DEFAULT_SAMPLE_RATE};
use crate::volume::VolumeInput;

/// Parameters shared by every stimulus variant.
///
/// Values are validated when the configuration is turned into a
/// [`Stimulus`](crate::Stimulus), not when it is deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Volume, a scalar or one value per channel, in `[0, 100]`.
    pub volume: VolumeInput,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration: f64,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            volume: VolumeInput::Scalar(50.0),
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: DEFAULT_DURATION,
        }
    }
}
