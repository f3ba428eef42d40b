//! Pure tone stimulus, `sin(2*pi*f*t)`.

use std::f64::consts::TAU;

use ndarray::{Array1, Array2, ArrayView1};
use tracing::debug;

use crate::checks::check_frequency;
use crate::stimulus::{
    DEFAULT_DURATION, DEFAULT_SAMPLE_RATE, Stimulus, Synthesize, normalize_peak, stereo,
};
use crate::volume::{Volume, VolumeInput};
use crate::StimulusResult;

/// Default tone frequency, A440.
pub const DEFAULT_FREQUENCY: f64 = 440.0;

/// A pure tone stimulus.
pub type Tone = Stimulus<ToneSynth>;

/// Sine synthesis at a fixed frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSynth {
    frequency: f64,
}

impl ToneSynth {
    /// Create a tone synthesizer.
    ///
    /// # Errors
    /// Returns [`crate::StimulusError::InvalidParameter`] unless `frequency` is finite and positive.
    pub fn new(frequency: f64) -> StimulusResult<Self> {
        Ok(Self {
            frequency: check_frequency(frequency)?,
        })
    }

    /// Tone frequency in Hz.
    pub const fn frequency(&self) -> f64 {
        self.frequency
    }
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
        }
    }
}

impl Synthesize for ToneSynth {
    fn name(&self) -> String {
        "tone".to_string()
    }

    fn synthesize(&mut self, times: ArrayView1<'_, f64>, volume: &Volume) -> Array2<f64> {
        let mut tone: Array1<f64> = times.mapv(|t| (TAU * self.frequency * t).sin());
        normalize_peak(&mut tone);
        stereo(&tone, volume)
    }
}

impl Stimulus<ToneSynth> {
    /// Tone frequency in Hz.
    pub fn frequency(&self) -> f64 {
        let frequency = self.synth().frequency();
        debug!("'frequency' is set to {frequency:.2} [Hz].");
        frequency
    }

    /// Replace the tone frequency and recompute the signal.
    ///
    /// # Errors
    /// Returns [`crate::StimulusError::InvalidParameter`] unless `frequency` is finite and positive.
    pub fn set_frequency(&mut self, frequency: f64) -> StimulusResult<()> {
        debug!("Setting 'frequency' to {frequency:.2} [Hz].");
        let frequency = check_frequency(frequency)?;
        self.update_synth(|synth| synth.frequency = frequency);
        Ok(())
    }
}

/// Build a pure tone stimulus.
///
/// # Errors
/// Returns [`crate::StimulusError::InvalidParameter`] if any parameter is invalid.
pub fn tone(
    volume: impl Into<VolumeInput>,
    sample_rate: u32,
    duration: f64,
    frequency: f64,
) -> StimulusResult<Tone> {
    Stimulus::new(ToneSynth::new(frequency)?, volume, sample_rate, duration)
}

/// Build an A440 tone lasting one second at 44.1 kHz.
///
/// # Errors
/// Returns [`crate::StimulusError::InvalidParameter`] if the volume is invalid.
pub fn default_tone(volume: impl Into<VolumeInput>) -> StimulusResult<Tone> {
    tone(volume, DEFAULT_SAMPLE_RATE, DEFAULT_DURATION, DEFAULT_FREQUENCY)
}
