//! Coloured noise stimulus.
//!
//! White gaussian noise is shaped in the frequency domain by the power
//! spectral density of the requested colour, transformed back, peak-normalised
//! and scaled by the channel gains. Both channels receive the same noise.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stimulus::{Stimulus, Synthesize, normalize_peak, stereo};
use crate::volume::{Volume, VolumeInput};
use crate::{StimulusError, StimulusResult};

/// A coloured noise stimulus.
pub type Noise = Stimulus<NoiseSynth>;

/// Spectral colour of the noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    /// Flat spectrum.
    #[default]
    White,
    /// Power falls off as `1/f`.
    Pink,
    /// Power rises as `f`.
    Blue,
    /// Power rises as `f^2`.
    Violet,
    /// Power falls off as `1/f^2`.
    Brown,
}

impl NoiseColor {
    /// Every supported colour.
    pub const ALL: [Self; 5] = [Self::White, Self::Pink, Self::Blue, Self::Violet, Self::Brown];

    /// Lowercase colour name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Violet => "violet",
            Self::Brown => "brown",
        }
    }

    /// Amplitude shaping factor at normalised frequency `f` (cycles per sample).
    ///
    /// Colours that diverge at DC return 0 there.
    pub fn amplitude(&self, f: f64) -> f64 {
        match self {
            Self::White => 1.0,
            Self::Blue => f.sqrt(),
            Self::Violet => f,
            Self::Pink if f == 0.0 => 0.0,
            Self::Pink => 1.0 / f.sqrt(),
            Self::Brown if f == 0.0 => 0.0,
            Self::Brown => 1.0 / f,
        }
    }
}

impl fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoiseColor {
    type Err = StimulusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                StimulusError::invalid_parameter(
                    "color",
                    format!("unknown noise color '{s}', expected one of white, pink, blue, violet, brown"),
                )
            })
    }
}

/// Noise synthesis with its own random number generator.
#[derive(Debug, Clone)]
pub struct NoiseSynth {
    color: NoiseColor,
    rng: StdRng,
}

impl NoiseSynth {
    /// Noise of the given colour seeded from the operating system.
    pub fn new(color: NoiseColor) -> Self {
        Self {
            color,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Noise of the given colour with a reproducible seed.
    pub fn with_seed(color: NoiseColor, seed: u64) -> Self {
        Self {
            color,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Noise colour.
    pub const fn color(&self) -> NoiseColor {
        self.color
    }
}

impl Default for NoiseSynth {
    fn default() -> Self {
        Self::new(NoiseColor::default())
    }
}

impl Synthesize for NoiseSynth {
    fn name(&self) -> String {
        format!("{} noise", self.color)
    }

    fn synthesize(&mut self, times: ArrayView1<'_, f64>, volume: &Volume) -> Array2<f64> {
        let mut noise = colored_noise(&mut self.rng, times.len(), self.color);
        normalize_peak(&mut noise);
        stereo(&noise, volume)
    }
}

/// Generate `n` samples of noise with the spectral shape of `color`.
///
/// The shaping curve is scaled to unit RMS over the non-negative frequency
/// bins so the output keeps the energy of the underlying white noise.
pub fn colored_noise<R: Rng>(rng: &mut R, n: usize, color: NoiseColor) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }

    let mut spectrum: Vec<Complex<f64>> = (0..n)
        .map(|_| Complex::new(rng.sample::<f64, _>(StandardNormal), 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut spectrum);

    // Shaping evaluated on the rfft bins 0..=n/2.
    let n_f = n as f64;
    let shape: Vec<f64> = (0..=n / 2).map(|k| color.amplitude(k as f64 / n_f)).collect();
    let rms = (shape.iter().map(|s| s * s).sum::<f64>() / shape.len() as f64).sqrt();
    let scale = if rms > 0.0 { 1.0 / rms } else { 0.0 };

    for (k, bin) in spectrum.iter_mut().enumerate() {
        *bin *= shape[k.min(n - k)] * scale;
    }

    planner.plan_fft_inverse(n).process(&mut spectrum);
    debug!("Generated {n} samples of {color} noise.");
    spectrum.into_iter().map(|c| c.re / n_f).collect()
}

impl Stimulus<NoiseSynth> {
    /// Noise colour.
    pub fn color(&self) -> NoiseColor {
        let color = self.synth().color();
        debug!("'color' is set to {color}.");
        color
    }

    /// Replace the noise colour and recompute the signal.
    pub fn set_color(&mut self, color: NoiseColor) {
        debug!("Setting 'color' to {color}.");
        self.update_synth(|synth| synth.color = color);
    }
}

/// Build a coloured noise stimulus.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] if any parameter is invalid.
pub fn noise(
    volume: impl Into<VolumeInput>,
    sample_rate: u32,
    duration: f64,
    color: NoiseColor,
) -> StimulusResult<Noise> {
    Stimulus::new(NoiseSynth::new(color), volume, sample_rate, duration)
}
