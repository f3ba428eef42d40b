//! The stimulus parameter model.
//!
//! A [`Stimulus`] owns four user-facing parameters (volume, sample rate,
//! duration and an optional window) and two derived buffers: the time axis and
//! the stereo signal. Every setter validates its input first and then eagerly
//! recomputes whatever depends on it, so the buffers never go stale:
//!
//! - volume or window changed: signal is recomputed;
//! - sample rate or duration changed: time axis, then signal, are recomputed.
//!
//! The waveform itself comes from a [`Synthesize`] implementation such as
//! [`ToneSynth`](crate::ToneSynth) or [`NoiseSynth`](crate::NoiseSynth).
//!
//! # Copies
//!
//! Buffers live behind [`Arc`]. [`Clone`] and `copy(false)` produce a shallow
//! copy that aliases the original's buffers; `copy(true)` allocates fresh ones.
//! Recomputation always installs new buffers, and [`Stimulus::signal_mut`]
//! detaches an aliased signal before handing it out.

use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

use crate::checks::{
    check_duration, check_sample_count, check_sample_rate, check_volume, check_window, sample_count,
};
use crate::config::StimulusConfig;
use crate::volume::{Volume, VolumeInput, VolumeLevel};
use crate::window::{WindowType, generate_window};
use crate::{StimulusError, StimulusResult};

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default duration in seconds.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Waveform synthesis capability supplied by concrete stimulus variants.
pub trait Synthesize {
    /// Short human readable name, e.g. `"tone"` or `"pink noise"`.
    fn name(&self) -> String;

    /// Produce the raw, unwindowed stereo waveform.
    ///
    /// The returned buffer must have shape `(times.len(), 2)`; column 0 is the
    /// left channel and column 1 the right channel. `volume` holds the
    /// per-channel gains to apply.
    fn synthesize(&mut self, times: ArrayView1<'_, f64>, volume: &Volume) -> Array2<f64>;
}

/// Scale a mono waveform so its largest magnitude is 1. Silent input is left alone.
pub(crate) fn normalize_peak(samples: &mut Array1<f64>) {
    let peak = samples.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()));
    if peak > 0.0 {
        samples.mapv_inplace(|x| x / peak);
    }
}

/// Duplicate a mono waveform into two columns scaled by the channel gains.
pub(crate) fn stereo(mono: &Array1<f64>, volume: &Volume) -> Array2<f64> {
    let gains = volume.factors();
    Array2::from_shape_fn((mono.len(), 2), |(i, c)| mono[i] * gains[c])
}

/// An audio stimulus: validated parameters plus their derived buffers.
#[derive(Debug, Clone)]
pub struct Stimulus<S: Synthesize> {
    synth: S,
    volume: Volume,
    sample_rate: u32,
    duration: f64,
    window: Option<Arc<Array1<f64>>>,
    times: Arc<Array1<f64>>,
    signal: Arc<Array2<f64>>,
}

impl<S: Synthesize> Stimulus<S> {
    /// Build a stimulus, validating every parameter.
    ///
    /// The window starts out absent (rectangular).
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if any parameter is out of
    /// range or the time axis would exceed [`MAX_SAMPLES`](crate::checks::MAX_SAMPLES).
    pub fn new(
        synth: S,
        volume: impl Into<VolumeInput>,
        sample_rate: u32,
        duration: f64,
    ) -> StimulusResult<Self> {
        let volume = check_volume(&volume.into())?;
        let sample_rate = check_sample_rate(sample_rate)?;
        let duration = check_duration(duration)?;
        check_sample_count("duration", duration, sample_rate)?;

        let mut stimulus = Self {
            synth,
            volume,
            sample_rate,
            duration,
            window: None,
            times: Arc::new(Array1::zeros(0)),
            signal: Arc::new(Array2::zeros((0, 2))),
        };
        stimulus.recompute_times();
        stimulus.recompute_signal();
        Ok(stimulus)
    }

    /// Build a stimulus at the default sample rate and duration.
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if the volume is out of range.
    pub fn with_defaults(synth: S, volume: impl Into<VolumeInput>) -> StimulusResult<Self> {
        Self::new(synth, volume, DEFAULT_SAMPLE_RATE, DEFAULT_DURATION)
    }

    /// Build a stimulus from a [`StimulusConfig`].
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if the configuration holds invalid values.
    pub fn from_config(synth: S, config: &StimulusConfig) -> StimulusResult<Self> {
        Self::new(
            synth,
            config.volume.clone(),
            config.sample_rate,
            config.duration,
        )
    }

    /// Name of the underlying synthesis variant.
    pub fn name(&self) -> String {
        self.synth.name()
    }

    /// Variant specific synthesis parameters.
    pub const fn synth(&self) -> &S {
        &self.synth
    }

    /// Current volume. Equal channels are reported as [`VolumeLevel::Mono`].
    pub fn volume(&self) -> VolumeLevel {
        debug!("'volume' is set to {} [AU].", self.volume);
        self.volume.level()
    }

    /// Replace the volume and recompute the signal.
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] on wrong arity, non-finite or
    /// out of range values. The stimulus is left untouched in that case.
    pub fn set_volume(&mut self, volume: impl Into<VolumeInput>) -> StimulusResult<()> {
        let volume = volume.into();
        debug!("Setting 'volume' to {volume} [AU].");
        self.volume = check_volume(&volume)?;
        self.recompute_signal();
        Ok(())
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        debug!("'sample_rate' is set to {} [Hz].", self.sample_rate);
        self.sample_rate
    }

    /// Replace the sample rate and recompute the time axis and signal; refused
    /// while a window is set unless the sample count stays the same.
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if the rate is zero, if the
    /// time axis would exceed [`MAX_SAMPLES`](crate::checks::MAX_SAMPLES), or if
    /// a window is set whose length would no longer match the number of samples.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> StimulusResult<()> {
        debug!("Setting 'sample_rate' to {sample_rate} [Hz].");
        let sample_rate = check_sample_rate(sample_rate)?;
        let n_samples = check_sample_count("sample_rate", self.duration, sample_rate)?;
        self.check_window_fits(n_samples)?;
        self.sample_rate = sample_rate;
        self.recompute_times();
        self.recompute_signal();
        Ok(())
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        debug!("'duration' is set to {:.2} [seconds].", self.duration);
        self.duration
    }

    /// Replace the duration and recompute the time axis and signal; refused
    /// while a window is set unless the sample count stays the same.
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if the duration is not a
    /// positive finite number, if the time axis would exceed
    /// [`MAX_SAMPLES`](crate::checks::MAX_SAMPLES), or if a window is set whose
    /// length would no longer match the number of samples.
    pub fn set_duration(&mut self, duration: f64) -> StimulusResult<()> {
        debug!("Setting 'duration' to {duration:.2} [seconds].");
        let duration = check_duration(duration)?;
        let n_samples = check_sample_count("duration", duration, self.sample_rate)?;
        self.check_window_fits(n_samples)?;
        self.duration = duration;
        self.recompute_times();
        self.recompute_signal();
        Ok(())
    }

    /// Window applied to the raw waveform, if any.
    pub fn window(&self) -> Option<&Array1<f64>> {
        self.window.as_deref()
    }

    /// Install or clear the window and recompute the signal.
    ///
    /// `None` restores the rectangular (no-op) window.
    ///
    /// # Errors
    /// Returns [`StimulusError::InvalidParameter`] if the window length differs
    /// from [`n_samples`](Self::n_samples) or it holds non-finite values.
    pub fn set_window(&mut self, window: Option<Array1<f64>>) -> StimulusResult<()> {
        match &window {
            Some(w) => {
                debug!("Setting 'window' with {} coefficients.", w.len());
                check_window(w, self.n_samples())?;
            }
            None => debug!("Clearing 'window'."),
        }
        self.window = window.map(Arc::new);
        self.recompute_signal();
        Ok(())
    }

    /// Install a generated window matching the current number of samples.
    ///
    /// # Errors
    /// Propagates errors from [`set_window`](Self::set_window).
    pub fn set_window_type(&mut self, window_type: WindowType) -> StimulusResult<()> {
        self.set_window(Some(generate_window(self.n_samples(), window_type)))
    }

    /// Number of samples, the length of the time axis.
    pub fn n_samples(&self) -> usize {
        self.times.len()
    }

    /// Sample timestamps in seconds, spanning `[0, duration]` inclusive.
    pub fn times(&self) -> &Array1<f64> {
        &self.times
    }

    /// Final signal, shape `(n_samples, 2)`.
    pub fn signal(&self) -> &Array2<f64> {
        &self.signal
    }

    /// Mutable access to the signal buffer.
    ///
    /// If the buffer is shared with a shallow copy it is detached first. Any
    /// edits are discarded at the next recomputation.
    pub fn signal_mut(&mut self) -> &mut Array2<f64> {
        Arc::make_mut(&mut self.signal)
    }

    /// Duplicate the stimulus.
    ///
    /// With `deep` every buffer is freshly allocated. Without it, the copy
    /// aliases the original's time axis, window and signal until either side
    /// recomputes or detaches them.
    pub fn copy(&self, deep: bool) -> Self
    where
        S: Clone,
    {
        debug!("Copying '{}' stimulus (deep: {deep}).", self.synth.name());
        let mut copy = self.clone();
        if deep {
            copy.times = Arc::new((*self.times).clone());
            copy.signal = Arc::new((*self.signal).clone());
            copy.window = self.window.as_deref().map(|w| Arc::new(w.clone()));
        }
        copy
    }

    /// Whether `other` aliases this stimulus' signal buffer.
    pub fn shares_signal_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.signal, &other.signal)
    }

    /// Apply a change to the synthesis parameters and recompute the signal.
    pub(crate) fn update_synth(&mut self, update: impl FnOnce(&mut S)) {
        update(&mut self.synth);
        self.recompute_signal();
    }

    fn check_window_fits(&self, n_samples: usize) -> StimulusResult<()> {
        match self.window.as_deref() {
            Some(window) if window.len() != n_samples => Err(StimulusError::invalid_parameter(
                "window",
                format!(
                    "the current window has {} coefficients but the new time axis would have {n_samples} samples; clear the window first",
                    window.len()
                ),
            )),
            _ => Ok(()),
        }
    }

    fn recompute_times(&mut self) {
        debug!(
            "Setting the 'times' array with the duration {:.2} [seconds] and the sampling rate {:.1} [Hz].",
            self.duration,
            f64::from(self.sample_rate)
        );
        let n_samples = sample_count(self.duration, self.sample_rate);
        self.times = Arc::new(Array1::linspace(0.0, self.duration, n_samples));
    }

    fn recompute_signal(&mut self) {
        debug!(
            "Synthesizing '{}' signal over {} samples.",
            self.synth.name(),
            self.times.len()
        );
        let mut signal = self.synth.synthesize(self.times.view(), &self.volume);
        debug_assert_eq!(signal.dim(), (self.times.len(), 2));

        if let Some(window) = self.window.as_deref() {
            debug!("Applying window to the signal.");
            signal *= &window.view().insert_axis(Axis(1));
        }
        self.signal = Arc::new(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    /// Constant waveform at the channel gains, handy for checking the model alone.
    #[derive(Debug, Clone, Default)]
    struct FlatSynth {
        calls: usize,
    }

    impl Synthesize for FlatSynth {
        fn name(&self) -> String {
            "flat".to_string()
        }

        fn synthesize(&mut self, times: ArrayView1<'_, f64>, volume: &Volume) -> Array2<f64> {
            self.calls += 1;
            let [left, right] = volume.factors();
            Array2::from_shape_fn((times.len(), 2), |(_, c)| if c == 0 { left } else { right })
        }
    }

    fn flat(volume: impl Into<VolumeInput>, sample_rate: u32, duration: f64) -> Stimulus<FlatSynth> {
        Stimulus::new(FlatSynth::default(), volume, sample_rate, duration).unwrap()
    }

    #[test]
    fn test_construct_example() {
        let stimulus = flat(50, 1000, 0.5);
        assert_eq!(stimulus.n_samples(), 500);
        assert_eq!(stimulus.times().len(), 500);
        assert_eq!(stimulus.times()[0], 0.0);
        assert_approx_eq!(stimulus.times()[499], 0.5, 1e-12);
        assert_eq!(stimulus.signal().dim(), (500, 2));
        assert_eq!(stimulus.synth().calls, 1);
        assert!(stimulus.window().is_none());
    }

    #[test]
    fn test_defaults() {
        let stimulus = Stimulus::with_defaults(FlatSynth::default(), 10).unwrap();
        assert_eq!(stimulus.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(stimulus.duration(), DEFAULT_DURATION);
        assert_eq!(stimulus.n_samples(), 44100);
        assert_eq!(stimulus.name(), "flat");
    }

    #[test]
    fn test_construct_rejects_invalid() {
        assert!(Stimulus::new(FlatSynth::default(), 101, 1000, 1.0).is_err());
        assert!(Stimulus::new(FlatSynth::default(), 50, 0, 1.0).is_err());
        assert!(Stimulus::new(FlatSynth::default(), 50, 1000, 0.0).is_err());
        assert!(Stimulus::new(FlatSynth::default(), 50, 1000, -0.5).is_err());
    }

    #[test]
    fn test_times_are_ascending_and_span_duration() {
        for (sample_rate, duration) in [(1000, 0.5), (44100, 0.2), (8000, 1.25), (3, 2.0)] {
            let stimulus = flat(10, sample_rate, duration);
            let times = stimulus.times();
            assert_eq!(stimulus.n_samples(), sample_count(duration, sample_rate));
            assert_eq!(times[0], 0.0);
            assert!((times[times.len() - 1] - duration).abs() < 1e-9);
            assert!(times.windows(2).into_iter().all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_volume_round_trip() {
        let mut stimulus = flat(10, 1000, 0.1);
        for v in [0.0, 12.5, 50.0, 100.0] {
            stimulus.set_volume(v).unwrap();
            assert_eq!(stimulus.volume(), v);
        }
        stimulus.set_volume((20.0, 100.0)).unwrap();
        assert_eq!(stimulus.volume(), (20.0, 100.0));
        stimulus.set_volume([30.0]).unwrap();
        assert_eq!(stimulus.volume(), 30.0);
        stimulus.set_volume((40, 40)).unwrap();
        assert_eq!(stimulus.volume(), VolumeLevel::Mono(40.0));
    }

    #[test]
    fn test_volume_setter_recomputes_signal_only() {
        let mut stimulus = flat(10, 1000, 0.1);
        let times = stimulus.times().clone();
        stimulus.set_volume((20.0, 100.0)).unwrap();
        assert_eq!(stimulus.times(), &times);
        assert_eq!(stimulus.synth().calls, 2);
        assert!(stimulus.signal().column(0).iter().all(|&x| x == 0.2));
        assert!(stimulus.signal().column(1).iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_invalid_volume_leaves_state_untouched() {
        let mut stimulus = flat(10, 1000, 0.1);
        let times = stimulus.times().clone();
        let signal = stimulus.signal().clone();

        for bad in [VolumeInput::from(-1), 101.into(), vec![1.0, 2.0, 3.0].into()] {
            let err = stimulus.set_volume(bad).unwrap_err();
            assert!(err.is_invalid_parameter());
        }
        assert_eq!(stimulus.volume(), 10.0);
        assert_eq!(stimulus.times(), &times);
        assert_eq!(stimulus.signal(), &signal);
        assert_eq!(stimulus.synth().calls, 1);
    }

    #[test]
    fn test_sample_rate_and_duration_setters() {
        let mut stimulus = flat(10, 44100, 1.0);
        stimulus.set_sample_rate(48000).unwrap();
        assert_eq!(stimulus.sample_rate(), 48000);
        assert_eq!(stimulus.duration(), 1.0);
        assert_eq!(stimulus.n_samples(), 48000);
        assert_eq!(stimulus.signal().nrows(), 48000);

        stimulus.set_duration(0.5).unwrap();
        assert_eq!(stimulus.sample_rate(), 48000);
        assert_eq!(stimulus.duration(), 0.5);
        assert_eq!(stimulus.n_samples(), 24000);
        assert_eq!(stimulus.signal().nrows(), 24000);
        assert_approx_eq!(stimulus.times()[23999], 0.5, 1e-12);
    }

    #[test]
    fn test_invalid_sample_rate_and_duration_are_rejected() {
        let mut stimulus = flat(10, 1000, 0.5);
        assert!(stimulus.set_sample_rate(0).is_err());
        assert!(stimulus.set_duration(0.0).is_err());
        assert!(stimulus.set_duration(f64::NAN).is_err());
        assert_eq!(stimulus.sample_rate(), 1000);
        assert_eq!(stimulus.duration(), 0.5);
        assert_eq!(stimulus.n_samples(), 500);
    }

    #[test]
    fn test_oversized_time_axis_is_rejected() {
        let err = Stimulus::new(FlatSynth::default(), 50, 44100, 1e300).unwrap_err();
        assert!(err.is_invalid_parameter());

        let mut stimulus = flat(50, 1000, 0.5);
        assert!(stimulus.set_duration(1e300).unwrap_err().is_invalid_parameter());
        assert_eq!(stimulus.duration(), 0.5);
        assert_eq!(stimulus.n_samples(), 500);
        assert_eq!(stimulus.synth().calls, 1);

        assert!(stimulus.set_duration(1e6).is_err());
        assert!(stimulus.set_sample_rate(u32::MAX).unwrap_err().is_invalid_parameter());
        assert_eq!(stimulus.sample_rate(), 1000);
        assert_eq!(stimulus.n_samples(), 500);
    }

    #[test]
    fn test_window_application() {
        let mut stimulus = flat(50, 1000, 0.01);
        let unwindowed = stimulus.signal().clone();
        let window = Array1::linspace(0.0, 1.0, stimulus.n_samples());

        stimulus.set_window(Some(window.clone())).unwrap();
        for (i, w) in window.iter().enumerate() {
            assert_eq!(stimulus.signal()[[i, 0]], unwindowed[[i, 0]] * w);
            assert_eq!(stimulus.signal()[[i, 1]], unwindowed[[i, 1]] * w);
        }

        stimulus.set_window(None).unwrap();
        assert_eq!(stimulus.signal(), &unwindowed);
        stimulus.set_window(None).unwrap();
        assert_eq!(stimulus.signal(), &unwindowed);
    }

    #[test]
    fn test_zero_window_silences_signal() {
        let mut stimulus = flat(80, 1000, 0.1);
        stimulus
            .set_window(Some(Array1::zeros(stimulus.n_samples())))
            .unwrap();
        assert!(stimulus.signal().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_window_length_mismatch() {
        let mut stimulus = flat(80, 1000, 0.1);
        let signal = stimulus.signal().clone();
        let err = stimulus.set_window(Some(Array1::ones(99))).unwrap_err();
        assert!(err.is_invalid_parameter());
        assert!(stimulus.window().is_none());
        assert_eq!(stimulus.signal(), &signal);
    }

    #[test]
    fn test_window_blocks_resizing() {
        let mut stimulus = flat(80, 1000, 0.1);
        stimulus.set_window_type(WindowType::Hann).unwrap();
        assert!(stimulus.set_duration(0.2).is_err());
        assert!(stimulus.set_sample_rate(2000).is_err());
        assert_eq!(stimulus.n_samples(), 100);

        stimulus.set_window(None).unwrap();
        stimulus.set_duration(0.2).unwrap();
        assert_eq!(stimulus.n_samples(), 200);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut original = flat(50, 1000, 0.1);
        original.set_window_type(WindowType::Hamming).unwrap();
        let mut copy = original.copy(true);
        assert!(!copy.shares_signal_with(&original));
        assert_eq!(copy.signal(), original.signal());
        assert_eq!(copy.window(), original.window());

        copy.signal_mut().fill(-1.0);
        assert!(original.signal().iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_shallow_copy_shares_buffers() {
        let original = flat(50, 1000, 0.1);
        let mut copy = original.copy(false);
        assert!(copy.shares_signal_with(&original));
        assert_eq!(copy.signal(), original.signal());

        copy.set_volume(10).unwrap();
        assert!(!copy.shares_signal_with(&original));
        assert_eq!(original.volume(), 50.0);
    }

    #[test]
    fn test_sub_sample_duration_gives_empty_signal() {
        let stimulus = flat(50, 10, 0.05);
        assert_eq!(stimulus.n_samples(), 0);
        assert_eq!(stimulus.signal().dim(), (0, 2));
    }

    #[test]
    fn test_normalize_peak_ignores_silence() {
        let mut silent = Array1::zeros(4);
        normalize_peak(&mut silent);
        assert!(silent.iter().all(|&x| x == 0.0));

        let mut samples = ndarray::array![0.5, -2.0, 1.0];
        normalize_peak(&mut samples);
        assert_eq!(samples.to_vec(), vec![0.25, -1.0, 0.5]);
    }

    #[test]
    fn test_stereo_applies_channel_gains() {
        let mono = ndarray::array![1.0, -0.5];
        let volume = crate::checks::check_volume(&(50.0, 100.0).into()).unwrap();
        assert_eq!(stereo(&mono, &volume), ndarray::array![[0.5, 1.0], [-0.25, -0.5]]);
    }

    #[test]
    fn test_from_config() {
        let config = StimulusConfig {
            volume: (10.0, 20.0).into(),
            sample_rate: 8000,
            duration: 0.25,
        };
        let stimulus = Stimulus::from_config(FlatSynth::default(), &config).unwrap();
        assert_eq!(stimulus.volume(), (10.0, 20.0));
        assert_eq!(stimulus.n_samples(), 2000);
    }
}
