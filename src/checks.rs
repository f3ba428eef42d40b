//! Stateless parameter validators.
//!
//! Every setter on [`crate::Stimulus`] funnels its input through one of these
//! functions before touching any state.

use std::path::{Path, PathBuf};

use ndarray::Array1;

use crate::volume::{Volume, VolumeInput};
use crate::{StimulusError, StimulusResult};

/// File extensions accepted by [`check_file`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav"];

/// Validate a caller supplied volume.
///
/// A scalar or single-element collection is broadcast to both channels. Every
/// element must be finite and within `[0, 100]`.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] on wrong arity, non-finite or
/// out of range values.
pub fn check_volume(volume: &VolumeInput) -> StimulusResult<Volume> {
    let (left, right) = match volume {
        VolumeInput::Scalar(v) => (*v, *v),
        VolumeInput::Channels(values) => match values.as_slice() {
            [v] => (*v, *v),
            [l, r] => (*l, *r),
            other => {
                return Err(StimulusError::invalid_parameter(
                    "volume",
                    format!("expected 1 or 2 channel values, got {}", other.len()),
                ));
            }
        },
    };

    for v in [left, right] {
        if !v.is_finite() {
            return Err(StimulusError::invalid_parameter(
                "volume",
                format!("must be a finite number, got {v}"),
            ));
        }
        if !(Volume::MIN..=Volume::MAX).contains(&v) {
            return Err(StimulusError::invalid_parameter(
                "volume",
                format!("must be in [{}, {}], got {v}", Volume::MIN, Volume::MAX),
            ));
        }
    }
    Ok(Volume::from_channels(left, right))
}

/// Validate a sample rate in Hz.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] if the rate is zero.
pub fn check_sample_rate(sample_rate: u32) -> StimulusResult<u32> {
    if sample_rate == 0 {
        return Err(StimulusError::invalid_parameter(
            "sample_rate",
            "must be a positive integer, got 0",
        ));
    }
    Ok(sample_rate)
}

/// Validate a duration in seconds.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] unless the duration is finite and positive.
pub fn check_duration(duration: f64) -> StimulusResult<f64> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(StimulusError::invalid_parameter(
            "duration",
            format!("must be a positive number of seconds, got {duration}"),
        ));
    }
    Ok(duration)
}

/// Validate a synthesis frequency in Hz.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] unless the frequency is finite and positive.
pub fn check_frequency(frequency: f64) -> StimulusResult<f64> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(StimulusError::invalid_parameter(
            "frequency",
            format!("must be a positive number of Hz, got {frequency}"),
        ));
    }
    Ok(frequency)
}

/// Validate a window against the current number of samples.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] on a length mismatch or non-finite coefficients.
pub fn check_window(window: &Array1<f64>, n_samples: usize) -> StimulusResult<()> {
    if window.len() != n_samples {
        return Err(StimulusError::invalid_parameter(
            "window",
            format!(
                "length {} does not match the number of samples {n_samples}",
                window.len()
            ),
        ));
    }
    if window.iter().any(|w| !w.is_finite()) {
        return Err(StimulusError::invalid_parameter(
            "window",
            "all coefficients must be finite",
        ));
    }
    Ok(())
}

/// Largest time axis a stimulus may hold, a little over 100 minutes at 44.1 kHz.
pub const MAX_SAMPLES: usize = 1 << 28;

/// Number of samples produced by `duration` seconds at `sample_rate` Hz.
///
/// Only meaningful for inputs already accepted by [`check_sample_count`].
pub fn sample_count(duration: f64, sample_rate: u32) -> usize {
    (duration * f64::from(sample_rate)).floor() as usize
}

/// Validate that `duration` at `sample_rate` yields at most [`MAX_SAMPLES`] samples.
///
/// `parameter` names the value being changed in the error.
///
/// # Errors
/// Returns [`StimulusError::InvalidParameter`] when the time axis would be too long.
pub fn check_sample_count(
    parameter: &'static str,
    duration: f64,
    sample_rate: u32,
) -> StimulusResult<usize> {
    let samples = (duration * f64::from(sample_rate)).floor();
    if samples.is_nan() || samples > MAX_SAMPLES as f64 {
        return Err(StimulusError::invalid_parameter(
            parameter,
            format!(
                "{duration} [seconds] at {sample_rate} [Hz] exceeds the limit of {MAX_SAMPLES} samples"
            ),
        ));
    }
    Ok(samples as usize)
}

/// Validate an audio file path.
///
/// The extension must be one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
/// With `must_exist`, the file must already be present.
///
/// # Errors
/// Returns [`StimulusError::UnsupportedFormat`] for an unknown extension and
/// [`StimulusError::Io`] when a required file is missing.
pub fn check_file(path: impl AsRef<Path>, must_exist: bool) -> StimulusResult<PathBuf> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(StimulusError::unsupported_format(path, extension));
    }
    if must_exist && !path.exists() {
        return Err(StimulusError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_volume() {
        let volume = check_volume(&50.0.into()).unwrap();
        assert_eq!(volume.channels(), [50.0, 50.0]);
        let volume = check_volume(&(25.0, 50.0).into()).unwrap();
        assert_eq!(volume.channels(), [25.0, 50.0]);
        let volume = check_volume(&(0.0, 100.0).into()).unwrap();
        assert_eq!(volume.channels(), [0.0, 100.0]);
        let volume = check_volume(&[40.0].into()).unwrap();
        assert_eq!(volume.channels(), [40.0, 40.0]);
    }

    #[test]
    fn test_check_volume_rejects_bad_input() {
        assert!(check_volume(&[25.0, 50.0, 75.0].into()).is_err());
        assert!(check_volume(&Vec::<f64>::new().into()).is_err());
        assert!(check_volume(&(25.0, 101.0).into()).is_err());
        assert!(check_volume(&(-25.0, 100.0).into()).is_err());
        assert!(check_volume(&f64::NAN.into()).is_err());
        assert!(check_volume(&(10.0, f64::INFINITY).into()).is_err());
    }

    #[test]
    fn test_check_sample_rate() {
        assert_eq!(check_sample_rate(44100).unwrap(), 44100);
        assert!(check_sample_rate(0).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_check_duration() {
        assert_eq!(check_duration(101.0).unwrap(), 101.0);
        assert_eq!(check_duration(101.01).unwrap(), 101.01);
        assert!(check_duration(0.0).is_err());
        assert!(check_duration(-1.0).is_err());
        assert!(check_duration(f64::NAN).is_err());
    }

    #[test]
    fn test_check_frequency() {
        assert_eq!(check_frequency(440.0).unwrap(), 440.0);
        assert!(check_frequency(0.0).is_err());
        assert!(check_frequency(f64::INFINITY).is_err());
    }

    #[test]
    fn test_check_window() {
        assert!(check_window(&array![0.0, 0.5, 1.0], 3).is_ok());
        assert!(check_window(&array![0.0, 0.5], 3).is_err());
        assert!(check_window(&array![0.0, f64::NAN, 1.0], 3).is_err());
    }

    #[test]
    fn test_sample_count() {
        assert_eq!(sample_count(0.5, 1000), 500);
        assert_eq!(sample_count(1.0, 44100), 44100);
        assert_eq!(sample_count(0.0015, 1000), 1);
    }

    #[test]
    fn test_check_sample_count() {
        assert_eq!(check_sample_count("duration", 0.5, 1000).unwrap(), 500);
        assert_eq!(
            check_sample_count("duration", 1.0, MAX_SAMPLES as u32).unwrap(),
            MAX_SAMPLES
        );
        let err = check_sample_count("duration", 1e300, 44100).unwrap_err();
        assert!(matches!(
            err,
            StimulusError::InvalidParameter { parameter: "duration", .. }
        ));
        assert!(check_sample_count("sample_rate", 1e6, u32::MAX).is_err());
    }

    #[test]
    fn test_check_file() {
        assert!(check_file("beep.wav", false).is_ok());
        assert!(check_file("BEEP.WAV", false).is_ok());
        assert!(matches!(
            check_file("beep.mp3", false),
            Err(StimulusError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            check_file("beep", false),
            Err(StimulusError::UnsupportedFormat { .. })
        ));
        assert!(check_file("/definitely/not/here.wav", true).is_err());
    }
}
