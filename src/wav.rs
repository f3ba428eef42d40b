//! WAV persistence.
//!
//! Signals are written as two-channel, 32-bit IEEE float WAV files via
//! `hound`. [`load`] reads any PCM or float WAV back into a frame-major buffer.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::checks::check_file;
use crate::stimulus::{Stimulus, Synthesize};
use crate::{StimulusError, StimulusResult};

impl<S: Synthesize> Stimulus<S> {
    /// Save the signal to a `.wav` file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// - [`StimulusError::UnsupportedFormat`] if the extension is not `.wav`.
    /// - [`StimulusError::FileConflict`] if the file exists and `overwrite` is false.
    /// - [`StimulusError::Io`] / [`StimulusError::Wav`] if writing fails.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> StimulusResult<()> {
        write(path, self.sample_rate(), self.signal().view(), overwrite)
    }
}

/// Encode a frame-major buffer (`(frames, channels)`) as a float WAV file.
///
/// # Errors
/// See [`Stimulus::save`].
pub fn write(
    path: impl AsRef<Path>,
    sample_rate: u32,
    signal: ArrayView2<'_, f64>,
    overwrite: bool,
) -> StimulusResult<()> {
    let path = check_file(path, false)?;
    if !overwrite && path.exists() {
        return Err(StimulusError::file_conflict(path));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let channels = u16::try_from(signal.ncols()).map_err(|_| {
        StimulusError::invalid_parameter("signal", format!("too many channels: {}", signal.ncols()))
    })?;
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    debug!(
        "Writing sound to file {} with sampling frequency {:.1} [Hz].",
        path.display(),
        f64::from(sample_rate)
    );
    let mut writer = WavWriter::create(&path, spec)?;
    // Logical order is row-major, which interleaves the channels frame by frame.
    for &sample in signal.iter() {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Decode a WAV file into `(sample_rate, buffer)`, buffer shaped `(frames, channels)`.
///
/// Integer samples are scaled to `[-1, 1)`.
///
/// # Errors
/// - [`StimulusError::UnsupportedFormat`] if the extension is not `.wav`.
/// - [`StimulusError::Io`] / [`StimulusError::Wav`] if reading fails.
pub fn load(path: impl AsRef<Path>) -> StimulusResult<(u32, Array2<f64>)> {
    let path = check_file(path, true)?;
    let mut reader = WavReader::open(&path)?;
    let spec = reader.spec();
    debug!(
        "Reading sound from file {} ({} channels at {} [Hz]).",
        path.display(),
        spec.channels,
        spec.sample_rate
    );

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let full_scale = f64::from(1_u32 << (spec.bits_per_sample.clamp(1, 32) - 1));
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / full_scale))
                .collect::<Result<_, _>>()?
        }
    };

    let buffer = deinterleave(samples, usize::from(spec.channels))?;
    Ok((spec.sample_rate, buffer))
}

/// Reshape interleaved samples into a `(frames, channels)` buffer.
fn deinterleave(samples: Vec<f64>, channels: usize) -> StimulusResult<Array2<f64>> {
    if channels == 0 || samples.len() % channels != 0 {
        return Err(StimulusError::malformed_audio(format!(
            "{} samples cannot be split into {channels} channels",
            samples.len()
        )));
    }
    let frames = samples.len() / channels;
    Array2::from_shape_vec((frames, channels), samples)
        .map_err(|e| StimulusError::malformed_audio(e.to_string()))
}
