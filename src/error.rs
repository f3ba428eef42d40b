//! Error types and result utilities for stimulus operations.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience type alias for results that may contain a [`StimulusError`].
pub type StimulusResult<T> = Result<T, StimulusError>;

/// Error types that can occur while building, editing, saving or playing a stimulus.
#[derive(Error, Debug)]
pub enum StimulusError {
    /// A parameter failed type or range validation.
    ///
    /// Raised by constructors and setters before any state is modified, so the
    /// stimulus keeps its last valid parameters and buffers.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human readable reason.
        reason: String,
    },

    /// The target file already exists and overwriting was not requested.
    #[error(
        "The file {} already exists. Set 'overwrite' to true to replace it.",
        path.display()
    )]
    FileConflict {
        /// Path that already exists.
        path: PathBuf,
    },

    /// The file extension is not a supported audio container.
    #[error("Unsupported audio format '{extension}' for {}; supported: .wav", path.display())]
    UnsupportedFormat {
        /// Path that was rejected.
        path: PathBuf,
        /// Extension found on the path (empty when missing).
        extension: String,
    },

    /// Underlying file-system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV encoding or decoding failure.
    #[error("WAV codec error: {0}")]
    Wav(#[from] hound::Error),

    /// Decoded audio data has an impossible layout.
    #[error("Malformed audio data: {0}")]
    MalformedAudio(String),

    /// The audio device refused or failed a playback request.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl StimulusError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }

    /// Create a file conflict error.
    pub fn file_conflict(path: impl Into<PathBuf>) -> Self {
        Self::FileConflict { path: path.into() }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Create a malformed audio error.
    pub fn malformed_audio(details: impl Into<String>) -> Self {
        Self::MalformedAudio(details.into())
    }

    /// Create a playback error.
    pub fn playback(details: impl Into<String>) -> Self {
        Self::Playback(details.into())
    }

    /// Check if this error was raised by parameter validation.
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

#[cfg(feature = "playback")]
impl From<cpal::BuildStreamError> for StimulusError {
    fn from(err: cpal::BuildStreamError) -> Self {
        Self::playback(format!("Failed to build stream: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::PlayStreamError> for StimulusError {
    fn from(err: cpal::PlayStreamError) -> Self {
        Self::playback(format!("Failed to play stream: {}", err))
    }
}

#[cfg(feature = "playback")]
impl From<cpal::PauseStreamError> for StimulusError {
    fn from(err: cpal::PauseStreamError) -> Self {
        Self::playback(format!("Failed to pause stream: {}", err))
    }
}
