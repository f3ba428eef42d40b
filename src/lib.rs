// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![deny(missing_docs)] // Documentation is a must for release

//! # AudioStimuli
//!
//! Parametric audio stimuli (pure tones, coloured noise) for experiment and
//! stimulus-presentation software.
//!
//! A [`Stimulus`] holds a volume, a sample rate, a duration and an optional
//! window, and keeps two derived buffers in sync with them: the time axis and
//! the stereo signal. Each setter validates first and then recomputes, so a
//! failed call never leaves a half-updated stimulus behind.
//!
//! ## Quick Start
//!
//! ```rust
//! use audio_stimuli::{WindowType, tone};
//!
//! // volume, sample rate, duration, frequency
//! let mut beep = tone(50, 1000, 0.5, 440.0).unwrap();
//! assert_eq!(beep.n_samples(), 500);
//! assert_eq!(beep.signal().dim(), (500, 2));
//!
//! // Changing a dependency recomputes the derived buffers.
//! beep.set_duration(0.25).unwrap();
//! assert_eq!(beep.n_samples(), 250);
//!
//! // Envelopes must match the current number of samples.
//! beep.set_window_type(WindowType::Hann).unwrap();
//! assert!(beep.set_window(Some(ndarray::Array1::ones(10))).is_err());
//! ```
//!
//! ## Volume
//!
//! A single value applies to both channels; a pair sets left and right
//! independently. Reading it back collapses equal channels.
//!
//! ```rust
//! use audio_stimuli::{NoiseColor, VolumeLevel, noise};
//!
//! let mut hiss = noise(10, 8000, 0.1, NoiseColor::Pink).unwrap();
//! hiss.set_volume((20.0, 80.0)).unwrap();
//! assert_eq!(hiss.volume(), VolumeLevel::Stereo(20.0, 80.0));
//! assert!(hiss.set_volume(101).is_err());
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use audio_stimuli::{StimulusError, tone};
//!
//! match tone(50, 0, 1.0, 440.0) {
//!     Err(StimulusError::InvalidParameter { parameter, .. }) => assert_eq!(parameter, "sample_rate"),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! ## Saving and Playback
//!
//! ```rust,no_run
//! use audio_stimuli::tone;
//!
//! let beep = tone(50, 44100, 1.0, 440.0).unwrap();
//! beep.save("stimuli/beep.wav", false).unwrap();
//! ```
//!
//! With the `playback` feature, `CpalSink` plays a stimulus on the default
//! output device:
//!
//! ```rust,ignore
//! use audio_stimuli::{CpalSink, tone};
//!
//! let mut sink = CpalSink::new()?;
//! tone(50, 44100, 1.0, 440.0)?.play(&mut sink, true)?;
//! ```

mod error;

pub mod checks;
pub mod config;
pub mod noise;
pub mod playback;
pub mod stimulus;
pub mod tone;
pub mod volume;
pub mod wav;
pub mod window;

pub use crate::config::StimulusConfig;
pub use crate::error::{StimulusError, StimulusResult};
pub use crate::noise::{Noise, NoiseColor, NoiseSynth, colored_noise, noise};
#[cfg(feature = "playback")]
pub use crate::playback::CpalSink;
pub use crate::playback::{AudioSink, STEREO_MAPPING};
pub use crate::stimulus::{DEFAULT_DURATION, DEFAULT_SAMPLE_RATE, Stimulus, Synthesize};
pub use crate::tone::{DEFAULT_FREQUENCY, Tone, ToneSynth, default_tone, tone};
pub use crate::volume::{Volume, VolumeInput, VolumeLevel};
pub use crate::wav::load;
pub use crate::window::{WindowType, generate_window};

/// Left channel index.
pub const LEFT: usize = 0;
/// Right channel index.
pub const RIGHT: usize = 1;
