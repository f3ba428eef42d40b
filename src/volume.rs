//! Stereo volume representation.
//!
//! Volumes are expressed in arbitrary units on a `[0, 100]` scale, one value per
//! channel. Callers can hand over a single value (applied to both channels) or a
//! per-channel collection; [`crate::checks::check_volume`] turns either into a
//! validated [`Volume`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LEFT, RIGHT};

/// Unvalidated volume as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VolumeInput {
    /// A single gain broadcast to both channels.
    Scalar(f64),
    /// One gain per channel. A single element is broadcast like a scalar.
    Channels(Vec<f64>),
}

impl From<f64> for VolumeInput {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<i32> for VolumeInput {
    fn from(value: i32) -> Self {
        Self::Scalar(f64::from(value))
    }
}

impl From<(f64, f64)> for VolumeInput {
    fn from((left, right): (f64, f64)) -> Self {
        Self::Channels(vec![left, right])
    }
}

impl From<(i32, i32)> for VolumeInput {
    fn from((left, right): (i32, i32)) -> Self {
        Self::Channels(vec![f64::from(left), f64::from(right)])
    }
}

impl<const N: usize> From<[f64; N]> for VolumeInput {
    fn from(values: [f64; N]) -> Self {
        Self::Channels(values.to_vec())
    }
}

impl From<Vec<f64>> for VolumeInput {
    fn from(values: Vec<f64>) -> Self {
        Self::Channels(values)
    }
}

impl From<&[f64]> for VolumeInput {
    fn from(values: &[f64]) -> Self {
        Self::Channels(values.to_vec())
    }
}

impl From<VolumeLevel> for VolumeInput {
    fn from(level: VolumeLevel) -> Self {
        match level {
            VolumeLevel::Mono(v) => Self::Scalar(v),
            VolumeLevel::Stereo(l, r) => Self::Channels(vec![l, r]),
        }
    }
}

impl From<Volume> for VolumeInput {
    fn from(volume: Volume) -> Self {
        volume.level().into()
    }
}

impl fmt::Display for VolumeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Channels(values) => write!(f, "{values:?}"),
        }
    }
}

/// Volume as reported back to the caller.
///
/// Equal channels collapse to [`VolumeLevel::Mono`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeLevel {
    /// Both channels share this gain.
    Mono(f64),
    /// Left and right gains differ.
    Stereo(f64, f64),
}

impl PartialEq<f64> for VolumeLevel {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Self::Mono(v) if v == other)
    }
}

impl PartialEq<(f64, f64)> for VolumeLevel {
    fn eq(&self, other: &(f64, f64)) -> bool {
        matches!(self, Self::Stereo(l, r) if (*l, *r) == *other)
    }
}

/// Validated per-channel gains, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    channels: [f64; 2],
}

impl Volume {
    /// Lowest accepted gain.
    pub const MIN: f64 = 0.0;
    /// Highest accepted gain.
    pub const MAX: f64 = 100.0;

    /// Wrap already validated channel gains.
    pub(crate) const fn from_channels(left: f64, right: f64) -> Self {
        Self {
            channels: [left, right],
        }
    }

    /// Left channel gain.
    pub const fn left(&self) -> f64 {
        self.channels[LEFT]
    }

    /// Right channel gain.
    pub const fn right(&self) -> f64 {
        self.channels[RIGHT]
    }

    /// Both gains, `[left, right]`.
    pub const fn channels(&self) -> [f64; 2] {
        self.channels
    }

    /// Both gains as linear factors in `[0, 1]`.
    pub fn factors(&self) -> [f64; 2] {
        self.channels.map(|v| v / Self::MAX)
    }

    /// The caller-facing form of this volume.
    pub fn level(&self) -> VolumeLevel {
        let (left, right) = (self.left(), self.right());
        if left == right {
            VolumeLevel::Mono(left)
        } else {
            VolumeLevel::Stereo(left, right)
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            VolumeLevel::Mono(v) => write!(f, "{v}"),
            VolumeLevel::Stereo(l, r) => write!(f, "({l}, {r})"),
        }
    }
}
