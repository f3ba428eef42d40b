//! Window (envelope) generation.
//!
//! A window is a per-sample multiplicative envelope applied to the raw
//! synthesized waveform. These helpers build common symmetric windows whose
//! length can be matched to a stimulus' [`n_samples`](crate::Stimulus::n_samples).

use ndarray::Array1;
use num_traits::{Float, FloatConst};
use serde::{Deserialize, Serialize};

/// Supported window shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Flat window, equivalent to applying no window.
    Rectangular,
    /// Hann window, raised cosine reaching zero at both ends.
    Hann,
    /// Hamming window, raised cosine with non-zero end points.
    Hamming,
    /// Blackman window, three-term cosine with strong side-lobe suppression.
    Blackman,
}

/// Generate symmetric window coefficients of length `size`.
///
/// A window of length 1 is `[1.0]`; length 0 is empty.
pub fn generate_window<F: Float + FloatConst>(size: usize, window_type: WindowType) -> Array1<F> {
    if size <= 1 {
        return Array1::from_elem(size, F::one());
    }

    let two_pi = F::TAU();
    let n_max = to_float::<F>(size - 1);
    let cosine = |i: usize, k: F| (k * two_pi * to_float::<F>(i) / n_max).cos();

    match window_type {
        WindowType::Rectangular => Array1::from_elem(size, F::one()),
        WindowType::Hann => {
            let half = constant::<F>(0.5);
            Array1::from_shape_fn(size, |i| half - half * cosine(i, F::one()))
        }
        WindowType::Hamming => {
            let (a0, a1) = (constant::<F>(0.54), constant::<F>(0.46));
            Array1::from_shape_fn(size, |i| a0 - a1 * cosine(i, F::one()))
        }
        WindowType::Blackman => {
            let (a0, a1, a2) = (constant::<F>(0.42), constant::<F>(0.5), constant::<F>(0.08));
            let two = constant::<F>(2.0);
            Array1::from_shape_fn(size, |i| a0 - a1 * cosine(i, F::one()) + a2 * cosine(i, two))
        }
    }
}

fn to_float<F: Float>(n: usize) -> F {
    F::from(n).unwrap_or_else(F::zero)
}

fn constant<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::zero)
}
