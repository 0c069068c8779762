//! Window functions for spectral analysis
//!
//! Windows are applied to each frame before the FFT to reduce spectral leakage

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~31 dB (first sidelobe)
    #[default]
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

/// Generate symmetric window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    // Zero- and one-point windows degenerate to all ones
    if length <= 1 {
        return vec![1.0; length];
    }

    let denom = (length - 1) as f64;

    match window_type {
        WindowType::Hann => (0..length)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / denom).cos())
            .collect(),

        WindowType::Hamming => (0..length)
            .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos())
            .collect(),

        WindowType::Blackman => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / denom;
                0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos()
            })
            .collect(),

        WindowType::Rectangular => vec![1.0; length],
    }
}

/// Sum of squared window coefficients
///
/// Divides the raw periodogram so that the estimate approximates power
/// spectral density independently of the window shape.
pub fn window_energy(window: &[f64]) -> f64 {
    window.iter().map(|&w| w * w).sum()
}

/// Multiply `frame` by `window` into `out`
///
/// All three slices must have the same length.
pub fn apply_window_into(frame: &[f64], window: &[f64], out: &mut [f64]) {
    for ((o, &s), &w) in out.iter_mut().zip(frame).zip(window) {
        *o = s * w;
    }
}
