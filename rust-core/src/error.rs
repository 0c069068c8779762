//! Error types for the analysis core

use thiserror::Error;

/// Structural failures of an analysis run
///
/// Numerical edge values (division by zero power, log of zero) are not
/// errors; they flow through the response curve as non-finite data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {samples} samples, one frame needs {frame_size}")]
    InsufficientData { samples: usize, frame_size: usize },

    #[error("Shape mismatch: {frames_a}x{bins_a} vs {frames_b}x{bins_b} (frames x bins)")]
    ShapeMismatch {
        frames_a: usize,
        bins_a: usize,
        frames_b: usize,
        bins_b: usize,
    },

    #[error("Channel length mismatch: channel A has {a} samples, channel B has {b}")]
    ChannelLengthMismatch { a: usize, b: usize },

    #[error("Peak at frame {frame}, bin {bin} lies outside the spectrogram")]
    PeakOutOfRange { frame: usize, bin: usize },

    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),

    #[error("FFT processing failed: {0}")]
    Transform(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
