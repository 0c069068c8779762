//! Short-time spectral analysis

pub mod fft;
pub mod frames;
pub mod spectrogram;
pub mod windowing;

pub use fft::FftEngine;
pub use frames::{segment, Frames};
pub use spectrogram::{frequency_axis, time_axis, SpectralEstimator, Spectrogram};
pub use windowing::{generate_window, WindowType};
