//! Spectral Bode estimation core
//!
//! Short-time power spectral analysis of two simultaneously captured
//! channels, with a peak-tracking estimate of the magnitude response
//! between them.

pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod response;
pub mod spectrum;

pub use config::{
    AnalysisConfig, ConfigOverrides, DisplayRange, MagnitudeScale, Profile, ReferenceChannel,
    RunConfig,
};
pub use error::AnalysisError;
pub use pipeline::{analyze, Analysis};
pub use response::{PeakRecord, ResponseCurve, ResponsePoint};
pub use spectrum::{Spectrogram, SpectralEstimator, WindowType};
