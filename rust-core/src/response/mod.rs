//! Peak tracking and magnitude response estimation

pub mod bode;
pub mod peak;

pub use bode::{estimate_response, ResponseCurve, ResponsePoint};
pub use peak::{track_peaks, PeakRecord};
