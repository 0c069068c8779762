//! End-to-end two-channel analysis
//!
//! samples → frames → PSD per channel → peak tracking on the reference
//! channel → response curve

use log::{debug, info};
use std::thread;

use crate::config::{ReferenceChannel, RunConfig};
use crate::error::{AnalysisError, Result};
use crate::response::{estimate_response, track_peaks, PeakRecord, ResponseCurve};
use crate::spectrum::{SpectralEstimator, Spectrogram};

/// Everything computed in one run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Spectrogram of the first input column
    pub channel_a: Spectrogram,

    /// Spectrogram of the second input column
    pub channel_b: Spectrogram,

    pub reference: ReferenceChannel,
    pub peaks: Vec<PeakRecord>,
    pub response: ResponseCurve,
}

impl Analysis {
    pub fn channel(&self, channel: ReferenceChannel) -> &Spectrogram {
        match channel {
            ReferenceChannel::A => &self.channel_a,
            ReferenceChannel::B => &self.channel_b,
        }
    }

    /// Spectrogram that drove peak tracking
    pub fn reference_spectrogram(&self) -> &Spectrogram {
        self.channel(self.reference)
    }
}

/// Run the whole core on two equal-length channels
///
/// The channels are transformed on two scoped threads; their results are
/// joined in channel order so the output does not depend on scheduling.
///
/// # Errors
/// * `ChannelLengthMismatch` if the channels differ in length
/// * `InsufficientData` if they are shorter than one frame
/// * `InvalidConfig` if the window has no energy at this frame size
/// * `ShapeMismatch` if the resulting spectrograms disagree
pub fn analyze(channel_a: &[f64], channel_b: &[f64], config: &RunConfig) -> Result<Analysis> {
    if channel_a.len() != channel_b.len() {
        return Err(AnalysisError::ChannelLengthMismatch {
            a: channel_a.len(),
            b: channel_b.len(),
        });
    }

    // Fail before spawning anything
    let frame_count = config.analysis.frame_count(channel_a.len())?;
    debug!(
        "Analyzing {} samples per channel: {} frames of {} (hop {})",
        channel_a.len(),
        frame_count,
        config.analysis.frame_size(),
        config.analysis.hop()
    );

    let (spec_a, spec_b) = thread::scope(|scope| {
        let worker = scope.spawn(|| {
            SpectralEstimator::new(config.analysis, config.window)?.estimate(channel_b)
        });
        let spec_a = SpectralEstimator::new(config.analysis, config.window)
            .and_then(|mut estimator| estimator.estimate(channel_a));
        let spec_b = worker.join().unwrap_or_else(|_| {
            Err(AnalysisError::Transform(
                "spectral estimation thread panicked".into(),
            ))
        });
        (spec_a, spec_b)
    });
    let (channel_a, channel_b) = (spec_a?, spec_b?);

    channel_a.ensure_same_shape(&channel_b)?;

    let (reference, primary) = match config.reference {
        ReferenceChannel::A => (&channel_a, &channel_b),
        ReferenceChannel::B => (&channel_b, &channel_a),
    };

    let peaks = track_peaks(reference);
    let mut response = estimate_response(&peaks, reference, primary, config.scale)?;
    if config.sort_by_frequency {
        response = response.sorted_by_frequency();
    }

    info!(
        "Analyzed {} frames x {} bins; reference channel {:?}, {} response points",
        channel_a.frame_count(),
        channel_a.bin_count(),
        config.reference,
        response.len()
    );

    Ok(Analysis {
        channel_a,
        channel_b,
        reference: config.reference,
        peaks,
        response,
    })
}
