//! Short-time power spectral density estimation
//!
//! Each frame is windowed, transformed, and scaled to a one-sided PSD:
//! `P[k] = c_k * |X[k]|² / (Fs * Σ w²)` where `c_k = 2` for every bin except
//! DC and (for even frame sizes) Nyquist, which have no mirror image.

use log::debug;
use ndarray::{Array2, ArrayView1};

use super::fft::FftEngine;
use super::frames::segment;
use super::windowing::{apply_window_into, generate_window, window_energy, WindowType};
use crate::config::{AnalysisConfig, DisplayRange};
use crate::error::{AnalysisError, Result};

/// Power spectral density of one channel over time
///
/// Indexed `[bin, frame]`, matching the layout of a spectrogram image
/// (frequency on the vertical axis, time on the horizontal).
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    power: Array2<f64>,
    frequencies: Vec<f64>,
    times: Vec<f64>,
    config: AnalysisConfig,
}

impl Spectrogram {
    /// Wrap an existing `[bin, frame]` power matrix
    ///
    /// The row count must equal `config.bin_count()`; axes are derived from
    /// `config`.
    pub fn from_power(power: Array2<f64>, config: AnalysisConfig) -> Result<Self> {
        if power.nrows() != config.bin_count() {
            return Err(AnalysisError::InvalidConfig(format!(
                "power matrix has {} bins, configuration implies {}",
                power.nrows(),
                config.bin_count()
            )));
        }

        let frame_count = power.ncols();
        Ok(Self {
            power,
            frequencies: frequency_axis(&config),
            times: time_axis(&config, frame_count),
            config,
        })
    }

    /// Power matrix, shape `(bin_count, frame_count)`
    pub fn power(&self) -> &Array2<f64> {
        &self.power
    }

    /// Bin centre frequencies in Hz, `freq[b] = b * Fs / frame_size`
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Frame start times in seconds, `time[i] = i * hop / Fs`
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn bin_count(&self) -> usize {
        self.power.nrows()
    }

    pub fn frame_count(&self) -> usize {
        self.power.ncols()
    }

    /// `(frame_count, bin_count)`
    pub fn shape(&self) -> (usize, usize) {
        (self.frame_count(), self.bin_count())
    }

    /// Power at `bin` during `frame`, None if out of range
    pub fn get(&self, bin: usize, frame: usize) -> Option<f64> {
        self.power.get((bin, frame)).copied()
    }

    /// Power of every bin during one frame, None if out of range
    pub fn frame(&self, frame: usize) -> Option<ArrayView1<'_, f64>> {
        (frame < self.frame_count()).then(|| self.power.column(frame))
    }

    /// `10 * log10(power)` clipped to the display range
    ///
    /// Returns a new matrix; the power values used for peak tracking and the
    /// response curve are never altered.
    pub fn to_display_db(&self, range: &DisplayRange) -> Array2<f64> {
        self.power.mapv(|p| range.clip(10.0 * p.log10()))
    }

    /// Check that two spectrograms can be compared bin by bin
    pub fn ensure_same_shape(&self, other: &Spectrogram) -> Result<()> {
        let (frames_a, bins_a) = self.shape();
        let (frames_b, bins_b) = other.shape();

        if frames_a != frames_b || bins_a != bins_b {
            return Err(AnalysisError::ShapeMismatch {
                frames_a,
                bins_a,
                frames_b,
                bins_b,
            });
        }
        Ok(())
    }
}

/// Windowed-FFT power spectral density estimator
pub struct SpectralEstimator {
    config: AnalysisConfig,
    window_type: WindowType,
    window: Vec<f64>,

    /// `1 / (Fs * Σ w²)`
    psd_scale: f64,

    fft_engine: FftEngine,
    windowed: Vec<f64>,
}

impl SpectralEstimator {
    /// Create an estimator for frames of `config.frame_size()` samples
    ///
    /// # Errors
    /// `InvalidConfig` if the window carries no energy at this frame size
    /// (a two-point Hann or Blackman window is all zeros), since the PSD
    /// scale would be infinite.
    pub fn new(config: AnalysisConfig, window_type: WindowType) -> Result<Self> {
        let window = generate_window(window_type, config.frame_size());
        let energy = window_energy(&window);

        if energy.is_nan() || energy <= f64::EPSILON * config.frame_size() as f64 {
            return Err(AnalysisError::InvalidConfig(format!(
                "{:?} window of {} samples has no energy",
                window_type,
                config.frame_size()
            )));
        }

        let psd_scale = 1.0 / (config.sample_rate() * energy);

        Ok(Self {
            config,
            window_type,
            window,
            psd_scale,
            fft_engine: FftEngine::new(config.frame_size()),
            windowed: vec![0.0; config.frame_size()],
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// One-sided PSD of a single frame
    ///
    /// # Arguments
    /// * `frame` - Exactly `frame_size` samples
    /// * `power` - Output of `bin_count` values
    pub fn estimate_frame(&mut self, frame: &[f64], power: &mut [f64]) -> Result<()> {
        if frame.len() != self.config.frame_size() {
            return Err(AnalysisError::Transform(format!(
                "frame has {} samples, expected {}",
                frame.len(),
                self.config.frame_size()
            )));
        }

        apply_window_into(frame, &self.window, &mut self.windowed);
        self.fft_engine.compute_power_into(&self.windowed, power)?;

        let last = power.len() - 1;
        let has_nyquist = self.config.frame_size() % 2 == 0;

        for (k, p) in power.iter_mut().enumerate() {
            let mirrored = k != 0 && !(has_nyquist && k == last);
            let factor = if mirrored { 2.0 } else { 1.0 };
            *p *= factor * self.psd_scale;
        }

        Ok(())
    }

    /// Spectrogram of a whole channel
    ///
    /// # Errors
    /// `InsufficientData` if the channel is shorter than one frame
    pub fn estimate(&mut self, samples: &[f64]) -> Result<Spectrogram> {
        let frames = segment(samples, &self.config)?;
        let frame_count = frames.frame_count();
        let bin_count = self.config.bin_count();

        // Rows are frames here so each output slice is contiguous
        let mut by_frame = Array2::<f64>::zeros((frame_count, bin_count));
        for (mut row, frame) in by_frame.rows_mut().into_iter().zip(frames) {
            let out = row.as_slice_mut().ok_or_else(|| {
                AnalysisError::Transform("spectrogram row is not contiguous".into())
            })?;
            self.estimate_frame(frame, out)?;
        }

        let power = by_frame.reversed_axes();

        debug!(
            "Estimated {} frames x {} bins ({:?} window, hop {})",
            frame_count,
            bin_count,
            self.window_type,
            self.config.hop()
        );

        Ok(Spectrogram {
            power,
            frequencies: frequency_axis(&self.config),
            times: time_axis(&self.config, frame_count),
            config: self.config,
        })
    }
}

/// `bin_count` frequencies, `freq[b] = b * Fs / frame_size`
pub fn frequency_axis(config: &AnalysisConfig) -> Vec<f64> {
    (0..config.bin_count())
        .map(|b| config.bin_frequency(b))
        .collect()
}

/// `frame_count` start times, `time[i] = i * hop / Fs`
pub fn time_axis(config: &AnalysisConfig, frame_count: usize) -> Vec<f64> {
    (0..frame_count).map(|i| config.frame_time(i)).collect()
}
