//! FFT engine using realfft for real-valued frames

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::error::{AnalysisError, Result};

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (realfft uses it as scratch)
    input_buffer: Vec<f64>,

    /// Reusable output buffer (complex spectrum)
    output_buffer: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();

        Self {
            fft_size,
            r2c,
            input_buffer,
            output_buffer,
        }
    }

    /// Compute the squared magnitude |X[k]|² for k = 0..fft_size/2
    ///
    /// # Arguments
    /// * `frame` - Input samples, zero-padded if shorter than fft_size
    /// * `power` - Output slice of length `num_bins()`
    pub fn compute_power_into(&mut self, frame: &[f64], power: &mut [f64]) -> Result<()> {
        if power.len() != self.num_bins() {
            return Err(AnalysisError::Transform(format!(
                "power buffer has {} slots, expected {}",
                power.len(),
                self.num_bins()
            )));
        }

        let copy_len = frame.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&frame[..copy_len]);
        self.input_buffer[copy_len..].fill(0.0);

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .map_err(|e| AnalysisError::Transform(e.to_string()))?;

        for (p, c) in power.iter_mut().zip(self.output_buffer.iter()) {
            *p = c.norm_sqr();
        }

        Ok(())
    }

    /// Compute power spectrum (magnitude squared) into a new vector
    pub fn compute_power(&mut self, frame: &[f64]) -> Result<Vec<f64>> {
        let mut power = vec![0.0; self.num_bins()];
        self.compute_power_into(frame, &mut power)?;
        Ok(power)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Get number of frequency bins (fft_size/2 + 1 for real FFT)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }
}
