//! Dominant-bin tracking

use serde::Serialize;

use crate::spectrum::Spectrogram;

/// Dominant bin of the reference channel during one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakRecord {
    pub frame: usize,
    pub bin: usize,
    pub frequency_hz: f64,
    pub power: f64,
}

/// Find the maximum-power bin of every frame
///
/// Ties go to the lowest bin. A frame whose values are all NaN reports
/// bin 0. An empty spectrogram yields an empty result.
pub fn track_peaks(spectrogram: &Spectrogram) -> Vec<PeakRecord> {
    let frequencies = spectrogram.frequencies();

    (0..spectrogram.frame_count())
        .filter_map(|frame| {
            let column = spectrogram.frame(frame)?;
            let (bin, power) = argmax_first(column.iter().copied())?;
            Some(PeakRecord {
                frame,
                bin,
                frequency_hz: frequencies[bin],
                power,
            })
        })
        .collect()
}

/// Index and value of the first maximum
fn argmax_first(values: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, v) in values.enumerate() {
        best = match best {
            None => Some((i, v)),
            // NaN never wins; a NaN incumbent is replaced by any number
            Some((_, b)) if v > b || (b.is_nan() && !v.is_nan()) => Some((i, v)),
            keep => keep,
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::spectrum::{SpectralEstimator, WindowType};
    use std::f64::consts::PI;

    #[test]
    fn test_argmax_ties_pick_lowest() {
        let values = [0.5, 2.0, 1.0, 2.0, 2.0];
        assert_eq!(argmax_first(values.into_iter()), Some((1, 2.0)));

        for _ in 0..10 {
            assert_eq!(argmax_first(values.into_iter()).unwrap().0, 1);
        }
    }

    #[test]
    fn test_argmax_nan() {
        assert_eq!(
            argmax_first([f64::NAN, 1.0, 3.0, f64::NAN].into_iter()),
            Some((2, 3.0))
        );
        assert_eq!(argmax_first(std::iter::empty()), None);
    }

    #[test]
    fn test_tracks_sine_frequency() {
        let fs = 48000.0;
        let f0 = 3000.0;
        let config = AnalysisConfig::new(1024, 512, fs).unwrap();
        let signal: Vec<f64> = (0..20_000)
            .map(|n| (2.0 * PI * f0 * n as f64 / fs).sin())
            .collect();

        let spec = SpectralEstimator::new(config, WindowType::Hann)
            .unwrap()
            .estimate(&signal)
            .unwrap();
        let peaks = track_peaks(&spec);

        assert_eq!(peaks.len(), spec.frame_count());
        for (i, peak) in peaks.iter().enumerate() {
            assert_eq!(peak.frame, i);
            assert!((peak.frequency_hz - f0).abs() <= config.bin_width_hz());
            assert_eq!(Some(peak.power), spec.get(peak.bin, i));
        }
    }

    #[test]
    fn test_tied_bins_in_spectrogram() {
        let config = AnalysisConfig::new(4, 0, 4.0).unwrap();
        let power = ndarray::array![[1.0, 0.0], [5.0, 2.0], [5.0, 2.0]];
        let spec = Spectrogram::from_power(power, config).unwrap();

        let peaks = track_peaks(&spec);
        assert_eq!(peaks[0].bin, 1);
        assert_eq!(peaks[0].frequency_hz, 1.0);
        assert_eq!(peaks[1].bin, 1);
    }

    #[test]
    fn test_empty_spectrogram() {
        let config = AnalysisConfig::new(4, 0, 4.0).unwrap();
        let spec = Spectrogram::from_power(ndarray::Array2::zeros((3, 0)), config).unwrap();

        assert!(track_peaks(&spec).is_empty());
    }

    #[test]
    fn test_silence_peaks_at_dc() {
        let config = AnalysisConfig::new(64, 0, 1000.0).unwrap();
        let spec = SpectralEstimator::new(config, WindowType::Hann)
            .unwrap()
            .estimate(&[0.0; 256])
            .unwrap();

        let peaks = track_peaks(&spec);
        assert_eq!(peaks.len(), 4);
        assert!(peaks.iter().all(|p| p.bin == 0 && p.power == 0.0));
    }
}
