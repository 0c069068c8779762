//! Peak-tracking magnitude response estimate
//!
//! For every frame the power of both channels is read at the reference
//! channel's dominant bin and the ratio is put on a logarithmic axis.
//! Zero powers produce `inf`, `-inf` or `NaN` magnitudes; these are kept.

use log::warn;
use serde::Serialize;

use super::peak::PeakRecord;
use crate::config::MagnitudeScale;
use crate::error::{AnalysisError, Result};
use crate::spectrum::Spectrogram;

/// One point of the response curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponsePoint {
    pub frequency_hz: f64,
    pub magnitude_db: f64,
}

/// Response points in frame order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseCurve {
    points: Vec<ResponsePoint>,
}

impl ResponseCurve {
    pub fn points(&self) -> &[ResponsePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponsePoint> {
        self.points.iter()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.frequency_hz).collect()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.magnitude_db).collect()
    }

    /// Number of points whose magnitude is infinite or NaN
    pub fn non_finite_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| !p.magnitude_db.is_finite())
            .count()
    }

    /// Copy of the curve ordered by ascending frequency
    ///
    /// The sort is stable, so points sharing a frequency keep frame order.
    pub fn sorted_by_frequency(&self) -> ResponseCurve {
        let mut points = self.points.clone();
        points.sort_by(|a, b| a.frequency_hz.total_cmp(&b.frequency_hz));
        ResponseCurve { points }
    }
}

impl From<Vec<ResponsePoint>> for ResponseCurve {
    fn from(points: Vec<ResponsePoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a ResponseCurve {
    type Item = &'a ResponsePoint;
    type IntoIter = std::slice::Iter<'a, ResponsePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Build the response curve from tracked peaks
///
/// # Arguments
/// * `peaks` - Output of `track_peaks` on `reference`
/// * `reference` - Channel that drove peak tracking (numerator)
/// * `primary` - The other channel (denominator)
/// * `scale` - Ratio-to-log conversion
///
/// # Errors
/// `ShapeMismatch` if the two spectrograms differ in frame or bin count,
/// `PeakOutOfRange` if a peak does not address a cell of the matrices.
pub fn estimate_response(
    peaks: &[PeakRecord],
    reference: &Spectrogram,
    primary: &Spectrogram,
    scale: MagnitudeScale,
) -> Result<ResponseCurve> {
    reference.ensure_same_shape(primary)?;

    let frequencies = reference.frequencies();
    let mut points = Vec::with_capacity(peaks.len());

    for peak in peaks {
        let out_of_range = || AnalysisError::PeakOutOfRange {
            frame: peak.frame,
            bin: peak.bin,
        };
        let power_ref = reference.get(peak.bin, peak.frame).ok_or_else(out_of_range)?;
        let power_primary = primary.get(peak.bin, peak.frame).ok_or_else(out_of_range)?;

        let ratio = power_ref / power_primary;

        points.push(ResponsePoint {
            frequency_hz: frequencies[peak.bin],
            magnitude_db: scale.apply(ratio),
        });
    }

    let curve = ResponseCurve { points };

    let non_finite = curve.non_finite_count();
    if non_finite > 0 {
        warn!(
            "Response curve has {} non-finite magnitude(s) out of {} (zero power in a channel)",
            non_finite,
            curve.len()
        );
    }

    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::response::track_peaks;
    use ndarray::array;

    fn config() -> AnalysisConfig {
        AnalysisConfig::new(4, 0, 4.0).unwrap()
    }

    #[test]
    fn test_ratio_to_natural_log() {
        let reference =
            Spectrogram::from_power(array![[0.0, 0.0], [8.0, 1.0], [0.0, 3.0]], config()).unwrap();
        let primary =
            Spectrogram::from_power(array![[1.0, 1.0], [2.0, 1.0], [1.0, 3.0]], config()).unwrap();

        let peaks = track_peaks(&reference);
        let curve =
            estimate_response(&peaks, &reference, &primary, MagnitudeScale::NaturalLogTimesTen)
                .unwrap();

        assert_eq!(curve.len(), 2);
        assert_eq!(curve.points()[0].frequency_hz, 1.0);
        assert!((curve.points()[0].magnitude_db - 10.0 * 4.0f64.ln()).abs() < 1e-12);
        assert_eq!(curve.points()[1].frequency_hz, 2.0);
        assert!(curve.points()[1].magnitude_db.abs() < 1e-12);
    }

    #[test]
    fn test_decibel_scale() {
        let reference = Spectrogram::from_power(array![[0.0], [100.0], [0.0]], config()).unwrap();
        let primary = Spectrogram::from_power(array![[1.0], [1.0], [1.0]], config()).unwrap();

        let peaks = track_peaks(&reference);
        let curve =
            estimate_response(&peaks, &reference, &primary, MagnitudeScale::PowerDecibel).unwrap();

        assert!((curve.points()[0].magnitude_db - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_values_pass_through() {
        // frame 0: 0/0, frame 1: x/0, frame 2: 0/x
        let reference_power = array![[0.0, 2.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let primary_power = array![[0.0, 0.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        let reference = Spectrogram::from_power(reference_power, config()).unwrap();
        let primary = Spectrogram::from_power(primary_power, config()).unwrap();

        let peaks = track_peaks(&reference);
        let curve =
            estimate_response(&peaks, &reference, &primary, MagnitudeScale::NaturalLogTimesTen)
                .unwrap();

        let mags = curve.magnitudes();
        assert!(mags[0].is_nan());
        assert_eq!(mags[1], f64::INFINITY);
        assert_eq!(mags[2], f64::NEG_INFINITY);
        assert_eq!(curve.non_finite_count(), 3);
    }

    #[test]
    fn test_shape_mismatch() {
        let reference =
            Spectrogram::from_power(array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]], config()).unwrap();
        let primary = Spectrogram::from_power(array![[1.0], [1.0], [1.0]], config()).unwrap();

        let peaks = track_peaks(&reference);
        assert!(matches!(
            estimate_response(&peaks, &reference, &primary, MagnitudeScale::default()),
            Err(AnalysisError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_peak_out_of_range() {
        let reference = Spectrogram::from_power(array![[1.0], [1.0], [1.0]], config()).unwrap();
        let bogus = [PeakRecord {
            frame: 3,
            bin: 0,
            frequency_hz: 0.0,
            power: 1.0,
        }];

        assert_eq!(
            estimate_response(&bogus, &reference, &reference, MagnitudeScale::default()),
            Err(AnalysisError::PeakOutOfRange { frame: 3, bin: 0 })
        );
    }

    #[test]
    fn test_sorted_by_frequency_keeps_original() {
        let curve = ResponseCurve::from(vec![
            ResponsePoint {
                frequency_hz: 300.0,
                magnitude_db: 1.0,
            },
            ResponsePoint {
                frequency_hz: 100.0,
                magnitude_db: 2.0,
            },
            ResponsePoint {
                frequency_hz: 300.0,
                magnitude_db: 3.0,
            },
            ResponsePoint {
                frequency_hz: 200.0,
                magnitude_db: 4.0,
            },
        ]);

        let sorted = curve.sorted_by_frequency();
        assert_eq!(sorted.frequencies(), vec![100.0, 200.0, 300.0, 300.0]);
        assert_eq!(sorted.magnitudes(), vec![2.0, 4.0, 1.0, 3.0]);
        assert_eq!(curve.frequencies(), vec![300.0, 100.0, 300.0, 200.0]);
    }

    #[test]
    fn test_json_nulls_for_non_finite() {
        let curve = ResponseCurve::from(vec![
            ResponsePoint {
                frequency_hz: 10.0,
                magnitude_db: f64::NAN,
            },
            ResponsePoint {
                frequency_hz: 20.0,
                magnitude_db: 1.5,
            },
        ]);

        let json = serde_json::to_string(&curve).unwrap();
        let expected = concat!(
            r#"[{"frequency_hz":10.0,"magnitude_db":null},"#,
            r#"{"frequency_hz":20.0,"magnitude_db":1.5}]"#
        );
        assert_eq!(json, expected);
    }
}
