//! Analysis configuration and named profiles
//!
//! `AnalysisConfig` carries the framing parameters shared by both channels.
//! `RunConfig` bundles it with the choices that only matter further down the
//! pipeline (reference channel, magnitude scale) and with the display range,
//! which the numeric path never reads.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::spectrum::WindowType;

/// Framing parameters for short-time spectral analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnalysisConfig", into = "RawAnalysisConfig")]
pub struct AnalysisConfig {
    frame_size: usize,
    overlap: usize,
    sample_rate: f64,
}

impl AnalysisConfig {
    /// Create a validated configuration
    ///
    /// # Arguments
    /// * `frame_size` - Samples per frame (NFFT, power of 2 recommended)
    /// * `overlap` - Samples shared by consecutive frames, `0 <= overlap < frame_size`
    /// * `sample_rate` - Sampling rate in Hz
    pub fn new(frame_size: usize, overlap: usize, sample_rate: f64) -> Result<Self> {
        if frame_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "frame size must be at least 1".into(),
            ));
        }
        if overlap >= frame_size {
            return Err(AnalysisError::InvalidConfig(format!(
                "overlap ({overlap}) must be smaller than frame size ({frame_size})"
            )));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "sample rate must be positive and finite (got {sample_rate})"
            )));
        }

        Ok(Self {
            frame_size,
            overlap,
            sample_rate,
        })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Offset between the starts of consecutive frames
    pub fn hop(&self) -> usize {
        self.frame_size - self.overlap
    }

    /// Number of non-negative frequency bins (`frame_size / 2 + 1`)
    pub fn bin_count(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Spacing between bins in Hz
    pub fn bin_width_hz(&self) -> f64 {
        self.sample_rate / self.frame_size as f64
    }

    /// Number of complete frames in a channel of `samples` samples
    pub fn frame_count(&self, samples: usize) -> Result<usize> {
        if samples < self.frame_size {
            return Err(AnalysisError::InsufficientData {
                samples,
                frame_size: self.frame_size,
            });
        }
        Ok((samples - self.frame_size) / self.hop() + 1)
    }

    /// Frequency of bin `b` in Hz
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.frame_size as f64
    }

    /// Start time of frame `i` in seconds
    pub fn frame_time(&self, frame: usize) -> f64 {
        (frame * self.hop()) as f64 / self.sample_rate
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Profile::Standard.analysis()
    }
}

#[derive(Serialize, Deserialize)]
struct RawAnalysisConfig {
    frame_size: usize,
    overlap: usize,
    sample_rate: f64,
}

impl TryFrom<RawAnalysisConfig> for AnalysisConfig {
    type Error = AnalysisError;

    fn try_from(raw: RawAnalysisConfig) -> Result<Self> {
        AnalysisConfig::new(raw.frame_size, raw.overlap, raw.sample_rate)
    }
}

impl From<AnalysisConfig> for RawAnalysisConfig {
    fn from(config: AnalysisConfig) -> Self {
        Self {
            frame_size: config.frame_size,
            overlap: config.overlap,
            sample_rate: config.sample_rate,
        }
    }
}

/// Display clipping range in dB, consumed only when rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub vmin: f64,
    pub vmax: f64,
}

impl DisplayRange {
    pub fn span(&self) -> f64 {
        self.vmax - self.vmin
    }

    pub fn clip(&self, value_db: f64) -> f64 {
        value_db.clamp(self.vmin, self.vmax)
    }
}

/// Channel whose dominant bin drives peak tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceChannel {
    A,
    /// Second column of the input table
    #[default]
    B,
}

/// Conversion from power ratio to the logarithmic magnitude axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeScale {
    /// `10 * ln(ratio)`, the formula used by the measurement scripts
    #[default]
    NaturalLogTimesTen,

    /// `10 * log10(ratio)`, conventional dB of a power ratio
    PowerDecibel,
}

impl MagnitudeScale {
    pub fn apply(&self, ratio: f64) -> f64 {
        match self {
            MagnitudeScale::NaturalLogTimesTen => 10.0 * ratio.ln(),
            MagnitudeScale::PowerDecibel => 10.0 * ratio.log10(),
        }
    }
}

/// Named measurement presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// 48 kHz, NFFT 2048, overlap 1024, display -50..0 dB
    Standard,

    /// 96 kHz, NFFT 2048, overlap 512, display -100..-20 dB, with response curve
    Bass,
}

impl Profile {
    pub fn analysis(&self) -> AnalysisConfig {
        let (overlap, sample_rate) = match self {
            Profile::Standard => (1024, 48000.0),
            Profile::Bass => (512, 96000.0),
        };
        AnalysisConfig {
            frame_size: 2048,
            overlap,
            sample_rate,
        }
    }

    pub fn display_range(&self) -> DisplayRange {
        match self {
            Profile::Standard => DisplayRange {
                vmin: -50.0,
                vmax: 0.0,
            },
            Profile::Bass => DisplayRange {
                vmin: -100.0,
                vmax: -20.0,
            },
        }
    }

    pub fn emits_response(&self) -> bool {
        matches!(self, Profile::Bass)
    }
}

/// Everything one run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub analysis: AnalysisConfig,
    pub window: WindowType,
    pub reference: ReferenceChannel,
    pub scale: MagnitudeScale,
    pub display: DisplayRange,

    /// Emit the response curve sorted by frequency instead of frame order
    pub sort_by_frequency: bool,

    /// Write the response curve artifact next to the spectrogram
    pub emit_response: bool,
}

impl RunConfig {
    pub fn from_profile(profile: Profile) -> Self {
        Self {
            analysis: profile.analysis(),
            window: WindowType::Hann,
            reference: ReferenceChannel::B,
            scale: MagnitudeScale::NaturalLogTimesTen,
            display: profile.display_range(),
            sort_by_frequency: false,
            emit_response: profile.emits_response(),
        }
    }
}

/// Field-by-field overrides layered on top of a preset or config file
///
/// When `frame_size` changes and `overlap` is not given, the overlap keeps
/// its fraction of the frame (1024 of 2048 becomes 512 of 1024), so a
/// preset overlap never ends up as large as the new frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub frame_size: Option<usize>,
    pub overlap: Option<usize>,
    pub sample_rate: Option<f64>,
    pub window: Option<WindowType>,
    pub reference: Option<ReferenceChannel>,
    pub scale: Option<MagnitudeScale>,
    pub sort_by_frequency: bool,
    pub emit_response: Option<bool>,
}

impl RunConfig {
    /// Overlay a JSON document onto this configuration
    ///
    /// Objects are merged key by key, so `{"analysis": {"overlap": 256}}`
    /// only changes the overlap. The result is validated like any other
    /// deserialised configuration.
    pub fn merged_with_json(&self, patch: serde_json::Value) -> Result<Self> {
        let mut value = serde_json::to_value(self)
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        merge_json(&mut value, patch);
        serde_json::from_value(value).map_err(|e| AnalysisError::InvalidConfig(e.to_string()))
    }

    /// Apply command-line style overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> Result<()> {
        if overrides.frame_size.is_some()
            || overrides.overlap.is_some()
            || overrides.sample_rate.is_some()
        {
            let current = self.analysis;
            let frame_size = overrides.frame_size.unwrap_or(current.frame_size);
            let overlap = match (overrides.overlap, overrides.frame_size) {
                (Some(overlap), _) => overlap,
                (None, Some(frame_size)) => current.overlap * frame_size / current.frame_size,
                (None, None) => current.overlap,
            };
            let sample_rate = overrides.sample_rate.unwrap_or(current.sample_rate);

            self.analysis = AnalysisConfig::new(frame_size, overlap, sample_rate)?;
        }

        if let Some(window) = overrides.window {
            self.window = window;
        }
        if let Some(reference) = overrides.reference {
            self.reference = reference;
        }
        if let Some(scale) = overrides.scale {
            self.scale = scale;
        }
        self.sort_by_frequency |= overrides.sort_by_frequency;
        if let Some(emit) = overrides.emit_response {
            self.emit_response = emit;
        }

        Ok(())
    }
}

/// Overlay `patch` onto `base`, recursing into objects
fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(base.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_profile(Profile::Standard)
    }
}
