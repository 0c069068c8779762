//! Numeric artifacts for the presentation layer
//!
//! - PGM grayscale image of the spectrograms, clipped to the display range
//! - FRD-style text of the response curve (`frequency magnitude` per line)
//! - JSON of the response curve

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::DisplayRange;
use crate::response::ResponseCurve;
use crate::spectrum::Spectrogram;

/// Prefix that names the response-curve artifact after the primary one
pub const RESPONSE_ARTIFACT_PREFIX: &str = "bode-";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize response curve: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Nothing to export: {0}")]
    Empty(&'static str),
}

/// Path of the response-curve artifact for a given spectrogram artifact
///
/// `out/run.pgm` becomes `out/bode-run.pgm`.
pub fn secondary_artifact_path(primary: impl AsRef<Path>) -> PathBuf {
    let primary = primary.as_ref();
    let name = primary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    primary.with_file_name(format!("{RESPONSE_ARTIFACT_PREFIX}{name}"))
}

/// Export spectrograms to one PGM grayscale image
///
/// Spectrograms are stacked top to bottom in the order given. Within each,
/// time runs along X and frequency along Y with low frequencies at the
/// bottom. dB values are clipped to `range` and mapped linearly onto 0..=255.
pub fn export_spectrogram_pgm(
    spectrograms: &[&Spectrogram],
    range: &DisplayRange,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let first = spectrograms
        .first()
        .ok_or(ExportError::Empty("no spectrograms given"))?;

    let width = first.frame_count();
    let height: usize = spectrograms.iter().map(|s| s.bin_count()).sum();
    if width == 0 || height == 0 {
        return Err(ExportError::Empty("spectrogram has no frames"));
    }

    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "P2")?;
    writeln!(
        file,
        "# Spectrogram, {} channel(s), display range {} to {} dB",
        spectrograms.len(),
        range.vmin,
        range.vmax
    )?;
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;

    let span = range.span();

    for spectrogram in spectrograms {
        let db = spectrogram.to_display_db(range);

        for bin in (0..spectrogram.bin_count()).rev() {
            let row: Vec<String> = (0..width)
                .map(|frame| {
                    let value = db.get((bin, frame)).copied().unwrap_or(range.vmin);
                    let normalized = if span > 0.0 {
                        ((value - range.vmin) / span).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    ((normalized * 255.0).round() as u8).to_string()
                })
                .collect();
            writeln!(file, "{}", row.join(" "))?;
        }
    }

    file.flush()?;
    Ok(())
}

/// Export response curve as `frequency magnitude` lines
///
/// Points keep the curve's order. Non-finite magnitudes are written as
/// `NaN`, `inf` or `-inf`.
pub fn export_response_frd(
    curve: &ResponseCurve,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let mut file = BufWriter::new(File::create(path)?);
    write_response_frd(curve, &mut file)?;
    file.flush()?;
    Ok(())
}

/// Write response curve lines to any writer
pub fn write_response_frd(curve: &ResponseCurve, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "* frequency_hz magnitude_db")?;
    for point in curve {
        writeln!(out, "{:.6} {:.6}", point.frequency_hz, point.magnitude_db)?;
    }
    Ok(())
}

/// Export response curve as a JSON array; non-finite magnitudes become `null`
pub fn export_response_json(
    curve: &ResponseCurve,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, curve)?;
    writeln!(file)?;
    file.flush()?;
    Ok(())
}
