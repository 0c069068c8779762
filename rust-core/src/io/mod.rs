//! Sample loading and artifact export around the analysis core

pub mod export;
pub mod loader;

pub use export::{
    export_response_frd, export_response_json, export_spectrogram_pgm, secondary_artifact_path,
    ExportError,
};
pub use loader::{load_two_channel, parse_two_channel, LoadError, TwoChannelSamples};
