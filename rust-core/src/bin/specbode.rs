//! Spectrogram and peak-tracking Bode estimate of a two-column sample table
//!
//! Writes the spectrogram image to OUTPUT and, when enabled, the response
//! curve to `bode-OUTPUT`.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::PathBuf;

use specbode::io::{
    export_response_frd, export_spectrogram_pgm, load_two_channel, secondary_artifact_path,
};
use specbode::{
    analyze, ConfigOverrides, MagnitudeScale, Profile, ReferenceChannel, RunConfig, WindowType,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// 48 kHz, overlap 1024, display -50..0 dB
    Standard,
    /// 96 kHz, overlap 512, display -100..-20 dB, response curve on
    Bass,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ChannelArg {
    A,
    B,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ScaleArg {
    /// 10 * ln(ratio)
    Natural,
    /// 10 * log10(ratio)
    Decibel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum WindowArg {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

#[derive(Parser, Debug)]
#[command(name = "specbode")]
#[command(version)]
#[command(
    about = "Spectrogram and peak-tracking magnitude response of a two-channel capture",
    long_about = None
)]
struct Args {
    /// Input table, one whitespace-separated sample pair per line
    input: PathBuf,

    /// Spectrogram image (PGM); the response curve goes next to it with a `bode-` prefix
    output: PathBuf,

    /// Measurement preset
    #[arg(short, long, value_enum, default_value_t = ProfileArg::Standard)]
    profile: ProfileArg,

    /// JSON run configuration, applied over the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Samples per frame (NFFT)
    #[arg(long)]
    frame_size: Option<usize>,

    /// Samples shared by consecutive frames; defaults to the preset's
    /// fraction of the frame when only --frame-size is given
    #[arg(long)]
    overlap: Option<usize>,

    /// Sampling rate in Hz
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Channel whose dominant bin drives peak tracking
    #[arg(long, value_enum)]
    reference: Option<ChannelArg>,

    /// Ratio-to-log conversion for the response curve
    #[arg(long, value_enum)]
    scale: Option<ScaleArg>,

    /// Analysis window
    #[arg(long, value_enum)]
    window: Option<WindowArg>,

    /// Sort the response curve by frequency instead of frame order
    #[arg(long)]
    sort_by_frequency: bool,

    /// Always write the response curve
    #[arg(long, conflicts_with = "no_response")]
    response: bool,

    /// Never write the response curve
    #[arg(long)]
    no_response: bool,
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    let config = build_config(&args)?;

    let samples = load_two_channel(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    info!(
        "Loaded {} sample pairs ({:.3} s at {} Hz)",
        samples.len(),
        samples.len() as f64 / config.analysis.sample_rate(),
        config.analysis.sample_rate()
    );

    let analysis = analyze(&samples.a, &samples.b, &config).context("Analysis failed")?;

    export_spectrogram_pgm(
        &[&analysis.channel_a, &analysis.channel_b],
        &config.display,
        &args.output,
    )
    .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Spectrogram written to {}", args.output.display());

    if config.emit_response {
        let path = secondary_artifact_path(&args.output);
        export_response_frd(&analysis.response, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Response curve written to {}", path.display());

        for point in analysis.response.iter() {
            println!("{:.3}\t{:.6}", point.frequency_hz, point.magnitude_db);
        }
    }

    let non_finite = analysis.response.non_finite_count();
    if non_finite == analysis.response.len() && non_finite > 0 {
        warn!("Every response point is non-finite; is one channel silent?");
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<RunConfig> {
    let profile = match args.profile {
        ProfileArg::Standard => Profile::Standard,
        ProfileArg::Bass => Profile::Bass,
    };
    let mut config = RunConfig::from_profile(profile);

    if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let patch = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        config = config
            .merged_with_json(patch)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    }

    config.apply(&overrides(args))?;
    Ok(config)
}

fn overrides(args: &Args) -> ConfigOverrides {
    let emit_response = if args.response {
        Some(true)
    } else if args.no_response {
        Some(false)
    } else {
        None
    };

    ConfigOverrides {
        frame_size: args.frame_size,
        overlap: args.overlap,
        sample_rate: args.sample_rate,
        window: args.window.map(|window| match window {
            WindowArg::Hann => WindowType::Hann,
            WindowArg::Hamming => WindowType::Hamming,
            WindowArg::Blackman => WindowType::Blackman,
            WindowArg::Rectangular => WindowType::Rectangular,
        }),
        reference: args.reference.map(|reference| match reference {
            ChannelArg::A => ReferenceChannel::A,
            ChannelArg::B => ReferenceChannel::B,
        }),
        scale: args.scale.map(|scale| match scale {
            ScaleArg::Natural => MagnitudeScale::NaturalLogTimesTen,
            ScaleArg::Decibel => MagnitudeScale::PowerDecibel,
        }),
        sort_by_frequency: args.sort_by_frequency,
        emit_response,
    }
}
