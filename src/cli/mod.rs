//! Command-line interface implementation
//!
//! This module parses arguments, sets up logging and hands off to
//! [`convert`] for the actual batch run.

mod convert;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::CliOverrides;
use crate::resample::ResampleStrategy;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

const AFTER_HELP: &str = "\
Examples:
  # Convert all images in images/ with the default 32x32 size
  pxgen

  # Convert a specific image into a specific directory
  pxgen --input images/1.gif --output output/

  # Box resampling (area averaging) is best for shrinking pixel art
  pxgen --resample box

  # Invert colors (clear background with black strokes)
  pxgen --invert

  # Contrast: 0.1 = low contrast/mono mapping, 1.0 = normal, 2.0 = high
  pxgen --contrast 1.0

  # Keep 50% of GIF frames, evenly sampled
  pxgen --frame-reduction 0.5

Resampling:
  auto uses box (area averaging) when shrinking and lanczos when growing.
  Shrinking below half size on any axis goes through two box passes.
  Transparent pixels are flattened onto white.";

/// Pxgen - Convert GIF/PNG images into C pixel tables
#[derive(Parser, Debug)]
#[command(name = "pxgen")]
#[command(about = "Pxgen - Convert GIF/PNG images into C header pixel tables for LED matrix displays")]
#[command(version)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Input image file or directory [default: images]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory, created if missing [default: output]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target width in pixels [default: 32]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Target height in pixels [default: 32]
    #[arg(short = 'H', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Resampling method [default: auto]
    #[arg(short, long, value_enum)]
    pub resample: Option<ResampleStrategy>,

    /// Invert colors before conversion
    #[arg(short = 'I', long, overrides_with = "no_invert")]
    pub invert: bool,

    /// Do not invert colors, even if the config file asks for it
    #[arg(long, overrides_with = "invert")]
    pub no_invert: bool,

    /// Contrast factor: 0.0 = flat gray, 0.1 = low contrast, 1.0 = unchanged, 2.0 = high [default: 0.1]
    #[arg(short, long)]
    pub contrast: Option<f32>,

    /// Fraction of GIF frames to drop, in [0.0, 1.0): 0.5 keeps half, 0.75 keeps a quarter [default: 0.0]
    #[arg(short, long)]
    pub frame_reduction: Option<f64>,

    /// Configuration file (default: nearest pixelart.toml, if any)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write pixel_art_types.h into the output directory's parent
    #[arg(long, overrides_with = "no_write_types")]
    pub write_types: bool,

    /// Skip pixel_art_types.h, even if the config file asks for it
    #[arg(long, overrides_with = "write_types")]
    pub no_write_types: bool,

    /// Print a JSON report instead of progress lines
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            width: self.width,
            height: self.height,
            resample: self.resample,
            invert: switch(self.invert, self.no_invert),
            contrast: self.contrast,
            frame_reduction: self.frame_reduction,
            write_types: switch(self.write_types, self.no_write_types),
        }
    }
}

/// Tri-state value of a `--flag` / `--no-flag` pair; `None` keeps the config value.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Route diagnostics to stderr so stdout stays clean for `--json`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pixelart_gen=debug" } else { "pixelart_gen=warn" };
    // A subscriber may already be installed when run() is called more than once
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .try_init();
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    convert::run_convert(&cli)
}
