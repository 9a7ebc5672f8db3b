//! Configuration loading and discovery for `pixelart.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PixelArtConfig;
use crate::resample::ResampleStrategy;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "pixelart.toml";

/// Configuration error. Any of these aborts a batch before the first input
/// is touched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse pixelart.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
    /// Input path does not exist
    #[error("Input path '{}' does not exist", .0.display())]
    MissingInput(PathBuf),
    /// Input directory holds nothing to convert
    #[error("No GIF or PNG files found in '{}'", .0.display())]
    NoInputs(PathBuf),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resample: Option<ResampleStrategy>,
    pub invert: Option<bool>,
    pub contrast: Option<f32>,
    pub frame_reduction: Option<f64>,
    pub write_types: Option<bool>,
}

/// Find pixelart.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find pixelart.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a pixelart.toml file.
///
/// With an explicit path the file must exist. Without one, the file is
/// discovered with [`find_config`] and built-in defaults are used when
/// there is none.
pub fn load_config(path: Option<&Path>) -> Result<PixelArtConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(PixelArtConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<PixelArtConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PixelArtConfig = toml::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PixelArtConfig, overrides: &CliOverrides) {
    if let Some(ref input) = overrides.input {
        config.paths.input = input.clone();
    }
    if let Some(ref output) = overrides.output {
        config.paths.output = output.clone();
    }
    if let Some(write_types) = overrides.write_types {
        config.paths.write_types = write_types;
    }

    let convert = &mut config.convert;
    if let Some(width) = overrides.width {
        convert.width = width;
    }
    if let Some(height) = overrides.height {
        convert.height = height;
    }
    if let Some(resample) = overrides.resample {
        convert.resample = resample;
    }
    if let Some(invert) = overrides.invert {
        convert.invert = invert;
    }
    if let Some(contrast) = overrides.contrast {
        convert.contrast = contrast;
    }
    if let Some(frame_reduction) = overrides.frame_reduction {
        convert.frame_reduction = frame_reduction;
    }
}

/// Load, merge CLI overrides, then validate the result.
///
/// Validation runs after merging so a bad file value fixed on the command
/// line is accepted, and a bad command-line value is always caught.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<PixelArtConfig, ConfigError> {
    let mut config = load_config(path)?;
    merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}
