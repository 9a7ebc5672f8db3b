//! Configuration schema types for `pixelart.toml`
//!
//! Defines the processing options and default paths, plus the validation
//! rules every configuration must pass before a batch starts.

use crate::resample::ResampleStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contrast applied when nothing else is configured.
///
/// Deliberately low: most sources are high-contrast artwork that reads
/// better on an LED matrix when flattened toward mid gray.
pub const DEFAULT_CONTRAST: f32 = 0.1;

/// Options that control how each frame is converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Resampling strategy
    pub resample: ResampleStrategy,
    /// Invert colors before contrast and resizing
    pub invert: bool,
    /// Contrast factor (1.0 = unchanged)
    pub contrast: f32,
    /// Fraction of animation frames to drop, in `[0.0, 1.0)`
    pub frame_reduction: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            resample: ResampleStrategy::Auto,
            invert: false,
            contrast: DEFAULT_CONTRAST,
            frame_reduction: 0.0,
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Image file or directory to convert
    pub input: PathBuf,
    /// Directory receiving headers and previews
    pub output: PathBuf,
    /// Also write `pixel_art_types.h` next to the output directory
    pub write_types: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { input: PathBuf::from("images"), output: PathBuf::from("output"), write_types: false }
    }
}

/// Root configuration structure for `pixelart.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelArtConfig {
    /// Conversion options
    pub convert: ProcessingConfig,
    /// Paths
    pub paths: PathsConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "convert.width")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

impl ProcessingConfig {
    /// Validate processing options and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.width == 0 {
            errors.push(ConfigValidationError {
                field: "convert.width".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.height == 0 {
            errors.push(ConfigValidationError {
                field: "convert.height".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if !(self.contrast >= 0.0 && self.contrast.is_finite()) {
            errors.push(ConfigValidationError {
                field: "convert.contrast".to_string(),
                message: format!("must be a finite value >= 0.0, got {}", self.contrast),
            });
        }

        if !(self.frame_reduction >= 0.0 && self.frame_reduction < 1.0) {
            errors.push(ConfigValidationError {
                field: "convert.frame_reduction".to_string(),
                message: format!(
                    "must be between 0.0 and 1.0 (exclusive), got {}",
                    self.frame_reduction
                ),
            });
        }

        errors
    }
}

impl PixelArtConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = self.convert.validate();

        if self.paths.output.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "paths.output".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PixelArtConfig::default();
        assert_eq!(config.convert.width, 32);
        assert_eq!(config.convert.height, 32);
        assert_eq!(config.convert.resample, ResampleStrategy::Auto);
        assert!(!config.convert.invert);
        assert_eq!(config.convert.contrast, DEFAULT_CONTRAST);
        assert_eq!(config.convert.frame_reduction, 0.0);
        assert_eq!(config.paths.input, PathBuf::from("images"));
        assert_eq!(config.paths.output, PathBuf::from("output"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: PixelArtConfig = toml::from_str(
            r#"
[convert]
width = 64
resample = "nearest"
frame_reduction = 0.25
"#,
        )
        .unwrap();
        assert_eq!(config.convert.width, 64);
        assert_eq!(config.convert.height, 32);
        assert_eq!(config.convert.resample, ResampleStrategy::Nearest);
        assert_eq!(config.convert.frame_reduction, 0.25);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_validate_zero_dimensions() {
        let config = ProcessingConfig { width: 0, height: 0, ..Default::default() };
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["convert.width", "convert.height"]);
    }

    #[test]
    fn test_validate_frame_reduction_range() {
        for bad in [-0.1, 1.0, 1.5, f64::NAN] {
            let config = ProcessingConfig { frame_reduction: bad, ..Default::default() };
            assert_eq!(config.validate().len(), 1, "{} should be rejected", bad);
        }
        for good in [0.0, 0.5, 0.99] {
            let config = ProcessingConfig { frame_reduction: good, ..Default::default() };
            assert!(config.validate().is_empty(), "{} should be accepted", good);
        }
    }

    #[test]
    fn test_validate_negative_contrast() {
        let config = ProcessingConfig { contrast: -1.0, ..Default::default() };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("convert.contrast"));
    }
}
