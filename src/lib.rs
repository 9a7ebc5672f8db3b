//! Pixelart-gen - Library for turning images into embedded pixel tables
//!
//! This library provides functionality to:
//! - Decode static and animated images into opaque RGB frames
//! - Thin out animation frames by even sampling
//! - Apply inversion and contrast, then resample to a target size
//! - Emit C headers with `pixel_rgb_t` arrays and frame tables
//! - Run whole directories as a batch that survives bad inputs

pub mod cli;
pub mod config;
pub mod decode;
pub mod emit;
pub mod frames;
pub mod gif;
pub mod ident;
pub mod output;
pub mod pipeline;
pub mod resample;
pub mod tone;
