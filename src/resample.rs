//! Scale-aware resampling for RGB frames
//!
//! Strategy selection depends on the scale direction: area averaging (box)
//! when shrinking, Lanczos when growing. Aggressive downscales (any axis
//! below 0.5) always go through two box passes via an intermediate size so a
//! single output pixel never averages an excessively large neighbourhood.

use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale factor below which a downscale is split into two box passes.
pub const TWO_PASS_THRESHOLD: f64 = 0.5;

/// User-facing resampling strategy.
///
/// | Strategy | Downscale | Upscale |
/// |----------|-----------|---------|
/// | `auto` | box | lanczos |
/// | `box` | box | box |
/// | `lanczos` | lanczos | lanczos |
/// | `nearest` | nearest | nearest |
/// | `bicubic` | bicubic | bicubic |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResampleStrategy {
    /// Box when downscaling, Lanczos when upscaling
    #[default]
    Auto,
    /// Area averaging, best for shrinking pixel art
    Box,
    /// Lanczos3, smooth upscaling
    Lanczos,
    /// Nearest neighbour, pixel-perfect
    Nearest,
    /// Catmull-Rom bicubic
    Bicubic,
}

/// A concrete filter, after `auto` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Box,
    Lanczos,
    Nearest,
    Bicubic,
}

impl ResampleStrategy {
    /// Resolve to a concrete filter for the given scale direction.
    pub fn resolve(self, is_downscale: bool) -> Filter {
        match self {
            ResampleStrategy::Auto if is_downscale => Filter::Box,
            ResampleStrategy::Auto => Filter::Lanczos,
            ResampleStrategy::Box => Filter::Box,
            ResampleStrategy::Lanczos => Filter::Lanczos,
            ResampleStrategy::Nearest => Filter::Nearest,
            ResampleStrategy::Bicubic => Filter::Bicubic,
        }
    }
}

impl fmt::Display for ResampleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleStrategy::Auto => "auto",
            ResampleStrategy::Box => "box",
            ResampleStrategy::Lanczos => "lanczos",
            ResampleStrategy::Nearest => "nearest",
            ResampleStrategy::Bicubic => "bicubic",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::Box => "box",
            Filter::Lanczos => "lanczos",
            Filter::Nearest => "nearest",
            Filter::Bicubic => "bicubic",
        };
        f.write_str(name)
    }
}

/// How a frame will be brought to its target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResizePlan {
    /// Source already has the target size
    Unchanged,
    /// One resize with the given filter
    SinglePass { filter: Filter },
    /// Box to `intermediate`, then box to the target
    TwoPass { intermediate: (u32, u32) },
}

impl fmt::Display for ResizePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizePlan::Unchanged => write!(f, "unchanged"),
            ResizePlan::SinglePass { filter } => write!(f, "{} (single pass)", filter),
            ResizePlan::TwoPass { intermediate: (w, h) } => {
                write!(f, "box (two pass via {}x{})", w, h)
            }
        }
    }
}

/// Decide how to resize from `source` to `target` dimensions.
///
/// Both dimensions must be non-zero; the config layer rejects zero targets
/// before any frame reaches this point.
pub fn plan(source: (u32, u32), target: (u32, u32), strategy: ResampleStrategy) -> ResizePlan {
    let (src_w, src_h) = source;
    let (dst_w, dst_h) = target;
    debug_assert!(src_w > 0 && src_h > 0, "source must be non-empty");
    debug_assert!(dst_w > 0 && dst_h > 0, "target must be non-empty");

    if source == target {
        return ResizePlan::Unchanged;
    }

    let scale_x = dst_w as f64 / src_w as f64;
    let scale_y = dst_h as f64 / src_h as f64;
    let is_downscale = scale_x < 1.0 || scale_y < 1.0;

    if is_downscale && (scale_x < TWO_PASS_THRESHOLD || scale_y < TWO_PASS_THRESHOLD) {
        let intermediate = (intermediate_extent(src_w, dst_w), intermediate_extent(src_h, dst_h));
        return ResizePlan::TwoPass { intermediate };
    }

    ResizePlan::SinglePass { filter: strategy.resolve(is_downscale) }
}

/// Intermediate extent for one axis of a two-pass downscale.
///
/// Starts from `max(target * 2, source / 2)` and is clamped to
/// `[target, max(source, target)]`: the first pass never shrinks below the
/// target and never enlarges the source.
pub fn intermediate_extent(source: u32, target: u32) -> u32 {
    let raw = target.saturating_mul(2).max(source / 2);
    raw.clamp(target, source.max(target))
}

/// Resize a frame to exactly `width` x `height` using `strategy`.
pub fn resize(frame: &RgbImage, width: u32, height: u32, strategy: ResampleStrategy) -> RgbImage {
    match plan(frame.dimensions(), (width, height), strategy) {
        ResizePlan::Unchanged => frame.clone(),
        ResizePlan::SinglePass { filter } => apply_filter(frame, width, height, filter),
        ResizePlan::TwoPass { intermediate: (mid_w, mid_h) } => {
            let intermediate = box_resize(frame, mid_w, mid_h);
            box_resize(&intermediate, width, height)
        }
    }
}

/// Run a single resize pass with a concrete filter.
pub fn apply_filter(frame: &RgbImage, width: u32, height: u32, filter: Filter) -> RgbImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    match filter {
        Filter::Box => box_resize(frame, width, height),
        Filter::Lanczos => imageops::resize(frame, width, height, FilterType::Lanczos3),
        Filter::Nearest => imageops::resize(frame, width, height, FilterType::Nearest),
        Filter::Bicubic => imageops::resize(frame, width, height, FilterType::CatmullRom),
    }
}

/// Area-averaging resize.
///
/// Each output pixel is the coverage-weighted mean of every source pixel its
/// footprint overlaps. Runs horizontally then vertically, keeping the
/// intermediate in floating point so rounding happens once.
pub fn box_resize(frame: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = frame.dimensions();
    if (src_w, src_h) == (width, height) {
        return frame.clone();
    }

    let x_weights = coverage_weights(src_w, width);
    let y_weights = coverage_weights(src_h, height);
    let src = frame.as_raw();
    let src_w = src_w as usize;
    let dst_w = width as usize;

    // Horizontal pass: src_h rows of dst_w pixels
    let mut horizontal = vec![0.0f64; dst_w * src_h as usize * 3];
    for y in 0..src_h as usize {
        let row = &src[y * src_w * 3..(y + 1) * src_w * 3];
        for (x, span) in x_weights.iter().enumerate() {
            let mut acc = [0.0f64; 3];
            for (i, w) in span.weights.iter().enumerate() {
                let p = (span.first + i) * 3;
                acc[0] += row[p] as f64 * w;
                acc[1] += row[p + 1] as f64 * w;
                acc[2] += row[p + 2] as f64 * w;
            }
            let out = (y * dst_w + x) * 3;
            horizontal[out..out + 3].copy_from_slice(&acc);
        }
    }

    // Vertical pass
    let mut out = RgbImage::new(width, height);
    for (y, span) in y_weights.iter().enumerate() {
        for x in 0..dst_w {
            let mut acc = [0.0f64; 3];
            for (i, w) in span.weights.iter().enumerate() {
                let p = ((span.first + i) * dst_w + x) * 3;
                acc[0] += horizontal[p] * w;
                acc[1] += horizontal[p + 1] * w;
                acc[2] += horizontal[p + 2] * w;
            }
            out.put_pixel(x as u32, y as u32, image::Rgb(acc.map(round_channel)));
        }
    }

    out
}

/// Source pixels contributing to one output pixel along an axis.
#[derive(Debug, Clone, PartialEq)]
struct Span {
    first: usize,
    weights: Vec<f64>,
}

/// Normalized overlap weights for resampling `src` samples onto `dst`.
fn coverage_weights(src: u32, dst: u32) -> Vec<Span> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).clamp(first + 1, src as usize);

            let mut weights: Vec<f64> = (first..last)
                .map(|j| {
                    let lo = start.max(j as f64);
                    let hi = end.min((j + 1) as f64);
                    (hi - lo).max(0.0)
                })
                .collect();

            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                weights.iter_mut().for_each(|w| *w /= total);
            }
            Span { first, weights }
        })
        .collect()
}

fn round_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
