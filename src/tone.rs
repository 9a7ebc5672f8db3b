//! Tone adjustments applied to every frame before resampling
//!
//! Order is fixed: inversion first, then contrast.

use image::RgbImage;

/// Contrast factor that leaves a frame untouched.
pub const NEUTRAL_CONTRAST: f32 = 1.0;

/// Apply optional inversion and contrast scaling to a frame in place.
pub fn apply_tone(frame: &mut RgbImage, invert: bool, contrast: f32) {
    if invert {
        invert_colors(frame);
    }
    if contrast != NEUTRAL_CONTRAST {
        adjust_contrast(frame, contrast);
    }
}

/// Replace every channel value `v` with `255 - v`.
pub fn invert_colors(frame: &mut RgbImage) {
    for value in frame.iter_mut() {
        *value = 255 - *value;
    }
}

/// Scale every channel away from (or toward) the frame's mean gray level.
///
/// `v' = mean + factor * (v - mean)`, truncated and clamped to `[0, 255]`.
/// A factor of `0.0` flattens the frame to a single gray.
pub fn adjust_contrast(frame: &mut RgbImage, factor: f32) {
    let mean = mean_gray(frame) as f32;
    for value in frame.iter_mut() {
        let scaled = mean + factor * (*value as f32 - mean);
        *value = if scaled <= 0.0 {
            0
        } else if scaled >= 255.0 {
            255
        } else {
            scaled as u8
        };
    }
}

/// Rounded mean of the frame's ITU-R 601 luma.
pub fn mean_gray(frame: &RgbImage) -> u8 {
    let count = frame.width() as u64 * frame.height() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = frame.pixels().map(|p| luma(p.0) as u64).sum();
    ((total as f64 / count as f64) + 0.5) as u8
}

/// 8-bit luma with 16-bit fixed point weights (0.299, 0.587, 0.114).
fn luma([r, g, b]: [u8; 3]) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample_frame() -> RgbImage {
        RgbImage::from_fn(6, 4, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, (x * y * 10) as u8]))
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma([0, 0, 0]), 0);
        assert_eq!(luma([255, 255, 255]), 255);
        assert_eq!(luma([255, 0, 0]), 76);
    }

    #[test]
    fn test_invert_then_neutral_contrast_is_negation() {
        let original = sample_frame();
        let mut frame = original.clone();
        apply_tone(&mut frame, true, 1.0);
        for (a, b) in original.iter().zip(frame.iter()) {
            assert_eq!(*b, !*a);
        }
    }

    #[test]
    fn test_neutral_contrast_is_identity() {
        let original = sample_frame();
        let mut frame = original.clone();
        apply_tone(&mut frame, false, 1.0);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_zero_contrast_flattens_to_gray() {
        for invert in [false, true] {
            let mut frame = sample_frame();
            apply_tone(&mut frame, invert, 0.0);
            let first = *frame.get_pixel(0, 0);
            for p in frame.pixels() {
                assert_eq!(p[0], p[1]);
                assert_eq!(p[1], p[2]);
                assert_eq!(*p, first);
            }
        }
    }

    #[test]
    fn test_zero_contrast_uses_mean_of_inverted_frame() {
        let mut frame = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        apply_tone(&mut frame, true, 0.0);
        assert_eq!(*frame.get_pixel(1, 1), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_high_contrast_clamps() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([10, 10, 10]));
        frame.put_pixel(1, 0, Rgb([245, 245, 245]));
        adjust_contrast(&mut frame, 4.0);
        assert_eq!(*frame.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_low_contrast_pulls_toward_mean() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([0, 0, 0]));
        frame.put_pixel(1, 0, Rgb([200, 200, 200]));
        // mean gray = 100
        adjust_contrast(&mut frame, 0.5);
        assert_eq!(*frame.get_pixel(0, 0), Rgb([50, 50, 50]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([150, 150, 150]));
    }

    #[test]
    fn test_mean_gray_empty_frame() {
        assert_eq!(mean_gray(&RgbImage::new(0, 0)), 0);
    }
}
