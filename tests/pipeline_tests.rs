//! End-to-end tests for the conversion pipeline
//!
//! Fixtures are generated on the fly, converted through the public API and
//! checked through the written header and preview files.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use pixelart_gen::config::ProcessingConfig;
use pixelart_gen::decode::{decode, LoopCount};
use pixelart_gen::pipeline::{convert_file, discover_inputs, run_batch, Outcome};
use pixelart_gen::resample::{resize, ResampleStrategy, ResizePlan};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_png(path: &Path, image: RgbImage) {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("should encode png");
    fs::write(path, bytes).expect("should write png");
}

fn write_gif(path: &Path, frame_count: usize, size: u32, delay_ms: u32, repeat: Repeat) {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(repeat).expect("should set repeat");
        for i in 0..frame_count {
            let buffer = RgbaImage::from_fn(size, size, |x, _| {
                if x as usize == i % size as usize {
                    Rgba([255, 255, 255, 255])
                } else {
                    Rgba([0, 0, 0, 255])
                }
            });
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder
                .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
                .expect("should encode frame");
        }
    }
    fs::write(path, bytes).expect("should write gif");
}

fn checkerboard(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgb([230, 40, 40])
        } else {
            Rgb([20, 20, 200])
        }
    })
}

fn neutral() -> ProcessingConfig {
    ProcessingConfig { contrast: 1.0, ..Default::default() }
}

/// Extract every `{0xRR, 0xGG, 0xBB}` triplet from header text
fn triplets(header: &str) -> Vec<[u8; 3]> {
    header
        .split("{0x")
        .skip(1)
        .map(|rest| {
            let body = &rest[..rest.find('}').expect("triplet should close")];
            let parts: Vec<u8> = body
                .split(", 0x")
                .map(|h| u8::from_str_radix(h.trim_start_matches("0x"), 16).expect("hex byte"))
                .collect();
            [parts[0], parts[1], parts[2]]
        })
        .collect()
}

#[test]
fn test_static_128_to_32_uses_two_pass_box() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("board.png");
    write_png(&input, checkerboard(128));

    let conversion = convert_file(&input, &temp.path().join("out"), &neutral())
        .expect("conversion should succeed");

    assert_eq!(conversion.plan, ResizePlan::TwoPass { intermediate: (64, 64) });
    let header = fs::read_to_string(&conversion.header).expect("header should exist");
    let pixels = triplets(&header);
    assert_eq!(pixels.len(), 1024);

    // Header pixels equal the library resize of the same source
    let expected = resize(&checkerboard(128), 32, 32, ResampleStrategy::Box);
    let expected: Vec<[u8; 3]> = expected.pixels().map(|p| p.0).collect();
    assert_eq!(pixels, expected);
}

#[test]
fn test_triplet_count_for_various_sizes() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("board.png");
    write_png(&input, checkerboard(40));

    for (w, h) in [(1, 1), (8, 3), (40, 40), (64, 20)] {
        let config = ProcessingConfig { width: w, height: h, ..neutral() };
        let out = temp.path().join(format!("out_{}x{}", w, h));
        let conversion = convert_file(&input, &out, &config).expect("conversion should succeed");
        let header = fs::read_to_string(conversion.header).expect("header should exist");
        assert_eq!(triplets(&header).len(), (w * h) as usize, "{}x{}", w, h);
    }
}

#[test]
fn test_header_is_byte_identical_across_runs() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("anim.gif");
    write_gif(&input, 6, 12, 90, Repeat::Infinite);
    let config = ProcessingConfig { width: 5, height: 5, frame_reduction: 0.3, ..Default::default() };

    let a = convert_file(&input, &temp.path().join("a"), &config).expect("first run");
    let b = convert_file(&input, &temp.path().join("b"), &config).expect("second run");

    assert_eq!(fs::read(a.header).unwrap(), fs::read(b.header).unwrap());
}

#[test]
fn test_ten_frame_animation_half_reduction() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("walk.gif");
    write_gif(&input, 10, 10, 60, Repeat::Finite(4));
    let config = ProcessingConfig { width: 5, height: 5, frame_reduction: 0.5, ..neutral() };

    let conversion =
        convert_file(&input, temp.path(), &config).expect("conversion should succeed");

    assert_eq!(conversion.frames, 5);
    assert_eq!(conversion.original_frames, 10);
    assert_eq!(conversion.frame_indices, vec![0, 2, 4, 6, 9]);

    let header = fs::read_to_string(&conversion.header).unwrap();
    assert!(header.contains("#define WALK_FRAME_COUNT 5"));
    assert!(header.contains("walk_frame_4_data"));
    assert!(!header.contains("walk_frame_5_data"));
    assert_eq!(triplets(&header).len(), 5 * 25);

    // Preview keeps timing and loop count
    let preview = decode(&fs::read(&conversion.preview).unwrap()).unwrap();
    assert_eq!(preview.frame_count(), 5);
    assert!(preview.frames.iter().all(|f| f.delay_ms == 60));
    assert_eq!(preview.loop_count, LoopCount::Finite(4));
}

#[test]
fn test_transparent_png_flattens_to_white() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("ghost.png");
    let rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    fs::write(&input, bytes).unwrap();

    let config = ProcessingConfig { width: 2, height: 2, ..neutral() };
    let conversion = convert_file(&input, temp.path(), &config).unwrap();
    let header = fs::read_to_string(conversion.header).unwrap();
    assert!(triplets(&header).iter().all(|p| *p == [255, 255, 255]));
}

#[test]
fn test_transparent_gif_flattens_to_white() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("sprite.gif");
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        for shade in [0u8, 90] {
            // Left column opaque, the rest transparent
            let buffer = RgbaImage::from_fn(4, 4, |x, _| {
                if x == 0 {
                    Rgba([shade, shade, shade, 255])
                } else {
                    Rgba([0, 0, 0, 0])
                }
            });
            let delay = Delay::from_numer_denom_ms(100, 1);
            encoder
                .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
                .expect("should encode frame");
        }
    }
    fs::write(&input, bytes).unwrap();

    let config = ProcessingConfig { width: 4, height: 4, ..neutral() };
    let conversion = convert_file(&input, temp.path(), &config).unwrap();
    let header = fs::read_to_string(conversion.header).unwrap();

    assert!(conversion.animated);
    let pixels = triplets(&header);
    assert_eq!(pixels.len(), 2 * 16);
    for (i, pixel) in pixels.iter().enumerate() {
        if i % 4 != 0 {
            assert_eq!(*pixel, [0xFF, 0xFF, 0xFF], "pixel {}", i);
        }
    }
    assert!(header.contains("{0xFF, 0xFF, 0xFF}"));
}

#[test]
fn test_invert_with_zero_contrast_is_gray() {
    let temp = TempDir::new().expect("should create temp dir");
    let input = temp.path().join("board.png");
    write_png(&input, checkerboard(16));

    let config = ProcessingConfig { width: 4, height: 4, invert: true, contrast: 0.0, ..Default::default() };
    let conversion = convert_file(&input, temp.path(), &config).unwrap();
    let header = fs::read_to_string(conversion.header).unwrap();
    let pixels = triplets(&header);
    assert!(pixels.iter().all(|p| p[0] == p[1] && p[1] == p[2]));
    assert!(pixels.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_batch_over_directory() {
    let temp = TempDir::new().expect("should create temp dir");
    let images = temp.path().join("images");
    fs::create_dir(&images).unwrap();
    write_png(&images.join("b_icon.PNG"), checkerboard(8));
    write_gif(&images.join("a_anim.gif"), 3, 8, 100, Repeat::Infinite);
    fs::write(images.join("c_broken.png"), b"nope").unwrap();
    fs::write(images.join("readme.txt"), b"ignored").unwrap();

    let inputs = discover_inputs(&images).expect("should discover inputs");
    let names: Vec<PathBuf> = inputs.iter().map(|p| PathBuf::from(p.file_name().unwrap())).collect();
    assert_eq!(
        names,
        vec![PathBuf::from("a_anim.gif"), PathBuf::from("b_icon.PNG"), PathBuf::from("c_broken.png")]
    );

    let out = temp.path().join("output");
    let report = run_batch(&inputs, &out, &ProcessingConfig::default());

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);
    assert!(matches!(report.files[2].outcome, Outcome::DecodeFailure { .. }));
    assert!(out.join("a_anim.h").exists());
    assert!(out.join("a_anim_resampled.gif").exists());
    assert!(out.join("b_icon.h").exists());
    assert!(out.join("b_icon_resampled.png").exists());
    assert!(!out.join("c_broken.h").exists());

    // No temporary files left over
    let leftovers: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
