//! Raster decoding behind a narrow capability interface
//!
//! The rest of the pipeline only ever sees [`SourceImage`]: opaque RGB frames
//! with delays. Codec quirks (palette expansion, GIF canvas disposal,
//! transparency) stay in here.

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Delay used for frames whose source carries no timing.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// Background that transparent pixels are flattened onto.
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Error type for decoding failures
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Source file could not be read
    #[error("cannot read source: {0}")]
    Read(#[from] std::io::Error),
    /// Underlying codec rejected the data
    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),
    /// GIF block structure could not be walked
    #[error("corrupt GIF: {0}")]
    Gif(#[from] gif::DecodingError),
    /// The container decoded but held no frames
    #[error("image contains no frames")]
    Empty,
}

/// How often an animation repeats, as stored in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCount {
    /// Loop forever
    #[default]
    Infinite,
    /// Play through this many extra times
    Finite(u16),
}

/// One decoded, flattened frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: RgbImage,
    /// Display time in milliseconds
    pub delay_ms: u32,
}

/// A fully decoded source raster.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub frames: Vec<Frame>,
    pub loop_count: LoopCount,
}

impl SourceImage {
    /// Number of decoded frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True for multi-frame sources.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }
}

/// Capability to turn encoded bytes into opaque RGB frames.
pub trait FrameDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, DecodeError>;
}

/// Decoder backed by the `image` crate (GIF and PNG, plus anything else
/// the enabled codecs understand as a still image).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, DecodeError> {
        match image::guess_format(bytes)? {
            ImageFormat::Gif => decode_gif(bytes),
            format => decode_still(bytes, format),
        }
    }
}

/// Decode with the default [`ImageDecoder`].
pub fn decode(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    ImageDecoder.decode(bytes)
}

fn decode_gif(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let frames = decoder.into_frames().collect_frames()?;

    let frames: Vec<Frame> = frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let delay_ms = if numer == 0 || denom == 0 { DEFAULT_FRAME_DELAY_MS } else { numer / denom };
            Frame { image: flatten_rgba(&frame.into_buffer()), delay_ms }
        })
        .collect();

    let (width, height) = frames.first().map(|f| f.image.dimensions()).ok_or(DecodeError::Empty)?;

    Ok(SourceImage {
        format: ImageFormat::Gif,
        width,
        height,
        frames,
        loop_count: gif_loop_count(bytes)?,
    })
}

fn decode_still(bytes: &[u8], format: ImageFormat) -> Result<SourceImage, DecodeError> {
    let image = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty);
    }

    Ok(SourceImage {
        format,
        width,
        height,
        frames: vec![Frame { image: flatten(&image), delay_ms: DEFAULT_FRAME_DELAY_MS }],
        loop_count: LoopCount::default(),
    })
}

/// Convert to RGB, compositing over [`BACKGROUND`] when the image has alpha.
pub fn flatten(image: &DynamicImage) -> RgbImage {
    if image.color().has_alpha() {
        flatten_rgba(&image.to_rgba8())
    } else {
        image.to_rgb8()
    }
}

/// Composite an RGBA buffer over [`BACKGROUND`] using alpha as the mask.
pub fn flatten_rgba(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        image::Rgb([
            blend(r, BACKGROUND[0], a),
            blend(g, BACKGROUND[1], a),
            blend(b, BACKGROUND[2], a),
        ])
    })
}

fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8
}

/// Read the repeat count from a GIF's NETSCAPE2.0 application extension.
///
/// The container is walked block by block, so marker bytes inside comments
/// or image data are never mistaken for the extension. A GIF without the
/// extension reports `Finite(0)` from the decoder and maps to the default.
pub fn gif_loop_count(bytes: &[u8]) -> Result<LoopCount, DecodeError> {
    let mut decoder = gif::DecodeOptions::new().read_info(Cursor::new(bytes))?;
    // The extension may follow the first image, so walk every frame header
    while decoder.next_frame_info()?.is_some() {}
    Ok(match decoder.repeat() {
        gif::Repeat::Infinite | gif::Repeat::Finite(0) => LoopCount::Infinite,
        gif::Repeat::Finite(n) => LoopCount::Finite(n),
    })
}
