//! C header generation for converted pixel data
//!
//! The emitted text targets the record layouts in `pixel_art_types.h`
//! ([`PIXEL_ART_TYPES_H`]):
//!
//! | Record | Fields |
//! |--------|--------|
//! | `pixel_rgb_t` | `r`, `g`, `b` bytes |
//! | `pixel_frame_t` | pixel array, width, height |
//! | `pixel_art_t` | frame array, frame count, width, height |
//!
//! Output is a pure function of its inputs: the same frames and names always
//! render to byte-identical text.

use crate::ident::{header_guard, macro_name};
use image::RgbImage;

/// Triplets per line in generated pixel arrays.
pub const PIXELS_PER_LINE: usize = 5;

/// File name of the shared record layout header.
pub const TYPES_HEADER_NAME: &str = "pixel_art_types.h";

/// Include path used by generated headers.
pub const TYPES_INCLUDE: &str = "../pixel_art_types.h";

/// Record layouts the generated headers depend on.
pub const PIXEL_ART_TYPES_H: &str = r#"/**
 * @file pixel_art_types.h
 * @brief Common pixel art data types
 */

#ifndef __PIXEL_ART_TYPES_H__
#define __PIXEL_ART_TYPES_H__

#include <stdint.h>

#ifdef __cplusplus
extern "C" {
#endif

/**
 * @brief RGB pixel structure
 */
typedef struct {
    uint8_t r; // Red component (0-255)
    uint8_t g; // Green component (0-255)
    uint8_t b; // Blue component (0-255)
} pixel_rgb_t;

/**
 * @brief Pixel art frame structure
 */
typedef struct {
    const pixel_rgb_t *pixels; // Pixel data array
    uint16_t width;            // Frame width
    uint16_t height;           // Frame height
} pixel_frame_t;

/**
 * @brief Pixel art data structure (for animated images)
 */
typedef struct {
    const pixel_frame_t *frames; // Array of frames
    uint16_t frame_count;        // Number of frames
    uint16_t width;              // Frame width
    uint16_t height;             // Frame height
} pixel_art_t;

#ifdef __cplusplus
}
#endif

#endif /* __PIXEL_ART_TYPES_H__ */
"#;

/// Which top-level record the header exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One `pixel_frame_t`
    Single,
    /// A `pixel_art_t` over a frame table
    Animated,
}

/// Generated pixel tables for one input image.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedArtifact {
    identifier: String,
    base_name: String,
    source_file: String,
    width: u32,
    height: u32,
    layout: Layout,
    frames: Vec<RgbImage>,
}

/// Build the artifact for `frames`, all of which are `width` x `height`.
/// `frames` must not be empty.
///
/// More than one frame selects [`Layout::Animated`]; use
/// [`EmittedArtifact::with_layout`] to force the animated layout for a
/// source that was reduced to a single frame.
pub fn emit(identifier: &str, frames: &[RgbImage], width: u32, height: u32) -> EmittedArtifact {
    debug_assert!(!frames.is_empty(), "an artifact needs at least one frame");
    debug_assert!(
        frames.iter().all(|f| f.dimensions() == (width, height)),
        "all frames must match the declared size"
    );

    EmittedArtifact {
        identifier: identifier.to_string(),
        base_name: identifier.to_string(),
        source_file: identifier.to_string(),
        width,
        height,
        layout: if frames.len() > 1 { Layout::Animated } else { Layout::Single },
        frames: frames.to_vec(),
    }
}

impl EmittedArtifact {
    /// Record the original file name and its stem for the header comments.
    pub fn with_source(mut self, base_name: &str, source_file: &str) -> Self {
        self.base_name = base_name.to_string();
        self.source_file = source_file.to_string();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Name of the header file this artifact is written to.
    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.base_name)
    }

    /// Name of the pixel array for frame `index`.
    pub fn frame_array_name(&self, index: usize) -> String {
        match self.layout {
            Layout::Single => format!("{}_pixels", self.identifier),
            Layout::Animated => format!("{}_frame_{}_data", self.identifier, index),
        }
    }

    /// Render the complete header text.
    pub fn to_header(&self) -> String {
        let guard = header_guard(&self.identifier);
        let mut out = format!(
            "/**\n * @file {}\n * @brief Pixel art data for {}\n * @note Generated from {}\n * @note Image size: {}x{} pixels\n */\n\n",
            self.header_file_name(),
            self.base_name,
            self.source_file,
            self.width,
            self.height
        );
        out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        out.push_str(&format!("#include \"{}\"\n\n", TYPES_INCLUDE));
        out.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");

        match self.layout {
            Layout::Single => self.push_single(&mut out),
            Layout::Animated => self.push_animated(&mut out),
        }

        out.push_str("#ifdef __cplusplus\n}\n#endif\n\n");
        out.push_str(&format!("#endif /* {} */\n", guard));
        out
    }

    fn push_single(&self, out: &mut String) {
        let array = self.frame_array_name(0);
        out.push_str("// Pixel data array\n");
        if let Some(frame) = self.frames.first() {
            push_pixel_array(out, &array, frame);
        }
        out.push_str(&format!(
            "/**\n * @brief Pixel art frame for {}\n */\nconst pixel_frame_t {} = {{\n    .pixels = {},\n    .width = {},\n    .height = {}\n}};\n\n",
            self.base_name, self.identifier, array, self.width, self.height
        ));
    }

    fn push_animated(&self, out: &mut String) {
        let id = &self.identifier;
        let count_macro = format!("{}_FRAME_COUNT", macro_name(id));
        out.push_str(&format!("#define {} {}\n\n", count_macro, self.frames.len()));

        for (index, frame) in self.frames.iter().enumerate() {
            out.push_str(&format!("// Frame {} pixel data\n", index));
            push_pixel_array(out, &self.frame_array_name(index), frame);
        }

        out.push_str("// Frame array\n");
        out.push_str(&format!("static const pixel_frame_t {}_frames[{}] = {{\n", id, count_macro));
        for index in 0..self.frames.len() {
            out.push_str(&format!(
                "    {{{}, {}, {}}},\n",
                self.frame_array_name(index),
                self.width,
                self.height
            ));
        }
        out.push_str("};\n\n");

        out.push_str(&format!(
            "/**\n * @brief Pixel art data for {}\n */\nconst pixel_art_t {id} = {{\n    .frames = {id}_frames, .frame_count = {}, .width = {}, .height = {}}};\n\n",
            self.base_name, count_macro, self.width, self.height
        ));
    }
}

/// Append `static const pixel_rgb_t <name>[N] = { ... };` for one frame.
fn push_pixel_array(out: &mut String, name: &str, frame: &RgbImage) {
    let pixels: Vec<&[u8]> = frame.as_raw().chunks_exact(3).collect();
    out.push_str(&format!("static const pixel_rgb_t {}[{}] = {{\n", name, pixels.len()));

    let line_count = pixels.len().div_ceil(PIXELS_PER_LINE);
    for (line, chunk) in pixels.chunks(PIXELS_PER_LINE).enumerate() {
        let triplets: Vec<String> = chunk.iter().map(|p| format_triplet(p)).collect();
        out.push_str("    ");
        out.push_str(&triplets.join(", "));
        if line + 1 < line_count {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("};\n\n");
}

/// `{0xRR, 0xGG, 0xBB}` with uppercase hex digits.
pub fn format_triplet(rgb: &[u8]) -> String {
    format!("{{0x{:02X}, 0x{:02X}, 0x{:02X}}}", rgb[0], rgb[1], rgb[2])
}
