//! Animated GIF previews

use crate::decode::{Frame, LoopCount};
use crate::output::{OutputError, StagedFile};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage};
use std::io::Write;
use std::path::Path;

/// Stage an animated GIF for `path`, keeping each frame's delay and the
/// source's loop count.
///
/// GIF delays are stored in centiseconds, so delays are rounded down to a
/// multiple of 10ms with a floor of 10ms.
pub fn stage_gif(
    frames: &[Frame],
    loop_count: LoopCount,
    path: &Path,
) -> Result<StagedFile, OutputError> {
    let mut staged = StagedFile::create(path)?;
    {
        let mut writer = staged.writer();
        {
            let mut encoder = GifEncoder::new(&mut writer);
            encoder.set_repeat(match loop_count {
                LoopCount::Infinite => Repeat::Infinite,
                LoopCount::Finite(n) => Repeat::Finite(n),
            })?;

            for frame in frames {
                let rgba = DynamicImage::ImageRgb8(frame.image.clone()).to_rgba8();
                let delay = Delay::from_numer_denom_ms(gif_delay_ms(frame.delay_ms), 1);
                encoder.encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))?;
            }
        }
        writer.flush()?;
    }
    Ok(staged)
}

/// Delay in milliseconds as it survives the centisecond GIF encoding.
pub fn gif_delay_ms(delay_ms: u32) -> u32 {
    (delay_ms / 10).max(1) * 10
}
