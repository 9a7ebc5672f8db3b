//! Frame extraction and even frame subsampling
//!
//! Animations can be thinned out before conversion: frames are picked at a
//! constant stride and the last frame is always kept so the loop closes
//! where the original does.

use crate::decode::{Frame, SourceImage};
use serde::Serialize;

/// Ordered, strictly increasing source frame indices to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrameSelection(Vec<usize>);

impl FrameSelection {
    /// Keep every frame of an `frame_count` long animation.
    pub fn all(frame_count: usize) -> Self {
        Self((0..frame_count).collect())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Number of frames kept for a given reduction fraction.
///
/// `max(1, floor(frame_count * (1 - reduction)))`.
pub fn frames_to_keep(frame_count: usize, reduction: f64) -> usize {
    ((frame_count as f64 * (1.0 - reduction)).floor() as usize).max(1)
}

/// Pick which frames survive a reduction of `reduction` (in `[0.0, 1.0)`).
///
/// Outside `(0.0, 1.0)`, or when nothing would be dropped, every frame is
/// kept. Otherwise `keep` indices are taken at stride `frame_count / keep`
/// (truncated per step) and the final one is forced to `frame_count - 1`.
pub fn select_frames(frame_count: usize, reduction: f64) -> FrameSelection {
    if !(reduction > 0.0 && reduction < 1.0) {
        return FrameSelection::all(frame_count);
    }

    let keep = frames_to_keep(frame_count, reduction);
    if keep >= frame_count {
        return FrameSelection::all(frame_count);
    }

    let step = frame_count as f64 / keep as f64;
    let mut indices: Vec<usize> = (0..keep).map(|i| (i as f64 * step) as usize).collect();
    if let Some(last) = indices.last_mut() {
        *last = frame_count - 1;
    }
    FrameSelection(indices)
}

/// Frames of `source` chosen by [`select_frames`], in selection order.
pub fn extract_frames(source: &SourceImage, reduction: f64) -> (FrameSelection, Vec<Frame>) {
    let selection = select_frames(source.frame_count(), reduction);
    let frames = selection.indices().iter().map(|&i| source.frames[i].clone()).collect();
    (selection, frames)
}
