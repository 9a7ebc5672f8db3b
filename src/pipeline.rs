//! Conversion pipeline: decode, select, tone, resize, emit, write
//!
//! Each input runs to completion before the next one starts. A failing input
//! is recorded and skipped; it never stops the batch and never leaves a
//! finished-looking file behind.

use crate::config::{ConfigError, ProcessingConfig};
use crate::decode::{self, DecodeError, Frame, LoopCount};
use crate::emit::{self, Layout};
use crate::frames::extract_frames;
use crate::gif::stage_gif;
use crate::ident;
use crate::output::{self, OutputError, StagedFile};
use crate::resample::{self, ResizePlan};
use crate::tone::apply_tone;
use glob::{glob_with, MatchOptions, Pattern};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info_span, warn};

/// Extensions picked up when the input is a directory (matched without
/// regard to case).
pub const INPUT_EXTENSIONS: [&str; 2] = ["gif", "png"];

/// A conversion failure scoped to one input file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source could not be read or decoded
    #[error("{}: decode failed: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    /// An output could not be written
    #[error("{}: write failed: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: OutputError,
    },
}

impl PipelineError {
    /// Pipeline stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Decode { .. } => Stage::Decode,
            PipelineError::Write { .. } => Stage::Write,
        }
    }
}

/// Stages that can fail for an individual input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Decode,
    Write,
}

/// Summary of one successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// Already reported by [`FileOutcome::input`]
    #[serde(skip)]
    pub input: PathBuf,
    pub identifier: String,
    pub header: PathBuf,
    pub preview: PathBuf,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub animated: bool,
    pub frames: usize,
    pub original_frames: usize,
    pub frame_indices: Vec<usize>,
    pub plan: ResizePlan,
}

/// Result of converting one input.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success(Conversion),
    DecodeFailure { message: String },
    WriteFailure { message: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<Result<Conversion, PipelineError>> for Outcome {
    fn from(result: Result<Conversion, PipelineError>) -> Self {
        match result {
            Ok(conversion) => Outcome::Success(conversion),
            Err(e) => match e.stage() {
                Stage::Decode => Outcome::DecodeFailure { message: e.to_string() },
                Stage::Write => Outcome::WriteFailure { message: e.to_string() },
            },
        }
    }
}

/// Outcome for one input of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Outcomes of a whole batch, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_success()).count()
    }

    /// True when every input converted.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded() == self.total()
    }
}

/// Frames after tone adjustment and resizing, ready for emission.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub frames: Vec<Frame>,
    pub frame_indices: Vec<usize>,
    pub original_frames: usize,
    pub animated: bool,
    pub loop_count: LoopCount,
    pub source_size: (u32, u32),
    pub plan: ResizePlan,
}

/// Run the in-memory part of the pipeline on encoded image bytes.
pub fn process_bytes(
    bytes: &[u8],
    config: &ProcessingConfig,
) -> Result<ProcessedImage, DecodeError> {
    let source = decode::decode(bytes)?;
    let (selection, mut frames) = extract_frames(&source, config.frame_reduction);
    debug!(
        format = ?source.format,
        frames = source.frame_count(),
        kept = selection.len(),
        "decoded source"
    );

    let plan = resample::plan(
        (source.width, source.height),
        (config.width, config.height),
        config.resample,
    );
    debug!(%plan, "resize plan");

    for frame in &mut frames {
        apply_tone(&mut frame.image, config.invert, config.contrast);
        frame.image = resample::resize(&frame.image, config.width, config.height, config.resample);
    }

    Ok(ProcessedImage {
        frames,
        frame_indices: selection.indices().to_vec(),
        original_frames: source.frame_count(),
        animated: source.is_animated(),
        loop_count: source.loop_count,
        source_size: (source.width, source.height),
        plan,
    })
}

/// Convert one image file, writing `{stem}.h` and a resampled preview into
/// `out_dir`.
pub fn convert_file(
    input: &Path,
    out_dir: &Path,
    config: &ProcessingConfig,
) -> Result<Conversion, PipelineError> {
    let span = info_span!("convert", input = %input.display());
    let _enter = span.enter();

    let decode_err = |source: DecodeError| PipelineError::Decode { path: input.to_path_buf(), source };
    let bytes = fs::read(input).map_err(|e| decode_err(e.into()))?;
    let processed = process_bytes(&bytes, config).map_err(decode_err)?;

    let base_name = ident::base_name(input);
    let identifier = ident::identifier_for_path(input);
    let source_file =
        input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let images: Vec<_> = processed.frames.iter().map(|f| f.image.clone()).collect();
    let layout = if processed.animated { Layout::Animated } else { Layout::Single };
    let artifact = emit::emit(&identifier, &images, config.width, config.height)
        .with_source(&base_name, &source_file)
        .with_layout(layout);

    let header = output::header_path(out_dir, &base_name);
    let preview = output::preview_path(out_dir, &base_name, processed.animated);

    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: OutputError| PipelineError::Write { path, source }
    };

    // Stage both files before committing either one
    let staged_header =
        output::stage_bytes(artifact.to_header().as_bytes(), &header).map_err(write_err(&header))?;
    let staged_preview = stage_preview(&processed, &preview).map_err(write_err(&preview))?;
    // The header marks a finished conversion, so it goes into place last
    staged_preview.commit().map_err(write_err(&preview))?;
    if let Err(e) = staged_header.commit() {
        if let Err(cleanup) = fs::remove_file(&preview) {
            warn!(preview = %preview.display(), error = %cleanup, "cannot remove orphaned preview");
        }
        return Err(write_err(&header)(e));
    }
    debug!(header = %header.display(), preview = %preview.display(), "wrote outputs");

    Ok(Conversion {
        input: input.to_path_buf(),
        identifier,
        header,
        preview,
        width: config.width,
        height: config.height,
        source_width: processed.source_size.0,
        source_height: processed.source_size.1,
        animated: processed.animated,
        frames: processed.frames.len(),
        original_frames: processed.original_frames,
        frame_indices: processed.frame_indices,
        plan: processed.plan,
    })
}

fn stage_preview(processed: &ProcessedImage, path: &Path) -> Result<StagedFile, OutputError> {
    if processed.animated {
        stage_gif(&processed.frames, processed.loop_count, path)
    } else {
        match processed.frames.first() {
            Some(frame) => output::stage_png(&frame.image, path),
            None => output::stage_bytes(&[], path),
        }
    }
}

/// Convert every input in order, collecting one outcome per file.
pub fn run_batch(inputs: &[PathBuf], out_dir: &Path, config: &ProcessingConfig) -> BatchReport {
    run_batch_with(inputs, out_dir, config, |_| {})
}

/// Like [`run_batch`], calling `on_file` as soon as each input finishes.
pub fn run_batch_with<F>(
    inputs: &[PathBuf],
    out_dir: &Path,
    config: &ProcessingConfig,
    mut on_file: F,
) -> BatchReport
where
    F: FnMut(&FileOutcome),
{
    let mut report = BatchReport { files: Vec::with_capacity(inputs.len()) };
    for input in inputs {
        let result = convert_file(input, out_dir, config);
        if let Err(ref e) = result {
            warn!(input = %input.display(), stage = ?e.stage(), "conversion failed: {}", e);
        }
        let file = FileOutcome { input: input.clone(), outcome: result.into() };
        on_file(&file);
        report.files.push(file);
    }
    report
}

/// Check if a path has a supported input extension (case-insensitive).
pub fn is_input_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| INPUT_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}

/// Resolve the input argument to the ordered list of files to convert.
///
/// A file is returned as-is. A directory yields its `.gif`/`.png` entries
/// (any case, not recursive) sorted by file name.
pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(ConfigError::MissingInput(input.to_path_buf()));
    }

    let options = MatchOptions { case_sensitive: false, ..Default::default() };
    let dir = Pattern::escape(&input.display().to_string());
    let mut files = Vec::new();
    for ext in INPUT_EXTENSIONS {
        if let Ok(paths) = glob_with(&format!("{}/*.{}", dir, ext), options) {
            files.extend(paths.filter_map(Result::ok).filter(|p| p.is_file() && is_input_image(p)));
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files.dedup();

    if files.is_empty() {
        return Err(ConfigError::NoInputs(input.to_path_buf()));
    }
    Ok(files)
}
