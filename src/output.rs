//! Output paths and staged file writes
//!
//! Every artifact is first written to a temporary file next to its final
//! location and only renamed into place by [`StagedFile::commit`]. Dropping
//! an uncommitted stage deletes the temporary file, so a failed conversion
//! never leaves a half-written header or preview behind.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Renaming the staged file into place failed
    #[error("cannot move staged file into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// A fully written temporary file waiting to be moved to `target`.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Create an empty staged file in `target`'s directory.
    pub fn create(target: &Path) -> Result<Self, OutputError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        ensure_dir(dir)?;
        let temp = tempfile::Builder::new().prefix(".pxgen-").suffix(".tmp").tempfile_in(dir)?;
        Ok(Self { temp, target: target.to_path_buf() })
    }

    /// Final destination of this file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writer into the temporary file.
    pub fn writer(&mut self) -> BufWriter<&mut fs::File> {
        BufWriter::new(self.temp.as_file_mut())
    }

    /// Atomically move the temporary file to its target path.
    pub fn commit(self) -> Result<PathBuf, OutputError> {
        self.temp.persist(&self.target)?;
        Ok(self.target)
    }
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Stage `contents` for `path`.
pub fn stage_bytes(contents: &[u8], path: &Path) -> Result<StagedFile, OutputError> {
    let mut staged = StagedFile::create(path)?;
    {
        let mut writer = staged.writer();
        writer.write_all(contents)?;
        writer.flush()?;
    }
    Ok(staged)
}

/// Stage an RGB image as PNG for `path`.
pub fn stage_png(image: &RgbImage, path: &Path) -> Result<StagedFile, OutputError> {
    let mut staged = StagedFile::create(path)?;
    {
        let mut writer = staged.writer();
        PngEncoder::new(&mut writer).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ColorType::Rgb8,
        )?;
        writer.flush()?;
    }
    Ok(staged)
}

/// Write `contents` to `path` in one step.
pub fn write_atomic(contents: &[u8], path: &Path) -> Result<PathBuf, OutputError> {
    stage_bytes(contents, path)?.commit()
}

/// Header path for an input: `{out_dir}/{base_name}.h`.
pub fn header_path(out_dir: &Path, base_name: &str) -> PathBuf {
    out_dir.join(format!("{}.h", base_name))
}

/// Preview path for an input.
///
/// | Source | Output |
/// |--------|--------|
/// | Animated | `{out_dir}/{base_name}_resampled.gif` |
/// | Static (PNG, or single-frame GIF) | `{out_dir}/{base_name}_resampled.png` |
pub fn preview_path(out_dir: &Path, base_name: &str, animated: bool) -> PathBuf {
    let ext = if animated { "gif" } else { "png" };
    out_dir.join(format!("{}_resampled.{}", base_name, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    #[test]
    fn test_header_path() {
        assert_eq!(header_path(Path::new("out"), "heart"), PathBuf::from("out/heart.h"));
    }

    #[test]
    fn test_preview_path_animated_and_static() {
        assert_eq!(
            preview_path(Path::new("out"), "cat", true),
            PathBuf::from("out/cat_resampled.gif")
        );
        assert_eq!(
            preview_path(Path::new("out"), "cat", false),
            PathBuf::from("out/cat_resampled.png")
        );
    }

    #[test]
    fn test_staged_file_invisible_until_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.h");

        let staged = stage_bytes(b"hello", &path).unwrap();
        assert!(!path.exists());

        let written = staged.commit().unwrap();
        assert_eq!(written, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.h");

        let staged = stage_bytes(b"partial", &path).unwrap();
        drop(staged);

        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.h");
        fs::write(&path, "old").unwrap();

        write_atomic(b"new", &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_stage_png_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/preview.png");

        let mut image = RgbImage::new(2, 2);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 1, Rgb([0, 0, 255]));

        stage_png(&image, &path).unwrap().commit().unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_stage_into_file_path_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = stage_bytes(b"x", &blocker.join("out.h"));
        assert!(result.is_err());
    }
}
