//! Convert command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{Cli, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{resolve_config, ConfigError};
use crate::emit::{PIXEL_ART_TYPES_H, TYPES_HEADER_NAME};
use crate::output::{ensure_dir, write_atomic};
use crate::pipeline::{discover_inputs, run_batch_with, FileOutcome, Outcome};

/// Execute a conversion batch
pub fn run_convert(cli: &Cli) -> ExitCode {
    let config = match resolve_config(cli.config.as_deref(), &cli.overrides()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let inputs = match discover_inputs(&config.paths.input) {
        Ok(files) => files,
        Err(e @ ConfigError::NoInputs(_)) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let out_dir = &config.paths.output;
    if let Err(e) = ensure_dir(out_dir) {
        eprintln!("Error: cannot create output directory '{}': {}", out_dir.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    if config.paths.write_types {
        let types_path = types_header_path(out_dir);
        match write_atomic(PIXEL_ART_TYPES_H.as_bytes(), &types_path) {
            Ok(path) if !cli.json => println!("Wrote {}", path.display()),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: Failed to write '{}': {}", types_path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let convert = &config.convert;
    if !cli.json {
        println!("Found {} image file(s)", inputs.len());
        println!("Target size: {}x{} pixels\n", convert.width, convert.height);
    }

    let report = run_batch_with(&inputs, out_dir, convert, |file| {
        if !cli.json {
            print_outcome(file, convert.frame_reduction);
        }
    });

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: cannot serialize report: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("\nSuccessfully converted {}/{} file(s)", report.succeeded(), report.total());
    }

    if report.all_succeeded() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// `pixel_art_types.h` lives one level above the output directory, matching
/// the `#include "../pixel_art_types.h"` in generated headers.
fn types_header_path(out_dir: &Path) -> PathBuf {
    let parent = match out_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parent.join(TYPES_HEADER_NAME)
}

fn file_label(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

fn print_outcome(file: &FileOutcome, frame_reduction: f64) {
    match &file.outcome {
        Outcome::Success(c) => {
            println!("Converted: {}", file_label(&c.input));
            println!("  -> Header: {}", file_label(&c.header));
            println!("  -> Image: {}", file_label(&c.preview));
            println!("  -> Size: {}x{} pixels (resize: {})", c.width, c.height, c.plan);
            if c.animated {
                println!("  -> Frames: {} (original: {})", c.frames, c.original_frames);
                if frame_reduction > 0.0 {
                    println!("  -> Frame reduction: {:.1}%", frame_reduction * 100.0);
                }
            }
        }
        Outcome::DecodeFailure { message } | Outcome::WriteFailure { message } => {
            eprintln!("Error converting {}", message);
        }
    }
}
