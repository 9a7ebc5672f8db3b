//! pxgen - Command-line tool for converting GIF/PNG images to C pixel tables

use std::process::ExitCode;

use pixelart_gen::cli;

fn main() -> ExitCode {
    cli::run()
}
