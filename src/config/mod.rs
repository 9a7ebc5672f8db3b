//! Configuration for conversions
//!
//! Settings are layered: built-in defaults, then an optional
//! `pixelart.toml`, then command-line flags.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
