//! C identifier derivation for generated headers
//!
//! Every name in a generated header (arrays, structs, macros, include guard)
//! is derived from one sanitized base identifier so the output is stable
//! for a given input file name.

use std::path::Path;

/// Identifier used when a file stem sanitizes to nothing.
pub const FALLBACK_IDENTIFIER: &str = "image";

/// Convert an arbitrary string into a valid C identifier.
///
/// Every character that is not alphanumeric or `_` becomes `_`, and a
/// leading digit gets an extra `_` prefix. An empty string stays empty;
/// callers that need a usable name should go through
/// [`identifier_for_path`].
///
/// # Examples
///
/// ```
/// use pixelart_gen::ident::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("3d-logo!"), "_3d_logo_");
/// assert_eq!(sanitize_identifier("heart_02"), "heart_02");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident: String =
        name.chars().map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' }).collect();

    if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    ident
}

/// Base name of an input file: its file name without the last extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Identifier for an input file, derived from its stem.
///
/// Falls back to [`FALLBACK_IDENTIFIER`] so the emitter never receives an
/// empty name.
pub fn identifier_for_path(path: &Path) -> String {
    let ident = sanitize_identifier(&base_name(path));
    if ident.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        ident
    }
}

/// Upper-case form used for `#define` names (`<ID>_FRAME_COUNT`).
pub fn macro_name(identifier: &str) -> String {
    identifier.to_uppercase()
}

/// Include guard token for a header generated from `identifier`.
pub fn header_guard(identifier: &str) -> String {
    format!("__{}_H__", macro_name(identifier))
}
