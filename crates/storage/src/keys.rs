//! Storage key helpers
//!
//! Uploaded file names pass through `sanitize_file_name` before they are
//! embedded in a storage key, so keys stay safe in URLs and paths.

/// Replace every character outside `[A-Za-z0-9._-]` with `_`, collapsing
/// runs of replaced characters into a single `_`.
///
/// Idempotent: feeding a sanitized name back through is a fixed point.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut replaced = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            replaced = false;
        } else if !replaced {
            out.push('_');
            replaced = true;
        }
    }
    out
}
