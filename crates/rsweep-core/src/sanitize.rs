//! Identifier sanitization for use as filesystem path components.

use serde::{Deserialize, Serialize};

/// Character treated as a path separator. Backslashes are ordinary characters.
pub const PATH_SEPARATOR: char = '/';

/// Replacement written in place of every path separator.
pub const REPLACEMENT: &str = "_";

/// Replaces every `/` in `raw` with an underscore.
///
/// The transform is total: every other character, including whitespace and
/// non-ASCII text, is copied through unchanged. It is lossy, since
/// `a/b` and `a_b` sanitize to the same string.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.replace(PATH_SEPARATOR, REPLACEMENT)
}

/// Returns true when `raw` is already safe to use as a single path component.
pub fn is_sanitized(raw: &str) -> bool {
    !raw.contains(PATH_SEPARATOR)
}

/// An identifier kept together with its sanitized companion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SanitizedPair {
    /// Identifier as supplied by the caller.
    pub raw: String,
    /// Path-safe form of [`SanitizedPair::raw`].
    pub sanitized: String,
}

impl SanitizedPair {
    /// Sanitizes `raw` and keeps both forms.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sanitized = sanitize_identifier(&raw);
        Self { raw, sanitized }
    }
}

/// Sanitizes every identifier, preserving order so the Nth output corresponds
/// to the Nth input.
pub fn sanitize_all<I, S>(raws: I) -> Vec<SanitizedPair>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    raws.into_iter().map(SanitizedPair::new).collect()
}
