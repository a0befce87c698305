//! Upload input validation
//!
//! Sanitizes user-supplied document names before they reach the filesystem
//! and checks uploads against the extension allow-list.

use crate::core::config::upload;

/// Splits a file name into stem and extension.
///
/// The extension starts at the last `.` and includes it; a leading dot
/// (hidden-file style) or a missing dot yields an empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => name.split_at(pos),
        _ => (name, ""),
    }
}

/// Returns true if the file name carries an allow-listed document extension.
///
/// Matching is case-insensitive: `.PDF` and `.pdf` are both accepted.
pub fn has_allowed_extension(name: &str) -> bool {
    let (_, ext) = split_extension(name);
    let ext = ext.to_lowercase();
    upload::ALLOWED_EXTENSIONS.contains(&ext.as_str())
}

/// Sanitizes a user-supplied document name.
///
/// Keeps letters, digits, whitespace, `.`, `_` and `-`; collapses whitespace
/// runs to a single space and trims. Names longer than
/// [`upload::MAX_NAME_CHARS`] keep the first [`upload::KEPT_STEM_CHARS`]
/// characters of the stem plus the extension. An empty result falls back to
/// [`upload::FALLBACK_NAME`].
pub fn clean_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '.' | '_' | '-'))
        .collect();

    let mut cleaned = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.chars().count() > upload::MAX_NAME_CHARS {
        let (stem, ext) = split_extension(&cleaned);
        let short_stem: String = stem.chars().take(upload::KEPT_STEM_CHARS).collect();
        cleaned = format!("{}{}", short_stem, ext);
    }

    if cleaned.is_empty() {
        upload::FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}
