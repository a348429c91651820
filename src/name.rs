//! Symbol names derived from icon file names.

use std::path::Path;

/// A symbol name derived from an icon's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconName {
    /// File name without its extension, as found on disk
    pub stem: String,
    /// Normalized, URL-safe form of the stem
    pub slug: String,
}

impl IconName {
    /// Derive the name for a file. Returns `None` when nothing usable is
    /// left after normalization (e.g. a file literally named `.svg`).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_stem(file_name).to_string();
        let slug = slugify(&stem);
        if slug.is_empty() {
            return None;
        }
        Some(Self { stem, slug })
    }
}

/// Normalize a file name (extension included) into a slug.
///
/// The stem is transliterated to ASCII, lower-cased, and every run of
/// non-alphanumeric characters becomes a single `-`. Leading and trailing
/// separators are dropped. `normalize("Arrow Left.svg") == "arrow-left"`.
pub fn normalize(file_name: &str) -> String {
    slugify(file_stem(file_name))
}

fn file_stem(file_name: &str) -> &str {
    // `.svg` has no stem: Path treats it as a dotfile, so handle it here.
    if let Some(stripped) = file_name.strip_prefix('.') {
        if !stripped.contains('.') {
            return "";
        }
    }
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

fn slugify(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw);

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }
    slug
}
