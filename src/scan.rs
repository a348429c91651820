//! Listing icon sources and deciding which ones are SVG.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SpritzError;

/// Content types accepted for an `.svg` file. Sniffing text-based SVG is
/// unreliable, so every plausible answer is allowed.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["text/html", "image/svg", "image/svg+xml", "text/plain"];

/// How much of a file is read to guess its content type.
const SNIFF_LEN: u64 = 8 * 1024;

/// A candidate input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSource {
    pub path: PathBuf,
    pub file_name: String,
    /// Sniffed from the start of the file, see [`sniff_content_type`].
    /// `None` for files without an `.svg` extension, which are never read.
    pub content_type: Option<String>,
}

impl IconSource {
    /// Build a source, sniffing the file at `path` if it has an `.svg`
    /// extension.
    pub fn from_path(path: &Path) -> Result<Self, SpritzError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = if has_svg_extension(path) {
            Some(sniff_file(path)?.to_string())
        } else {
            None
        };
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            content_type,
        })
    }
}

fn sniff_file(path: &Path) -> Result<&'static str, SpritzError> {
    let unreadable = |source| SpritzError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut head = Vec::new();
    File::open(path)
        .and_then(|file| file.take(SNIFF_LEN).read_to_end(&mut head))
        .map_err(unreadable)?;
    Ok(sniff_content_type(&head))
}

/// List the files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Hidden files are included,
/// symlinks to files are listed, and ignore files are not consulted.
pub fn scan(dir: &Path) -> Result<impl Iterator<Item = Result<IconSource, SpritzError>>, SpritzError> {
    let meta = fs::metadata(dir).map_err(|source| SpritzError::SourceUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(SpritzError::SourceUnreadable {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let root = dir.to_path_buf();
    Ok(walker.filter_map(move |entry| {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                return Some(Err(SpritzError::SourceUnreadable {
                    path: root.clone(),
                    source,
                }));
            }
        };
        // `is_file` follows symlinks; dangling links are not files.
        if entry.depth() == 0 || !entry.path().is_file() {
            return None;
        }
        Some(IconSource::from_path(entry.path()))
    }))
}

/// Whether a source should be compiled: its extension is `svg` (any case)
/// and its content type is in [`ALLOWED_CONTENT_TYPES`].
pub fn is_svg_source(source: &IconSource) -> bool {
    has_svg_extension(&source.path)
        && source
            .content_type
            .as_deref()
            .is_some_and(|t| ALLOWED_CONTENT_TYPES.contains(&t))
}

/// Extension check on the text after the last `.`, so a file named just
/// `.svg` counts as an SVG (and is later rejected for having no name).
pub fn has_svg_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("svg"))
}

/// Guess a MIME type from file contents.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.is_empty() {
        return "application/x-empty";
    }
    if bytes.contains(&0) {
        return "application/octet-stream";
    }
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        // A prefix may end in the middle of a character.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return "application/octet-stream",
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    match first_element(text).as_deref() {
        Some(name) if name.eq_ignore_ascii_case("svg") => "image/svg+xml",
        Some(name) if name.eq_ignore_ascii_case("html") => "text/html",
        Some(_) => "text/xml",
        None => "text/plain",
    }
}

/// Local name of the first element, if the text starts like markup.
fn first_element(text: &str) -> Option<String> {
    if !text.trim_start().starts_with('<') {
        return None;
    }
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::DocType(dt)) => {
                let dt = String::from_utf8_lossy(&dt).trim().to_ascii_lowercase();
                if dt.starts_with("html") {
                    return Some("html".into());
                }
            }
            Ok(Event::Text(t)) if !t.iter().all(u8::is_ascii_whitespace) => return None,
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
