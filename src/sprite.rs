//! Sprite assembly and output.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::SymbolFragment;
use crate::error::SpritzError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// The aggregate sprite: shared defs first, then every symbol in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteDocument {
    /// `id` attribute for the root element
    pub id: Option<String>,
    pub defs: Vec<String>,
    pub symbols: Vec<String>,
}

impl SpriteDocument {
    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = &'a SymbolFragment>) -> Self {
        let mut doc = Self::default();
        for fragment in fragments {
            doc.defs.push(fragment.defs.clone());
            doc.symbols.push(fragment.body.clone());
        }
        doc
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Render the document. The `<defs>` wrapper is only emitted when at
    /// least one chunk is non-empty.
    pub fn render(&self) -> String {
        let symbols_len: usize = self.symbols.iter().map(String::len).sum();
        let defs_len: usize = self.defs.iter().map(String::len).sum();
        let mut out = String::with_capacity(symbols_len + defs_len + 256);

        out.push_str(XML_DECLARATION);
        out.push('\n');
        out.push_str("<svg");
        if let Some(ref id) = self.id {
            out.push_str(" id=\"");
            push_escaped_attr(&mut out, id);
            out.push('"');
        }
        out.push_str(" version=\"1.1\" xmlns=\"");
        out.push_str(SVG_NS);
        out.push_str("\" xmlns:xlink=\"");
        out.push_str(XLINK_NS);
        out.push_str("\">");

        if defs_len > 0 {
            out.push_str("<defs>");
            for chunk in &self.defs {
                out.push_str(chunk);
            }
            out.push_str("</defs>");
        }

        for symbol in &self.symbols {
            out.push_str(symbol);
        }

        out.push_str("</svg>\n");
        out
    }
}

/// Wrap symbol bodies and defs chunks into a sprite document.
pub fn assemble<S: AsRef<str>, D: AsRef<str>>(symbols: &[S], defs: &[D]) -> String {
    SpriteDocument {
        id: None,
        defs: defs.iter().map(|d| d.as_ref().to_string()).collect(),
        symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
    }
    .render()
}

/// Replace `path` with `contents`, creating parent directories as needed.
///
/// The document is written next to the destination and renamed over it, so
/// readers never observe a half-written sprite.
pub fn write_sprite(path: &Path, contents: &str) -> Result<(), SpritzError> {
    let write_err = |source| SpritzError::DestinationWriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    // Temp files are owner-only; the sprite is served to other users.
    if let Some(perms) = output_permissions(path) {
        tmp.as_file().set_permissions(perms).map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Keep the mode of the file being replaced, or `0644` for a new one.
#[cfg(unix)]
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => Some(fs::Permissions::from_mode(0o644)),
    }
}

#[cfg(not(unix))]
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    fs::metadata(path).ok().map(|meta| meta.permissions())
}

fn push_escaped_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
