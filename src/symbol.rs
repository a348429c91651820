//! Rewriting icon documents into `<symbol>` fragments.
//!
//! This is a text transform, not a tree transform: the document is scanned
//! once with quick-xml to locate and validate the root `<svg>` element, then
//! rewritten with plain substring operations. Markup inside the root is
//! passed through byte-for-byte.

use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;

use crate::SymbolOptions;
use crate::error::MalformedSvg;

/// Vendor class token removed from every icon (`class="feather feather-x"`).
const VENDOR_CLASS: &str = "feather ";
/// Vendor class prefix and its replacement.
const VENDOR_PREFIX: (&str, &str) = ("feather-", "icon-");

/// Greedy on purpose: first `<defs>` to the last `</defs>`.
static DEFS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<defs>(.*)</defs>").expect("defs pattern is valid"));

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+class="[a-z0-9:;.\s()\-,]*""#).expect("class pattern is valid")
});

/// The root's own `id`, replaced by the symbol id.
static ROOT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+id\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("id pattern is valid")
});

/// One icon, ready to be placed in a sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFragment {
    /// Fragment id, e.g. `i-home`
    pub id: String,
    /// `<symbol>` markup with the hoisted defs removed
    pub body: String,
    /// Inner markup of the icon's `<defs>` block (empty if none)
    pub defs: String,
}

impl SymbolFragment {
    pub fn new(slug: &str, content: &str, options: &SymbolOptions) -> Result<Self, MalformedSvg> {
        let symbol = to_symbol_with_options(slug, content, options)?;
        let defs = extract_defs(&symbol).to_string();
        let body = strip_defs(&symbol);
        Ok(Self {
            id: symbol_id(slug, options),
            body,
            defs,
        })
    }
}

/// The fragment id a slug is published under.
pub fn symbol_id(slug: &str, options: &SymbolOptions) -> String {
    format!("{}{}", options.prefix, slug)
}

/// Rewrite an icon document into a `<symbol id="i-{slug}">` fragment with
/// default options.
pub fn to_symbol(slug: &str, content: &str) -> Result<String, MalformedSvg> {
    to_symbol_with_options(slug, content, &SymbolOptions::default())
}

/// Rewrite an icon document into a `<symbol>` fragment.
///
/// Anything outside the root element (XML declaration, doctype, comments)
/// is dropped. Only the root tag is renamed; nested `<svg>` elements are
/// left alone.
pub fn to_symbol_with_options(
    slug: &str,
    content: &str,
    options: &SymbolOptions,
) -> Result<String, MalformedSvg> {
    // quick-xml skips a leading BOM, so positions only line up without it.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let root = locate_root(content)?;

    // Root attributes up to and including `>` (or `/>`).
    let mut attrs = content[root.start + "<svg".len()..root.open_end].to_string();
    if root.has_id {
        attrs = ROOT_ID.replacen(&attrs, 1, "").into_owned();
    }

    let mut inner = attrs;
    if !root.self_closing {
        let rest = &content[root.open_end..root.end];
        let close = rest
            .rfind("</svg")
            .ok_or_else(|| MalformedSvg("root <svg> has no closing tag".into()))?;
        inner.push_str(&rest[..close]);
    }

    // Cleanup runs before the id is inserted so slugs are never rewritten.
    if options.vendor_cleanup {
        inner = inner
            .replace(VENDOR_CLASS, "")
            .replace(VENDOR_PREFIX.0, VENDOR_PREFIX.1);
    }
    if options.strip_classes {
        inner = CLASS_ATTR.replace_all(&inner, "").into_owned();
    }

    let id = symbol_id(slug, options);
    let mut out = String::with_capacity(inner.len() + id.len() + 24);
    out.push_str("<symbol id=\"");
    out.push_str(&id);
    out.push('"');
    out.push_str(&inner);
    if !root.self_closing {
        out.push_str("</symbol>");
    }
    Ok(out)
}

/// Inner markup of the `<defs>` block, or `""` when there is none.
///
/// Icons are expected to carry at most one defs block. With several, the
/// capture spans from the first `<defs>` to the last `</defs>`.
pub fn extract_defs(content: &str) -> &str {
    DEFS.captures(content)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str())
}

/// Remove the `<defs>` block matched by [`extract_defs`].
pub fn strip_defs(content: &str) -> String {
    DEFS.replace(content, "").into_owned()
}

struct RootSpan {
    start: usize,
    /// End of the opening tag
    open_end: usize,
    end: usize,
    self_closing: bool,
    has_id: bool,
}

/// Find the byte span of the single root `<svg>` element.
fn locate_root(content: &str) -> Result<RootSpan, MalformedSvg> {
    let mut reader = Reader::from_str(content);
    let mut root: Option<RootSpan> = None;
    let mut depth = 0usize;

    loop {
        let event = reader.read_event()?;
        let pos = reader.buffer_position() as usize;

        match event {
            Event::Start(ref start) | Event::Empty(ref start) => {
                let self_closing = matches!(event, Event::Empty(_));
                if depth > 0 {
                    if !self_closing {
                        depth += 1;
                    }
                    continue;
                }
                if root.is_some() {
                    return Err(MalformedSvg("more than one root element".into()));
                }
                if start.name().as_ref() != b"svg" {
                    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    return Err(MalformedSvg(format!(
                        "root element is <{}>, expected <svg>",
                        name
                    )));
                }
                let mut has_id = false;
                for attr in start.attributes() {
                    let attr =
                        attr.map_err(|e| MalformedSvg(format!("invalid attribute: {}", e)))?;
                    has_id |= attr.key.as_ref() == b"id";
                }
                let tag_start = content
                    .get(..pos)
                    .and_then(|head| head.rfind("<svg"))
                    .ok_or_else(|| MalformedSvg("cannot locate root <svg> tag".into()))?;
                root = Some(RootSpan {
                    start: tag_start,
                    open_end: pos,
                    end: pos,
                    self_closing,
                    has_id,
                });
                if !self_closing {
                    depth = 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(span) = root.as_mut() {
                        span.end = pos;
                    }
                }
            }
            Event::Text(ref text) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(MalformedSvg("text outside the root element".into()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(MalformedSvg("unexpected end of file inside <svg>".into()));
    }
    root.ok_or_else(|| MalformedSvg("no <svg> root element found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_root_in_symbol() {
        let out = to_symbol("home", r#"<svg viewBox="0 0 24 24"><path d="M0 0"/></svg>"#).unwrap();
        assert!(out.starts_with(r#"<symbol id="i-home" viewBox="0 0 24 24">"#));
        assert!(out.ends_with("</symbol>"));
        assert_eq!(out.matches("<symbol").count(), 1);
        assert!(!out.contains("svg"));
    }

    #[test]
    fn test_drops_prolog_and_trailing_whitespace() {
        let svg = "<?xml version=\"1.0\"?>\n<!-- exported -->\n<svg><circle/></svg>\n";
        let out = to_symbol("dot", svg).unwrap();
        assert_eq!(out, r#"<symbol id="i-dot"><circle/></symbol>"#);
    }

    #[test]
    fn test_nested_svg_is_untouched() {
        let svg = r#"<svg><svg x="2"><rect/></svg></svg>"#;
        let out = to_symbol("nest", svg).unwrap();
        assert_eq!(out, r#"<symbol id="i-nest"><svg x="2"><rect/></svg></symbol>"#);
    }

    #[test]
    fn test_self_closing_root() {
        let out = to_symbol("blank", r#"<svg viewBox="0 0 1 1"/>"#).unwrap();
        assert_eq!(out, r#"<symbol id="i-blank" viewBox="0 0 1 1"/>"#);
    }

    #[test]
    fn test_vendor_class_cleanup() {
        let svg = r#"<svg class="feather feather-home"><path/></svg>"#;
        let out = to_symbol("home", svg).unwrap();
        assert!(out.contains(r#"class="icon-home""#), "{}", out);
        assert!(!out.contains("feather"));
    }

    #[test]
    fn test_vendor_cleanup_can_be_disabled() {
        let options = SymbolOptions {
            vendor_cleanup: false,
            ..SymbolOptions::default()
        };
        let svg = r#"<svg class="feather feather-home"/>"#;
        let out = to_symbol_with_options("home", svg, &options).unwrap();
        assert!(out.contains("feather feather-home"));
    }

    #[test]
    fn test_vendor_cleanup_leaves_id_alone() {
        let out = to_symbol("feather-x", r#"<svg class="feather-x"/>"#).unwrap();
        assert_eq!(out, r#"<symbol id="i-feather-x" class="icon-x"/>"#);
    }

    #[test]
    fn test_strip_classes() {
        let options = SymbolOptions {
            strip_classes: true,
            ..SymbolOptions::default()
        };
        let svg = r#"<svg class="w-4 h-4"><path class="stroke-(--c)" d="M0 0"/></svg>"#;
        let out = to_symbol_with_options("x", svg, &options).unwrap();
        assert_eq!(out, r#"<symbol id="i-x"><path d="M0 0"/></symbol>"#);
    }

    #[test]
    fn test_strip_classes_keeps_data_attributes() {
        let options = SymbolOptions {
            strip_classes: true,
            ..SymbolOptions::default()
        };
        let svg = r#"<svg data-class="x" class="y"><path/></svg>"#;
        let out = to_symbol_with_options("x", svg, &options).unwrap();
        assert_eq!(out, r#"<symbol id="i-x" data-class="x"><path/></symbol>"#);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let svg = "\u{feff}<svg viewBox=\"0 0 24 24\"><path d=\"M0 0\"/></svg>\n";
        let out = to_symbol("home", svg).unwrap();
        assert_eq!(out, r#"<symbol id="i-home" viewBox="0 0 24 24"><path d="M0 0"/></symbol>"#);
    }

    #[test]
    fn test_byte_order_mark_with_multibyte_attribute() {
        let out = to_symbol("x", "\u{feff}<svg aria-label=\"café\"></svg>").unwrap();
        assert_eq!(out, r#"<symbol id="i-x" aria-label="café"></symbol>"#);
    }

    #[test]
    fn test_root_id_is_replaced() {
        let svg = r#"<svg version="1.1" id="Layer_1" viewBox="0 0 1 1"/>"#;
        let out = to_symbol("x", svg).unwrap();
        assert_eq!(out, r#"<symbol id="i-x" version="1.1" viewBox="0 0 1 1"/>"#);

        let mut reader = Reader::from_str(&out);
        match reader.read_event().unwrap() {
            Event::Empty(start) => {
                assert!(start.attributes().all(|a| a.is_ok()));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_nested_ids_survive_root_id_removal() {
        let svg = r#"<svg id='root' data-id="keep"><g id="layer"/></svg>"#;
        let out = to_symbol("x", svg).unwrap();
        assert_eq!(out, r#"<symbol id="i-x" data-id="keep"><g id="layer"/></symbol>"#);
    }

    #[test]
    fn test_duplicate_root_attributes_are_rejected() {
        assert!(to_symbol("x", r#"<svg id="a" id="b"/>"#).is_err());
    }

    #[test]
    fn test_custom_prefix() {
        let options = SymbolOptions {
            prefix: "icon-".into(),
            ..SymbolOptions::default()
        };
        let out = to_symbol_with_options("bell", "<svg/>", &options).unwrap();
        assert!(out.starts_with(r#"<symbol id="icon-bell""#));
    }

    #[test]
    fn test_rejects_missing_root() {
        assert!(to_symbol("x", "").is_err());
        assert!(to_symbol("x", "just text").is_err());
        assert!(to_symbol("x", "<!-- nothing here -->").is_err());
    }

    #[test]
    fn test_rejects_wrong_root() {
        let err = to_symbol("x", "<html><body/></html>").unwrap_err();
        assert!(err.0.contains("<html>"), "{}", err);
        assert!(to_symbol("x", "<svg:svg/>").is_err());
    }

    #[test]
    fn test_rejects_multiple_roots() {
        assert!(to_symbol("x", "<svg/><svg/>").is_err());
    }

    #[test]
    fn test_rejects_unclosed_root() {
        assert!(to_symbol("x", "<svg><path/>").is_err());
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(to_symbol("x", "<svg><g></svg>").is_err());
    }

    #[test]
    fn test_extract_defs() {
        let svg = r#"<svg><defs><linearGradient id="g"/></defs><path/></svg>"#;
        assert_eq!(extract_defs(svg), r#"<linearGradient id="g"/>"#);
        assert_eq!(extract_defs("<svg><path/></svg>"), "");
    }

    #[test]
    fn test_extract_defs_is_greedy() {
        let svg = "<svg><defs><a/></defs><path/><defs><b/></defs></svg>";
        assert_eq!(extract_defs(svg), "<a/></defs><path/><defs><b/>");
    }

    #[test]
    fn test_extract_defs_spans_lines() {
        let svg = "<svg>\n<defs>\n  <clipPath id=\"c\"/>\n</defs>\n</svg>";
        assert_eq!(extract_defs(svg), "\n  <clipPath id=\"c\"/>\n");
    }

    #[test]
    fn test_fragment_hoists_defs_out_of_body() {
        let svg = r#"<svg><defs><clipPath id="c"/></defs><circle/></svg>"#;
        let fragment = SymbolFragment::new("user", svg, &SymbolOptions::default()).unwrap();
        assert_eq!(fragment.id, "i-user");
        assert_eq!(fragment.defs, r#"<clipPath id="c"/>"#);
        assert_eq!(fragment.body, r#"<symbol id="i-user"><circle/></symbol>"#);
    }

    #[test]
    fn test_fragment_without_defs() {
        let fragment =
            SymbolFragment::new("home", r#"<svg><path d="M0 0"/></svg>"#, &SymbolOptions::default())
                .unwrap();
        assert_eq!(fragment.defs, "");
        assert_eq!(fragment.body, r#"<symbol id="i-home"><path d="M0 0"/></symbol>"#);
    }
}
