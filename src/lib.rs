//! spritz - an SVG icon sprite compiler
//!
//! spritz turns a flat directory of SVG icons into one sprite document made
//! of `<symbol id="i-{name}">` elements, so any page can render an icon with
//! `<use href="#i-{name}">`. Shared `<defs>` are hoisted into a single block
//! at the top of the sprite.

mod component;
mod config;
mod error;
mod name;
mod optimize;
mod scan;
mod sprite;
mod symbol;

pub use component::*;
pub use config::*;
pub use error::*;
pub use name::*;
pub use optimize::*;
pub use scan::*;
pub use sprite::*;
pub use symbol::*;

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

/// What a successful [`compile`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Symbol ids in sprite order
    pub symbols: Vec<String>,
    /// Files in the source directory that were not icons
    pub skipped: Vec<PathBuf>,
    /// Where the sprite was written
    pub output: PathBuf,
}

/// Build the sprite described by `config`.
///
/// Every accepted icon is optimized in place, rewritten into a symbol, and
/// collected; the sprite is written only once all icons succeeded, followed
/// by the component templates. The first error aborts the run.
pub fn compile(config: &Config, optimizer: &dyn Optimizer) -> Result<CompileReport, SpritzError> {
    let mut report = CompileReport {
        output: config.output.clone(),
        ..CompileReport::default()
    };
    let mut fragments = Vec::new();
    let mut claimed: HashMap<String, PathBuf> = HashMap::new();

    for source in scan(&config.source)? {
        let source = source?;

        if !is_svg_source(&source) {
            if has_svg_extension(&source.path) {
                warn!(
                    path = %source.path.display(),
                    content_type = source.content_type.as_deref().unwrap_or_default(),
                    "skipping .svg file with unexpected content"
                );
            } else {
                debug!(path = %source.path.display(), "skipping non-svg file");
            }
            report.skipped.push(source.path);
            continue;
        }

        let name = IconName::from_file_name(&source.file_name).ok_or_else(|| SpritzError::EmptyName {
            path: source.path.clone(),
        })?;
        let id = symbol_id(&name.slug, &config.symbol);
        if let Some(first) = claimed.get(&id) {
            return Err(SpritzError::DuplicateSymbol {
                id,
                first: first.clone(),
                second: source.path,
            });
        }

        optimizer.optimize(&source.path)?;

        let content = fs::read_to_string(&source.path).map_err(|e| SpritzError::SourceUnreadable {
            path: source.path.clone(),
            source: e,
        })?;
        let fragment = SymbolFragment::new(&name.slug, &content, &config.symbol).map_err(|e| {
            SpritzError::MalformedSymbol {
                path: source.path.clone(),
                source: e,
            }
        })?;

        debug!(id = %fragment.id, path = %source.path.display(), "compiled symbol");
        claimed.insert(id, source.path);
        fragments.push(fragment);
    }

    let sprite = SpriteDocument::from_fragments(&fragments).with_id(config.sprite.id.clone());
    write_sprite(&config.output, &sprite.render())?;
    report.symbols = fragments.into_iter().map(|f| f.id).collect();

    info!(
        symbols = report.symbols.len(),
        skipped = report.skipped.len(),
        output = %config.output.display(),
        "sprite written"
    );

    materialize(&config.components)?;

    Ok(report)
}
