use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpritzError {
    #[error("Cannot read icon source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Optimizer failed on {}: {message}", path.display())]
    OptimizationFailure { path: PathBuf, message: String },

    #[error("Optimizer `{program}` not found (install svgo or pass --no-optimize)")]
    OptimizerUnavailable { program: String },

    #[error("Malformed icon {}: {source}", path.display())]
    MalformedSymbol {
        path: PathBuf,
        #[source]
        source: MalformedSvg,
    },

    #[error("Icon file name {} does not produce a usable symbol name", path.display())]
    EmptyName { path: PathBuf },

    #[error("Symbol id `{id}` is produced by both {} and {}", first.display(), second.display())]
    DuplicateSymbol {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Cannot write {}: {source}", path.display())]
    DestinationWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Component template {} is missing", path.display())]
    TemplateMissing { path: PathBuf },

    #[error("Cannot read config {}: {source}", path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Why an icon document could not be turned into a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MalformedSvg(pub String);

impl From<quick_xml::Error> for MalformedSvg {
    fn from(e: quick_xml::Error) -> Self {
        MalformedSvg(format!("XML parsing error: {}", e))
    }
}
