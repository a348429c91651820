//! Companion component templates.
//!
//! Components render an icon with `<use href="#i-{name}">` against the
//! sprite. They are static files; this module only copies them into place,
//! or writes the shipped Blade component when no source is given.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::SpritzError;

/// Default Blade component shipped with the crate.
pub const BLADE_ICON_COMPONENT: &str = include_str!("../templates/icon.blade.php");

/// A template file and where it is copied to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentTemplate {
    /// `None` means [`BLADE_ICON_COMPONENT`]
    #[serde(default)]
    pub source: Option<PathBuf>,
    pub destination: PathBuf,
}

impl ComponentTemplate {
    /// The shipped Blade component, written to `destination`.
    pub fn blade(destination: impl Into<PathBuf>) -> Self {
        Self {
            source: None,
            destination: destination.into(),
        }
    }
}

/// Copy every template to its destination, overwriting existing files.
///
/// All sources are checked before anything is copied.
pub fn materialize(templates: &[ComponentTemplate]) -> Result<(), SpritzError> {
    let missing = templates
        .iter()
        .filter_map(|t| t.source.as_ref())
        .find(|source| !source.is_file());
    if let Some(missing) = missing {
        return Err(SpritzError::TemplateMissing {
            path: missing.clone(),
        });
    }

    for template in templates {
        let write_err = |source| SpritzError::DestinationWriteFailure {
            path: template.destination.clone(),
            source,
        };
        if let Some(dir) = template.destination.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(write_err)?;
            }
        }
        match &template.source {
            Some(source) => {
                fs::copy(source, &template.destination).map_err(write_err)?;
                debug!(
                    source = %source.display(),
                    destination = %template.destination.display(),
                    "copied component"
                );
            }
            None => {
                fs::write(&template.destination, BLADE_ICON_COMPONENT).map_err(write_err)?;
                debug!(destination = %template.destination.display(), "wrote builtin component");
            }
        }
    }
    Ok(())
}
