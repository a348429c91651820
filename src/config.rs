//! Compiler configuration.
//!
//! Every field has a default, so an empty (or absent) `spritz.toml` is a
//! valid configuration. Relative paths in a config file are resolved against
//! the directory that contains it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::component::ComponentTemplate;
use crate::error::SpritzError;

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "spritz.toml";

/// Top-level compiler configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Flat directory holding the individual icons
    pub source: PathBuf,
    /// Sprite destination, overwritten on every run
    pub output: PathBuf,
    pub symbol: SymbolOptions,
    pub sprite: SpriteOptions,
    pub optimizer: OptimizerOptions,
    /// Static component files copied after the sprite is written
    pub components: Vec<ComponentTemplate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("resources/icons"),
            output: PathBuf::from("public/svg/icons.svg"),
            symbol: SymbolOptions::default(),
            sprite: SpriteOptions::default(),
            optimizer: OptimizerOptions::default(),
            components: Vec::new(),
        }
    }
}

/// How each icon is rewritten into a symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymbolOptions {
    /// Prepended to the slug to form the fragment id (default: `i-`)
    pub prefix: String,
    /// Drop the `feather ` class token and rename `feather-` to `icon-`
    pub vendor_cleanup: bool,
    /// Remove `class="..."` attributes entirely
    pub strip_classes: bool,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            prefix: "i-".into(),
            vendor_cleanup: true,
            strip_classes: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteOptions {
    /// `id` attribute on the sprite's root `<svg>`
    pub id: Option<String>,
}

/// External optimizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerOptions {
    pub enabled: bool,
    /// Program name or path (default: `svgo`)
    pub program: String,
    /// Extra arguments, placed before `--input`/`--output`
    pub args: Vec<String>,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "svgo".into(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Load a config file, resolving relative paths against its directory.
    pub fn from_file(path: &Path) -> Result<Self, SpritzError> {
        let content = std::fs::read_to_string(path).map_err(|source| SpritzError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_str(&content).map_err(|source| SpritzError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.rebased(base))
    }

    /// Parse a config from TOML text. Paths are left as written.
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve every relative path against `base`.
    pub fn rebased(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.source);
        rebase(&mut self.output);
        for component in &mut self.components {
            if let Some(source) = &mut component.source {
                rebase(source);
            }
            rebase(&mut component.destination);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.source, PathBuf::from("resources/icons"));
        assert_eq!(config.output, PathBuf::from("public/svg/icons.svg"));
        assert_eq!(config.symbol.prefix, "i-");
        assert!(config.symbol.vendor_cleanup);
        assert!(!config.symbol.strip_classes);
        assert!(config.sprite.id.is_none());
        assert!(config.optimizer.enabled);
        assert_eq!(config.optimizer.program, "svgo");
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_str(
            r#"
            source = "icons"
            output = "dist/sprite.svg"

            [symbol]
            prefix = "icon-"
            strip_classes = true

            [sprite]
            id = "icons-sprite"

            [optimizer]
            enabled = false
            args = ["--multipass"]

            [[components]]
            source = "stubs/icon.blade.php"
            destination = "views/components/icon.blade.php"
            "#,
        )
        .unwrap();

        assert_eq!(config.source, PathBuf::from("icons"));
        assert_eq!(config.symbol.prefix, "icon-");
        assert!(config.symbol.vendor_cleanup);
        assert!(config.symbol.strip_classes);
        assert_eq!(config.sprite.id.as_deref(), Some("icons-sprite"));
        assert!(!config.optimizer.enabled);
        assert_eq!(config.optimizer.args, vec!["--multipass".to_string()]);
        assert_eq!(config.components.len(), 1);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_str("sourse = \"icons\"").is_err());
        assert!(Config::from_str("[symbol]\nprefx = \"x\"").is_err());
    }

    #[test]
    fn test_rebased_only_touches_relative_paths() {
        let mut config = Config::default();
        config.output = PathBuf::from("/abs/icons.svg");
        config.components.push(ComponentTemplate {
            source: Some(PathBuf::from("stubs/icon.vue")),
            destination: PathBuf::from("out/icon.vue"),
        });

        let config = config.rebased(Path::new("/project"));
        assert_eq!(config.source, PathBuf::from("/project/resources/icons"));
        assert_eq!(config.output, PathBuf::from("/abs/icons.svg"));
        assert_eq!(
            config.components[0].source.as_deref(),
            Some(Path::new("/project/stubs/icon.vue"))
        );
        assert_eq!(config.components[0].destination, PathBuf::from("/project/out/icon.vue"));
    }

    #[test]
    fn test_component_without_source_is_builtin() {
        let config = Config::from_str(
            "[[components]]\ndestination = \"resources/views/components/icon.blade.php\"\n",
        )
        .unwrap()
        .rebased(Path::new("/project"));

        assert_eq!(
            config.components,
            vec![ComponentTemplate::blade("/project/resources/views/components/icon.blade.php")]
        );
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "output = 3").unwrap();
        match Config::from_file(&path) {
            Err(SpritzError::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
