//! Configuration loading for the formatter.
//!
//! `defaults/pupfmt.default.toml` is embedded into the crate so that documented
//! defaults and runtime behavior stay in sync. Callers layer a user file and
//! individual overrides on top via [`Loader`] before deserializing into
//! [`PupfmtConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/pupfmt.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupfmtConfig {
    pub formatting: FormattingConfig,
    pub parsing: ParsingConfig,
}

/// Knobs of the canonical renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingConfig {
    pub indent_width: usize,
    pub align_arrows: bool,
    pub cuddle_else: bool,
    pub max_line_width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub split_resources: SplitMode,
}

/// How a resource body holding several titles becomes several blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMode {
    /// Keep one node and emit one block per title when rendering.
    Render,
    /// Rewrite the token stream so each title parses as its own resource.
    Splice,
}

impl Default for PupfmtConfig {
    fn default() -> Self {
        Self {
            formatting: FormattingConfig {
                indent_width: 2,
                align_arrows: true,
                cuddle_else: true,
                max_line_width: 80,
            },
            parsing: ParsingConfig {
                split_resources: SplitMode::Render,
            },
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `formatting.indent_width`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PupfmtConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PupfmtConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_default_impl() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, PupfmtConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parsing.split_resources", "splice")
            .expect("override to apply")
            .set_override("formatting.indent_width", 4i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.parsing.split_resources, SplitMode::Splice);
        assert_eq!(config.formatting.indent_width, 4);
        assert!(config.formatting.align_arrows);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[formatting]\nalign_arrows = false").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert!(!config.formatting.align_arrows);
        assert_eq!(config.formatting.indent_width, 2);
    }

    #[test]
    fn rejects_unknown_split_mode() {
        let result = Loader::new()
            .set_override("parsing.split_resources", "sideways")
            .expect("override to apply")
            .build();
        assert!(result.is_err());
    }
}
