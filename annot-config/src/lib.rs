//! Shared configuration loader for the annot toolchain.
//!
//! `defaults/annot.default.toml` is embedded into every binary so that the documented
//! defaults and runtime behavior stay in sync. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into [`AnnotConfig`].
//!
//! Each section deserializes straight into the option struct of the model stage it
//! configures, so there is no separate mapping layer to keep up to date.

use annot_model::annot::annotations::HistoryOptions;
use annot_model::annot::codebook::CodebookOptions;
use annot_model::annot::tokens::{ImportOptions, TokenizerOptions};
use annot_model::annot::unit::UnitOptions;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/annot.default.toml");

/// Top-level configuration consumed by annot applications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnotConfig {
    pub tokenizer: TokenizerOptions,
    pub import: ImportOptions,
    pub codebook: CodebookOptions,
    pub history: HistoryOptions,
}

impl AnnotConfig {
    /// The options needed to prepare units
    pub fn unit_options(&self) -> UnitOptions {
        UnitOptions {
            tokenizer: self.tokenizer.clone(),
            import: self.import.clone(),
            history: self.history,
        }
    }
}

/// Builds an [`AnnotConfig`] from the embedded defaults plus user layers.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// A loader holding only `annot.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file if it exists, such as a per-project `annot.toml`.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `history.max_entries`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge the layers into an [`AnnotConfig`].
    pub fn build(self) -> Result<AnnotConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults without any user layers.
pub fn load_defaults() -> Result<AnnotConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_model_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.tokenizer, TokenizerOptions::default());
        assert_eq!(config.import, ImportOptions::default());
        assert_eq!(config.codebook, CodebookOptions::default());
        assert_eq!(config.history, HistoryOptions::default());
        assert_eq!(config.unit_options(), UnitOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("history.max_entries", 3)
            .expect("override to apply")
            .set_override("codebook.tree_separator", " / ")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.history.max_entries, 3);
        assert_eq!(config.codebook.tree_separator, " / ");
    }

    #[test]
    fn layers_user_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("annot.toml");
        let mut file = std::fs::File::create(&path).expect("config file");
        writeln!(file, "[import]\ndefault_post = \"\"").expect("write config");

        let config = Loader::new()
            .with_file(&path)
            .with_optional_file(dir.path().join("missing.toml"))
            .build()
            .expect("config to build");
        assert_eq!(config.import.default_post, "");
        assert_eq!(config.import.default_field, "text");

        let missing = Loader::new().with_file(dir.path().join("missing.toml")).build();
        assert!(missing.is_err());
    }
}
