//! Shared configuration loader for the quire toolchain.
//!
//! `defaults/quire.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QuireConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use quire_babel::migrate::MigrateOptions;
use quire_babel::store::StoreLayout;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/quire.default.toml");

/// Name of the optional per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "quire.toml";

/// Top-level configuration consumed by quire applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QuireConfig {
    pub migrate: MigrateConfig,
    pub store: StoreConfig,
    pub render: RenderConfig,
    pub log: LogConfig,
}

/// Widget defaults used by the migration rules.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrateConfig {
    pub default_code_language: String,
    pub default_callout_emoji: String,
}

impl From<MigrateConfig> for MigrateOptions {
    fn from(config: MigrateConfig) -> Self {
        MigrateOptions {
            default_code_language: config.default_code_language,
            default_callout_emoji: config.default_callout_emoji,
        }
    }
}

impl From<&MigrateConfig> for MigrateOptions {
    fn from(config: &MigrateConfig) -> Self {
        config.clone().into()
    }
}

/// Page store location, file names and commit messages.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub json_file: String,
    pub html_file: String,
    pub save_message: String,
    pub migrate_message: String,
}

impl From<&StoreConfig> for StoreLayout {
    fn from(config: &StoreConfig) -> Self {
        StoreLayout {
            json_file: config.json_file.clone(),
            html_file: config.html_file.clone(),
            save_message: config.save_message.clone(),
            migrate_message: config.migrate_message.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub include_cover: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
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

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QuireConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QuireConfig, ConfigError> {
    Loader::new().build()
}
