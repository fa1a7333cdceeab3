//! Shared configuration loader for the docsync toolchain.
//!
//! `defaults/docsync.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`DocsyncConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docsync_core::formats::text::{BulletMarker, TextOptions};
use docsync_core::sync::SyncOptions;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/docsync.default.toml");

/// Top-level configuration consumed by docsync applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocsyncConfig {
    pub sync: SyncConfig,
    pub text: TextConfig,
}

impl DocsyncConfig {
    /// Engine options with the text export settings folded in.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            text: TextOptions::from(&self.text),
            ..SyncOptions::from(&self.sync)
        }
    }
}

/// Save scheduling.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub auto_save: bool,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        SyncOptions {
            debounce: Duration::from_millis(config.debounce_ms),
            auto_save: config.auto_save,
            ..SyncOptions::default()
        }
    }
}

/// Plain-text export knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct TextConfig {
    pub bullet_marker: BulletMarker,
}

impl From<&TextConfig> for TextOptions {
    fn from(config: &TextConfig) -> Self {
        TextOptions {
            bullet_marker: config.bullet_marker,
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
    pub fn build(self) -> Result<DocsyncConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocsyncConfig, ConfigError> {
    Loader::new().build()
}
