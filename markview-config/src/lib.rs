//! Shared configuration loader for the markview toolchain.
//!
//! `defaults/markview.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`MarkviewConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use markview_core::{ImageUrlPattern, RenderOptions};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/markview.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "markview.toml";

/// Top-level configuration consumed by markview applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkviewConfig {
    pub render: RenderConfig,
    pub highlight: HighlightConfig,
    pub images: ImagesConfig,
    pub inspect: InspectConfig,
}

impl MarkviewConfig {
    /// Render options for this configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            top_level: self.render.top_level,
            no_fragments: self.render.no_fragments,
            nofollow: self.render.nofollow,
            line_numbers: self.highlight.line_numbers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub top_level: bool,
    pub no_fragments: bool,
    pub nofollow: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_numbers: bool,
}

/// Image detection knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub extensions: Vec<String>,
    pub probe: bool,
    pub probe_timeout_secs: u64,
}

impl ImagesConfig {
    pub fn probe_timeout(&self) -> Option<Duration> {
        match self.probe_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl From<&ImagesConfig> for ImageUrlPattern {
    fn from(config: &ImagesConfig) -> Self {
        ImageUrlPattern::new(&config.extensions)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub default_transform: String,
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

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MarkviewConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MarkviewConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(config.render.top_level);
        assert!(!config.render.nofollow);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(
            config.images.extensions,
            vec!["png", "jpg", "jpeg", "gif", "webp"]
        );
        assert!(!config.images.probe);
        assert_eq!(config.inspect.default_transform, "render-treeviz");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("render.nofollow", true)
            .expect("override to apply")
            .set_override("images.probe_timeout_secs", 0)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.render.nofollow);
        assert_eq!(config.images.probe_timeout(), None);
    }

    #[test]
    fn user_file_is_layered() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[render]\ntop_level = false\n\n[images]\nextensions = [\"svg\"]")
            .expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert!(!config.render.top_level);
        assert!(!config.render.no_fragments);

        let pattern = ImageUrlPattern::from(&config.images);
        assert!(pattern.is_match("https://x.test/logo.svg"));
        assert!(!pattern.is_match("https://x.test/logo.png"));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("definitely/not/here/markview.toml")
            .build()
            .expect("config to build");
        assert!(config.render.top_level);
    }

    #[test]
    fn converts_to_render_options() {
        let config = Loader::new()
            .set_override("highlight.line_numbers", false)
            .expect("override to apply")
            .build()
            .expect("config to build");
        let options = config.render_options();
        assert!(options.top_level);
        assert!(!options.line_numbers);
        assert!(!options.no_fragments);
    }
}
