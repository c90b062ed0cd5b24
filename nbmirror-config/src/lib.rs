//! Shared configuration loader for the nbmirror toolchain.
//!
//! `defaults/nbmirror.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`MirrorConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use nbmirror_babel::{LanguageSyntax, MarshalOptions, MirrorRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/nbmirror.default.toml");

/// Top-level configuration consumed by nbmirror applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    pub marshal: MarshalConfig,
    pub detect: DetectConfig,
    /// Language table additions, keyed by language id
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarshalConfig {
    pub insert_header: bool,
    pub default_format: String,
}

impl From<&MarshalConfig> for MarshalOptions {
    fn from(config: &MarshalConfig) -> Self {
        MarshalOptions {
            insert_header: config.insert_header,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectConfig {
    pub default_language: String,
}

impl DetectConfig {
    /// The fallback language, if one is configured
    pub fn default_language(&self) -> Option<&str> {
        let language = self.default_language.trim();
        (!language.is_empty()).then_some(language)
    }
}

/// Comment syntax of a language added through configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    #[serde(default)]
    pub line_comment: Vec<String>,
    /// Opening and closing block comment tokens
    #[serde(default)]
    pub block_comment: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "pragma_allowed")]
    pub encoding_pragma_allowed: bool,
}

fn pragma_allowed() -> bool {
    true
}

impl LanguageConfig {
    fn to_syntax(&self, id: &str) -> Result<LanguageSyntax, ConfigError> {
        let block_comment = match self.block_comment.as_slice() {
            [] => None,
            [open, close] => Some((open.clone(), close.clone())),
            _ => {
                return Err(ConfigError::Message(format!(
                    "languages.{id}.block_comment needs exactly an opening and a closing token"
                )))
            }
        };
        if self.line_comment.iter().any(|token| token.trim().is_empty()) {
            return Err(ConfigError::Message(format!(
                "languages.{id}.line_comment contains an empty token"
            )));
        }
        if self.line_comment.is_empty() && block_comment.is_none() {
            return Err(ConfigError::Message(format!(
                "languages.{id} needs a line_comment or a block_comment"
            )));
        }
        Ok(LanguageSyntax {
            id: id.to_string(),
            aliases: self.aliases.clone(),
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            line_comment: self.line_comment.clone(),
            block_comment,
            encoding_pragma_allowed: self.encoding_pragma_allowed,
        })
    }
}

impl MirrorConfig {
    /// The configured language additions, ready to register
    pub fn language_syntaxes(&self) -> Result<Vec<LanguageSyntax>, ConfigError> {
        self.languages
            .iter()
            .map(|(id, language)| language.to_syntax(id))
            .collect()
    }

    /// Built-in registry extended with the configured languages
    pub fn registry(&self) -> Result<MirrorRegistry, ConfigError> {
        let mut registry = MirrorRegistry::with_defaults();
        for syntax in self.language_syntaxes()? {
            registry.register_language(syntax);
        }
        if !registry.has_format(&self.marshal.default_format) {
            return Err(ConfigError::Message(format!(
                "marshal.default_format: unknown format {}",
                self.marshal.default_format
            )));
        }
        Ok(registry)
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
    pub fn build(self) -> Result<MirrorConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MirrorConfig, ConfigError> {
    Loader::new().build()
}
