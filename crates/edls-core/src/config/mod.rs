//! Configuration types and loading.
//!
//! This module provides the configuration structures for EDLS: the language
//! descriptor and token grammar registered with the editor, plus the tuning
//! knobs of the provider bridge and the diagnostic binder.

mod language;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use language::{LanguageDescriptor, TokenGrammar, TokenRule};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Default owner label for markers set by the bridge.
pub const DEFAULT_MARKER_OWNER: &str = "solidity";

/// Main configuration for the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Language registered with the editor.
    #[serde(default)]
    pub language: LanguageDescriptor,

    /// Tokenizer grammar registered with the editor.
    #[serde(default)]
    pub grammar: TokenGrammar,

    /// Provider bridge settings.
    #[serde(default)]
    pub bridge: BridgeSettings,

    /// Diagnostic binder settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,
}

/// Settings for the provider bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSettings {
    /// Timeout for a single backend request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Drop responses that were superseded by a newer request for the same
    /// document and capability.
    #[serde(default = "default_true")]
    pub discard_stale_responses: bool,
}

impl BridgeSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            discard_stale_responses: true,
        }
    }
}

/// What triggers a diagnostic re-render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticRefresh {
    /// Re-render on every content change of a document.
    ContentChange,
    /// Re-render when the backend publishes diagnostics for a document.
    Publish,
    /// Both of the above.
    #[default]
    Both,
}

impl DiagnosticRefresh {
    /// Whether content changes trigger a re-render.
    #[must_use]
    pub const fn on_content_change(self) -> bool {
        matches!(self, Self::ContentChange | Self::Both)
    }

    /// Whether backend publications trigger a re-render.
    #[must_use]
    pub const fn on_publish(self) -> bool {
        matches!(self, Self::Publish | Self::Both)
    }
}

/// Settings for the diagnostic binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsSettings {
    /// Owner label under which markers are set.
    #[serde(default = "default_marker_owner")]
    pub owner: String,

    /// Refresh trigger.
    #[serde(default)]
    pub refresh: DiagnosticRefresh,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            owner: default_marker_owner(),
            refresh: DiagnosticRefresh::default(),
        }
    }
}

const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

const fn default_true() -> bool {
    true
}

fn default_marker_owner() -> String {
    DEFAULT_MARKER_OWNER.to_string()
}

impl BridgeConfig {
    /// Load configuration from the default path.
    ///
    /// Default paths checked in order:
    /// 1. `$EDLS_CONFIG` environment variable
    /// 2. `./edls.toml` (current directory)
    /// 3. `~/.config/edls/edls.toml` (Linux/macOS)
    /// 4. `%APPDATA%\edls\edls.toml` (Windows)
    ///
    /// Falls back to the built-in defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be parsed
    /// or fails validation.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("EDLS_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let local_config = PathBuf::from("edls.toml");
        if local_config.exists() {
            return Self::load_from(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("edls").join("edls.toml");
            if user_config.exists() {
                return Self::load_from(&user_config);
            }
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, parsing fails, or the
    /// values are invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.language.id.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "language.id cannot be empty".to_string(),
            ));
        }
        if let Some(ext) = self
            .language
            .extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(Error::InvalidConfig(format!(
                "extension '{ext}' must start with '.'"
            )));
        }
        for (index, rule) in self.grammar.rules.iter().enumerate() {
            if rule.pattern.is_empty() || rule.token.is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "grammar rule {index} needs both a pattern and a token"
                )));
            }
        }
        if self.bridge.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "bridge.request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.diagnostics.owner.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "diagnostics.owner cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("edls.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.language.id, "solidity");
        assert_eq!(config.bridge.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert!(config.bridge.discard_stale_responses);
        assert_eq!(config.diagnostics.owner, DEFAULT_MARKER_OWNER);
        assert_eq!(config.diagnostics.refresh, DiagnosticRefresh::Both);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_file_uses_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write_config(&tmp_dir, "");

        let config = BridgeConfig::load_from(&path).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_load_from_valid_toml() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write_config(
            &tmp_dir,
            r##"
            [language]
            id = "vyper"
            aliases = ["Vyper"]
            extensions = [".vy"]
            mimetypes = ["text/x-vyper"]

            [[grammar.rules]]
            pattern = "#.*"
            token = "comment"

            [bridge]
            request_timeout_ms = 250
            discard_stale_responses = false

            [diagnostics]
            owner = "vyper"
            refresh = "content-change"
        "##,
        );

        let config = BridgeConfig::load_from(&path).unwrap();
        assert_eq!(config.language.id, "vyper");
        assert_eq!(config.language.extensions, vec![".vy"]);
        assert_eq!(config.grammar.rules.len(), 1);
        assert_eq!(config.bridge.request_timeout(), Duration::from_millis(250));
        assert!(!config.bridge.discard_stale_responses);
        assert_eq!(config.diagnostics.owner, "vyper");
        assert_eq!(config.diagnostics.refresh, DiagnosticRefresh::ContentChange);
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let result = BridgeConfig::load_from(Path::new("/nonexistent/edls.toml"));

        if let Err(Error::ConfigNotFound(path)) = result {
            assert_eq!(path, PathBuf::from("/nonexistent/edls.toml"));
        } else {
            panic!("Expected ConfigNotFound error");
        }
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write_config(&tmp_dir, "invalid toml content {{}");

        assert!(matches!(
            BridgeConfig::load_from(&path),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_deny_unknown_fields() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write_config(
            &tmp_dir,
            r"
            [bridge]
            retries = 3
        ",
        );

        assert!(BridgeConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_validate_empty_language_id() {
        let tmp_dir = TempDir::new().unwrap();
        let path = write_config(
            &tmp_dir,
            r#"
            [language]
            id = ""
        "#,
        );

        match BridgeConfig::load_from(&path) {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("language.id")),
            other => panic!("Expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_extension_without_dot() {
        let mut config = BridgeConfig::default();
        config.language.extensions = vec!["sol".to_string()];

        match config.validate() {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("'sol'")),
            other => panic!("Expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_incomplete_grammar_rule() {
        let mut config = BridgeConfig::default();
        config.grammar.rules.push(TokenRule {
            pattern: String::new(),
            token: "comment".to_string(),
        });

        match config.validate() {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("grammar rule 8")),
            other => panic!("Expected InvalidConfig error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = BridgeConfig::default();
        config.bridge.request_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_empty_owner() {
        let mut config = BridgeConfig::default();
        config.diagnostics.owner = "  ".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = BridgeConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: BridgeConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_refresh_flags() {
        assert!(DiagnosticRefresh::Both.on_content_change());
        assert!(DiagnosticRefresh::Both.on_publish());
        assert!(DiagnosticRefresh::ContentChange.on_content_change());
        assert!(!DiagnosticRefresh::ContentChange.on_publish());
        assert!(!DiagnosticRefresh::Publish.on_content_change());
        assert!(DiagnosticRefresh::Publish.on_publish());
    }
}
