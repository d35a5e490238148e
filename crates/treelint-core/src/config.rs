//! Engine configuration types.
//!
//! Checks are declared as an ordered `[[checks]]` array; that order is
//! semantic, because it fixes dispatch order and therefore the tie-break
//! order of violations on the same position. Options use a `BTreeMap` so
//! the serialized form — and with it the configuration hash — is
//! deterministic.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::violation::Severity;

/// Top-level configuration for a treelint run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Severity threshold for a failing exit (default: "error").
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Violations below this severity are filtered out entirely.
    #[serde(default)]
    pub min_severity: Option<Severity>,

    /// Path of the on-disk result cache. No caching when absent.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// File discovery settings.
    #[serde(default)]
    pub analyzer: AnalyzerSettings,

    /// Active checks, in declaration order.
    #[serde(default)]
    pub checks: Vec<CheckSettings>,

    /// Path/check/line suppression entries.
    #[serde(default)]
    pub suppressions: Vec<SuppressionEntry>,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Stable hash of the effective configuration.
    ///
    /// Two runs with the same configuration produce the same hash; any
    /// change to it invalidates every cache entry keyed to the old hash.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if canonicalization fails.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let canonical = serde_json::to_string(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?;
        Ok(crate::cache::content_hash(&canonical))
    }
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Glob patterns excluded from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect `.gitignore` files during discovery.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Declaration of one active check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSettings {
    /// Check name (e.g. `"nested-if-depth"`).
    pub name: String,

    /// Whether this check runs. Defaults to `true`.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this check.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Explicit token-name subset. Overrides the check's default tokens;
    /// the check's required tokens are always processed regardless.
    #[serde(default)]
    pub tokens: Option<Vec<String>>,

    /// Check-specific options.
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl CheckSettings {
    /// Declaration with just a name, everything else defaulted.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: None,
            severity: None,
            tokens: None,
            options: BTreeMap::new(),
        }
    }

    /// Whether the check should run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Boolean option with a default.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Integer option with a default.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// String option with a default.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// One path/check/line suppression loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionEntry {
    /// Glob pattern matched against the violation's file path.
    pub files: String,

    /// Check name to suppress; absent or `"*"` suppresses every check.
    #[serde(default)]
    pub checks: Option<String>,

    /// Lines the suppression applies to; absent means the whole file.
    #[serde(default)]
    pub lines: Option<Vec<usize>>,
}

/// Fatal configuration error. The run aborts before any file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Configuration could not be canonicalized for hashing.
    #[error("failed to serialize config: {message}")]
    Serialize {
        /// Serialization error message.
        message: String,
    },

    /// A declared check name matches no registered module.
    #[error("unknown check {0:?}")]
    UnknownCheck(String),

    /// A configured token name is not in the registry.
    #[error("check `{check}`: unknown token name {name:?}")]
    UnknownToken {
        /// Check whose token list failed to resolve.
        check: String,
        /// Offending token name.
        name: String,
    },

    /// A configured token is outside the check's acceptable set.
    #[error("check `{check}`: token {name:?} is not acceptable for this check")]
    TokenNotAcceptable {
        /// Check whose token list was rejected.
        check: String,
        /// Offending token name.
        name: String,
    },

    /// A module's default tokens are not a subset of its acceptable set.
    #[error("check `{check}`: default tokens are not a subset of acceptable tokens ({tokens})")]
    DefaultNotAcceptable {
        /// Offending check.
        check: String,
        /// Names of the tokens outside the acceptable set.
        tokens: String,
    },

    /// A module's required tokens are not a subset of its default set.
    #[error("check `{check}`: required tokens are not a subset of default tokens ({tokens})")]
    RequiredNotDefault {
        /// Offending check.
        check: String,
        /// Names of the tokens outside the default set.
        tokens: String,
    },

    /// A suppression file pattern failed to compile.
    #[error("invalid suppression pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern as written in configuration.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// A check option has an unusable value.
    #[error("check `{check}`: invalid value for option `{option}`: {message}")]
    InvalidOption {
        /// Check the option belongs to.
        check: String,
        /// Option key.
        option: String,
        /// What was wrong with the value.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_empty() {
        let config = EngineConfig::default();
        assert!(config.checks.is_empty());
        assert!(config.suppressions.is_empty());
        assert!(config.analyzer.respect_gitignore);
    }

    #[test]
    fn parse_preserves_check_order() {
        let toml = r#"
fail_on = "warning"

[analyzer]
exclude = ["**/generated/**"]

[[checks]]
name = "nested-if-depth"
max = 2
severity = "warning"

[[checks]]
name = "empty-block"
tokens = ["block", "class_body"]

[[suppressions]]
files = "**/Legacy.java"
checks = "empty-block"
lines = [10, 11]
"#;
        let config = EngineConfig::parse(toml).unwrap();
        assert_eq!(config.fail_on, Some(Severity::Warning));
        assert_eq!(config.checks.len(), 2);
        assert_eq!(config.checks[0].name, "nested-if-depth");
        assert_eq!(config.checks[0].get_int("max", 1), 2);
        assert_eq!(config.checks[0].severity, Some(Severity::Warning));
        assert_eq!(
            config.checks[1].tokens.as_deref(),
            Some(&["block".to_string(), "class_body".to_string()][..])
        );
        assert_eq!(config.suppressions[0].lines.as_deref(), Some(&[10, 11][..]));
    }

    #[test]
    fn enabled_defaults_to_true() {
        let settings = CheckSettings::named("empty-block");
        assert!(settings.is_enabled());
    }

    #[test]
    fn option_accessors_fall_back_to_defaults() {
        let config = EngineConfig::parse(
            r#"
[[checks]]
name = "todo-comment"
marker = "FIXME"
"#,
        )
        .unwrap();
        let check = &config.checks[0];
        assert_eq!(check.get_str("marker", "TODO"), "FIXME");
        assert_eq!(check.get_str("other", "TODO"), "TODO");
        assert_eq!(check.get_int("max", 5), 5);
        assert!(check.get_bool("flag", true));
    }

    #[test]
    fn config_hash_is_stable_and_sensitive() {
        let a = EngineConfig::parse("[[checks]]\nname = \"empty-block\"\n").unwrap();
        let b = EngineConfig::parse("[[checks]]\nname = \"empty-block\"\n").unwrap();
        let c = EngineConfig::parse("[[checks]]\nname = \"todo-comment\"\n").unwrap();
        assert_eq!(a.config_hash().unwrap(), b.config_hash().unwrap());
        assert_ne!(a.config_hash().unwrap(), c.config_hash().unwrap());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = EngineConfig::parse("checks = nonsense");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
