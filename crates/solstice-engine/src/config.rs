//! User-facing configuration.
//!
//! A config file maps onto [`Config`]: preset names to extend, a rule map,
//! parser options, and file selection globs. TOML and JSON are both
//! accepted; the extension picks the format.
//!
//! ```toml
//! extends = ["recommended"]
//!
//! [rules]
//! "security/reentrancy" = "off"
//! "lint/max-line-length" = ["warning", { max = 100 }]
//! "gas-optimization" = "info"          # category short-circuit
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One entry in the `rules` map: either a bare severity token or a
/// `[severity, options]` pair. Keys are rule ids or bare category names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSetting {
    Severity(String),
    WithOptions(String, BTreeMap<String, serde_json::Value>),
}

impl RuleSetting {
    pub fn severity_token(&self) -> &str {
        match self {
            RuleSetting::Severity(s) => s,
            RuleSetting::WithOptions(s, _) => s,
        }
    }

    pub fn options(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        match self {
            RuleSetting::Severity(_) => None,
            RuleSetting::WithOptions(_, opts) => Some(opts),
        }
    }
}

/// Parser options surfaced through configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ParserSettings {
    /// With `tolerant` set, parse errors become recoverable `parser/*`
    /// issues instead of failing the file. The same flag selects tolerant
    /// config resolution (unknown rule ids are dropped with a notice).
    pub tolerant: bool,
    /// Kept for config compatibility with JS-lineage linters. The Solidity
    /// grammar has a single entry point, so this does not alter parsing.
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Module,
    Script,
}

/// A user configuration, as read from a config file or built by a preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Presets to extend, resolved in order before this config's own rules.
    pub extends: Vec<String>,
    /// Rule id (or bare category) -> setting.
    pub rules: BTreeMap<String, RuleSetting>,
    /// Parser options; last layer that sets them wins.
    pub parser: Option<ParserSettings>,
    /// Globs selecting files to analyze; last layer that sets them wins.
    pub files: Option<Vec<String>>,
    /// Globs excluding files from analysis; last layer that sets them wins.
    pub excluded_files: Option<Vec<String>>,
}

impl Config {
    /// Load a config file. `.json` parses as JSON, anything else as TOML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            serde_json::from_str(&text).map_err(|e| ConfigError::Syntax {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        } else {
            toml::from_str(&text).map_err(|e| ConfigError::Syntax {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    }

    /// Convenience for building preset configs.
    pub fn with_rule(mut self, key: &str, setting: RuleSetting) -> Self {
        self.rules.insert(key.to_string(), setting);
        self
    }
}

/// Named presets shipped with the tool (`recommended`, `security`, ...).
/// Each preset is itself a `Config` value.
#[derive(Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Config>,
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, config: Config) {
        self.presets.insert(name.to_string(), config);
    }

    pub fn get(&self, name: &str) -> Option<&Config> {
        self.presets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip() {
        let toml_text = r#"
extends = ["recommended"]

[rules]
"security/reentrancy" = "off"
"lint/max-line-length" = ["warning", { max = 100 }]
"#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.extends, vec!["recommended"]);

        match &config.rules["security/reentrancy"] {
            RuleSetting::Severity(s) => assert_eq!(s, "off"),
            other => panic!("expected bare severity, got {:?}", other),
        }
        match &config.rules["lint/max-line-length"] {
            RuleSetting::WithOptions(sev, opts) => {
                assert_eq!(sev, "warning");
                assert_eq!(opts["max"], serde_json::json!(100));
            }
            other => panic!("expected severity with options, got {:?}", other),
        }
    }

    #[test]
    fn json_config_parses() {
        let json_text = r#"{
            "extends": ["security"],
            "rules": { "naming/func-name-mixedcase": "error" },
            "parser": { "tolerant": true },
            "excludedFiles": ["vendor/**"]
        }"#;
        let config: Config = serde_json::from_str(json_text).unwrap();

        assert_eq!(config.extends, vec!["security"]);
        assert_eq!(
            config.parser,
            Some(ParserSettings {
                tolerant: true,
                source_type: SourceType::Module
            })
        );
        assert_eq!(config.excluded_files.as_deref(), Some(&["vendor/**".to_string()][..]));
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.extends.is_empty());
        assert!(config.rules.is_empty());
        assert!(config.parser.is_none());
    }
}
