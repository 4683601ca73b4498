//! Built-in presets.
//!
//! Presets are plain `Config` values derived from the catalog, so a new
//! builtin rule lands in `recommended` automatically unless listed in the
//! noisy set.

use crate::rules;
use solstice_engine::{Config, PresetCatalog, RuleSetting};

/// Style-volume rules kept out of `recommended`; users opt in per project.
const NOT_RECOMMENDED: &[&str] = &[
    "lint/max-line-length",
    "best-practices/one-contract-per-file",
    "gas-optimization/indexed-events",
    "gas-optimization/increment-by-one",
];

/// Every builtin rule at its default severity, minus the noisy set.
pub fn recommended() -> Config {
    let mut config = Config::default();
    for rule in rules::all() {
        let meta = rule.metadata();
        if NOT_RECOMMENDED.contains(&meta.id) {
            continue;
        }
        config.rules.insert(
            meta.id.to_string(),
            RuleSetting::Severity(meta.default_severity.to_string()),
        );
    }
    config
}

/// The security category only, via the category short-circuit, with
/// constructor duplication kept at error.
pub fn security() -> Config {
    Config::default()
        .with_rule("security", RuleSetting::Severity("warning".to_string()))
        .with_rule(
            "security/multiple-constructors",
            RuleSetting::Severity("error".to_string()),
        )
}

/// Catalog of every preset shipped with the tool.
pub fn catalog() -> PresetCatalog {
    let mut presets = PresetCatalog::new();
    presets.insert("recommended", recommended());
    presets.insert("security", security());
    presets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_registry;
    use solstice_engine::{Severity, resolve};
    use std::path::Path;

    #[test]
    fn recommended_resolves_against_the_catalog() {
        let registry = builtin_registry().unwrap();
        let mut config = Config::default();
        config.extends = vec!["recommended".to_string()];

        let resolved = resolve(&config, &catalog(), &registry, Path::new("."))
            .unwrap()
            .config;

        assert!(resolved.is_active("security/reentrancy"));
        assert!(resolved.is_active("lint/compiler-version"));
        assert!(!resolved.is_active("lint/max-line-length"));
        assert_eq!(
            resolved.severity_of("security/multiple-constructors"),
            Some(Severity::Error)
        );
    }

    #[test]
    fn security_preset_covers_exactly_the_security_category() {
        let registry = builtin_registry().unwrap();
        let mut config = Config::default();
        config.extends = vec!["security".to_string()];

        let resolved = resolve(&config, &catalog(), &registry, Path::new("."))
            .unwrap()
            .config;

        for (id, state) in resolved.effective_rules() {
            assert!(id.starts_with("security/"), "unexpected rule {}", id);
            let expected = if id == "security/multiple-constructors" {
                Severity::Error
            } else {
                Severity::Warning
            };
            assert_eq!(state.severity, expected, "rule {}", id);
        }
        assert!(resolved.is_active("security/tx-origin"));
    }
}
