//! Builtin rules for solstice.
//!
//! Every rule ships as a `Rule` implementation grouped by category
//! (`security/*`, `lint/*`, `best-practices/*`, `code-quality/*`,
//! `naming/*`, `gas-optimization/*`), registered through
//! [`builtin_registry`]. Presets (`recommended`, `security`) are plain
//! `Config` values derived from the catalog.

pub mod presets;
mod rules;
mod version;

#[cfg(test)]
mod scenarios;

pub use version::VersionReq;

use solstice_engine::{RegistryError, RuleRegistry};

/// Registry holding every builtin rule.
pub fn builtin_registry() -> Result<RuleRegistry, RegistryError> {
    let mut registry = RuleRegistry::new();
    for rule in rules::all() {
        registry.register(rule)?;
    }
    Ok(registry)
}
