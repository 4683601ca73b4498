//! Configuration resolution.
//!
//! Turns a user [`Config`] plus the preset catalog into the flat
//! [`ResolvedConfig`] the driver consumes: presets expanded transitively,
//! layers merged entry by entry (later layers win), category short-circuits
//! applied, severities normalized, `off` entries dropped, options validated
//! against each rule's declared schema.
//!
//! Identical inputs produce identical output: every map involved is ordered.

use crate::config::{Config, ParserSettings, PresetCatalog, RuleSetting};
use crate::diagnostics::{Category, Issue, Severity};
use crate::error::ConfigError;
use crate::registry::RuleRegistry;
use crate::UNKNOWN_RULE_ID;
use solstice_ast::Span;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Effective state of one active rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleState {
    pub severity: Severity,
    pub options: BTreeMap<String, serde_json::Value>,
}

/// Flat, fully resolved configuration. `off` rules are omitted.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    base_path: PathBuf,
    parser: ParserSettings,
    effective: BTreeMap<String, RuleState>,
    file_globs: Vec<String>,
    excluded_globs: Vec<String>,
    files: Vec<glob::Pattern>,
    excluded: Vec<glob::Pattern>,
}

impl ResolvedConfig {
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn parser(&self) -> ParserSettings {
        self.parser
    }

    /// Active rules with their effective state, lexicographic by id.
    pub fn effective_rules(&self) -> impl Iterator<Item = (&str, &RuleState)> {
        self.effective.iter().map(|(id, s)| (id.as_str(), s))
    }

    pub fn is_active(&self, rule_id: &str) -> bool {
        self.effective.contains_key(rule_id)
    }

    pub fn severity_of(&self, rule_id: &str) -> Option<Severity> {
        self.effective.get(rule_id).map(|s| s.severity)
    }

    pub fn option(&self, rule_id: &str, key: &str) -> Option<&serde_json::Value> {
        self.effective.get(rule_id)?.options.get(key)
    }

    pub fn active_count(&self) -> usize {
        self.effective.len()
    }

    /// Keep only the rules the predicate accepts (single-rule CLI filter).
    pub fn retain_rules(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.effective.retain(|id, _| keep(id));
    }

    /// File-selection predicate from the `files`/`excludedFiles` globs.
    /// Paths are matched relative to `base_path` when possible.
    pub fn selects(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.base_path).unwrap_or(path);
        let rel = rel.to_string_lossy();

        if !self.files.is_empty() && !self.files.iter().any(|p| p.matches(&rel)) {
            return false;
        }
        !self.excluded.iter().any(|p| p.matches(&rel))
    }

    /// Re-serialize as a flat `Config` with no `extends`. Resolving the
    /// canonical form yields this same resolved config back.
    pub fn to_canonical_config(&self) -> Config {
        let mut rules = BTreeMap::new();
        for (id, state) in &self.effective {
            let token = state.severity.to_string();
            let setting = if state.options.is_empty() {
                RuleSetting::Severity(token)
            } else {
                RuleSetting::WithOptions(token, state.options.clone())
            };
            rules.insert(id.clone(), setting);
        }
        Config {
            extends: Vec::new(),
            rules,
            parser: Some(self.parser),
            files: (!self.file_globs.is_empty()).then(|| self.file_globs.clone()),
            excluded_files: (!self.excluded_globs.is_empty()).then(|| self.excluded_globs.clone()),
        }
    }
}

/// The outcome of resolution: the config plus any notices produced in
/// tolerant mode (dropped unknown rules).
#[derive(Debug)]
pub struct Resolution {
    pub config: ResolvedConfig,
    pub notices: Vec<Issue>,
}

/// Resolve a user config against the preset catalog and the rule registry.
pub fn resolve(
    config: &Config,
    presets: &PresetCatalog,
    registry: &RuleRegistry,
    base_path: &Path,
) -> Result<Resolution, ConfigError> {
    let mut layers = Vec::new();
    let mut in_progress = Vec::new();
    let mut seen = HashSet::new();
    expand_presets(config, presets, &mut layers, &mut in_progress, &mut seen)?;
    layers.push(config);

    // Top-level options are last-writer-wins across layers.
    let parser = layers
        .iter()
        .filter_map(|l| l.parser)
        .next_back()
        .unwrap_or_default();
    let file_globs = last_set(&layers, |l| l.files.as_ref());
    let excluded_globs = last_set(&layers, |l| l.excluded_files.as_ref());

    let tolerant = parser.tolerant;
    let mut notices = Vec::new();
    let mut effective: BTreeMap<String, RuleState> = BTreeMap::new();

    for layer in &layers {
        // Category short-circuits first: per-rule keys in the same layer win.
        for (key, setting) in &layer.rules {
            if key.contains('/') {
                continue;
            }
            apply_category(key, setting, registry, &mut effective, tolerant, &mut notices, base_path)?;
        }
        for (key, setting) in &layer.rules {
            if !key.contains('/') {
                continue;
            }
            if !registry.contains(key) {
                if tolerant {
                    notices.push(unknown_rule_notice(key, base_path));
                    continue;
                }
                return Err(ConfigError::UnknownRule(key.clone()));
            }
            let severity = parse_severity(key, setting.severity_token())?;
            effective.insert(
                key.clone(),
                RuleState {
                    severity,
                    options: setting.options().cloned().unwrap_or_default(),
                },
            );
        }
    }

    effective.retain(|_, state| state.severity != Severity::Off);

    for (id, state) in &effective {
        validate_options(id, state, registry)?;
    }

    let files = compile_globs(&file_globs)?;
    let excluded = compile_globs(&excluded_globs)?;

    Ok(Resolution {
        config: ResolvedConfig {
            base_path: base_path.to_path_buf(),
            parser,
            effective,
            file_globs,
            excluded_globs,
            files,
            excluded,
        },
        notices,
    })
}

fn expand_presets<'c>(
    config: &'c Config,
    presets: &'c PresetCatalog,
    layers: &mut Vec<&'c Config>,
    in_progress: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> Result<(), ConfigError> {
    for name in &config.extends {
        if in_progress.iter().any(|n| n == name) {
            return Err(ConfigError::CyclicExtends(name.clone()));
        }
        if !seen.insert(name.clone()) {
            continue;
        }
        let preset = presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.clone()))?;
        in_progress.push(name.clone());
        expand_presets(preset, presets, layers, in_progress, seen)?;
        in_progress.pop();
        layers.push(preset);
    }
    Ok(())
}

fn apply_category(
    key: &str,
    setting: &RuleSetting,
    registry: &RuleRegistry,
    effective: &mut BTreeMap<String, RuleState>,
    tolerant: bool,
    notices: &mut Vec<Issue>,
    base_path: &Path,
) -> Result<(), ConfigError> {
    let category = match Category::from_prefix(key) {
        Some(c) if !c.is_reserved() => c,
        _ => {
            if tolerant {
                notices.push(unknown_rule_notice(key, base_path));
                return Ok(());
            }
            return Err(ConfigError::UnknownRule(key.to_string()));
        }
    };
    if setting.options().is_some() {
        return Err(ConfigError::BadOptions {
            rule_id: key.to_string(),
            reason: "options cannot be set on a whole category".to_string(),
        });
    }
    let severity = parse_severity(key, setting.severity_token())?;
    for id in registry.ids_in(category) {
        effective.insert(
            id.to_string(),
            RuleState {
                severity,
                options: BTreeMap::new(),
            },
        );
    }
    Ok(())
}

fn parse_severity(key: &str, token: &str) -> Result<Severity, ConfigError> {
    token.parse().map_err(|_| ConfigError::BadSeverity {
        key: key.to_string(),
        value: token.to_string(),
    })
}

fn validate_options(
    id: &str,
    state: &RuleState,
    registry: &RuleRegistry,
) -> Result<(), ConfigError> {
    let Some(rule) = registry.get(id) else {
        return Ok(());
    };
    let specs = rule.metadata().options;
    for (key, value) in &state.options {
        match specs.iter().find(|s| s.key == key.as_str()) {
            None => {
                return Err(ConfigError::BadOptions {
                    rule_id: id.to_string(),
                    reason: format!("unknown option `{}`", key),
                });
            }
            Some(spec) if !spec.kind.admits(value) => {
                return Err(ConfigError::BadOptions {
                    rule_id: id.to_string(),
                    reason: format!("option `{}` expects a {}", key, spec.kind.name()),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn last_set<'c>(layers: &[&'c Config], get: impl Fn(&'c Config) -> Option<&'c Vec<String>>) -> Vec<String> {
    layers
        .iter()
        .filter_map(|l| get(l))
        .next_back()
        .cloned()
        .unwrap_or_default()
}

fn compile_globs(patterns: &[String]) -> Result<Vec<glob::Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| ConfigError::BadGlob {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

fn unknown_rule_notice(key: &str, base_path: &Path) -> Issue {
    Issue {
        rule_id: UNKNOWN_RULE_ID.to_string(),
        category: Category::Engine,
        severity: Severity::Warning,
        message: format!("unknown rule `{}` in configuration; entry dropped", key),
        file: base_path.to_path_buf(),
        span: Span::file_start(),
        suggestion: None,
        data: None,
    }
}
