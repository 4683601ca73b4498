//! Analysis runner.
//!
//! Loads the project config, resolves it once, then fans analysis out over
//! files with rayon. Per-file work is strictly single-threaded; the linter
//! and resolved config are immutable and shared across workers.

use rayon::prelude::*;
use solstice_engine::{
    Config, ConfigError, FileReport, Linter, RegistryError, Report, Resolution, RunLimits, resolve,
};
use solstice_rules::{builtin_registry, presets};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Fatal setup failures; analysis never starts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Debug output categories.
#[derive(Debug, Default)]
pub struct DebugFlags {
    pub timing: bool,
}

impl DebugFlags {
    pub fn from_args(args: &[String]) -> Self {
        let all = args.iter().any(|s| s == "all");
        Self {
            timing: all || args.iter().any(|s| s == "timing"),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    /// Restrict the run to a single rule id.
    pub rule_filter: Option<String>,
    pub limits: RunLimits,
    pub debug: DebugFlags,
}

/// The outcome of one `check` invocation.
pub struct RunOutcome {
    pub report: Report,
    /// Files that could not be read or failed to parse under a
    /// non-tolerant config, with the reason.
    pub failed_files: Vec<(PathBuf, String)>,
    pub files_scanned: usize,
}

/// Locate the config file: explicit flag, project-root candidates, then
/// the user-global fallback.
pub fn find_config(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    for candidate in [".solstice.toml", "solstice.toml", ".solsticerc.json"] {
        let path = root.join(candidate);
        if path.is_file() {
            return Some(path);
        }
    }
    let global = dirs::config_dir()?.join("solstice").join("config.toml");
    global.is_file().then_some(global)
}

/// Load the effective user config. Without any config file, the tool runs
/// the `recommended` preset.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match find_config(root, explicit) {
        Some(path) => Config::from_path(&path),
        None => {
            let mut config = Config::default();
            config.extends = vec!["recommended".to_string()];
            Ok(config)
        }
    }
}

/// Analyze every Solidity file under `paths`.
pub fn run_check(paths: &[PathBuf], root: &Path, options: &RunOptions) -> Result<RunOutcome, RunError> {
    let start = Instant::now();

    let registry = Arc::new(builtin_registry()?);
    let config = load_config(root, options.config_path.as_deref())?;
    let Resolution {
        config: mut resolved,
        notices,
    } = resolve(&config, &presets::catalog(), &registry, root)?;
    if let Some(filter) = &options.rule_filter {
        resolved.retain_rules(|id| id == filter);
    }
    let resolved = Arc::new(resolved);
    let linter = Linter::new(registry, resolved.clone());

    let files = crate::walk::collect_sources(paths, &resolved);
    if options.debug.timing {
        eprintln!(
            "[timing] file collection: {:?} ({} files)",
            start.elapsed(),
            files.len()
        );
    }
    let lint_start = Instant::now();

    let results: Vec<(PathBuf, Result<FileReport, String>)> = files
        .par_iter()
        .map(|file| {
            if options.limits.cancel.is_canceled() {
                return (
                    file.clone(),
                    Ok(FileReport {
                        issues: Vec::new(),
                        partial: true,
                    }),
                );
            }
            let outcome = match std::fs::read_to_string(file) {
                Err(e) => Err(format!("failed to read: {}", e)),
                Ok(source) => linter
                    .lint_source(file, &source, &options.limits)
                    .map_err(|e| e.to_string()),
            };
            (file.clone(), outcome)
        })
        .collect();

    let mut report = Report::new();
    report.extend(notices);
    let mut failed_files = Vec::new();
    for (file, result) in results {
        match result {
            Ok(file_report) => report.merge(file_report),
            Err(reason) => failed_files.push((file, reason)),
        }
    }
    report.finish();

    if options.debug.timing {
        eprintln!(
            "[timing] analysis: {:?} ({} issues)",
            lint_start.elapsed(),
            report.issues.len()
        );
        eprintln!("[timing] total: {:?}", start.elapsed());
    }

    Ok(RunOutcome {
        report,
        failed_files,
        files_scanned: files.len(),
    })
}
