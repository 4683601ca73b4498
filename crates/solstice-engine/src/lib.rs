//! Rule-engine core for solstice.
//!
//! This crate is the framework the analysis rules plug into:
//! - the diagnostic model (`Severity`, `Category`, `Issue`)
//! - the rule contract and registry (`Rule`, `RuleMetadata`, `RuleRegistry`)
//! - the configuration resolver (`Config` + `PresetCatalog` -> `ResolvedConfig`)
//! - the per-file analysis context rules report through (`LintContext`)
//! - the driver that walks a file's tree once and dispatches nodes to every
//!   interested rule (`Linter`)
//! - report assembly (`FileReport`, `Report`)
//!
//! The Solidity parser itself lives in `solstice-ast`; rule bodies live in
//! `solstice-rules`. Nothing in this crate is Solidity-rule-specific beyond
//! the node tag vocabulary.

mod config;
mod context;
mod diagnostics;
mod driver;
mod error;
mod registry;
mod report;
mod resolve;
mod rule;

pub use config::{Config, ParserSettings, PresetCatalog, RuleSetting, SourceType};
pub use context::{LintContext, ReportExtras};
pub use diagnostics::{Category, Issue, Severity};
pub use driver::{CancelToken, Linter, RunLimits};
pub use error::{ConfigError, EngineError, ParseError, RegistryError};
pub use registry::RuleRegistry;
pub use report::{FileReport, Report, SeverityCounts, sort_issues};
pub use resolve::{Resolution, ResolvedConfig, RuleState, resolve};
pub use rule::{OptionKind, OptionSpec, Rule, RuleMetadata};

/// Rule id of the synthetic issue emitted when a rule panics.
pub const RULE_CRASHED_ID: &str = "engine/rule-crashed";
/// Rule id of the synthetic issue emitted when a file exceeds its budget.
pub const FILE_TIMEOUT_ID: &str = "engine/file-timeout";
/// Rule id of the notice emitted for unknown rules in tolerant mode.
pub const UNKNOWN_RULE_ID: &str = "engine/unknown-rule";
/// Rule id family for parser diagnostics surfaced as issues.
pub const PARSER_SYNTAX_ERROR_ID: &str = "parser/syntax-error";
pub const PARSER_MISSING_TOKEN_ID: &str = "parser/missing-token";
