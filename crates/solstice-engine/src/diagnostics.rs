//! Severity, category, and issue records.

use serde::{Deserialize, Serialize};
use solstice_ast::Span;
use std::path::PathBuf;

/// Severity of a rule or issue. Totally ordered so callers can threshold:
/// `Off < Info < Warning < Error`. `Off` means "do not emit" and never
/// appears on an emitted issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Info,
    #[default]
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Off => write!(f, "off"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Severity::Off),
            "info" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Family a rule belongs to. The prefix of a rule id is the kebab-cased
/// category name (`security/tx-origin`, `code-quality/code-complexity`).
///
/// `Parser` and `Engine` are reserved for synthetic diagnostics emitted by
/// the core itself (`parser/syntax-error`, `engine/rule-crashed`); rules
/// cannot be registered under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Security,
    Lint,
    BestPractices,
    CodeQuality,
    Naming,
    GasOptimization,
    Parser,
    Engine,
}

impl Category {
    /// Kebab-cased id prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::Lint => "lint",
            Category::BestPractices => "best-practices",
            Category::CodeQuality => "code-quality",
            Category::Naming => "naming",
            Category::GasOptimization => "gas-optimization",
            Category::Parser => "parser",
            Category::Engine => "engine",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "security" => Some(Category::Security),
            "lint" => Some(Category::Lint),
            "best-practices" => Some(Category::BestPractices),
            "code-quality" => Some(Category::CodeQuality),
            "naming" => Some(Category::Naming),
            "gas-optimization" => Some(Category::GasOptimization),
            "parser" => Some(Category::Parser),
            "engine" => Some(Category::Engine),
            _ => None,
        }
    }

    /// Categories rules may register under.
    pub fn user_categories() -> &'static [Category] {
        &[
            Category::Security,
            Category::Lint,
            Category::BestPractices,
            Category::CodeQuality,
            Category::Naming,
            Category::GasOptimization,
        ]
    }

    /// Reserved for synthetic diagnostics from the core.
    pub fn is_reserved(&self) -> bool {
        matches!(self, Category::Parser | Category::Engine)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A single diagnostic emission.
///
/// `severity` is the effective severity for the rule on this file after
/// config resolution, never the rule's metadata default.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub rule_id: String,
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
