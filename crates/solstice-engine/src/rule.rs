//! The rule contract.
//!
//! A rule is a metadata record plus an analyze entry point. Rules declare
//! which node tags their visitor wants at construction; the driver inverts
//! those declarations into a dispatch table so rule count does not change
//! traversal cost.

use crate::context::LintContext;
use crate::diagnostics::{Category, Severity};
use solstice_ast::{NodeId, NodeTag};

/// Immutable description of a rule.
#[derive(Debug, Clone)]
pub struct RuleMetadata {
    /// Globally unique id of the form `category/short-name`. The prefix must
    /// equal the kebab-cased `category`.
    pub id: &'static str,
    pub category: Category,
    pub default_severity: Severity,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub tags: &'static [&'static str],
    /// User-configurable knobs, validated at config-resolution time.
    pub options: &'static [OptionSpec],
}

/// Declared shape of one per-rule option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub doc: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Integer,
    String,
    StringList,
}

impl OptionKind {
    /// Whether a configured value has this shape.
    pub fn admits(&self, value: &serde_json::Value) -> bool {
        match self {
            OptionKind::Bool => value.is_boolean(),
            OptionKind::Integer => value.is_u64() || value.is_i64(),
            OptionKind::String => value.is_string(),
            OptionKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(serde_json::Value::is_string)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OptionKind::Bool => "bool",
            OptionKind::Integer => "integer",
            OptionKind::String => "string",
            OptionKind::StringList => "string list",
        }
    }
}

/// An analysis rule.
///
/// Implementations provide at least one of the two entry styles:
/// - a visitor: declare tags in `interests` and implement `visit`, called
///   for every matching node during the driver's single traversal;
/// - a whole-tree pass: implement `analyze`. For rules without interests it
///   runs before traversal; for visitor rules it runs after traversal as a
///   finalize hook.
///
/// Rules are side-effect-only: they write issues through
/// [`LintContext::report`] and return nothing. They must not retain
/// references to the context beyond the call that received it, and they must
/// be `Send + Sync` so independent files can be analyzed in parallel.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &'static RuleMetadata;

    /// Node tags this rule's visitor wants. Empty means whole-tree only.
    fn interests(&self) -> &'static [NodeTag] {
        &[]
    }

    /// Per-node visitor entry.
    fn visit(&self, _ctx: &LintContext, _node: NodeId) {}

    /// Whole-tree entry.
    fn analyze(&self, _ctx: &LintContext) {}
}
