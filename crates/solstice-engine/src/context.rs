//! Per-file analysis context.
//!
//! One `LintContext` is created per file, owned by the driver, and borrowed
//! by one rule at a time; interior mutability keeps the rule-facing API
//! `&self`. After the driver finishes, the context is consumed and its issue
//! list extracted — nothing escapes it.

use crate::diagnostics::{Category, Issue, Severity};
use crate::registry::RuleRegistry;
use crate::resolve::ResolvedConfig;
use serde::de::DeserializeOwned;
use solstice_ast::{LineIndex, NodeId, Span, SyntaxTree};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Optional fields for [`LintContext::report_with`].
#[derive(Debug, Default)]
pub struct ReportExtras {
    /// Severity hint. The emitted severity is `min(hint, effective)`: a rule
    /// may downgrade a secondary finding but never exceed the user's ceiling.
    pub severity: Option<Severity>,
    pub suggestion: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Working state shared with rules while one file is analyzed.
pub struct LintContext<'a> {
    file: &'a Path,
    source: &'a str,
    tree: &'a SyntaxTree,
    line_index: LineIndex,
    config: &'a ResolvedConfig,
    registry: &'a RuleRegistry,
    issues: RefCell<Vec<Issue>>,
    memo: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl<'a> LintContext<'a> {
    pub fn new(
        file: &'a Path,
        source: &'a str,
        tree: &'a SyntaxTree,
        config: &'a ResolvedConfig,
        registry: &'a RuleRegistry,
    ) -> Self {
        Self {
            file,
            source,
            tree,
            line_index: LineIndex::new(source),
            config,
            registry,
            issues: RefCell::new(Vec::new()),
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn file(&self) -> &Path {
        self.file
    }

    pub fn source_text(&self) -> &str {
        self.source
    }

    /// Text of a 1-based source line.
    pub fn source_line(&self, line: u32) -> Option<&str> {
        self.line_index.line_text(self.source, line)
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Root of the adapted syntax tree.
    pub fn ast(&self) -> &SyntaxTree {
        self.tree
    }

    /// Source text covered by a node.
    pub fn text(&self, node: NodeId) -> &str {
        self.tree.text(self.source, node)
    }

    pub fn config(&self) -> &ResolvedConfig {
        self.config
    }

    /// Report an issue at the rule's effective severity.
    pub fn report(&self, rule_id: &str, span: Span, message: impl Into<String>) {
        self.report_with(rule_id, span, message, ReportExtras::default());
    }

    /// Report an issue with a severity hint, suggestion, or attached data.
    pub fn report_with(
        &self,
        rule_id: &str,
        span: Span,
        message: impl Into<String>,
        extras: ReportExtras,
    ) {
        let Some(effective) = self.config.severity_of(rule_id) else {
            return;
        };
        let severity = extras.severity.map_or(effective, |hint| hint.min(effective));
        if severity == Severity::Off {
            return;
        }
        let Some(category) = self.category_of(rule_id) else {
            return;
        };
        self.issues.borrow_mut().push(Issue {
            rule_id: rule_id.to_string(),
            category,
            severity,
            message: message.into(),
            file: self.file.to_path_buf(),
            span,
            suggestion: extras.suggestion,
            data: extras.data,
        });
    }

    fn category_of(&self, rule_id: &str) -> Option<Category> {
        if let Some(rule) = self.registry.get(rule_id) {
            return Some(rule.metadata().category);
        }
        rule_id
            .split_once('/')
            .and_then(|(prefix, _)| Category::from_prefix(prefix))
    }

    /// A per-rule option from the resolved config, deserialized to `T`.
    pub fn option<T: DeserializeOwned>(&self, rule_id: &str, key: &str) -> Option<T> {
        let value = self.config.option(rule_id, key)?.clone();
        serde_json::from_value(value).ok()
    }

    /// A per-rule option with a fallback default.
    pub fn option_or<T: DeserializeOwned>(&self, rule_id: &str, key: &str, default: T) -> T {
        self.option(rule_id, key).unwrap_or(default)
    }

    /// Memoized per-rule intermediate state, shared across a rule's visits
    /// within this file. Keyed by rule id; dies with the context.
    pub fn memo<T, F>(&self, rule_id: &str, build: F) -> Rc<T>
    where
        T: Any,
        F: FnOnce(&Self) -> T,
    {
        let cached = self.memo.borrow().get(rule_id).cloned();
        if let Some(value) = cached {
            if let Ok(typed) = value.downcast::<T>() {
                return typed;
            }
        }
        let value = Rc::new(build(self));
        self.memo
            .borrow_mut()
            .insert(rule_id.to_string(), value.clone() as Rc<dyn Any>);
        value
    }

    /// Issues reported so far, in emission order.
    pub fn issues(&self) -> std::cell::Ref<'_, [Issue]> {
        std::cell::Ref::map(self.issues.borrow(), |v| v.as_slice())
    }

    pub fn issue_count(&self) -> usize {
        self.issues.borrow().len()
    }

    /// Consume the context, yielding issues in emission order.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues.into_inner()
    }

    /// Driver-side: drop everything a crashed rule contributed.
    pub(crate) fn purge_rule(&self, rule_id: &str) {
        self.issues.borrow_mut().retain(|i| i.rule_id != rule_id);
    }

    /// Driver-side: synthetic issues bypass the effective-severity lookup.
    pub(crate) fn push_synthetic(&self, issue: Issue) {
        self.issues.borrow_mut().push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PresetCatalog, RuleSetting};
    use crate::resolve::resolve;
    use crate::rule::{Rule, RuleMetadata};
    use solstice_ast::{NodeTag, Position, TreeBuilder};
    use std::sync::Arc;

    struct Dummy(&'static RuleMetadata);
    impl Rule for Dummy {
        fn metadata(&self) -> &'static RuleMetadata {
            self.0
        }
    }

    static META: RuleMetadata = RuleMetadata {
        id: "lint/sample",
        category: Category::Lint,
        default_severity: Severity::Warning,
        title: "Sample",
        description: "",
        recommendation: "",
        tags: &[],
        options: &[],
    };

    fn registry() -> RuleRegistry {
        let mut r = RuleRegistry::new();
        r.register(Arc::new(Dummy(&META))).unwrap();
        r
    }

    fn config_for(registry: &RuleRegistry, severity: &str) -> ResolvedConfig {
        let mut config = Config::default();
        config.rules.insert(
            "lint/sample".to_string(),
            RuleSetting::Severity(severity.to_string()),
        );
        resolve(&config, &PresetCatalog::new(), registry, Path::new("."))
            .unwrap()
            .config
    }

    fn tiny_tree() -> SyntaxTree {
        let mut b = TreeBuilder::new();
        b.push(
            NodeTag::SourceUnit,
            "source_file",
            Span::new(Position::new(1, 1, 0), Position::new(1, 6, 5)),
            None,
        );
        b.build()
    }

    #[test]
    fn report_uses_effective_severity() {
        let registry = registry();
        let config = config_for(&registry, "error");
        let tree = tiny_tree();
        let ctx = LintContext::new(Path::new("a.sol"), "x = 1", &tree, &config, &registry);

        ctx.report("lint/sample", Span::file_start(), "finding");

        let issues = ctx.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].category, Category::Lint);
    }

    #[test]
    fn severity_hint_is_capped_not_escalated() {
        let registry = registry();
        let config = config_for(&registry, "warning");
        let tree = tiny_tree();
        let ctx = LintContext::new(Path::new("a.sol"), "x = 1", &tree, &config, &registry);

        ctx.report_with(
            "lint/sample",
            Span::file_start(),
            "escalation attempt",
            ReportExtras {
                severity: Some(Severity::Error),
                ..Default::default()
            },
        );
        ctx.report_with(
            "lint/sample",
            Span::file_start(),
            "secondary note",
            ReportExtras {
                severity: Some(Severity::Info),
                ..Default::default()
            },
        );

        let issues = ctx.into_issues();
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[1].severity, Severity::Info);
    }

    #[test]
    fn inactive_rules_cannot_report() {
        let registry = registry();
        let config = config_for(&registry, "off");
        let tree = tiny_tree();
        let ctx = LintContext::new(Path::new("a.sol"), "x = 1", &tree, &config, &registry);

        ctx.report("lint/sample", Span::file_start(), "should vanish");
        assert_eq!(ctx.issue_count(), 0);
    }

    #[test]
    fn memo_builds_once() {
        let registry = registry();
        let config = config_for(&registry, "warning");
        let tree = tiny_tree();
        let ctx = LintContext::new(Path::new("a.sol"), "x = 1", &tree, &config, &registry);

        let mut builds = 0;
        for _ in 0..3 {
            let value: Rc<u32> = ctx.memo("lint/sample", |_| {
                builds += 1;
                7
            });
            assert_eq!(*value, 7);
        }
        assert_eq!(builds, 1);
    }
}
