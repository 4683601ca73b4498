//! Rule driver.
//!
//! Per file: parse, build a context, run whole-tree-only rules, make one
//! traversal dispatching nodes to every interested rule, then run the
//! finalize pass of visitor rules. The dispatch table is inverted from the
//! active ruleset once per `Linter` and reused for every file, so traversal
//! cost does not grow with rule count.
//!
//! A rule that panics is contained: its partial issues are purged, the
//! remaining rules still run, and the file gains one `engine/rule-crashed`
//! issue. Cancellation and the per-file wall-clock budget are checked
//! between rule invocations; there is no early stop on findings.

use crate::context::LintContext;
use crate::diagnostics::{Category, Issue, Severity};
use crate::error::{EngineError, ParseError};
use crate::registry::RuleRegistry;
use crate::report::{FileReport, sort_issues};
use crate::resolve::ResolvedConfig;
use crate::rule::Rule;
use crate::{FILE_TIMEOUT_ID, PARSER_MISSING_TOKEN_ID, PARSER_SYNTAX_ERROR_ID, RULE_CRASHED_ID};
use solstice_ast::{NodeId, NodeTag, Span, SyntaxTree};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Caller-supplied cancellation flag, shareable across workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-run resource limits.
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    pub cancel: CancelToken,
    /// Wall-clock budget per file. On expiry the file is abandoned with an
    /// `engine/file-timeout` issue and the run moves on.
    pub file_budget: Option<Duration>,
}

struct ActiveRule {
    id: &'static str,
    rule: Arc<dyn Rule>,
    has_visitors: bool,
}

/// A resolved-config-plus-registry pair, ready to lint files.
///
/// Immutable and `Sync`: one `Linter` may serve many files in parallel, one
/// context per file.
pub struct Linter {
    registry: Arc<RuleRegistry>,
    config: Arc<ResolvedConfig>,
    active: Vec<ActiveRule>,
    dispatch: HashMap<NodeTag, Vec<usize>>,
}

impl Linter {
    /// Build the dispatch plan for a resolved config. The active set is the
    /// registry filtered to the config's effective rules, in lexicographic
    /// id order; per-tag visitor lists inherit that order.
    pub fn new(registry: Arc<RuleRegistry>, config: Arc<ResolvedConfig>) -> Self {
        let mut active = Vec::new();
        for rule in registry.iter() {
            let id = rule.metadata().id;
            if config.is_active(id) {
                active.push(ActiveRule {
                    id,
                    rule: rule.clone(),
                    has_visitors: !rule.interests().is_empty(),
                });
            }
        }

        let mut dispatch: HashMap<NodeTag, Vec<usize>> = HashMap::new();
        for (idx, entry) in active.iter().enumerate() {
            for &tag in entry.rule.interests() {
                dispatch.entry(tag).or_default().push(idx);
            }
        }

        Self {
            registry,
            config,
            active,
            dispatch,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Ids of the rules this linter will actually invoke.
    pub fn active_rule_ids(&self) -> Vec<&'static str> {
        self.active.iter().map(|r| r.id).collect()
    }

    /// Analyze one file's source text.
    ///
    /// Returns `Err` only for non-tolerant parse failures; everything found
    /// during analysis is converted into issues in the `FileReport`.
    pub fn lint_source(
        &self,
        file: &Path,
        source: &str,
        limits: &RunLimits,
    ) -> Result<FileReport, EngineError> {
        let parsed = solstice_ast::parse(source).map_err(|e| EngineError::Parser(e.to_string()))?;

        let mut issues: Vec<Issue> = Vec::new();
        if !parsed.diagnostics.is_empty() {
            if !self.config.parser().tolerant {
                let first = &parsed.diagnostics[0];
                return Err(EngineError::Parse(ParseError {
                    file: file.to_path_buf(),
                    line: first.span.start.line,
                    message: first.message.clone(),
                }));
            }
            for diag in &parsed.diagnostics {
                let rule_id = if diag.message.starts_with("missing") {
                    PARSER_MISSING_TOKEN_ID
                } else {
                    PARSER_SYNTAX_ERROR_ID
                };
                issues.push(synthetic(rule_id, Category::Parser, file, diag.span, &diag.message));
            }
        }

        let ctx = LintContext::new(file, source, &parsed.tree, &self.config, &self.registry);
        let mut run = FileRun {
            linter: self,
            ctx,
            dead: vec![false; self.active.len()],
            deadline: limits.file_budget.map(|budget| Instant::now() + budget),
            cancel: limits.cancel.clone(),
            stop: None,
        };
        run.execute(&parsed.tree);

        let stop = run.stop;
        if matches!(stop, Some(Stop::Timeout)) {
            run.ctx.push_synthetic(synthetic(
                FILE_TIMEOUT_ID,
                Category::Engine,
                file,
                Span::file_start(),
                "per-file time budget exceeded; analysis of this file was aborted",
            ));
        }

        issues.extend(run.ctx.into_issues());
        sort_issues(&mut issues);

        Ok(FileReport {
            issues,
            partial: matches!(stop, Some(Stop::Canceled)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Canceled,
    Timeout,
}

/// Mutable driver state for one file.
struct FileRun<'a> {
    linter: &'a Linter,
    ctx: LintContext<'a>,
    dead: Vec<bool>,
    deadline: Option<Instant>,
    cancel: CancelToken,
    stop: Option<Stop>,
}

impl<'a> FileRun<'a> {
    fn execute(&mut self, tree: &SyntaxTree) {
        // Whole-tree-only rules run before traversal.
        for idx in 0..self.linter.active.len() {
            if self.linter.active[idx].has_visitors {
                continue;
            }
            if self.check_limits() {
                return;
            }
            self.invoke_analyze(idx);
        }

        self.visit(tree, tree.root());
        if self.stop.is_some() {
            return;
        }

        // Finalize pass for rules that also registered visitors.
        for idx in 0..self.linter.active.len() {
            if !self.linter.active[idx].has_visitors || self.dead[idx] {
                continue;
            }
            if self.check_limits() {
                return;
            }
            self.invoke_analyze(idx);
        }
    }

    fn visit(&mut self, tree: &SyntaxTree, node: NodeId) {
        if let Some(indices) = self.linter.dispatch.get(&tree.tag(node)) {
            for &idx in indices {
                if self.dead[idx] {
                    continue;
                }
                if self.check_limits() {
                    return;
                }
                self.invoke_visit(idx, node);
            }
        }
        for &child in tree.children(node) {
            if self.stop.is_some() {
                return;
            }
            self.visit(tree, child);
        }
    }

    /// True when the run must stop. Checked between rule invocations; a
    /// rule's single call never observes cancellation.
    fn check_limits(&mut self) -> bool {
        if self.stop.is_some() {
            return true;
        }
        if self.cancel.is_canceled() {
            self.stop = Some(Stop::Canceled);
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stop = Some(Stop::Timeout);
                return true;
            }
        }
        false
    }

    fn invoke_visit(&mut self, idx: usize, node: NodeId) {
        let entry = &self.linter.active[idx];
        let result = catch_unwind(AssertUnwindSafe(|| entry.rule.visit(&self.ctx, node)));
        if let Err(payload) = result {
            self.bury(idx, payload);
        }
    }

    fn invoke_analyze(&mut self, idx: usize) {
        let entry = &self.linter.active[idx];
        let result = catch_unwind(AssertUnwindSafe(|| entry.rule.analyze(&self.ctx)));
        if let Err(payload) = result {
            self.bury(idx, payload);
        }
    }

    /// Contain a crashed rule: discard its partial issues, stop invoking it,
    /// and record the crash as a synthetic error issue.
    fn bury(&mut self, idx: usize, payload: Box<dyn std::any::Any + Send>) {
        let id = self.linter.active[idx].id;
        self.dead[idx] = true;
        self.ctx.purge_rule(id);
        self.ctx.push_synthetic(synthetic(
            RULE_CRASHED_ID,
            Category::Engine,
            self.ctx.file(),
            Span::file_start(),
            &format!("rule `{}` crashed: {}", id, panic_message(&payload)),
        ));
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn synthetic(rule_id: &str, category: Category, file: &Path, span: Span, message: &str) -> Issue {
    Issue {
        rule_id: rule_id.to_string(),
        category,
        severity: Severity::Error,
        message: message.to_string(),
        file: file.to_path_buf(),
        span,
        suggestion: None,
        data: None,
    }
}
