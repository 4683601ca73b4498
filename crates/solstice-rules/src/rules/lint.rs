//! General lint rules.

use super::brace_body;
use crate::version::VersionReq;
use solstice_ast::{NodeId, NodeTag, Position, Span};
use solstice_engine::{
    Category, LintContext, OptionKind, OptionSpec, ReportExtras, Rule, RuleMetadata, Severity,
};
use std::cell::Cell;
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(CompilerVersion),
        Arc::new(NoEmptyBlocks),
        Arc::new(Quotes),
        Arc::new(MaxLineLength),
        Arc::new(NoConsole),
    ]
}

/// Flags exact compiler pins and missing pragmas.
///
/// Runs both ways: the visitor inspects each pragma directive, and the
/// finalize pass reports files that declare contracts without any
/// `pragma solidity` at all.
struct CompilerVersion;

static COMPILER_VERSION: RuleMetadata = RuleMetadata {
    id: "lint/compiler-version",
    category: Category::Lint,
    default_severity: Severity::Warning,
    title: "Compiler version pragma",
    description: "Exact pins block security patch releases; a missing pragma \
                  lets any compiler build the file.",
    recommendation: "Declare a range such as `^0.8.0`.",
    tags: &["pragma"],
    options: &[],
};

impl Rule for CompilerVersion {
    fn metadata(&self) -> &'static RuleMetadata {
        &COMPILER_VERSION
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::PragmaDirective]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        let Some(req) = VersionReq::parse(text) else {
            return;
        };
        let seen = ctx.memo::<Cell<bool>, _>(COMPILER_VERSION.id, |_| Cell::new(false));
        seen.set(true);
        if req.is_exact_pin() {
            ctx.report(
                COMPILER_VERSION.id,
                ctx.ast().span(node),
                "Exact compiler version pinned; prefer a range such as ^0.8.0 so patch \
                 releases with security fixes are not excluded",
            );
        }
    }

    fn analyze(&self, ctx: &LintContext) {
        let seen = ctx.memo::<Cell<bool>, _>(COMPILER_VERSION.id, |_| Cell::new(false));
        if seen.get() {
            return;
        }
        let tree = ctx.ast();
        if tree.find(tree.root(), NodeTag::ContractDefinition).is_empty() {
            return;
        }
        ctx.report(
            COMPILER_VERSION.id,
            Span::file_start(),
            "missing `pragma solidity` version declaration",
        );
    }
}

/// Empty contract and function bodies.
struct NoEmptyBlocks;

static NO_EMPTY_BLOCKS: RuleMetadata = RuleMetadata {
    id: "lint/no-empty-blocks",
    category: Category::Lint,
    default_severity: Severity::Warning,
    title: "Empty block",
    description: "An empty body is either unfinished work or dead surface.",
    recommendation: "Implement the body or remove the declaration.",
    tags: &[],
    options: &[],
};

impl Rule for NoEmptyBlocks {
    fn metadata(&self) -> &'static RuleMetadata {
        &NO_EMPTY_BLOCKS
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ContractDefinition, NodeTag::FunctionDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        match tree.tag(node) {
            NodeTag::ContractDefinition => {
                if brace_body(ctx.text(node)) == Some("") {
                    ctx.report(NO_EMPTY_BLOCKS.id, tree.span(node), "empty contract body");
                }
            }
            NodeTag::FunctionDefinition => {
                let Some(body) = tree.child_tagged(node, NodeTag::Block) else {
                    return;
                };
                if brace_body(ctx.text(body)) == Some("") {
                    ctx.report(NO_EMPTY_BLOCKS.id, tree.span(body), "empty function body");
                }
            }
            _ => {}
        }
    }
}

/// String literals should use double quotes.
struct Quotes;

static QUOTES: RuleMetadata = RuleMetadata {
    id: "lint/quotes",
    category: Category::Lint,
    default_severity: Severity::Info,
    title: "String quote style",
    description: "The Solidity style guide uses double-quoted strings.",
    recommendation: "Replace single quotes with double quotes.",
    tags: &["style"],
    options: &[],
};

impl Rule for Quotes {
    fn metadata(&self) -> &'static RuleMetadata {
        &QUOTES
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::Literal]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        if !tree.kind(node).contains("string") || !ctx.text(node).starts_with('\'') {
            return;
        }
        // Grammars nest a string node inside the literal; report the
        // outermost one only.
        let nested = tree
            .parent(node)
            .is_some_and(|p| tree.kind(p).contains("string"));
        if nested {
            return;
        }
        let text = ctx.text(node);
        let suggestion = text
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
            .map(|inner| format!("\"{}\"", inner));
        ctx.report_with(
            QUOTES.id,
            tree.span(node),
            "use double quotes for string literals",
            ReportExtras {
                suggestion,
                ..Default::default()
            },
        );
    }
}

/// Line length limit, configurable via `max`.
struct MaxLineLength;

static MAX_LINE_LENGTH: RuleMetadata = RuleMetadata {
    id: "lint/max-line-length",
    category: Category::Lint,
    default_severity: Severity::Info,
    title: "Line too long",
    description: "Long lines are hard to review side by side.",
    recommendation: "Wrap the line.",
    tags: &["style"],
    options: &[OptionSpec {
        key: "max",
        kind: OptionKind::Integer,
        doc: "maximum allowed line length in characters (default 120)",
    }],
};

impl Rule for MaxLineLength {
    fn metadata(&self) -> &'static RuleMetadata {
        &MAX_LINE_LENGTH
    }

    fn analyze(&self, ctx: &LintContext) {
        let max: usize = ctx.option_or(MAX_LINE_LENGTH.id, "max", 120);
        let mut offset = 0u32;
        for (idx, line) in ctx.source_text().split('\n').enumerate() {
            let width = line.trim_end_matches('\r').chars().count();
            if width > max {
                let line_no = idx as u32 + 1;
                let span = Span::new(
                    Position::new(line_no, 1, offset),
                    Position::new(line_no, line.len() as u32 + 1, offset + line.len() as u32),
                );
                ctx.report(
                    MAX_LINE_LENGTH.id,
                    span,
                    format!("line is {} characters, limit is {}", width, max),
                );
            }
            offset += line.len() as u32 + 1;
        }
    }
}

/// Development console artifacts left in the source.
struct NoConsole;

static NO_CONSOLE: RuleMetadata = RuleMetadata {
    id: "lint/no-console",
    category: Category::Lint,
    default_severity: Severity::Warning,
    title: "Console artifact",
    description: "`console.sol` imports and `console.log` calls are debug \
                  tooling and must not reach production bytecode.",
    recommendation: "Remove console imports and calls before deployment.",
    tags: &["debug"],
    options: &[],
};

impl Rule for NoConsole {
    fn metadata(&self) -> &'static RuleMetadata {
        &NO_CONSOLE
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ImportDirective, NodeTag::MemberAccess]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        match tree.tag(node) {
            NodeTag::ImportDirective => {
                if ctx.text(node).contains("console") {
                    ctx.report(NO_CONSOLE.id, tree.span(node), "remove console import");
                }
            }
            NodeTag::MemberAccess => {
                if super::object_name(ctx, node) == Some("console") {
                    ctx.report(NO_CONSOLE.id, tree.span(node), "remove console call");
                }
            }
            _ => {}
        }
    }
}
