//! Best-practice rules.

use super::file_version_req;
use solstice_ast::{ContractKind, NodeId, NodeTag};
use solstice_engine::{Category, LintContext, Rule, RuleMetadata, Severity};
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(CustomErrors),
        Arc::new(ExplicitTypes),
        Arc::new(OneContractPerFile),
    ]
}

/// Revert strings on compilers that support custom errors.
struct CustomErrors;

static CUSTOM_ERRORS: RuleMetadata = RuleMetadata {
    id: "best-practices/custom-errors",
    category: Category::BestPractices,
    default_severity: Severity::Info,
    title: "Revert string instead of custom error",
    description: "Custom errors (Solidity 0.8.4+) are cheaper to deploy and \
                  to revert with than string messages, and carry typed data.",
    recommendation: "Define `error` types and use `revert MyError()` instead \
                     of `require(cond, \"message\")`.",
    tags: &["gas", "errors"],
    options: &[],
};

impl Rule for CustomErrors {
    fn metadata(&self) -> &'static RuleMetadata {
        &CUSTOM_ERRORS
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionCall]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let req = file_version_req(ctx, CUSTOM_ERRORS.id);
        let supported = req.as_ref().as_ref().is_some_and(|r| r.at_least(0, 8, 4));
        if !supported {
            return;
        }

        let tree = ctx.ast();
        let Some(&callee) = tree.children(node).first() else {
            return;
        };
        if tree.tag(callee) != NodeTag::Identifier
            || !matches!(ctx.text(callee), "require" | "revert")
        {
            return;
        }
        let has_string_arg = tree
            .find(node, NodeTag::Literal)
            .into_iter()
            .any(|l| ctx.text(l).starts_with('"') || ctx.text(l).starts_with('\''));
        if has_string_arg {
            ctx.report(
                CUSTOM_ERRORS.id,
                tree.span(node),
                format!("use a custom error instead of a `{}` string", ctx.text(callee)),
            );
        }
    }
}

/// Bare `uint`/`int` aliases.
struct ExplicitTypes;

static EXPLICIT_TYPES: RuleMetadata = RuleMetadata {
    id: "best-practices/explicit-types",
    category: Category::BestPractices,
    default_severity: Severity::Info,
    title: "Implicit integer width",
    description: "`uint` and `int` are aliases for the 256-bit forms; the \
                  alias hides width from readers and ABI tooling.",
    recommendation: "Spell out `uint256` / `int256`.",
    tags: &["style"],
    options: &[],
};

impl Rule for ExplicitTypes {
    fn metadata(&self) -> &'static RuleMetadata {
        &EXPLICIT_TYPES
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::TypeName]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        if matches!(text, "uint" | "int") {
            ctx.report(
                EXPLICIT_TYPES.id,
                ctx.ast().span(node),
                format!("use `{}256` instead of `{}`", text, text),
            );
        }
    }
}

/// More than one concrete contract in a file.
struct OneContractPerFile;

static ONE_CONTRACT_PER_FILE: RuleMetadata = RuleMetadata {
    id: "best-practices/one-contract-per-file",
    category: Category::BestPractices,
    default_severity: Severity::Info,
    title: "Multiple contracts in one file",
    description: "One contract per file keeps imports, licensing, and \
                  verification tooling simple. Interfaces and libraries are \
                  exempt.",
    recommendation: "Split each contract into its own file.",
    tags: &["style"],
    options: &[],
};

impl Rule for OneContractPerFile {
    fn metadata(&self) -> &'static RuleMetadata {
        &ONE_CONTRACT_PER_FILE
    }

    fn analyze(&self, ctx: &LintContext) {
        let tree = ctx.ast();
        let contracts: Vec<NodeId> = tree
            .find(tree.root(), NodeTag::ContractDefinition)
            .into_iter()
            .filter(|&c| tree.contract_kind(c) == Some(ContractKind::Contract))
            .collect();
        for &extra in contracts.iter().skip(1) {
            let name = tree.name_of(ctx.source_text(), extra).unwrap_or("<anonymous>");
            ctx.report(
                ONE_CONTRACT_PER_FILE.id,
                tree.span(extra),
                format!("contract `{}` should live in its own file", name),
            );
        }
    }
}
