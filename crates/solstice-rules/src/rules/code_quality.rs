//! Code-quality metrics rules. All three take a `max` option.

use solstice_ast::{NodeId, NodeTag};
use solstice_engine::{
    Category, LintContext, OptionKind, OptionSpec, Rule, RuleMetadata, Severity,
};
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(FunctionMaxLines),
        Arc::new(MaxStatesCount),
        Arc::new(CodeComplexity),
    ]
}

struct FunctionMaxLines;

static FUNCTION_MAX_LINES: RuleMetadata = RuleMetadata {
    id: "code-quality/function-max-lines",
    category: Category::CodeQuality,
    default_severity: Severity::Info,
    title: "Function too long",
    description: "Long functions hide control flow and resist review.",
    recommendation: "Extract helpers until the function fits the limit.",
    tags: &["metrics"],
    options: &[OptionSpec {
        key: "max",
        kind: OptionKind::Integer,
        doc: "maximum function length in lines (default 50)",
    }],
};

impl Rule for FunctionMaxLines {
    fn metadata(&self) -> &'static RuleMetadata {
        &FUNCTION_MAX_LINES
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let max: u32 = ctx.option_or(FUNCTION_MAX_LINES.id, "max", 50);
        let span = ctx.ast().span(node);
        let lines = span.end.line - span.start.line + 1;
        if lines > max {
            let name = ctx
                .ast()
                .name_of(ctx.source_text(), node)
                .unwrap_or("<unnamed>");
            ctx.report(
                FUNCTION_MAX_LINES.id,
                span,
                format!("function `{}` spans {} lines, limit is {}", name, lines, max),
            );
        }
    }
}

struct MaxStatesCount;

static MAX_STATES_COUNT: RuleMetadata = RuleMetadata {
    id: "code-quality/max-states-count",
    category: Category::CodeQuality,
    default_severity: Severity::Info,
    title: "Too many state variables",
    description: "A large state surface makes storage layout and upgrade \
                  reasoning fragile.",
    recommendation: "Group related fields into structs or split the contract.",
    tags: &["metrics"],
    options: &[OptionSpec {
        key: "max",
        kind: OptionKind::Integer,
        doc: "maximum state variable count per contract (default 15)",
    }],
};

impl Rule for MaxStatesCount {
    fn metadata(&self) -> &'static RuleMetadata {
        &MAX_STATES_COUNT
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ContractDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let max: usize = ctx.option_or(MAX_STATES_COUNT.id, "max", 15);
        let tree = ctx.ast();
        let count = tree.find(node, NodeTag::StateVariableDeclaration).len();
        if count > max {
            let name = tree.name_of(ctx.source_text(), node).unwrap_or("<anonymous>");
            ctx.report(
                MAX_STATES_COUNT.id,
                tree.span(node),
                format!(
                    "contract `{}` has {} state variables, limit is {}",
                    name, count, max
                ),
            );
        }
    }
}

/// Branch-counting cyclomatic complexity per function.
struct CodeComplexity;

static CODE_COMPLEXITY: RuleMetadata = RuleMetadata {
    id: "code-quality/code-complexity",
    category: Category::CodeQuality,
    default_severity: Severity::Info,
    title: "Function too complex",
    description: "Each branch multiplies the paths a reviewer and a test \
                  suite must cover.",
    recommendation: "Extract branches into helpers or flatten conditions.",
    tags: &["metrics"],
    options: &[OptionSpec {
        key: "max",
        kind: OptionKind::Integer,
        doc: "maximum cyclomatic complexity per function (default 7)",
    }],
};

const BRANCH_TAGS: &[NodeTag] = &[
    NodeTag::IfStatement,
    NodeTag::ForStatement,
    NodeTag::WhileStatement,
    NodeTag::DoWhileStatement,
    NodeTag::TernaryExpression,
];

impl Rule for CodeComplexity {
    fn metadata(&self) -> &'static RuleMetadata {
        &CODE_COMPLEXITY
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let max: usize = ctx.option_or(CODE_COMPLEXITY.id, "max", 7);
        let tree = ctx.ast();
        let complexity = 1 + BRANCH_TAGS
            .iter()
            .map(|&tag| tree.find(node, tag).len())
            .sum::<usize>();
        if complexity > max {
            let name = tree.name_of(ctx.source_text(), node).unwrap_or("<unnamed>");
            ctx.report(
                CODE_COMPLEXITY.id,
                tree.span(node),
                format!(
                    "function `{}` has cyclomatic complexity {}, limit is {}",
                    name, complexity, max
                ),
            );
        }
    }
}
