//! Gas-optimization rules.

use super::has_keyword;
use solstice_ast::{NodeId, NodeTag};
use solstice_engine::{Category, LintContext, Rule, RuleMetadata, Severity};
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(IndexedEvents), Arc::new(IncrementByOne)]
}

/// Events with parameters but no indexed topics.
struct IndexedEvents;

static INDEXED_EVENTS: RuleMetadata = RuleMetadata {
    id: "gas-optimization/indexed-events",
    category: Category::GasOptimization,
    default_severity: Severity::Info,
    title: "Event without indexed parameters",
    description: "Indexed parameters become log topics, which off-chain \
                  consumers can filter server-side instead of scanning \
                  every log.",
    recommendation: "Index up to three of the parameters filters will use.",
    tags: &["events"],
    options: &[],
};

impl Rule for IndexedEvents {
    fn metadata(&self) -> &'static RuleMetadata {
        &INDEXED_EVENTS
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::EventDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        let has_params = text
            .find('(')
            .zip(text.rfind(')'))
            .is_some_and(|(open, close)| open < close && !text[open + 1..close].trim().is_empty());
        if has_params && !has_keyword(text, "indexed") {
            let name = ctx
                .ast()
                .name_of(ctx.source_text(), node)
                .unwrap_or("<unnamed>");
            ctx.report(
                INDEXED_EVENTS.id,
                ctx.ast().span(node),
                format!("event `{}` has no indexed parameters", name),
            );
        }
    }
}

/// Postfix increment/decrement statements.
struct IncrementByOne;

static INCREMENT_BY_ONE: RuleMetadata = RuleMetadata {
    id: "gas-optimization/increment-by-one",
    category: Category::GasOptimization,
    default_severity: Severity::Info,
    title: "Postfix increment",
    description: "`i++` keeps a copy of the old value that statement position \
                  never reads; `++i` skips it and is slightly cheaper.",
    recommendation: "Use the prefix form when the expression value is unused.",
    tags: &["loops"],
    options: &[],
};

impl Rule for IncrementByOne {
    fn metadata(&self) -> &'static RuleMetadata {
        &INCREMENT_BY_ONE
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::UpdateExpression]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        let postfix = text.ends_with("++") || text.ends_with("--");
        if !postfix {
            return;
        }
        let tree = ctx.ast();
        let statement_position = tree.parent(node).is_some_and(|p| {
            matches!(
                tree.tag(p),
                NodeTag::ExpressionStatement | NodeTag::ForStatement
            )
        });
        if statement_position {
            let op = if text.ends_with("++") { "++" } else { "--" };
            ctx.report(
                INCREMENT_BY_ONE.id,
                tree.span(node),
                format!("prefer `{}i` over `i{}` when the value is unused", op, op),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::lint_rule;

    #[test]
    fn unindexed_event_flagged() {
        let source = r#"
pragma solidity ^0.8.0;
contract C {
    event Plain(address to, uint256 amount);
    event Topical(address indexed to, uint256 amount);
    event Empty();
}
"#;
        let issues = lint_rule(source, "gas-optimization/indexed-events");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("`Plain`"));
    }

    #[test]
    fn postfix_increment_in_loop() {
        let source = r#"
pragma solidity ^0.8.0;
contract C {
    function sum(uint n) public pure returns (uint total) {
        for (uint i = 0; i < n; i++) {
            total = total + i;
        }
    }
}
"#;
        let issues = lint_rule(source, "gas-optimization/increment-by-one");
        assert_eq!(issues.len(), 1);

        let prefix = source.replace("i++", "++i");
        assert!(lint_rule(&prefix, "gas-optimization/increment-by-one").is_empty());
    }
}
