//! Builtin rule catalog, one module per category.

mod best_practices;
mod code_quality;
mod gas;
mod lint;
mod naming;
mod security;

use crate::version::VersionReq;
use solstice_ast::{NodeId, NodeTag};
use solstice_engine::{LintContext, Rule};
use std::rc::Rc;
use std::sync::Arc;

/// Every builtin rule, in category order.
pub(crate) fn all() -> Vec<Arc<dyn Rule>> {
    let mut rules: Vec<Arc<dyn Rule>> = Vec::new();
    rules.extend(security::rules());
    rules.extend(lint::rules());
    rules.extend(best_practices::rules());
    rules.extend(code_quality::rules());
    rules.extend(naming::rules());
    rules.extend(gas::rules());
    rules
}

/// The file's pragma constraint, memoized per rule. The first parseable
/// `pragma solidity` directive wins; files without one yield `None` and
/// version-gated rules stay quiet.
pub(crate) fn file_version_req(ctx: &LintContext, rule_id: &str) -> Rc<Option<VersionReq>> {
    ctx.memo(rule_id, |ctx| {
        let tree = ctx.ast();
        tree.find(tree.root(), NodeTag::PragmaDirective)
            .into_iter()
            .filter_map(|pragma| VersionReq::parse(ctx.text(pragma)))
            .next()
    })
}

/// Property side of a member access: its last direct identifier child
/// (`a.b.call` -> `call`).
pub(crate) fn property_name<'c>(ctx: &'c LintContext, node: NodeId) -> Option<&'c str> {
    let tree = ctx.ast();
    tree.children(node)
        .iter()
        .rev()
        .copied()
        .find(|&c| tree.tag(c) == NodeTag::Identifier)
        .map(|c| ctx.text(c))
}

/// Object side of a member access, when it is a plain identifier.
pub(crate) fn object_name<'c>(ctx: &'c LintContext, node: NodeId) -> Option<&'c str> {
    let tree = ctx.ast();
    let first = *tree.children(node).first()?;
    (tree.tag(first) == NodeTag::Identifier).then(|| ctx.text(first))
}

/// Word-boundary keyword search without regex: `has_keyword("uint x", "uint")`.
pub(crate) fn has_keyword(text: &str, keyword: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|token| token == keyword)
}

/// Content between the outermost braces of a node's text, trimmed.
pub(crate) fn brace_body(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (open < close).then(|| text[open + 1..close].trim())
}
