//! Security rules.

use super::{file_version_req, has_keyword, property_name};
use solstice_ast::{NodeId, NodeTag};
use solstice_engine::{Category, LintContext, Rule, RuleMetadata, Severity};
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(IntegerOverflow),
        Arc::new(DivideBeforeMultiply),
        Arc::new(MultipleConstructors),
        Arc::new(Reentrancy),
        Arc::new(TxOrigin),
        Arc::new(AvoidSelfdestruct),
        Arc::new(LowLevelCalls),
        Arc::new(StateVisibility),
        Arc::new(CheckSendResult),
    ]
}

/// Unchecked arithmetic on compilers that predate built-in overflow checks.
struct IntegerOverflow;

static INTEGER_OVERFLOW: RuleMetadata = RuleMetadata {
    id: "security/integer-overflow",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Possible integer overflow",
    description: "Arithmetic wraps silently on Solidity below 0.8.0. Flags \
                  additive and multiplicative expressions when the pragma \
                  admits such a compiler.",
    recommendation: "Require Solidity 0.8.0 or newer, or guard the \
                     arithmetic with a checked-math library.",
    tags: &["arithmetic", "overflow"],
    options: &[],
};

impl Rule for IntegerOverflow {
    fn metadata(&self) -> &'static RuleMetadata {
        &INTEGER_OVERFLOW
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::BinaryOperation]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let req = file_version_req(ctx, INTEGER_OVERFLOW.id);
        let vulnerable = req
            .as_ref()
            .as_ref()
            .is_some_and(|r| r.allows_below(0, 8));
        if !vulnerable {
            return;
        }
        let Some(op) = ctx.ast().binary_operator(ctx.source_text(), node) else {
            return;
        };
        if matches!(op, "+" | "-" | "*" | "**") {
            ctx.report(
                INTEGER_OVERFLOW.id,
                ctx.ast().span(node),
                format!(
                    "`{}` can overflow on Solidity below 0.8.0; this pragma admits such compilers",
                    op
                ),
            );
        }
    }
}

/// `a / b * c` — division first throws away precision.
struct DivideBeforeMultiply;

static DIVIDE_BEFORE_MULTIPLY: RuleMetadata = RuleMetadata {
    id: "security/divide-before-multiply",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Division before multiplication",
    description: "Integer division truncates; multiplying the truncated \
                  quotient amplifies the rounding error.",
    recommendation: "Reorder so multiplication happens before division.",
    tags: &["arithmetic", "precision"],
    options: &[],
};

impl Rule for DivideBeforeMultiply {
    fn metadata(&self) -> &'static RuleMetadata {
        &DIVIDE_BEFORE_MULTIPLY
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::BinaryOperation]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let source = ctx.source_text();
        if tree.binary_operator(source, node) != Some("*") {
            return;
        }
        let Some(&left) = tree.children(node).first() else {
            return;
        };
        if tree.tag(left) == NodeTag::BinaryOperation
            && tree.binary_operator(source, left) == Some("/")
        {
            ctx.report(
                DIVIDE_BEFORE_MULTIPLY.id,
                tree.span(node),
                "division happens before multiplication; truncation loses precision",
            );
        }
    }
}

/// More than one constructor body in a single contract.
struct MultipleConstructors;

static MULTIPLE_CONSTRUCTORS: RuleMetadata = RuleMetadata {
    id: "security/multiple-constructors",
    category: Category::Security,
    default_severity: Severity::Error,
    title: "Multiple constructors",
    description: "A contract with more than one constructor definition will \
                  not compile, and pre-0.5 name-based constructors alongside \
                  `constructor()` create ambiguity about initialization.",
    recommendation: "Keep exactly one constructor per contract.",
    tags: &["constructor"],
    options: &[],
};

impl Rule for MultipleConstructors {
    fn metadata(&self) -> &'static RuleMetadata {
        &MULTIPLE_CONSTRUCTORS
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ContractDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let source = ctx.source_text();
        let constructors: Vec<NodeId> = tree
            .find(node, NodeTag::FunctionDefinition)
            .into_iter()
            .filter(|&f| {
                tree.function_kind(source, f) == Some(solstice_ast::FunctionKind::Constructor)
            })
            .collect();
        if constructors.len() > 1 {
            let name = tree.name_of(source, node).unwrap_or("<anonymous>");
            ctx.report(
                MULTIPLE_CONSTRUCTORS.id,
                tree.span(constructors[1]),
                format!("contract `{}` declares multiple constructors", name),
            );
        }
    }
}

/// External call followed by a state write in the same function body.
struct Reentrancy;

static REENTRANCY: RuleMetadata = RuleMetadata {
    id: "security/reentrancy",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Possible reentrancy",
    description: "An external call hands control to the callee before this \
                  function finishes updating state; the callee can re-enter \
                  and observe stale balances.",
    recommendation: "Follow checks-effects-interactions: update state before \
                     making external calls, or add a reentrancy guard.",
    tags: &["reentrancy", "external-call"],
    options: &[],
};

const EXTERNAL_CALL_MEMBERS: &[&str] = &["call", "delegatecall", "send", "transfer"];

impl Rule for Reentrancy {
    fn metadata(&self) -> &'static RuleMetadata {
        &REENTRANCY
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let external_call = tree
            .find(node, NodeTag::MemberAccess)
            .into_iter()
            .find(|&m| {
                property_name(ctx, m).is_some_and(|p| EXTERNAL_CALL_MEMBERS.contains(&p))
            });
        let Some(call) = external_call else {
            return;
        };

        let call_end = tree.span(call).end.offset;
        let assigned_after = tree
            .find(node, NodeTag::Assignment)
            .into_iter()
            .any(|a| tree.span(a).start.offset > call_end);
        if assigned_after {
            ctx.report(
                REENTRANCY.id,
                tree.span(call),
                "state is written after this external call; the callee can re-enter first",
            );
        }
    }
}

/// `tx.origin` in authorization logic.
struct TxOrigin;

static TX_ORIGIN: RuleMetadata = RuleMetadata {
    id: "security/tx-origin",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Use of tx.origin",
    description: "`tx.origin` is the transaction sender, not the immediate \
                  caller; a malicious contract in the call chain passes any \
                  `tx.origin` check the victim would.",
    recommendation: "Authorize against `msg.sender`.",
    tags: &["authorization"],
    options: &[],
};

impl Rule for TxOrigin {
    fn metadata(&self) -> &'static RuleMetadata {
        &TX_ORIGIN
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::MemberAccess]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        if ctx.text(node) == "tx.origin" {
            ctx.report(
                TX_ORIGIN.id,
                ctx.ast().span(node),
                "avoid `tx.origin`; use `msg.sender` for authorization",
            );
        }
    }
}

/// `selfdestruct` and its deprecated alias.
struct AvoidSelfdestruct;

static AVOID_SELFDESTRUCT: RuleMetadata = RuleMetadata {
    id: "security/avoid-selfdestruct",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Use of selfdestruct",
    description: "`selfdestruct` irreversibly removes code and forwards the \
                  balance; since the Cancun fork its semantics changed and \
                  its use is deprecated.",
    recommendation: "Use a withdrawal pattern and an explicit disabled flag \
                     instead of destroying the contract.",
    tags: &["selfdestruct", "deprecated"],
    options: &[],
};

impl Rule for AvoidSelfdestruct {
    fn metadata(&self) -> &'static RuleMetadata {
        &AVOID_SELFDESTRUCT
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionCall]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let Some(&callee) = tree.children(node).first() else {
            return;
        };
        if tree.tag(callee) == NodeTag::Identifier
            && matches!(ctx.text(callee), "selfdestruct" | "suicide")
        {
            ctx.report(
                AVOID_SELFDESTRUCT.id,
                tree.span(node),
                format!("avoid `{}`", ctx.text(callee)),
            );
        }
    }
}

/// Raw `.call` / `.delegatecall` / `.staticcall`.
struct LowLevelCalls;

static LOW_LEVEL_CALLS: RuleMetadata = RuleMetadata {
    id: "security/low-level-calls",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Low-level call",
    description: "Low-level calls skip type and existence checks and return \
                  raw success flags that are easy to ignore.",
    recommendation: "Prefer contract interfaces; when a low-level call is \
                     unavoidable, check its success flag.",
    tags: &["external-call"],
    options: &[],
};

impl Rule for LowLevelCalls {
    fn metadata(&self) -> &'static RuleMetadata {
        &LOW_LEVEL_CALLS
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::MemberAccess]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let Some(property) = property_name(ctx, node) else {
            return;
        };
        if matches!(property, "call" | "delegatecall" | "staticcall") {
            ctx.report(
                LOW_LEVEL_CALLS.id,
                ctx.ast().span(node),
                format!("low-level `.{}`", property),
            );
        }
    }
}

/// State variables without an explicit visibility keyword.
struct StateVisibility;

static STATE_VISIBILITY: RuleMetadata = RuleMetadata {
    id: "security/state-visibility",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Implicit state visibility",
    description: "State variables default to `internal`; leaving the \
                  visibility implicit hides intent from reviewers.",
    recommendation: "Mark every state variable `public`, `private`, or \
                     `internal` explicitly.",
    tags: &["visibility"],
    options: &[],
};

impl Rule for StateVisibility {
    fn metadata(&self) -> &'static RuleMetadata {
        &STATE_VISIBILITY
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::StateVariableDeclaration]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        let explicit = ["public", "private", "internal"]
            .iter()
            .any(|kw| has_keyword(text, kw));
        if !explicit {
            ctx.report(
                STATE_VISIBILITY.id,
                ctx.ast().span(node),
                "state variable visibility is implicit; declare it explicitly",
            );
        }
    }
}

/// `.send()` used as a bare statement, its success flag dropped.
struct CheckSendResult;

static CHECK_SEND_RESULT: RuleMetadata = RuleMetadata {
    id: "security/check-send-result",
    category: Category::Security,
    default_severity: Severity::Warning,
    title: "Unchecked send",
    description: "`send` returns false on failure instead of reverting; \
                  dropping the flag silently loses funds accounting.",
    recommendation: "Check the boolean result of `send`, or use `transfer` \
                     / a withdrawal pattern.",
    tags: &["external-call"],
    options: &[],
};

impl Rule for CheckSendResult {
    fn metadata(&self) -> &'static RuleMetadata {
        &CHECK_SEND_RESULT
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ExpressionStatement]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let unchecked_send = tree
            .find(node, NodeTag::MemberAccess)
            .into_iter()
            .any(|m| {
                property_name(ctx, m) == Some("send")
                    && tree
                        .parent(m)
                        .is_some_and(|p| tree.tag(p) == NodeTag::FunctionCall)
            });
        if unchecked_send {
            ctx.report(
                CHECK_SEND_RESULT.id,
                tree.span(node),
                "result of `send` is not checked",
            );
        }
    }
}
