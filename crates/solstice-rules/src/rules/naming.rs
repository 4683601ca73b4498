//! Naming-convention rules.

use super::has_keyword;
use solstice_ast::{FunctionKind, NodeId, NodeTag};
use solstice_engine::{Category, LintContext, Rule, RuleMetadata, Severity};
use std::sync::Arc;

pub(crate) fn rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(ContractNamePascalCase),
        Arc::new(FuncNameMixedCase),
        Arc::new(VarNameMixedCase),
        Arc::new(ConstNameSnakeCase),
        Arc::new(EventNamePascalCase),
    ]
}

/// `PascalCase`: uppercase start, no underscores.
fn is_pascal_case(name: &str) -> bool {
    !name.contains('_')
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
}

/// `mixedCase`: lowercase start, no underscores. Leading underscores are
/// tolerated (the common internal-member convention).
fn is_mixed_case(name: &str) -> bool {
    let trimmed = name.trim_start_matches('_');
    !trimmed.contains('_')
        && trimmed
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
}

/// `UPPER_SNAKE_CASE` for constants.
fn is_upper_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

struct ContractNamePascalCase;

static CONTRACT_NAME: RuleMetadata = RuleMetadata {
    id: "naming/contract-name-pascalcase",
    category: Category::Naming,
    default_severity: Severity::Warning,
    title: "Contract name casing",
    description: "Contracts, interfaces, and libraries use PascalCase.",
    recommendation: "Rename to PascalCase.",
    tags: &[],
    options: &[],
};

impl Rule for ContractNamePascalCase {
    fn metadata(&self) -> &'static RuleMetadata {
        &CONTRACT_NAME
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::ContractDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let Some(name) = tree.name_of(ctx.source_text(), node) else {
            return;
        };
        if !is_pascal_case(name) {
            ctx.report(
                CONTRACT_NAME.id,
                tree.span(node),
                format!("contract name `{}` should be PascalCase", name),
            );
        }
    }
}

struct FuncNameMixedCase;

static FUNC_NAME: RuleMetadata = RuleMetadata {
    id: "naming/func-name-mixedcase",
    category: Category::Naming,
    default_severity: Severity::Warning,
    title: "Function name casing",
    description: "Functions use mixedCase.",
    recommendation: "Rename to mixedCase.",
    tags: &[],
    options: &[],
};

impl Rule for FuncNameMixedCase {
    fn metadata(&self) -> &'static RuleMetadata {
        &FUNC_NAME
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::FunctionDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let source = ctx.source_text();
        if tree.function_kind(source, node) != Some(FunctionKind::Function) {
            return;
        }
        let Some(name) = tree.name_of(source, node) else {
            return;
        };
        if !is_mixed_case(name) {
            ctx.report(
                FUNC_NAME.id,
                tree.span(node),
                format!("function name `{}` should be mixedCase", name),
            );
        }
    }
}

struct VarNameMixedCase;

static VAR_NAME: RuleMetadata = RuleMetadata {
    id: "naming/var-name-mixedcase",
    category: Category::Naming,
    default_severity: Severity::Warning,
    title: "State variable casing",
    description: "Mutable state variables use mixedCase.",
    recommendation: "Rename to mixedCase.",
    tags: &[],
    options: &[],
};

impl Rule for VarNameMixedCase {
    fn metadata(&self) -> &'static RuleMetadata {
        &VAR_NAME
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::StateVariableDeclaration]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let text = ctx.text(node);
        if has_keyword(text, "constant") {
            return;
        }
        let tree = ctx.ast();
        let Some(name) = tree.name_of(ctx.source_text(), node) else {
            return;
        };
        if !is_mixed_case(name) {
            ctx.report(
                VAR_NAME.id,
                tree.span(node),
                format!("state variable `{}` should be mixedCase", name),
            );
        }
    }
}

struct ConstNameSnakeCase;

static CONST_NAME: RuleMetadata = RuleMetadata {
    id: "naming/const-name-snakecase",
    category: Category::Naming,
    default_severity: Severity::Warning,
    title: "Constant name casing",
    description: "Constants use UPPER_SNAKE_CASE.",
    recommendation: "Rename to UPPER_SNAKE_CASE.",
    tags: &[],
    options: &[],
};

impl Rule for ConstNameSnakeCase {
    fn metadata(&self) -> &'static RuleMetadata {
        &CONST_NAME
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::StateVariableDeclaration]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        if !has_keyword(ctx.text(node), "constant") {
            return;
        }
        let tree = ctx.ast();
        let Some(name) = tree.name_of(ctx.source_text(), node) else {
            return;
        };
        if !is_upper_snake_case(name) {
            ctx.report(
                CONST_NAME.id,
                tree.span(node),
                format!("constant `{}` should be UPPER_SNAKE_CASE", name),
            );
        }
    }
}

struct EventNamePascalCase;

static EVENT_NAME: RuleMetadata = RuleMetadata {
    id: "naming/event-name-pascalcase",
    category: Category::Naming,
    default_severity: Severity::Warning,
    title: "Event name casing",
    description: "Events use PascalCase.",
    recommendation: "Rename to PascalCase.",
    tags: &[],
    options: &[],
};

impl Rule for EventNamePascalCase {
    fn metadata(&self) -> &'static RuleMetadata {
        &EVENT_NAME
    }

    fn interests(&self) -> &'static [NodeTag] {
        &[NodeTag::EventDefinition]
    }

    fn visit(&self, ctx: &LintContext, node: NodeId) {
        let tree = ctx.ast();
        let Some(name) = tree.name_of(ctx.source_text(), node) else {
            return;
        };
        if !is_pascal_case(name) {
            ctx.report(
                EVENT_NAME.id,
                tree.span(node),
                format!("event name `{}` should be PascalCase", name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_mixed_case, is_pascal_case, is_upper_snake_case};
    use crate::test_util::lint_rule;

    #[test]
    fn casing_predicates() {
        assert!(is_pascal_case("MyToken"));
        assert!(!is_pascal_case("my_token"));
        assert!(!is_pascal_case("myToken"));

        assert!(is_mixed_case("transferFrom"));
        assert!(is_mixed_case("_mint"));
        assert!(!is_mixed_case("TransferFrom"));
        assert!(!is_mixed_case("transfer_from"));

        assert!(is_upper_snake_case("MAX_SUPPLY"));
        assert!(!is_upper_snake_case("MaxSupply"));
    }

    #[test]
    fn contract_and_event_names() {
        let source = r#"
pragma solidity ^0.8.0;
contract my_token {
    event transfer_done(address to);
}
"#;
        assert_eq!(lint_rule(source, "naming/contract-name-pascalcase").len(), 1);
        assert_eq!(lint_rule(source, "naming/event-name-pascalcase").len(), 1);
    }

    #[test]
    fn function_names() {
        let source = r#"
pragma solidity ^0.8.0;
contract C {
    constructor() {}
    function DoThing() public {}
    function doThing() public pure returns (uint) { return 1; }
}
"#;
        let issues = lint_rule(source, "naming/func-name-mixedcase");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("`DoThing`"));
    }

    #[test]
    fn constants_vs_mutable_state() {
        let source = r#"
pragma solidity ^0.8.0;
contract C {
    uint256 public constant maxSupply = 1000;
    uint256 public TotalMinted;
}
"#;
        assert_eq!(lint_rule(source, "naming/const-name-snakecase").len(), 1);
        let var_issues = lint_rule(source, "naming/var-name-mixedcase");
        assert_eq!(var_issues.len(), 1);
        assert!(var_issues[0].message.contains("`TotalMinted`"));
    }
}
