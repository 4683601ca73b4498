//! Parser adapter over tree-sitter-solidity.
//!
//! The adapter parses source text and flattens the tree-sitter tree into the
//! arena model: named grammar nodes become arena nodes tagged by
//! `tag_for_kind`, ERROR and MISSING nodes become recoverable parse
//! diagnostics. Whether those diagnostics are fatal is the engine's call
//! (the `tolerant` parser option), not the adapter's.

use crate::source::{Position, Span};
use crate::tree::{NodeId, NodeTag, SyntaxTree, TreeBuilder};
use thiserror::Error;

/// A recoverable problem found while parsing.
#[derive(Debug, Clone)]
pub struct ParseDiagnostic {
    pub span: Span,
    pub message: String,
}

/// A parsed file: the adapted tree plus any parse diagnostics.
#[derive(Debug)]
pub struct Parsed {
    pub tree: SyntaxTree,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Failure to produce a tree at all (as opposed to a tree with errors).
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("failed to load Solidity grammar: {0}")]
    Grammar(String),
    #[error("parser produced no tree")]
    NoTree,
}

/// Parse Solidity source into the arena tree model.
pub fn parse(source: &str) -> Result<Parsed, ParseFailure> {
    let language: tree_sitter::Language = tree_sitter_solidity::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseFailure::Grammar(e.to_string()))?;

    let ts_tree = parser.parse(source, None).ok_or(ParseFailure::NoTree)?;

    let mut builder = TreeBuilder::new();
    let mut diagnostics = Vec::new();
    let root = ts_tree.root_node();
    let root_id = builder.push(NodeTag::SourceUnit, root.kind(), node_span(root), None);
    adapt_children(root, root_id, &mut builder, &mut diagnostics);

    // A tree can carry the error bit without any reachable ERROR/MISSING
    // node (e.g. the root itself failed); keep strict mode honest.
    if diagnostics.is_empty() && root.has_error() {
        diagnostics.push(ParseDiagnostic {
            span: node_span(root),
            message: syntax_error_message(root),
        });
    }

    Ok(Parsed {
        tree: builder.build(),
        diagnostics,
    })
}

fn adapt_children(
    ts_node: tree_sitter::Node,
    parent: NodeId,
    builder: &mut TreeBuilder,
    diagnostics: &mut Vec<ParseDiagnostic>,
) {
    let mut cursor = ts_node.walk();
    for child in ts_node.children(&mut cursor) {
        if child.is_missing() {
            diagnostics.push(ParseDiagnostic {
                span: node_span(child),
                message: format!("missing {}", child.kind()),
            });
            continue;
        }
        if !child.is_named() {
            // Anonymous tokens (keywords, operators, punctuation) are not
            // arena nodes; operator text is recovered from spans on demand.
            continue;
        }
        if child.is_error() {
            diagnostics.push(ParseDiagnostic {
                span: node_span(child),
                message: syntax_error_message(child),
            });
        }
        let id = builder.push(
            tag_for_kind(child.kind()),
            child.kind(),
            node_span(child),
            Some(parent),
        );
        adapt_children(child, id, builder, diagnostics);
    }
}

fn syntax_error_message(node: tree_sitter::Node) -> String {
    let pos = node.start_position();
    format!("syntax error at line {}", pos.row + 1)
}

fn node_span(node: tree_sitter::Node) -> Span {
    Span::new(
        ts_position(node.start_position(), node.start_byte()),
        ts_position(node.end_position(), node.end_byte()),
    )
}

fn ts_position(point: tree_sitter::Point, byte: usize) -> Position {
    Position::new(point.row as u32 + 1, point.column as u32 + 1, byte as u32)
}

/// Map a grammar production name to a node tag.
///
/// The table is deliberately generous with aliases: the Solidity grammar has
/// renamed productions across releases, and an unrecognized name degrades to
/// `Other` rather than breaking adaptation.
fn tag_for_kind(kind: &str) -> NodeTag {
    match kind {
        "source_file" | "source_unit" => NodeTag::SourceUnit,
        "pragma_directive" => NodeTag::PragmaDirective,
        "import_directive" => NodeTag::ImportDirective,
        "contract_declaration"
        | "contract_definition"
        | "interface_declaration"
        | "interface_definition"
        | "library_declaration"
        | "library_definition" => NodeTag::ContractDefinition,
        "function_definition"
        | "function_declaration"
        | "constructor_definition"
        | "constructor_declaration"
        | "fallback_receive_definition" => NodeTag::FunctionDefinition,
        "modifier_definition" | "modifier_declaration" => NodeTag::ModifierDefinition,
        "state_variable_declaration" => NodeTag::StateVariableDeclaration,
        "event_definition" | "event_declaration" => NodeTag::EventDefinition,
        "struct_declaration" | "struct_definition" => NodeTag::StructDefinition,
        "enum_declaration" | "enum_definition" => NodeTag::EnumDefinition,
        "error_declaration" | "error_definition" => NodeTag::ErrorDefinition,
        "using_directive" | "using_for_directive" => NodeTag::UsingForDirective,
        "block_statement" | "function_body" | "block" | "unchecked_block" => NodeTag::Block,
        "expression_statement" => NodeTag::ExpressionStatement,
        "if_statement" => NodeTag::IfStatement,
        "for_statement" => NodeTag::ForStatement,
        "while_statement" => NodeTag::WhileStatement,
        "do_while_statement" => NodeTag::DoWhileStatement,
        "return_statement" => NodeTag::ReturnStatement,
        "emit_statement" => NodeTag::EmitStatement,
        "variable_declaration_statement" => NodeTag::VariableDeclarationStatement,
        "binary_expression" | "binary_operation" => NodeTag::BinaryOperation,
        "unary_expression" | "unary_operation" => NodeTag::UnaryOperation,
        "update_expression" => NodeTag::UpdateExpression,
        "ternary_expression" | "conditional_expression" => NodeTag::TernaryExpression,
        "assignment_expression" | "augmented_assignment_expression" => NodeTag::Assignment,
        "call_expression" | "function_call_expression" => NodeTag::FunctionCall,
        "member_expression" | "member_access_expression" => NodeTag::MemberAccess,
        "array_access" | "index_access" | "subscript_expression" => NodeTag::IndexAccess,
        "identifier" => NodeTag::Identifier,
        "number_literal"
        | "decimal_number"
        | "hex_number"
        | "string_literal"
        | "string"
        | "boolean_literal"
        | "hex_string_literal"
        | "unicode_string_literal"
        | "literal" => NodeTag::Literal,
        "type_name" | "primitive_type" | "user_defined_type" => NodeTag::TypeName,
        _ => NodeTag::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = r#"
pragma solidity ^0.8.0;

contract Counter {
    uint256 public count;

    function increment() public {
        count = count + 1;
    }
}
"#;

    #[test]
    fn parses_a_simple_contract() {
        let parsed = parse(COUNTER).unwrap();
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);

        let tree = &parsed.tree;
        assert_eq!(tree.tag(tree.root()), NodeTag::SourceUnit);

        let pragmas = tree.find(tree.root(), NodeTag::PragmaDirective);
        assert_eq!(pragmas.len(), 1);
        assert!(tree.text(COUNTER, pragmas[0]).contains("^0.8.0"));

        let contracts = tree.find(tree.root(), NodeTag::ContractDefinition);
        assert_eq!(contracts.len(), 1);
        assert_eq!(tree.name_of(COUNTER, contracts[0]), Some("Counter"));

        let functions = tree.find(contracts[0], NodeTag::FunctionDefinition);
        assert_eq!(functions.len(), 1);
        assert_eq!(tree.name_of(COUNTER, functions[0]), Some("increment"));
    }

    #[test]
    fn binary_operations_carry_operators() {
        let source = "contract C { function f(uint a, uint b) public pure returns (uint) { return a / b; } }";
        let parsed = parse(source).unwrap();
        let tree = &parsed.tree;

        let bins = tree.find(tree.root(), NodeTag::BinaryOperation);
        assert_eq!(bins.len(), 1);
        assert_eq!(tree.binary_operator(source, bins[0]), Some("/"));
    }

    #[test]
    fn spans_are_one_based_and_within_file() {
        let parsed = parse(COUNTER).unwrap();
        let tree = &parsed.tree;
        let extent = tree.span(tree.root());

        for (_, node) in tree.iter() {
            assert!(node.span.start.line >= 1);
            assert!(node.span.start.column >= 1);
            assert!(extent.contains(&node.span));
        }
    }

    #[test]
    fn broken_source_yields_diagnostics_not_failure() {
        let parsed = parse("contract { function ] }").unwrap();
        assert!(!parsed.diagnostics.is_empty());
    }

    #[test]
    fn empty_source_parses() {
        let parsed = parse("").unwrap();
        assert!(
            parsed
                .tree
                .find(parsed.tree.root(), NodeTag::ContractDefinition)
                .is_empty()
        );
    }
}
