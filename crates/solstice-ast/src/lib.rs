//! Solidity syntax tree model for solstice.
//!
//! This crate wraps the tree-sitter Solidity grammar in a typed, arena-based
//! node model that analysis rules consume:
//! - `parse()` turns source text into a `SyntaxTree` plus recoverable
//!   parse diagnostics
//! - `SyntaxTree` stores nodes in an arena addressed by `NodeId` handles,
//!   with parent links and source-ordered children
//! - `walk()` drives a pre/post-order `Visitor` over the tree
//!
//! Nodes are pure data: rules may re-traverse any subtree without affecting
//! an outer traversal.

mod parse;
mod source;
mod tree;

pub use parse::{ParseDiagnostic, ParseFailure, Parsed, parse};
pub use source::{LineIndex, Position, Span};
pub use tree::{
    ContractKind, FunctionKind, Node, NodeId, NodeTag, SyntaxTree, TreeBuilder, Visitor, walk,
    walk_from,
};
