//! Arena-based syntax tree.
//!
//! Nodes live in a flat arena owned by the `SyntaxTree` and are addressed by
//! `NodeId` handles. Parent links are handles too, so the tree has no cyclic
//! ownership and subtree traversals are cheap.

use crate::source::Span;

/// Handle to a node in a `SyntaxTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Typed tag over the Solidity constructs rules dispatch on.
///
/// The tag set is intentionally coarser than the grammar: every grammar
/// production maps to a tag, with `Other` catching constructs no rule
/// dispatches on. The raw grammar kind is kept on the node for the cases
/// where a rule needs the finer distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    SourceUnit,
    PragmaDirective,
    ImportDirective,
    ContractDefinition,
    FunctionDefinition,
    ModifierDefinition,
    StateVariableDeclaration,
    EventDefinition,
    StructDefinition,
    EnumDefinition,
    ErrorDefinition,
    UsingForDirective,
    Block,
    ExpressionStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    DoWhileStatement,
    ReturnStatement,
    EmitStatement,
    VariableDeclarationStatement,
    BinaryOperation,
    UnaryOperation,
    UpdateExpression,
    TernaryExpression,
    Assignment,
    FunctionCall,
    MemberAccess,
    IndexAccess,
    Identifier,
    Literal,
    TypeName,
    Other,
}

/// Contract-like definition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Interface,
    Library,
}

/// Function-like definition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Constructor,
    Fallback,
    Receive,
    Function,
}

/// A single node: tag, raw grammar kind, span, parent, ordered children.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: NodeTag,
    /// Production name from the grammar (e.g. `binary_expression`).
    pub kind: &'static str,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// An adapted parse of one source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn tag(&self, id: NodeId) -> NodeTag {
        self.node(id).tag
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes with their handles, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Walk parent handles from `id` (exclusive) to the root (inclusive).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// All descendants of `id` with the given tag, in source order.
    /// `id` itself is not included.
    pub fn find(&self, id: NodeId, tag: NodeTag) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_tagged(id, tag, &mut out);
        out
    }

    fn collect_tagged(&self, id: NodeId, tag: NodeTag, out: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            if self.tag(child) == tag {
                out.push(child);
            }
            self.collect_tagged(child, tag, out);
        }
    }

    /// First direct child with the given tag.
    pub fn child_tagged(&self, id: NodeId, tag: NodeTag) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.tag(c) == tag)
    }

    /// The source text a node covers.
    pub fn text<'s>(&self, source: &'s str, id: NodeId) -> &'s str {
        self.span(id).slice(source)
    }

    /// The declared name of a definition-like node: the text of its first
    /// identifier child.
    pub fn name_of<'s>(&self, source: &'s str, id: NodeId) -> Option<&'s str> {
        self.child_tagged(id, NodeTag::Identifier)
            .map(|ident| self.text(source, ident))
    }

    /// Contract kind for a `ContractDefinition` node.
    pub fn contract_kind(&self, id: NodeId) -> Option<ContractKind> {
        if self.tag(id) != NodeTag::ContractDefinition {
            return None;
        }
        let kind = self.kind(id);
        if kind.starts_with("interface") {
            Some(ContractKind::Interface)
        } else if kind.starts_with("library") {
            Some(ContractKind::Library)
        } else {
            Some(ContractKind::Contract)
        }
    }

    /// Function kind for a `FunctionDefinition` node. Fallback and receive
    /// share one grammar production, so the source text disambiguates them.
    pub fn function_kind(&self, source: &str, id: NodeId) -> Option<FunctionKind> {
        if self.tag(id) != NodeTag::FunctionDefinition {
            return None;
        }
        let kind = self.kind(id);
        if kind.starts_with("constructor") {
            return Some(FunctionKind::Constructor);
        }
        if kind.starts_with("fallback") || kind.starts_with("receive") {
            let text = self.text(source, id);
            return if text.trim_start().starts_with("receive") {
                Some(FunctionKind::Receive)
            } else {
                Some(FunctionKind::Fallback)
            };
        }
        // Older grammars spell these as plain functions named after the kind.
        match self.name_of(source, id) {
            Some("constructor") => Some(FunctionKind::Constructor),
            Some("fallback") => Some(FunctionKind::Fallback),
            Some("receive") => Some(FunctionKind::Receive),
            _ => Some(FunctionKind::Function),
        }
    }

    /// Operator text of a `BinaryOperation`, recovered from the source gap
    /// between its two operands. The grammar keeps operators as anonymous
    /// tokens, so they are not arena nodes.
    pub fn binary_operator<'s>(&self, source: &'s str, id: NodeId) -> Option<&'s str> {
        if self.tag(id) != NodeTag::BinaryOperation {
            return None;
        }
        let children = self.children(id);
        if children.len() < 2 {
            return None;
        }
        let left_end = self.span(children[0]).end.offset as usize;
        let right_start = self.span(children[children.len() - 1]).start.offset as usize;
        if left_end > right_start || right_start > source.len() {
            return None;
        }
        let gap = source[left_end..right_start].trim();
        (!gap.is_empty()).then_some(gap)
    }
}

/// Incremental construction of a `SyntaxTree`, used by the parser adapter
/// and by tests that assemble trees by hand.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and wire it to its parent. Children are recorded in
    /// push order, which the adapter keeps equal to source order.
    pub fn push(
        &mut self,
        tag: NodeTag,
        kind: &'static str,
        span: Span,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            tag,
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Finish the tree. The first pushed node is the root.
    pub fn build(self) -> SyntaxTree {
        assert!(!self.nodes.is_empty(), "tree must have a root node");
        SyntaxTree {
            nodes: self.nodes,
            root: NodeId(0),
        }
    }
}

/// Pre/post-order hooks for `walk`.
pub trait Visitor {
    fn enter(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
    fn leave(&mut self, _tree: &SyntaxTree, _node: NodeId) {}
}

/// Depth-first traversal of the whole tree, children in source order.
pub fn walk<V: Visitor>(tree: &SyntaxTree, visitor: &mut V) {
    walk_from(tree, tree.root(), visitor);
}

/// Depth-first traversal of the subtree rooted at `node`.
pub fn walk_from<V: Visitor>(tree: &SyntaxTree, node: NodeId, visitor: &mut V) {
    visitor.enter(tree, node);
    for &child in tree.children(node) {
        walk_from(tree, child, visitor);
    }
    visitor.leave(tree, node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Position;

    fn span(start: u32, end: u32) -> Span {
        Span::new(
            Position::new(1, start + 1, start),
            Position::new(1, end + 1, end),
        )
    }

    fn sample_tree() -> SyntaxTree {
        // source_file > contract > (identifier, function > block)
        let mut b = TreeBuilder::new();
        let root = b.push(NodeTag::SourceUnit, "source_file", span(0, 40), None);
        let contract = b.push(
            NodeTag::ContractDefinition,
            "contract_declaration",
            span(0, 40),
            Some(root),
        );
        b.push(NodeTag::Identifier, "identifier", span(9, 10), Some(contract));
        let func = b.push(
            NodeTag::FunctionDefinition,
            "function_definition",
            span(13, 38),
            Some(contract),
        );
        b.push(NodeTag::Block, "block_statement", span(30, 38), Some(func));
        b.build()
    }

    #[test]
    fn parent_and_ancestor_links() {
        let tree = sample_tree();
        let blocks = tree.find(tree.root(), NodeTag::Block);
        assert_eq!(blocks.len(), 1);

        let chain: Vec<NodeTag> = tree.ancestors(blocks[0]).map(|id| tree.tag(id)).collect();
        assert_eq!(
            chain,
            vec![
                NodeTag::FunctionDefinition,
                NodeTag::ContractDefinition,
                NodeTag::SourceUnit
            ]
        );
    }

    #[test]
    fn find_is_source_ordered_and_excludes_self() {
        let tree = sample_tree();
        assert!(tree.find(tree.root(), NodeTag::SourceUnit).is_empty());

        let all = tree.find(tree.root(), NodeTag::ContractDefinition);
        assert_eq!(all.len(), 1);
        assert_eq!(tree.contract_kind(all[0]), Some(ContractKind::Contract));
    }

    #[test]
    fn walk_order() {
        struct Recorder {
            entered: Vec<NodeTag>,
            left: Vec<NodeTag>,
        }
        impl Visitor for Recorder {
            fn enter(&mut self, tree: &SyntaxTree, node: NodeId) {
                self.entered.push(tree.tag(node));
            }
            fn leave(&mut self, tree: &SyntaxTree, node: NodeId) {
                self.left.push(tree.tag(node));
            }
        }

        let tree = sample_tree();
        let mut rec = Recorder {
            entered: Vec::new(),
            left: Vec::new(),
        };
        walk(&tree, &mut rec);

        assert_eq!(rec.entered[0], NodeTag::SourceUnit);
        assert_eq!(rec.entered[1], NodeTag::ContractDefinition);
        assert_eq!(*rec.left.last().unwrap(), NodeTag::SourceUnit);
        assert_eq!(rec.entered.len(), rec.left.len());
    }

    #[test]
    fn binary_operator_from_gap() {
        let source = "a / b";
        let mut b = TreeBuilder::new();
        let root = b.push(NodeTag::SourceUnit, "source_file", span(0, 5), None);
        let bin = b.push(
            NodeTag::BinaryOperation,
            "binary_expression",
            span(0, 5),
            Some(root),
        );
        b.push(NodeTag::Identifier, "identifier", span(0, 1), Some(bin));
        b.push(NodeTag::Identifier, "identifier", span(4, 5), Some(bin));
        let tree = b.build();

        assert_eq!(tree.binary_operator(source, bin), Some("/"));
    }
}
