//! Uniform syntax tree over every grammar backend.
//!
//! Parsed trees are copied into an owned arena: every [`SyntaxNode`] owns the
//! ids of its children and refers back to its parent by id. Positions are
//! already translated to full-document coordinates, so downstream code never
//! needs to know whether the script came from a markup block.

mod kind;
pub mod parser;

use std::fmt;

pub use kind::NodeKind;
pub use parser::{parse_unit, Grammar, LooseParser, ScriptParser, StrictParser};

use crate::dialect::SourceUnit;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Source location span with byte offsets and 0-indexed line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    /// Whether `other` lies within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line + 1, self.start_col + 1)
    }
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Field name this node occupies in its parent (`value`, `body`, ...).
    pub field: Option<&'static str>,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// A parsed document.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    text: String,
    grammar: &'static str,
}

impl SyntaxTree {
    /// Copy a tree-sitter tree into the arena, shifting positions by the
    /// unit's offsets. `document` is the full document text.
    pub fn from_tree_sitter(
        tree: &tree_sitter::Tree,
        unit: &SourceUnit,
        document: &str,
        grammar: &'static str,
    ) -> Self {
        let mut nodes: Vec<SyntaxNode> = Vec::new();
        let mut stack: Vec<(tree_sitter::Node, Option<NodeId>, Option<&'static str>)> =
            vec![(tree.root_node(), None, None)];

        while let Some((ts_node, parent, field)) = stack.pop() {
            let id = NodeId(nodes.len());
            let kind = if ts_node.is_error() || ts_node.is_missing() {
                NodeKind::Error
            } else {
                NodeKind::from_grammar(ts_node.kind(), ts_node.is_named())
            };

            let start = ts_node.start_position();
            let end = ts_node.end_position();
            let (start_line, start_col) = unit.to_document(start.row, start.column);
            let (end_line, end_col) = unit.to_document(end.row, end.column);

            nodes.push(SyntaxNode {
                kind,
                field,
                span: Span {
                    start_byte: ts_node.start_byte() + unit.byte_offset,
                    end_byte: ts_node.end_byte() + unit.byte_offset,
                    start_line,
                    start_col,
                    end_line,
                    end_col,
                },
                parent,
                children: Vec::new(),
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }

            let mut children = Vec::new();
            let mut cursor = ts_node.walk();
            if cursor.goto_first_child() {
                loop {
                    children.push((cursor.node(), Some(id), cursor.field_name()));
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
            }
            stack.extend(children.into_iter().rev());
        }

        Self {
            nodes,
            text: document.to_string(),
            grammar,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Name of the grammar that produced the tree.
    pub fn grammar(&self) -> &'static str {
        self.grammar
    }

    pub fn source(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Source text covered by a node.
    pub fn text(&self, id: NodeId) -> &str {
        let span = self.span(id);
        self.text.get(span.start_byte..span.end_byte).unwrap_or("")
    }

    /// All node ids in document (pre-)order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Named (non-token, non-comment) children.
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| !matches!(self.kind(*c), NodeKind::Token | NodeKind::Comment))
    }

    /// First child stored under `field`.
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.node(*c).field == Some(field))
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.kind(*c) == kind)
    }

    /// Whether `id` has an anonymous token child spelled `token`.
    pub fn has_token(&self, id: NodeId, token: &str) -> bool {
        self.children(id)
            .iter()
            .any(|c| self.kind(*c) == NodeKind::Token && self.text(*c) == token)
    }

    /// Parent chain, nearest first (excluding `id`).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// `id` and all its descendants in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Strip parentheses, type casts and non-null assertions.
    pub fn unwrap_transparent(&self, mut id: NodeId) -> NodeId {
        while self.kind(id).is_transparent() {
            match self.named_children(id).next() {
                Some(inner) => id = inner,
                None => break,
            }
        }
        id
    }

    /// Like [`unwrap_transparent`](Self::unwrap_transparent) but also looks
    /// through `await`.
    pub fn unwrap_value(&self, mut id: NodeId) -> NodeId {
        loop {
            let inner = self.unwrap_transparent(id);
            if self.kind(inner) == NodeKind::AwaitExpression {
                match self.named_children(inner).next() {
                    Some(awaited) => {
                        id = awaited;
                        continue;
                    }
                    None => return inner,
                }
            }
            return inner;
        }
    }

    /// Smallest node whose span contains the byte range, preferring named
    /// nodes over tokens.
    pub fn smallest_containing(&self, start: usize, end: usize) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for id in self.ids() {
            let node = self.node(id);
            if node.kind == NodeKind::Token {
                continue;
            }
            if node.span.start_byte <= start && end <= node.span.end_byte {
                let better = match best {
                    Some(b) => node.span.len() <= self.span(b).len(),
                    None => true,
                };
                if better {
                    best = Some(id);
                }
            }
        }
        best
    }

    /// Named node whose span is exactly the byte range, outermost first.
    pub fn node_with_span(&self, start: usize, end: usize) -> Option<NodeId> {
        self.ids().find(|id| {
            let node = self.node(*id);
            node.kind != NodeKind::Token
                && node.span.start_byte == start
                && node.span.end_byte == end
        })
    }

    /// Whether any node is an error or missing node.
    pub fn has_error(&self) -> bool {
        self.nodes.iter().any(|n| n.kind.is_error())
    }

    /// Document line of the first error node, if any.
    pub fn first_error_line(&self) -> Option<usize> {
        self.nodes
            .iter()
            .find(|n| n.kind.is_error())
            .map(|n| n.span.start_line)
    }

    /// Nearest ancestor (or self) that sits directly inside a statement list.
    ///
    /// New statements can always be placed right before or right after such
    /// a node.
    pub fn statement_anchor(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| {
                self.parent(*n)
                    .map(|p| self.kind(p).is_statement_list())
                    .unwrap_or(false)
            })
    }

    /// Nearest enclosing function, excluding `id` itself.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|a| self.kind(*a).is_function())
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect;

    fn parse(text: &str, ext: &str) -> SyntaxTree {
        let unit = dialect::load(text, ext).expect("should load");
        parse_unit(&unit, text).expect("should parse")
    }

    #[test]
    fn test_arena_links() {
        let tree = parse("const a = [1, 2];\n", "ts");
        let root = tree.root();
        assert_eq!(tree.kind(root), NodeKind::Program);
        assert!(tree.parent(root).is_none());

        let array = tree
            .ids()
            .find(|id| tree.kind(*id) == NodeKind::ArrayLiteral)
            .expect("array node");
        assert_eq!(tree.text(array), "[1, 2]");
        assert_eq!(tree.node(array).field, Some("value"));

        let declarator = tree.parent(array).expect("parent");
        assert_eq!(tree.kind(declarator), NodeKind::VariableDeclarator);
        assert!(tree.children(declarator).contains(&array));
        let name = tree.child_by_field(declarator, "name").expect("name");
        assert_eq!(tree.text(name), "a");
    }

    #[test]
    fn test_unwrap_value_strips_wrappers() {
        let tree = parse("async function f() { const v = await (fetchIt() as Thing)!; }\n", "ts");
        let declarator = tree
            .ids()
            .find(|id| tree.kind(*id) == NodeKind::VariableDeclarator)
            .expect("declarator");
        let value = tree.child_by_field(declarator, "value").expect("value");
        let inner = tree.unwrap_value(value);
        assert_eq!(tree.kind(inner), NodeKind::CallExpression);
    }

    #[test]
    fn test_statement_anchor() {
        let tree = parse("function f() {\n  return a.b;\n}\n", "js");
        let member = tree
            .ids()
            .find(|id| tree.kind(*id) == NodeKind::MemberExpression)
            .expect("member");
        let anchor = tree.statement_anchor(member).expect("anchor");
        assert_eq!(tree.kind(anchor), NodeKind::ReturnStatement);
        let func = tree.enclosing_function(member).expect("function");
        assert_eq!(tree.kind(func), NodeKind::FunctionDeclaration);
    }

    #[test]
    fn test_positions_use_document_coordinates() {
        let text = "<template/>\n<script>\nlet answer = 42;\n</script>\n";
        let tree = parse(text, "vue");
        let number = tree
            .ids()
            .find(|id| tree.kind(*id) == NodeKind::Number)
            .expect("number");
        let span = tree.span(number);
        assert_eq!(span.start_line, 2);
        assert_eq!(span.start_col, 13);
        assert_eq!(tree.text(number), "42");
    }
}
