//! Arena storage for the manifest tree
//!
//!     Nodes live in one vector and refer to each other by [NodeId]. A node is always
//!     reserved before any of its descendants, so truncating the arena back to an earlier
//!     length discards a failed construction together with everything it built.

use super::nodes::{Node, NodeId, NodeKind, Variant};

#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    /// A tree holding only the pending root
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Pending(Variant::Manifest),
            parent: None,
            level: -1,
            line: 1,
            inner_spacing: false,
            outer_spacing: false,
        };
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a pending node under `parent`
    pub fn reserve(&mut self, variant: Variant, parent: NodeId, line: u32) -> NodeId {
        let level = self.get(parent).level + 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Pending(variant),
            parent: Some(parent),
            level,
            line,
            inner_spacing: false,
            outer_spacing: false,
        });
        id
    }

    pub fn fill(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.0].kind = kind;
    }

    pub fn set_spacing(&mut self, id: NodeId, inner: bool, outer: bool) {
        let node = &mut self.nodes[id.0];
        node.inner_spacing = inner;
        node.outer_spacing = outer;
    }

    /// Drop every node reserved at or after `len`
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len.max(1));
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    pub fn variant(&self, id: NodeId) -> Variant {
        self.get(id).variant()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).kind.children()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Whether any node is still pending
    pub fn has_pending(&self) -> bool {
        self.nodes.iter().any(|node| node.kind.is_pending())
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::token::{Token, TokenKind};

    #[test]
    fn test_levels_follow_parents() {
        let mut ast = Ast::new();
        let class = ast.reserve(Variant::Class, ast.root(), 1);
        let resource = ast.reserve(Variant::Resource, class, 2);
        assert_eq!(ast.get(ast.root()).level, -1);
        assert_eq!(ast.get(class).level, 0);
        assert_eq!(ast.get(resource).level, 1);
        assert_eq!(ast.get(resource).parent, Some(class));
    }

    #[test]
    fn test_truncate_discards_descendants() {
        let mut ast = Ast::new();
        let keep = ast.reserve(Variant::Comment, ast.root(), 1);
        let mark = ast.len();
        let hash = ast.reserve(Variant::Hash, ast.root(), 2);
        ast.reserve(Variant::KeyValuePair, hash, 2);
        ast.truncate(mark);
        assert_eq!(ast.len(), 2);
        assert_eq!(ast.variant(keep), Variant::Comment);
    }

    #[test]
    fn test_truncate_keeps_root() {
        let mut ast = Ast::new();
        ast.truncate(0);
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn test_fill_replaces_pending() {
        let mut ast = Ast::new();
        let id = ast.reserve(Variant::Simple, ast.root(), 1);
        assert!(ast.has_pending());
        ast.fill(
            id,
            NodeKind::Simple {
                token: Token::new(TokenKind::Number, "1", 1),
            },
        );
        ast.fill(ast.root(), NodeKind::Manifest { statements: vec![id] });
        assert!(!ast.has_pending());
        assert_eq!(ast.children(ast.root()), vec![id]);
    }
}
