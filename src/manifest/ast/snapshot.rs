//! AST Snapshot - a normalized, serializable view of the tree
//!
//! The snapshot flattens each node into a type name, a short label, a map of
//! scalar attributes and its children, so that the JSON and treeviz formats can
//! focus on presentation without re-walking the arena.

use super::arena::Ast;
use super::nodes::{ExprPart, NodeId, NodeKind, ResourceHead};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A snapshot of a node in a normalized, serializable form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    pub node_type: String,
    pub label: String,
    pub line: u32,
    pub level: i32,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            line: 0,
            level: 0,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: AstSnapshot) -> Self {
        self.children.push(child);
        self
    }
}

/// Snapshot the whole tree from its root
pub fn snapshot_from_ast(ast: &Ast) -> AstSnapshot {
    snapshot_node(ast, ast.root())
}

/// Snapshot one node and its descendants
pub fn snapshot_node(ast: &Ast, id: NodeId) -> AstSnapshot {
    let node = ast.get(id);
    let mut snapshot = AstSnapshot::new(node.variant().name(), "");
    snapshot.line = node.line;
    snapshot.level = node.level;
    if node.outer_spacing {
        snapshot = snapshot.with_attribute("outer_spacing", "true");
    }

    snapshot = match &node.kind {
        NodeKind::Pending(_) | NodeKind::Manifest { .. } => snapshot,
        NodeKind::Class { name, inherits, .. } => {
            let snapshot = labelled(snapshot, &name.text);
            match inherits {
                Some(parent) => snapshot.with_attribute("inherits", parent.text.as_str()),
                None => snapshot,
            }
        }
        NodeKind::Define { name, .. } => labelled(snapshot, &name.text),
        NodeKind::Node { names, inherits, .. } => {
            let names: Vec<&str> = names.iter().map(|t| t.text.as_str()).collect();
            let snapshot = labelled(snapshot, &names.join(", "));
            match inherits {
                Some(parent) => snapshot.with_attribute("inherits", parent.text.as_str()),
                None => snapshot,
            }
        }
        NodeKind::Parameter { name, .. } => labelled(snapshot, &name.text),
        NodeKind::Resource {
            sigil, head, has_block, ..
        } => {
            let label = match head {
                ResourceHead::Type(token) => format!("{}{}", sigil, token.text),
                ResourceHead::Reference(_) => format!("{}<reference>", sigil),
            };
            let snapshot = labelled(snapshot, &label);
            if sigil.is_empty() {
                snapshot.with_attribute("block", has_block.to_string())
            } else {
                snapshot
                    .with_attribute("sigil", sigil.as_str())
                    .with_attribute("block", has_block.to_string())
            }
        }
        NodeKind::ResourceTitle { .. } => snapshot,
        NodeKind::Collector { open, close, .. } => {
            labelled(snapshot, &format!("{} {}", open.text, close.text))
        }
        NodeKind::IfStatement { keyword, .. } => labelled(snapshot, &keyword.text),
        NodeKind::CaseStatement { .. } | NodeKind::CaseCondition { .. } => snapshot,
        NodeKind::Selector { .. } | NodeKind::Hash { .. } | NodeKind::List { .. } => snapshot,
        NodeKind::Include { keyword, .. } => labelled(snapshot, &keyword.text),
        NodeKind::VarAssignment { name, operator, .. } => {
            labelled(snapshot, &name.text).with_attribute("operator", operator.text.as_str())
        }
        NodeKind::FunctionCall {
            name,
            parenthesized,
            ..
        } => labelled(snapshot, &name.text)
            .with_attribute("parenthesized", parenthesized.to_string()),
        NodeKind::DependencyChain { edges, .. } => {
            let edges: Vec<&str> = edges.iter().map(|t| t.text.as_str()).collect();
            labelled(snapshot, &edges.join(" "))
        }
        NodeKind::ResourceRef { head, .. } => labelled(snapshot, &head.text),
        NodeKind::KeyValuePair {
            key,
            arrow,
            key_width,
            ..
        } => {
            let snapshot =
                labelled(snapshot, &key.text).with_attribute("arrow", arrow.text.as_str());
            if *key_width > 0 {
                snapshot.with_attribute("key_width", key_width.to_string())
            } else {
                snapshot
            }
        }
        NodeKind::Expression { parts } => {
            let operators: Vec<&str> = parts
                .iter()
                .filter_map(|part| match part {
                    ExprPart::Operator(token) => Some(token.text.as_str()),
                    ExprPart::Term(_) => None,
                })
                .collect();
            if operators.is_empty() {
                snapshot
            } else {
                snapshot.with_attribute("operators", operators.join(" "))
            }
        }
        NodeKind::Parenthesized { .. } => snapshot,
        NodeKind::Unary { operator, .. } => labelled(snapshot, &operator.text),
        NodeKind::Comment { text } | NodeKind::MultilineComment { text } => {
            labelled(snapshot, text)
        }
        NodeKind::Simple { token } => {
            labelled(snapshot, &token.text).with_attribute("token", token.kind.to_string())
        }
    };

    for child in node.kind.children() {
        snapshot = snapshot.with_child(snapshot_node(ast, child));
    }
    snapshot
}

fn labelled(mut snapshot: AstSnapshot, label: &str) -> AstSnapshot {
    snapshot.label = label.to_string();
    snapshot
}
