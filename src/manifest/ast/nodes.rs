//! Node variants of the manifest tree
//!
//!     The tree is a closed family: [Variant] names the node types the grammar registry
//!     knows about, and [NodeKind] carries each variant's fields. Children are referenced
//!     by [NodeId] into the owning [Ast](super::Ast) arena; tokens are stored by value so
//!     the renderer never has to look back at the token stream.
//!
//!     A node is reserved as [NodeKind::Pending] before its children are parsed, so that the
//!     children can record their parent and level, and is filled in once construction
//!     succeeds. A finished tree holds no pending node.

use crate::manifest::token::Token;
use serde::Serialize;
use std::fmt;

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    Manifest,
    Class,
    Define,
    Node,
    Parameter,
    Resource,
    ResourceTitle,
    Collector,
    IfStatement,
    CaseStatement,
    CaseCondition,
    Selector,
    Include,
    VarAssignment,
    FunctionCall,
    DependencyChain,
    ResourceRef,
    Hash,
    List,
    KeyValuePair,
    Expression,
    Parenthesized,
    Unary,
    Comment,
    MultilineComment,
    Simple,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Manifest => "Manifest",
            Variant::Class => "Class",
            Variant::Define => "Define",
            Variant::Node => "Node",
            Variant::Parameter => "Parameter",
            Variant::Resource => "Resource",
            Variant::ResourceTitle => "ResourceTitle",
            Variant::Collector => "Collector",
            Variant::IfStatement => "IfStatement",
            Variant::CaseStatement => "CaseStatement",
            Variant::CaseCondition => "CaseCondition",
            Variant::Selector => "Selector",
            Variant::Include => "Include",
            Variant::VarAssignment => "VarAssignment",
            Variant::FunctionCall => "FunctionCall",
            Variant::DependencyChain => "DependencyChain",
            Variant::ResourceRef => "ResourceRef",
            Variant::Hash => "Hash",
            Variant::List => "List",
            Variant::KeyValuePair => "KeyValuePair",
            Variant::Expression => "Expression",
            Variant::Parenthesized => "Parenthesized",
            Variant::Unary => "Unary",
            Variant::Comment => "Comment",
            Variant::MultilineComment => "MultilineComment",
            Variant::Simple => "Simple",
        }
    }

    /// Variants whose body is a statement list
    pub fn holds_statements(self) -> bool {
        matches!(
            self,
            Variant::Manifest
                | Variant::Class
                | Variant::Define
                | Variant::Node
                | Variant::IfStatement
                | Variant::CaseCondition
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Variant::Comment | Variant::MultilineComment)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Head of a resource declaration: a type name or a reference being overridden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResourceHead {
    Type(Token),
    Reference(NodeId),
}

/// One element of an expression's flat term/operator sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprPart {
    Term(NodeId),
    Operator(Token),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// Reserved while its children are being parsed
    Pending(Variant),
    Manifest {
        statements: Vec<NodeId>,
    },
    Class {
        name: Token,
        params: Vec<NodeId>,
        inherits: Option<Token>,
        body: Vec<NodeId>,
    },
    Define {
        name: Token,
        params: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Node {
        names: Vec<Token>,
        inherits: Option<Token>,
        body: Vec<NodeId>,
    },
    Parameter {
        type_expr: Option<NodeId>,
        name: Token,
        default: Option<NodeId>,
    },
    /// `items` interleaves titles, key/value pairs and comments in source order
    Resource {
        sigil: String,
        head: ResourceHead,
        collector: Option<NodeId>,
        has_block: bool,
        items: Vec<NodeId>,
    },
    ResourceTitle {
        titles: Vec<NodeId>,
    },
    Collector {
        open: Token,
        query: Option<NodeId>,
        close: Token,
    },
    /// `condition` is absent for an `else` branch
    IfStatement {
        keyword: Token,
        condition: Option<NodeId>,
        body: Vec<NodeId>,
    },
    CaseStatement {
        subject: NodeId,
        body: Vec<NodeId>,
    },
    CaseCondition {
        values: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Selector {
        subject: NodeId,
        items: Vec<NodeId>,
    },
    Include {
        keyword: Token,
        args: Vec<NodeId>,
    },
    VarAssignment {
        name: Token,
        operator: Token,
        value: NodeId,
    },
    FunctionCall {
        name: Token,
        args: Vec<NodeId>,
        parenthesized: bool,
    },
    DependencyChain {
        members: Vec<NodeId>,
        edges: Vec<Token>,
    },
    ResourceRef {
        head: Token,
        indexes: Vec<NodeId>,
    },
    Hash {
        items: Vec<NodeId>,
    },
    List {
        items: Vec<NodeId>,
    },
    /// `key_width` is set by the alignment pass; zero means unaligned
    KeyValuePair {
        key: Token,
        arrow: Token,
        value: NodeId,
        key_width: usize,
    },
    Expression {
        parts: Vec<ExprPart>,
    },
    Parenthesized {
        inner: NodeId,
    },
    Unary {
        operator: Token,
        operand: NodeId,
    },
    Comment {
        text: String,
    },
    MultilineComment {
        text: String,
    },
    Simple {
        token: Token,
    },
}

impl NodeKind {
    pub fn variant(&self) -> Variant {
        match self {
            NodeKind::Pending(variant) => *variant,
            NodeKind::Manifest { .. } => Variant::Manifest,
            NodeKind::Class { .. } => Variant::Class,
            NodeKind::Define { .. } => Variant::Define,
            NodeKind::Node { .. } => Variant::Node,
            NodeKind::Parameter { .. } => Variant::Parameter,
            NodeKind::Resource { .. } => Variant::Resource,
            NodeKind::ResourceTitle { .. } => Variant::ResourceTitle,
            NodeKind::Collector { .. } => Variant::Collector,
            NodeKind::IfStatement { .. } => Variant::IfStatement,
            NodeKind::CaseStatement { .. } => Variant::CaseStatement,
            NodeKind::CaseCondition { .. } => Variant::CaseCondition,
            NodeKind::Selector { .. } => Variant::Selector,
            NodeKind::Include { .. } => Variant::Include,
            NodeKind::VarAssignment { .. } => Variant::VarAssignment,
            NodeKind::FunctionCall { .. } => Variant::FunctionCall,
            NodeKind::DependencyChain { .. } => Variant::DependencyChain,
            NodeKind::ResourceRef { .. } => Variant::ResourceRef,
            NodeKind::Hash { .. } => Variant::Hash,
            NodeKind::List { .. } => Variant::List,
            NodeKind::KeyValuePair { .. } => Variant::KeyValuePair,
            NodeKind::Expression { .. } => Variant::Expression,
            NodeKind::Parenthesized { .. } => Variant::Parenthesized,
            NodeKind::Unary { .. } => Variant::Unary,
            NodeKind::Comment { .. } => Variant::Comment,
            NodeKind::MultilineComment { .. } => Variant::MultilineComment,
            NodeKind::Simple { .. } => Variant::Simple,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, NodeKind::Pending(_))
    }

    /// Child nodes in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Pending(_)
            | NodeKind::Comment { .. }
            | NodeKind::MultilineComment { .. }
            | NodeKind::Simple { .. } => Vec::new(),
            NodeKind::Manifest { statements } => statements.clone(),
            NodeKind::Class { params, body, .. } | NodeKind::Define { params, body, .. } => {
                params.iter().chain(body).copied().collect()
            }
            NodeKind::Node { body, .. } => body.clone(),
            NodeKind::Parameter {
                type_expr, default, ..
            } => type_expr.iter().chain(default).copied().collect(),
            NodeKind::Resource {
                head,
                collector,
                items,
                ..
            } => {
                let mut children = Vec::new();
                if let ResourceHead::Reference(id) = head {
                    children.push(*id);
                }
                children.extend(collector.iter().copied());
                children.extend(items.iter().copied());
                children
            }
            NodeKind::ResourceTitle { titles } => titles.clone(),
            NodeKind::Collector { query, .. } => query.iter().copied().collect(),
            NodeKind::IfStatement {
                condition, body, ..
            } => condition.iter().chain(body).copied().collect(),
            NodeKind::CaseStatement { subject, body } => {
                std::iter::once(*subject).chain(body.iter().copied()).collect()
            }
            NodeKind::CaseCondition { values, body } => {
                values.iter().chain(body).copied().collect()
            }
            NodeKind::Selector { subject, items } => {
                std::iter::once(*subject).chain(items.iter().copied()).collect()
            }
            NodeKind::Include { args, .. } | NodeKind::FunctionCall { args, .. } => args.clone(),
            NodeKind::VarAssignment { value, .. } => vec![*value],
            NodeKind::DependencyChain { members, .. } => members.clone(),
            NodeKind::ResourceRef { indexes, .. } => indexes.clone(),
            NodeKind::Hash { items } | NodeKind::List { items } => items.clone(),
            NodeKind::KeyValuePair { value, .. } => vec![*value],
            NodeKind::Expression { parts } => parts
                .iter()
                .filter_map(|part| match part {
                    ExprPart::Term(id) => Some(*id),
                    ExprPart::Operator(_) => None,
                })
                .collect(),
            NodeKind::Parenthesized { inner } => vec![*inner],
            NodeKind::Unary { operand, .. } => vec![*operand],
        }
    }
}

/// A node together with its tree bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// `parent.level + 1`; the root sits at -1
    pub level: i32,
    pub line: u32,
    pub inner_spacing: bool,
    pub outer_spacing: bool,
}

impl Node {
    pub fn variant(&self) -> Variant {
        self.kind.variant()
    }
}
