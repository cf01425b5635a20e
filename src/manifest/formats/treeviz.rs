//! Treeviz formatter for manifest trees
//!
//! One line per node, with the nesting drawn as box connectors so a tree can be
//! scanned quickly:
//!
//!     <prefix><connector> <icon> <NodeType>: <label>
//!
//! Labels are truncated to 30 characters. Nodes without a label print the type only.
//!
//! Example:
//!
//!     ├─ § Class: apache
//!     │ └─ ⧈ Resource: package
//!     │   ├─ ⊤ ResourceTitle
//!     │   │ └─ ∑ Expression
//!     │   │   └─ ◦ Simple: 'httpd'
//!     │   └─ ⇒ KeyValuePair: ensure
//!     │     └─ ∑ Expression
//!     │       └─ ◦ Simple: installed
//!     └─ ↦ Include: include
//!
//! Icons
//!     Statements:
//!         Class: §    Define: ƒ    Node: ⌂    Resource: ⧈    IfStatement: ⑂
//!         CaseStatement: ⋔    CaseCondition: ▹    Include: ↦    VarAssignment: ≔
//!         FunctionCall: ⨍    DependencyChain: ⛓
//!     Resource parts:
//!         ResourceTitle: ⊤    Collector: ⟪    ResourceRef: ⊕    Parameter: ¤
//!     Values:
//!         Hash: ⌗    List: ☰    KeyValuePair: ⇒    Selector: ?    Expression: ∑
//!         Parenthesized: ()    Unary: ¬    Simple: ◦
//!     Trivia:
//!         Comment: #    MultilineComment: ¶

use super::registry::{FormatError, Formatter};
use crate::manifest::ast::{snapshot_from_ast, Ast, AstSnapshot};

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, FormatError> {
        Ok(to_treeviz_str(ast))
    }

    fn description(&self) -> &str {
        "One line per node, drawn as a tree"
    }
}

fn icon(node_type: &str) -> &'static str {
    match node_type {
        "Class" => "§",
        "Define" => "ƒ",
        "Node" => "⌂",
        "Resource" => "⧈",
        "IfStatement" => "⑂",
        "CaseStatement" => "⋔",
        "CaseCondition" => "▹",
        "Include" => "↦",
        "VarAssignment" => "≔",
        "FunctionCall" => "⨍",
        "DependencyChain" => "⛓",
        "ResourceTitle" => "⊤",
        "Collector" => "⟪",
        "ResourceRef" => "⊕",
        "Parameter" => "¤",
        "Hash" => "⌗",
        "List" => "☰",
        "KeyValuePair" => "⇒",
        "Selector" => "?",
        "Expression" => "∑",
        "Parenthesized" => "()",
        "Unary" => "¬",
        "Comment" => "#",
        "MultilineComment" => "¶",
        "Simple" => "◦",
        _ => "⧉",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

pub fn to_treeviz_str(ast: &Ast) -> String {
    let root = snapshot_from_ast(ast);
    let mut result = String::new();
    append_children(&mut result, &root.children, "");
    result
}

fn append_node(result: &mut String, node: &AstSnapshot, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let icon = icon(&node.node_type);

    if node.label.is_empty() {
        result.push_str(&format!("{}{} {} {}\n", prefix, connector, icon, node.node_type));
    } else {
        // Multi-line comments are shown by their first line
        let label = node.label.lines().next().unwrap_or_default();
        result.push_str(&format!(
            "{}{} {} {}: {}\n",
            prefix,
            connector,
            icon,
            node.node_type,
            truncate(label, 30)
        ));
    }

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, &node.children, &new_prefix);
}

fn append_children(result: &mut String, children: &[AstSnapshot], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, child, prefix, is_last);
    }
}
