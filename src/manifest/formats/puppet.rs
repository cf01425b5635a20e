//! Canonical manifest renderer
//!
//!     Renders the tree back to source text. Statements are indented by their level;
//!     expressions are rendered inline where that stays readable and expanded one item per
//!     line otherwise.
//!
//! Blank Lines
//!
//!     Containers lay out their children with [Renderer::output_children]:
//!
//!     1. A child with `outer_spacing` gets a blank line before it, unless the previous
//!        sibling is a comment (comments stay attached to what follows them).
//!     2. A blank line always follows an outer-spaced child, unless the next sibling is an
//!        `else`/`elsif` branch.
//!     3. An `else`/`elsif` branch directly after an `if` branch is joined to its `}` as
//!        `} else` when `cuddle_else` is on.
//!
//!     At most one blank line ever separates two siblings. String and comment bodies are
//!     emitted as they were lexed.
//!
//!     Block bodies are trimmed, so `{` is never followed and `}` never preceded by a blank
//!     line. Empty blocks render as `{}`.
//!
//! Layout
//!
//!     | Node          | Inline when                                   | Otherwise                  |
//!     |---------------|-----------------------------------------------|----------------------------|
//!     | Hash          | one single-line pair, no comments             | one pair per line, `,`     |
//!     | List          | no comments, no multi-line item               | one item per line, `,`     |
//!     | Parameters    | no comments and the header fits the width     | one parameter per line, `,`|
//!     | Selector      | never                                         | one pair per line, `,`     |
//!
//!     A resource with several titles renders one block per title, separated by a blank
//!     line. As a dependency chain member it stays one block, with `;` ending each title's
//!     attributes.

use super::alignment::align_keys;
use super::registry::{FormatError, Formatter};
use crate::manifest::ast::{Ast, ExprPart, NodeId, NodeKind, ResourceHead, Variant};
use crate::manifest::config::FormattingConfig;

/// Render a parsed manifest in canonical form
pub fn render(ast: &Ast, options: &FormattingConfig) -> String {
    let mut ast = ast.clone();
    if options.align_arrows {
        align_keys(&mut ast);
    }
    Renderer::new(&ast, options).manifest()
}

pub struct PuppetFormatter {
    options: FormattingConfig,
}

impl PuppetFormatter {
    pub fn new(options: FormattingConfig) -> Self {
        Self { options }
    }
}

impl Formatter for PuppetFormatter {
    fn name(&self) -> &str {
        "puppet"
    }

    fn serialize(&self, ast: &Ast) -> Result<String, FormatError> {
        Ok(render(ast, &self.options))
    }

    fn description(&self) -> &str {
        "Canonically formatted manifest source"
    }
}

pub struct Renderer<'a> {
    ast: &'a Ast,
    options: &'a FormattingConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(ast: &'a Ast, options: &'a FormattingConfig) -> Self {
        Self { ast, options }
    }

    pub fn manifest(&self) -> String {
        let root = self.ast.root();
        let NodeKind::Manifest { statements } = self.ast.kind(root) else {
            return String::new();
        };
        let body = self.output_children(root, statements);
        let body = body.trim_matches('\n');
        if body.is_empty() {
            String::new()
        } else {
            format!("{}\n", body)
        }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.options.indent_width)
    }

    fn depth(&self, id: NodeId) -> usize {
        self.ast.get(id).level.max(0) as usize
    }

    /// One statement on its own line(s), indented by its level
    fn output(&self, id: NodeId) -> String {
        let depth = self.depth(id);
        format!("{}{}\n", self.pad(depth), self.text(id, depth))
    }

    pub fn output_children(&self, parent: NodeId, children: &[NodeId]) -> String {
        let padded = self.ast.get(parent).inner_spacing;
        let mut out = String::new();
        if padded {
            out.push('\n');
        }

        let mut previous: Option<NodeId> = None;
        for &child in children {
            if let Some(prev) = previous {
                if self.cuddles(prev, child) {
                    out.pop();
                    out.push(' ');
                    out.push_str(&self.text(child, self.depth(child)));
                    out.push('\n');
                    previous = Some(child);
                    continue;
                }
                let prev_node = self.ast.get(prev);
                let node = self.ast.get(child);
                let blank = !self.is_else_branch(child)
                    && (prev_node.outer_spacing
                        || (node.outer_spacing && !prev_node.variant().is_comment()));
                if blank {
                    out.push('\n');
                }
            }
            out.push_str(&self.output(child));
            previous = Some(child);
        }

        if padded {
            out.push('\n');
        }
        out
    }

    /// An `else`/`elsif` branch joins the closing `}` of the branch before it
    fn cuddles(&self, prev: NodeId, child: NodeId) -> bool {
        self.options.cuddle_else
            && self.is_else_branch(child)
            && self.ast.variant(prev) == Variant::IfStatement
    }

    fn is_else_branch(&self, id: NodeId) -> bool {
        matches!(
            self.ast.kind(id),
            NodeKind::IfStatement { keyword, .. } if keyword.text != "if"
        )
    }

    fn block(&self, owner: NodeId, body: &[NodeId], depth: usize) -> String {
        if body.is_empty() {
            return "{}".to_string();
        }
        let inner = self.output_children(owner, body);
        format!("{{\n{}\n{}}}", inner.trim_matches('\n'), self.pad(depth))
    }

    /// Text of any node. The first line is unindented; later lines are indented for `depth`.
    pub fn text(&self, id: NodeId, depth: usize) -> String {
        match self.ast.kind(id) {
            NodeKind::Pending(_) | NodeKind::Manifest { .. } => String::new(),
            NodeKind::Comment { text } => comment_text(text),
            NodeKind::MultilineComment { text } => text.clone(),
            NodeKind::Class {
                name,
                params,
                inherits,
                body,
            } => {
                let prefix = format!("class {}", name.text);
                let suffix = match inherits {
                    Some(parent) => format!(" inherits {} {{", parent.text),
                    None => " {".to_string(),
                };
                let params = self.parameters(params, depth, &prefix, " ", &suffix);
                let inherits = match inherits {
                    Some(parent) => format!(" inherits {}", parent.text),
                    None => String::new(),
                };
                format!(
                    "{}{}{} {}",
                    prefix,
                    params,
                    inherits,
                    self.block(id, body, depth)
                )
            }
            NodeKind::Define { name, params, body } => {
                let prefix = format!("define {}", name.text);
                let params = self.parameters(params, depth, &prefix, "", " {");
                format!("{}{} {}", prefix, params, self.block(id, body, depth))
            }
            NodeKind::Node {
                names,
                inherits,
                body,
            } => {
                let names: Vec<&str> = names.iter().map(|t| t.text.as_str()).collect();
                let inherits = match inherits {
                    Some(parent) => format!(" inherits {}", parent.text),
                    None => String::new(),
                };
                format!(
                    "node {}{} {}",
                    names.join(", "),
                    inherits,
                    self.block(id, body, depth)
                )
            }
            NodeKind::Parameter {
                type_expr,
                name,
                default,
            } => {
                let mut text = String::new();
                if let Some(type_expr) = type_expr {
                    text.push_str(&self.text(*type_expr, depth));
                    text.push(' ');
                }
                text.push_str(&name.text);
                if let Some(default) = default {
                    text.push_str(" = ");
                    text.push_str(&self.text(*default, depth));
                }
                text
            }
            NodeKind::Resource { .. } => self.resource(id, depth),
            NodeKind::ResourceTitle { titles } => format!("{}:", self.joined(titles, depth)),
            NodeKind::Collector { open, query, close } => match query {
                Some(query) => format!("{} {} {}", open.text, self.text(*query, depth), close.text),
                None => format!("{} {}", open.text, close.text),
            },
            NodeKind::IfStatement {
                keyword,
                condition,
                body,
            } => match condition {
                Some(condition) => format!(
                    "{} {} {}",
                    keyword.text,
                    self.text(*condition, depth),
                    self.block(id, body, depth)
                ),
                None => format!("{} {}", keyword.text, self.block(id, body, depth)),
            },
            NodeKind::CaseStatement { subject, body } => format!(
                "case {} {}",
                self.text(*subject, depth),
                self.block(id, body, depth)
            ),
            NodeKind::CaseCondition { values, body } => format!(
                "{}: {}",
                self.joined(values, depth),
                self.block(id, body, depth)
            ),
            NodeKind::Selector { subject, items } => {
                let subject = self.text(*subject, depth);
                if items.is_empty() {
                    format!("{} ? {{}}", subject)
                } else {
                    format!("{} ? {}", subject, self.expanded(items, depth, "{", "}"))
                }
            }
            NodeKind::Include { keyword, args } => {
                format!("{} {}", keyword.text, self.joined(args, depth))
            }
            NodeKind::VarAssignment {
                name,
                operator,
                value,
            } => format!(
                "{} {} {}",
                name.text,
                operator.text,
                self.text(*value, depth)
            ),
            NodeKind::FunctionCall {
                name,
                args,
                parenthesized,
            } => {
                if *parenthesized {
                    format!("{}({})", name.text, self.joined(args, depth))
                } else {
                    format!("{} {}", name.text, self.joined(args, depth))
                }
            }
            NodeKind::DependencyChain { members, edges } => {
                let mut text = String::new();
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        let edge = edges.get(index - 1).map_or("->", |t| t.text.as_str());
                        text.push(' ');
                        text.push_str(edge);
                        text.push(' ');
                    }
                    text.push_str(&self.text(*member, depth));
                }
                text
            }
            NodeKind::ResourceRef { head, indexes } => {
                let mut text = head.text.clone();
                for index in indexes {
                    text.push_str(&self.text(*index, depth));
                }
                text
            }
            NodeKind::Hash { items } => self.hash(items, depth),
            NodeKind::List { items } => self.list(items, depth),
            NodeKind::KeyValuePair {
                key,
                arrow,
                value,
                key_width,
            } => format!(
                "{:<width$} {} {}",
                key.text,
                arrow.text,
                self.text(*value, depth),
                width = *key_width
            ),
            NodeKind::Expression { parts } => {
                let parts: Vec<String> = parts
                    .iter()
                    .map(|part| match part {
                        ExprPart::Term(term) => self.text(*term, depth),
                        ExprPart::Operator(token) => token.text.clone(),
                    })
                    .collect();
                parts.join(" ")
            }
            NodeKind::Parenthesized { inner } => format!("({})", self.text(*inner, depth)),
            NodeKind::Unary { operator, operand } => {
                format!("{}{}", operator.text, self.text(*operand, depth))
            }
            NodeKind::Simple { token } => token.text.clone(),
        }
    }

    fn joined(&self, ids: &[NodeId], depth: usize) -> String {
        let texts: Vec<String> = ids.iter().map(|id| self.text(*id, depth)).collect();
        texts.join(", ")
    }

    fn is_comment(&self, id: NodeId) -> bool {
        self.ast.variant(id).is_comment()
    }

    /// Items one per line between `open` and `close`, non-comments ending in `,`
    fn expanded(&self, items: &[NodeId], depth: usize, open: &str, close: &str) -> String {
        let mut text = format!("{}\n", open);
        for item in items {
            text.push_str(&self.pad(depth + 1));
            text.push_str(&self.text(*item, depth + 1));
            if !self.is_comment(*item) {
                text.push(',');
            }
            text.push('\n');
        }
        text.push_str(&self.pad(depth));
        text.push_str(close);
        text
    }

    fn hash(&self, items: &[NodeId], depth: usize) -> String {
        match items {
            [] => "{}".to_string(),
            [pair] if self.ast.variant(*pair) == Variant::KeyValuePair => {
                let text = self.text(*pair, depth);
                if text.contains('\n') {
                    self.expanded(items, depth, "{", "}")
                } else {
                    format!("{{ {} }}", text)
                }
            }
            _ => self.expanded(items, depth, "{", "}"),
        }
    }

    fn list(&self, items: &[NodeId], depth: usize) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }
        let texts: Vec<String> = items.iter().map(|id| self.text(*id, depth)).collect();
        let inline = !items.iter().any(|id| self.is_comment(*id))
            && !texts.iter().any(|text| text.contains('\n'));
        if inline {
            format!("[{}]", texts.join(", "))
        } else {
            self.expanded(items, depth, "[", "]")
        }
    }

    /// Parameter list of a class or define; empty lists are omitted
    fn parameters(
        &self,
        params: &[NodeId],
        depth: usize,
        prefix: &str,
        separator: &str,
        suffix: &str,
    ) -> String {
        if params.is_empty() {
            return String::new();
        }
        let texts: Vec<String> = params.iter().map(|id| self.text(*id, depth + 1)).collect();
        let inline = format!("({})", texts.join(", "));
        let width = self.pad(depth).len() + prefix.len() + separator.len() + inline.len()
            + suffix.len();
        let fits = !params.iter().any(|id| self.is_comment(*id))
            && !inline.contains('\n')
            && width <= self.options.max_line_width;
        if fits {
            format!("{}{}", separator, inline)
        } else {
            format!("{}{}", separator, self.expanded(params, depth, "(", ")"))
        }
    }

    fn resource(&self, id: NodeId, depth: usize) -> String {
        let NodeKind::Resource {
            sigil,
            head,
            collector,
            has_block,
            items,
        } = self.ast.kind(id)
        else {
            return String::new();
        };

        let mut head_text = sigil.clone();
        match head {
            ResourceHead::Type(token) => head_text.push_str(&token.text),
            ResourceHead::Reference(reference) => {
                head_text.push_str(&self.text(*reference, depth))
            }
        }
        if let Some(collector) = collector {
            head_text.push(' ');
            head_text.push_str(&self.text(*collector, depth));
        }
        if !has_block {
            return head_text;
        }

        let (prelude, groups) = self.title_groups(items);
        if groups.is_empty() {
            return if prelude.is_empty() {
                format!("{} {{}}", head_text)
            } else {
                format!("{} {}", head_text, self.expanded(&prelude, depth, "{", "}"))
            };
        }

        let in_chain = self
            .ast
            .get(id)
            .parent
            .map_or(false, |parent| self.ast.variant(parent) == Variant::DependencyChain);

        // Comments ahead of the first title move above the head
        let mut leading = String::new();
        let mut prelude_pairs = Vec::new();
        for item in prelude {
            if self.is_comment(item) {
                leading.push_str(&self.text(item, depth));
                leading.push('\n');
                leading.push_str(&self.pad(depth));
            } else {
                prelude_pairs.push(item);
            }
        }

        if in_chain && groups.len() > 1 {
            return format!(
                "{}{}",
                leading,
                self.compact_resource(&head_text, &prelude_pairs, &groups, depth)
            );
        }

        let blocks: Vec<String> = groups
            .iter()
            .enumerate()
            .map(|(index, (title, members))| {
                let members: Vec<NodeId> = if index == 0 {
                    prelude_pairs.iter().chain(members).copied().collect()
                } else {
                    members.clone()
                };
                let title = self.text(*title, depth);
                if members.is_empty() {
                    format!("{} {{ {} }}", head_text, title)
                } else {
                    let body = self.expanded(&members, depth, "", "}");
                    format!("{} {{ {}{}", head_text, title, body)
                }
            })
            .collect();
        format!("{}{}", leading, blocks.join(&format!("\n\n{}", self.pad(depth))))
    }

    /// Items before the first title, then each title with the items that follow it
    fn title_groups(&self, items: &[NodeId]) -> (Vec<NodeId>, Vec<(NodeId, Vec<NodeId>)>) {
        let mut prelude = Vec::new();
        let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
        for &item in items {
            if self.ast.variant(item) == Variant::ResourceTitle {
                groups.push((item, Vec::new()));
            } else if let Some((_, members)) = groups.last_mut() {
                members.push(item);
            } else {
                prelude.push(item);
            }
        }
        (prelude, groups)
    }

    /// Several titles in one block: attributes end in `,`, the last one of a title in `;`
    fn compact_resource(
        &self,
        head_text: &str,
        prelude: &[NodeId],
        groups: &[(NodeId, Vec<NodeId>)],
        depth: usize,
    ) -> String {
        let mut text = format!("{} {{\n", head_text);
        for (index, (title, members)) in groups.iter().enumerate() {
            let members: Vec<NodeId> = if index == 0 {
                prelude.iter().chain(members).copied().collect()
            } else {
                members.clone()
            };
            let last_pair = members.iter().rposition(|id| !self.is_comment(*id));

            text.push_str(&self.pad(depth + 1));
            text.push_str(&self.text(*title, depth + 1));
            if last_pair.is_none() {
                text.push(';');
            }
            text.push('\n');
            for (position, member) in members.iter().enumerate() {
                text.push_str(&self.pad(depth + 2));
                text.push_str(&self.text(*member, depth + 2));
                if Some(position) == last_pair {
                    text.push(';');
                } else if !self.is_comment(*member) {
                    text.push(',');
                }
                text.push('\n');
            }
        }
        text.push_str(&self.pad(depth));
        text.push('}');
        text
    }
}

/// `#text` becomes `# text`; empty comments stay `#`
fn comment_text(text: &str) -> String {
    let rest = text.strip_prefix('#').unwrap_or(text).trim_end();
    if rest.is_empty() {
        "#".to_string()
    } else if rest.starts_with(char::is_whitespace) || rest.starts_with('#') {
        format!("#{}", rest)
    } else {
        format!("# {}", rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::config::{PupfmtConfig, SplitMode};
    use crate::manifest::format_source;

    fn fmt(source: &str) -> String {
        format_source(source, &PupfmtConfig::default()).expect("format")
    }

    #[test]
    fn test_comment_normalization() {
        assert_eq!(comment_text("#foo"), "# foo");
        assert_eq!(comment_text("# foo  "), "# foo");
        assert_eq!(comment_text("#"), "#");
        assert_eq!(comment_text("## section"), "## section");
        assert_eq!(comment_text("#   indented"), "#   indented");
    }

    #[test]
    fn test_blank_line_between_blocks() {
        assert_eq!(
            fmt("file{'a':}\nfile{'b':}"),
            "file { 'a': }\n\nfile { 'b': }\n"
        );
    }

    #[test]
    fn test_comment_stays_attached() {
        assert_eq!(
            fmt("include a\n# about b\nfile { 'b': }"),
            "include a\n# about b\nfile { 'b': }\n"
        );
    }

    #[test]
    fn test_cuddled_else() {
        let source = "if $a {\n  include x\n}\n\n\nelse {\n  include y\n}\n";
        assert_eq!(
            fmt(source),
            "if $a {\n  include x\n} else {\n  include y\n}\n"
        );
    }

    #[test]
    fn test_uncuddled_else() {
        let mut config = PupfmtConfig::default();
        config.formatting.cuddle_else = false;
        let formatted = format_source("if $a { } else { }", &config).expect("format");
        assert_eq!(formatted, "if $a {}\nelse {}\n");
    }

    #[test]
    fn test_literal_bodies_are_verbatim() {
        assert_eq!(
            fmt("$a = \"multi\n\n\n\nline\""),
            "$a = \"multi\n\n\n\nline\"\n"
        );
        assert_eq!(fmt("$a = \"}\n\nelse\""), "$a = \"}\n\nelse\"\n");
        assert_eq!(fmt("/* a\n\n\n\nb */"), "/* a\n\n\n\nb */\n");
        assert_eq!(
            fmt("if $a {\n  $b = \"}\n  else\"\n}"),
            "if $a {\n  $b = \"}\n  else\"\n}\n"
        );
    }

    #[test]
    fn test_comment_between_branches_blocks_cuddling() {
        assert_eq!(
            fmt("if $a { }\n# other\nelse { }"),
            "if $a {}\n\n# other\nelse {}\n"
        );
    }

    #[test]
    fn test_hash_layout() {
        assert_eq!(fmt("$h = {'a'=>1}"), "$h = { 'a' => 1 }\n");
        assert_eq!(
            fmt("$h = {'a'=>1,'bbb'=>2}"),
            "$h = {\n  'a'   => 1,\n  'bbb' => 2,\n}\n"
        );
        assert_eq!(fmt("$h = {}"), "$h = {}\n");
    }

    #[test]
    fn test_list_layout() {
        assert_eq!(fmt("$l = [ 1,2 , 3, ]"), "$l = [1, 2, 3]\n");
        assert_eq!(
            fmt("$l = [\n  1, # one\n  2\n]"),
            "$l = [\n  1,\n  # one\n  2,\n]\n"
        );
    }

    #[test]
    fn test_multi_title_split() {
        let source = "file { 'a': ensure => file; 'b': ensure => directory, mode => '0755' }";
        let expected = "file { 'a':\n  ensure => file,\n}\n\nfile { 'b':\n  ensure => directory,\n  mode   => '0755',\n}\n";
        assert_eq!(fmt(source), expected);

        let mut config = PupfmtConfig::default();
        config.parsing.split_resources = SplitMode::Splice;
        assert_eq!(format_source(source, &config).expect("format"), expected);
    }

    #[test]
    fn test_chain_member_keeps_one_block() {
        let source = "package { 'a': ensure => present; 'b': } -> Service['c']";
        assert_eq!(
            fmt(source),
            "package {\n  'a':\n    ensure => present;\n  'b':;\n} -> Service['c']\n"
        );
    }

    #[test]
    fn test_class_header_layout() {
        assert_eq!(
            fmt("class foo($a,$b=1) inherits bar { include baz }"),
            "class foo ($a, $b = 1) inherits bar {\n  include baz\n}\n"
        );
        assert_eq!(
            fmt("define foo::bar($a) { }"),
            "define foo::bar($a) {}\n"
        );
    }

    #[test]
    fn test_long_parameter_list_expands() {
        let source = "class foo ($first_parameter = 'one', $second_parameter = 'two', $third_parameter = 3) {}";
        assert_eq!(
            fmt(source),
            "class foo (\n  $first_parameter = 'one',\n  $second_parameter = 'two',\n  $third_parameter = 3,\n) {}\n"
        );
    }

    #[test]
    fn test_case_and_selector() {
        let source = "case $os {\n'Debian','Ubuntu': { include apt }\ndefault: {}\n}\n$x = $os ? {'Debian'=>1,default=>2}";
        assert_eq!(
            fmt(source),
            "case $os {\n  'Debian', 'Ubuntu': {\n    include apt\n  }\n  default: {}\n}\n\n$x = $os ? {\n  'Debian' => 1,\n  default  => 2,\n}\n"
        );
    }

    #[test]
    fn test_unaligned_when_disabled() {
        let mut config = PupfmtConfig::default();
        config.formatting.align_arrows = false;
        let formatted =
            format_source("file { 'a': ensure => file, mode => '0644' }", &config).expect("format");
        assert_eq!(
            formatted,
            "file { 'a':\n  ensure => file,\n  mode => '0644',\n}\n"
        );
    }

    #[test]
    fn test_indent_width() {
        let mut config = PupfmtConfig::default();
        config.formatting.indent_width = 4;
        let formatted = format_source("class a { include b }", &config).expect("format");
        assert_eq!(formatted, "class a {\n    include b\n}\n");
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(fmt(""), "");
        assert_eq!(fmt("\n\n\n"), "");
    }
}
