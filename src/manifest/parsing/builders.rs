//! Node builders
//!
//!     Turn the bindings collected by the stepper into finished [NodeKind]s. A builder
//!     returns `None` when a binding it requires is missing, which the engine treats as a
//!     failed construction.
//!
//!     Resources get a dedicated body loop, see [resource].

use super::engine::ParseContext;
use super::grammar::{COMMENTS, NEWLINES};
use super::stepper::{Bindings, Bound};
use crate::manifest::ast::{ExprPart, NodeId, NodeKind, ResourceHead, Variant};
use crate::manifest::config::SplitMode;
use crate::manifest::error::{ParseError, ParseResult};
use crate::manifest::token::{Token, TokenKind};

/// Build a node from the bindings of a successful step run
pub fn build(variant: Variant, b: &Bindings) -> Option<NodeKind> {
    let kind = match variant {
        Variant::Manifest | Variant::Resource => return None,
        Variant::Comment => NodeKind::Comment {
            text: b.token("text")?.text,
        },
        Variant::MultilineComment => NodeKind::MultilineComment {
            text: b.token("text")?.text,
        },
        Variant::Class => NodeKind::Class {
            name: b.token("name")?,
            params: b.nodes("params"),
            inherits: b.token("inherits"),
            body: b.block("body")?,
        },
        Variant::Define => NodeKind::Define {
            name: b.token("name")?,
            params: b.nodes("params"),
            body: b.block("body")?,
        },
        Variant::Node => NodeKind::Node {
            names: b.tokens("names"),
            inherits: b.token("inherits"),
            body: b.block("body")?,
        },
        Variant::Parameter => NodeKind::Parameter {
            type_expr: b.node("type"),
            name: b.token("name")?,
            default: b.node("default"),
        },
        Variant::ResourceTitle => NodeKind::ResourceTitle {
            titles: b.nodes("titles"),
        },
        Variant::Collector => NodeKind::Collector {
            open: b.token("open")?,
            query: b.node("query"),
            close: b.token("close")?,
        },
        Variant::IfStatement => NodeKind::IfStatement {
            keyword: b.token("keyword")?,
            condition: b.node("condition"),
            body: b.block("body")?,
        },
        Variant::CaseStatement => NodeKind::CaseStatement {
            subject: b.node("subject")?,
            body: b.block("body")?,
        },
        Variant::CaseCondition => NodeKind::CaseCondition {
            values: b.nodes("values"),
            body: b.block("body")?,
        },
        Variant::Selector => NodeKind::Selector {
            subject: b.node("subject")?,
            items: b.nodes("items"),
        },
        Variant::Include => NodeKind::Include {
            keyword: b.token("keyword")?,
            args: b.nodes("args"),
        },
        Variant::VarAssignment => NodeKind::VarAssignment {
            name: b.token("name")?,
            operator: b.token("operator")?,
            value: b.node("value")?,
        },
        Variant::FunctionCall => NodeKind::FunctionCall {
            name: b.token("name")?,
            args: b.nodes("args"),
            parenthesized: b.has("open"),
        },
        Variant::DependencyChain => NodeKind::DependencyChain {
            members: b.nodes("members"),
            edges: b.tokens("edges"),
        },
        Variant::ResourceRef => NodeKind::ResourceRef {
            head: b.token("head")?,
            indexes: b.nodes("indexes"),
        },
        Variant::Hash => NodeKind::Hash {
            items: b.nodes("items"),
        },
        Variant::List => NodeKind::List {
            items: b.nodes("items"),
        },
        Variant::KeyValuePair => NodeKind::KeyValuePair {
            key: b.token("key")?,
            arrow: b.token("arrow")?,
            value: b.node("value")?,
            key_width: 0,
        },
        Variant::Expression => NodeKind::Expression {
            parts: b
                .all("parts")
                .filter_map(|bound| match bound {
                    Bound::Node(id) => Some(ExprPart::Term(*id)),
                    Bound::Token(token) => Some(ExprPart::Operator(token.clone())),
                    Bound::Block(_) => None,
                })
                .collect(),
        },
        Variant::Parenthesized => NodeKind::Parenthesized {
            inner: b.node("inner")?,
        },
        Variant::Unary => NodeKind::Unary {
            operator: b.token("operator")?,
            operand: b.node("operand")?,
        },
        Variant::Simple => NodeKind::Simple {
            token: b.token("token")?,
        },
    };
    Some(kind)
}

/// Build a resource from its parsed head, then parse its body
///
///     The body mixes titles (`expr, expr:`), attributes (`key => value`), comments and
///     `;`/`,` separators in any order until the closing brace. When a second title shows
///     up and the parser runs in splice mode, the body is cut short: `} NEWLINE head {` is
///     injected in front of the title, so the remainder parses as a sibling resource.
///     Chain members, collectors and speculative parses are never spliced.
pub fn resource(
    ctx: &mut ParseContext,
    id: NodeId,
    b: &Bindings,
) -> ParseResult<Option<NodeKind>> {
    let sigil: String = b.tokens("sigil").iter().map(|t| t.text.as_str()).collect();
    let head = match (b.node("reference"), b.token("type")) {
        (Some(reference), _) => ResourceHead::Reference(reference),
        (None, Some(token)) => ResourceHead::Type(token),
        (None, None) => return Ok(None),
    };
    let collector = b.node("collector");

    let head_end = ctx.stream.mark();
    ctx.stream.skip(NEWLINES);
    if ctx.stream.current_kind() != Some(TokenKind::Lbrace) {
        if collector.is_some() {
            ctx.stream.reset(head_end);
            return Ok(Some(NodeKind::Resource {
                sigil,
                head,
                collector,
                has_block: false,
                items: Vec::new(),
            }));
        }
        ctx.note_failure();
        return Ok(None);
    }
    ctx.stream.advance();

    let parent = ctx.ast.get(id).parent;
    let in_chain = parent.map_or(false, |p| ctx.ast.variant(p) == Variant::DependencyChain);
    let may_splice = ctx.options.split_resources == SplitMode::Splice
        && matches!(head, ResourceHead::Type(_))
        && !in_chain
        && collector.is_none()
        && ctx.speculating == 0;

    let mut items = Vec::new();
    let mut seen_title = false;
    loop {
        ctx.stream.skip(NEWLINES);
        match ctx.stream.current_kind() {
            None => return Err(ParseError::UnexpectedEof),
            Some(TokenKind::Rbrace) => {
                ctx.stream.advance();
                break;
            }
            Some(TokenKind::Semic) | Some(TokenKind::Comma) => {
                ctx.stream.advance();
            }
            Some(TokenKind::Comment) | Some(TokenKind::Mlcomment) => {
                match ctx.dispatch(COMMENTS, id)? {
                    Some(comment) => items.push(comment),
                    None => return Ok(None),
                }
            }
            Some(_) if ctx.at_key_value() => match ctx.dispatch(&[Variant::KeyValuePair], id)? {
                Some(pair) => items.push(pair),
                None => return Ok(None),
            },
            Some(_) => {
                let before = ctx.checkpoint();
                let Some(title) = ctx.dispatch(&[Variant::ResourceTitle], id)? else {
                    return Ok(None);
                };
                if seen_title && may_splice {
                    ctx.rollback(before);
                    let line = ctx.stream.current().map_or(0, |token| token.line);
                    let mut injected = vec![
                        Token::new(TokenKind::Rbrace, "}", line),
                        Token::new(TokenKind::Return, "\n", line),
                    ];
                    injected.extend(resource_head_tokens(b));
                    injected.push(Token::new(TokenKind::Lbrace, "{", line));
                    log::debug!("splitting resource at line {}", line);
                    ctx.stream.inject(injected);
                    continue;
                }
                seen_title = true;
                items.push(title);
            }
        }
    }

    Ok(Some(NodeKind::Resource {
        sigil,
        head,
        collector,
        has_block: true,
        items,
    }))
}

/// Sigil and type tokens of the resource being parsed, for re-injection
fn resource_head_tokens(b: &Bindings) -> Vec<Token> {
    let mut tokens = b.tokens("sigil");
    tokens.extend(b.token("type"));
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ast::Ast;
    use crate::manifest::config::PupfmtConfig;
    use crate::manifest::lexing::tokenize;

    fn parse(source: &str) -> Ast {
        ParseContext::new(
            tokenize(source).expect("tokenize"),
            PupfmtConfig::default().parsing,
        )
        .parse()
        .expect("parse")
    }

    fn first(ast: &Ast) -> NodeId {
        ast.children(ast.root())[0]
    }

    #[test]
    fn test_class_with_params_and_inherits() {
        let ast = parse("class apache ($port = 80, String $name) inherits base { }");
        match ast.kind(first(&ast)) {
            NodeKind::Class {
                name,
                params,
                inherits,
                body,
            } => {
                assert_eq!(name.text, "apache");
                assert_eq!(params.len(), 2);
                assert_eq!(inherits.as_ref().map(|t| t.text.as_str()), Some("base"));
                assert!(body.is_empty());
                match ast.kind(params[1]) {
                    NodeKind::Parameter {
                        type_expr, name, ..
                    } => {
                        assert!(type_expr.is_some());
                        assert_eq!(name.text, "$name");
                    }
                    other => panic!("expected parameter, got {:?}", other),
                }
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_expression_keeps_operator_order() {
        let ast = parse("$a = 1 + $b * 2");
        let NodeKind::VarAssignment { value, .. } = ast.kind(first(&ast)) else {
            panic!("expected assignment");
        };
        let NodeKind::Expression { parts } = ast.kind(*value) else {
            panic!("expected expression");
        };
        let operators: Vec<&str> = parts
            .iter()
            .filter_map(|part| match part {
                ExprPart::Operator(token) => Some(token.text.as_str()),
                ExprPart::Term(_) => None,
            })
            .collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(operators, vec!["+", "*"]);
    }

    #[test]
    fn test_resource_items_interleave_titles() {
        let ast = parse("file {\n  'a': ensure => file;\n  # b\n  'b': mode => '0644'\n}");
        let NodeKind::Resource { items, sigil, .. } = ast.kind(first(&ast)) else {
            panic!("expected resource");
        };
        assert!(sigil.is_empty());
        let variants: Vec<Variant> = items.iter().map(|id| ast.variant(*id)).collect();
        assert_eq!(
            variants,
            vec![
                Variant::ResourceTitle,
                Variant::KeyValuePair,
                Variant::Comment,
                Variant::ResourceTitle,
                Variant::KeyValuePair,
            ]
        );
    }

    #[test]
    fn test_virtual_and_exported_sigils() {
        let ast = parse("@@nagios_host { $fqdn: }");
        let NodeKind::Resource { sigil, .. } = ast.kind(first(&ast)) else {
            panic!("expected resource");
        };
        assert_eq!(sigil, "@@");
    }

    #[test]
    fn test_collector_without_block() {
        let ast = parse("User <| groups == 'admin' |>\n");
        let NodeKind::Resource {
            collector,
            has_block,
            items,
            ..
        } = ast.kind(first(&ast))
        else {
            panic!("expected resource");
        };
        assert!(collector.is_some());
        assert!(!has_block);
        assert!(items.is_empty());
    }

    #[test]
    fn test_collector_with_block() {
        let ast = parse("Package <| |> { ensure => latest }");
        let NodeKind::Resource {
            has_block, items, ..
        } = ast.kind(first(&ast))
        else {
            panic!("expected resource");
        };
        assert!(has_block);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_resource_reference_override() {
        let ast = parse("Service['nginx'] { enable => true }");
        let NodeKind::Resource { head, .. } = ast.kind(first(&ast)) else {
            panic!("expected resource");
        };
        assert!(matches!(head, ResourceHead::Reference(_)));
    }

    #[test]
    fn test_function_call_forms() {
        let ast = parse("fail('x')\nnotice 'a', 'b'");
        let statements = ast.children(ast.root());
        match ast.kind(statements[0]) {
            NodeKind::FunctionCall {
                parenthesized,
                args,
                ..
            } => {
                assert!(parenthesized);
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
        match ast.kind(statements[1]) {
            NodeKind::FunctionCall {
                parenthesized,
                args,
                ..
            } => {
                assert!(!parenthesized);
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_if_branches_are_siblings() {
        let ast = parse("if $a { } elsif $b { } else { }");
        let keywords: Vec<String> = ast
            .children(ast.root())
            .into_iter()
            .map(|id| match ast.kind(id) {
                NodeKind::IfStatement { keyword, .. } => keyword.text.clone(),
                other => panic!("expected if, got {:?}", other),
            })
            .collect();
        assert_eq!(keywords, vec!["if", "elsif", "else"]);
    }
}
