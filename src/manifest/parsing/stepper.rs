//! Step runner
//!
//!     Interprets a variant's [Step] grammar against the token stream, recording matched
//!     tokens, nodes and blocks in [Bindings]. A step that fails leaves the stream, the
//!     arena and the bindings as they were before it ran; a failed sequence is undone by
//!     the caller's checkpoint.

use super::engine::ParseContext;
use super::grammar::{Step, StepKind, NEWLINES};
use crate::manifest::ast::NodeId;
use crate::manifest::error::ParseResult;
use crate::manifest::token::{Token, TokenKind};

/// A value captured by a bound step
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Token(Token),
    Node(NodeId),
    Block(Vec<NodeId>),
}

/// Ordered log of bound values. Binding a name more than once makes it a list.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(&'static str, Bound)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, value: Bound) {
        self.entries.push((name, value));
    }

    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn truncate(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(bound, _)| *bound == name)
    }

    /// All values bound under `name`, in match order
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Bound> + 'a {
        self.entries
            .iter()
            .filter(move |(bound, _)| *bound == name)
            .map(|(_, value)| value)
    }

    pub fn token(&self, name: &str) -> Option<Token> {
        self.all(name).find_map(|value| match value {
            Bound::Token(token) => Some(token.clone()),
            _ => None,
        })
    }

    pub fn tokens(&self, name: &str) -> Vec<Token> {
        self.all(name)
            .filter_map(|value| match value {
                Bound::Token(token) => Some(token.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.all(name).find_map(|value| match value {
            Bound::Node(id) => Some(*id),
            _ => None,
        })
    }

    pub fn nodes(&self, name: &str) -> Vec<NodeId> {
        self.all(name)
            .filter_map(|value| match value {
                Bound::Node(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn block(&self, name: &str) -> Option<Vec<NodeId>> {
        self.all(name).find_map(|value| match value {
            Bound::Block(ids) => Some(ids.clone()),
            _ => None,
        })
    }
}

impl ParseContext {
    /// Run a step sequence for the node `owner`. Returns false if any required step failed.
    pub(crate) fn run_steps(
        &mut self,
        steps: &[Step],
        owner: NodeId,
        bindings: &mut Bindings,
    ) -> ParseResult<bool> {
        for step in steps {
            if !self.run_step(step, owner, bindings)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn run_step(
        &mut self,
        step: &Step,
        owner: NodeId,
        bindings: &mut Bindings,
    ) -> ParseResult<bool> {
        if !self.run_once(step, owner, bindings)? {
            return Ok(step.optional);
        }
        if step.many {
            loop {
                let before = self.stream.mark();
                if !self.run_once(step, owner, bindings)? || self.stream.mark() == before {
                    break;
                }
            }
        }
        Ok(true)
    }

    fn run_once(
        &mut self,
        step: &Step,
        owner: NodeId,
        bindings: &mut Bindings,
    ) -> ParseResult<bool> {
        let checkpoint = self.checkpoint();
        let binding_mark = bindings.mark();
        if !step.keep_newlines {
            self.stream.skip(NEWLINES);
        }

        let matched = match &step.kind {
            StepKind::Token(kinds) => match self.stream.current() {
                Some(token) if kinds.contains(&token.kind) => {
                    let token = token.clone();
                    self.stream.advance();
                    if let Some(name) = step.bind {
                        bindings.push(name, Bound::Token(token));
                    }
                    true
                }
                _ => {
                    self.note_failure();
                    false
                }
            },
            StepKind::Class(variants) => match self.dispatch(variants, owner)? {
                Some(id) => {
                    if let Some(name) = step.bind {
                        bindings.push(name, Bound::Node(id));
                    }
                    true
                }
                None => {
                    self.note_failure();
                    false
                }
            },
            StepKind::Group(steps) => self.run_steps(steps, owner, bindings)?,
            StepKind::Alt(groups) => {
                let mut matched = false;
                for steps in groups {
                    let attempt = self.checkpoint();
                    let attempt_mark = bindings.mark();
                    if self.run_steps(steps, owner, bindings)? {
                        matched = true;
                        break;
                    }
                    self.rollback(attempt);
                    bindings.truncate(attempt_mark);
                }
                matched
            }
            StepKind::Block => {
                if self.stream.current_kind() == Some(TokenKind::Lbrace) {
                    self.stream.advance();
                    let statements = self.parse_statements(owner, Some(TokenKind::Rbrace))?;
                    self.stream.advance();
                    if let Some(name) = step.bind {
                        bindings.push(name, Bound::Block(statements));
                    }
                    true
                } else {
                    self.note_failure();
                    false
                }
            }
        };

        if !matched {
            self.rollback(checkpoint);
            bindings.truncate(binding_mark);
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ast::Variant;
    use crate::manifest::config::PupfmtConfig;
    use crate::manifest::lexing::tokenize;
    use crate::manifest::parsing::grammar::{alt, class, group, token};
    use crate::manifest::token::TokenKind as T;

    fn context(source: &str) -> ParseContext {
        ParseContext::new(
            tokenize(source).expect("tokenize"),
            PupfmtConfig::default().parsing,
        )
    }

    #[test]
    fn test_repeated_binds_become_lists() {
        let mut ctx = context("a, b, c");
        let root = ctx.ast.root();
        let steps = vec![
            token(&[T::Name]).bind("names"),
            group(vec![token(&[T::Comma]), token(&[T::Name]).bind("names")])
                .many()
                .optional(),
        ];
        let mut bindings = Bindings::new();
        assert!(ctx.run_steps(&steps, root, &mut bindings).expect("run"));
        let names: Vec<String> = bindings.tokens("names").into_iter().map(|t| t.text).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(ctx.stream.is_at_end());
    }

    #[test]
    fn test_failed_group_restores_cursor_and_bindings() {
        let mut ctx = context("a , 1");
        let root = ctx.ast.root();
        let steps = vec![
            token(&[T::Name]).bind("first"),
            group(vec![token(&[T::Comma]).bind("comma"), token(&[T::Name])]).optional(),
        ];
        let mut bindings = Bindings::new();
        assert!(ctx.run_steps(&steps, root, &mut bindings).expect("run"));
        assert!(!bindings.has("comma"));
        assert_eq!(ctx.stream.current_kind(), Some(T::Comma));
    }

    #[test]
    fn test_alt_takes_first_matching_branch() {
        let mut ctx = context("else {}");
        let root = ctx.ast.root();
        let steps = vec![alt(vec![
            vec![token(&[T::If]).bind("keyword"), token(&[T::Name])],
            vec![token(&[T::Else]).bind("keyword")],
        ])];
        let mut bindings = Bindings::new();
        assert!(ctx.run_steps(&steps, root, &mut bindings).expect("run"));
        assert_eq!(bindings.token("keyword").map(|t| t.kind), Some(T::Else));
    }

    #[test]
    fn test_keep_newlines_blocks_step() {
        let mut ctx = context("foo\n(1)");
        let root = ctx.ast.root();
        let steps = vec![
            token(&[T::Name]),
            token(&[T::Lparen]).keep_newlines(),
        ];
        let mut bindings = Bindings::new();
        assert!(!ctx.run_steps(&steps, root, &mut bindings).expect("run"));
    }

    #[test]
    fn test_failed_step_does_not_eat_newlines() {
        let mut ctx = context("\n\n$a");
        let root = ctx.ast.root();
        let steps = vec![token(&[T::Name]).optional()];
        let mut bindings = Bindings::new();
        assert!(ctx.run_steps(&steps, root, &mut bindings).expect("run"));
        assert_eq!(ctx.stream.mark(), 0);
    }

    #[test]
    fn test_class_step_binds_node() {
        let mut ctx = context("[1, 2]");
        let root = ctx.ast.root();
        let steps = vec![class(&[Variant::List]).bind("list")];
        let mut bindings = Bindings::new();
        assert!(ctx.run_steps(&steps, root, &mut bindings).expect("run"));
        let list = bindings.node("list").expect("list bound");
        assert_eq!(ctx.ast.variant(list), Variant::List);
    }
}
