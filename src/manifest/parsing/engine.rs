//! Node dispatch engine
//!
//!     Given a position and an ordered list of candidate variants, the engine runs each
//!     candidate's validity predicate and commits to the first one that accepts. The
//!     committed candidate is then constructed; if construction fails the stream and the
//!     arena are rolled back and dispatch reports no match. It never falls through to a
//!     later candidate once a predicate has accepted.
//!
//!     Most predicates are the registry's prefix patterns. A few variants need more context:
//!
//!     - FunctionCall: bare calls (no parentheses) to a fixed set of functions, only where a
//!       statement is expected.
//!     - Resource: sigils, `type {`, `Type <| |>` collectors and `Ref[..] {` overrides.
//!     - CaseCondition: only directly inside a case statement, and only if `values :` follows.
//!     - DependencyChain: a chain member followed by an edge.
//!     - Selector: a subject followed by `?`.
//!
//!     Subjects and reference overrides are recognized on tokens alone, matching index
//!     brackets without parsing them. Predicates that need to look past a whole node do so
//!     with a speculative parse that is always rolled back.

use super::builders;
use super::grammar::{
    self, descriptor, Descriptor, ARROWS, BARE_FUNCTIONS, CHAIN_MEMBERS, COLLECTOR_OPENS,
    EDGES, KEY_KINDS, NEWLINES, RESOURCE_TYPES, SIMPLE_KINDS, STATEMENTS,
};
use super::stepper::Bindings;
use crate::manifest::ast::{Ast, NodeId, NodeKind, Variant};
use crate::manifest::config::ParsingConfig;
use crate::manifest::error::{ParseError, ParseResult};
use crate::manifest::token::{Token, TokenKind, TokenStream};

const REFERENCE_HEADS: &[TokenKind] = &[TokenKind::Classref, TokenKind::DollarVar];

/// Stream position and arena size to roll back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    stream: usize,
    arena: usize,
}

pub struct ParseContext {
    pub(crate) stream: TokenStream,
    pub(crate) ast: Ast,
    pub(crate) options: ParsingConfig,
    /// Furthest token a step failed on during the current statement
    furthest: Option<(usize, Token)>,
    /// Depth of nested speculative parses; stream rewrites are suppressed while positive
    pub(crate) speculating: usize,
}

impl ParseContext {
    pub fn new(tokens: Vec<Token>, options: ParsingConfig) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            ast: Ast::new(),
            options,
            furthest: None,
            speculating: 0,
        }
    }

    /// Parse the whole stream into a manifest
    pub fn parse(mut self) -> ParseResult<Ast> {
        let root = self.ast.root();
        let statements = self.parse_statements(root, None)?;
        self.ast.fill(root, NodeKind::Manifest { statements });
        Ok(self.ast)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            stream: self.stream.mark(),
            arena: self.ast.len(),
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.stream.reset(checkpoint.stream);
        self.ast.truncate(checkpoint.arena);
    }

    /// Remember the current token as a failure point if it is the furthest so far
    pub(crate) fn note_failure(&mut self) {
        let position = self.stream.mark();
        if let Some(token) = self.stream.current() {
            let further = self
                .furthest
                .as_ref()
                .map_or(true, |(furthest, _)| position >= *furthest);
            if further {
                self.furthest = Some((position, token.clone()));
            }
        }
    }

    fn unexpected(&mut self) -> ParseError {
        self.stream.skip(NEWLINES);
        let current = self.stream.current().cloned();
        let token = match (self.furthest.take(), current) {
            (Some((position, token)), _) if position >= self.stream.mark() => Some(token),
            (_, current) => current,
        };
        match token {
            Some(token) => ParseError::UnexpectedToken {
                line: token.line,
                text: token.text,
            },
            None => ParseError::UnexpectedEof,
        }
    }

    /// Parse statements under `parent` until `terminator` (left unconsumed) or end of input
    pub(crate) fn parse_statements(
        &mut self,
        parent: NodeId,
        terminator: Option<TokenKind>,
    ) -> ParseResult<Vec<NodeId>> {
        let mut statements = Vec::new();
        loop {
            self.stream.skip(&[TokenKind::Return, TokenKind::Semic]);
            let Some(kind) = self.stream.current_kind() else {
                if terminator.is_some() {
                    return Err(ParseError::UnexpectedEof);
                }
                break;
            };
            if Some(kind) == terminator {
                break;
            }

            let before = self.stream.mark();
            self.furthest = None;
            match self.dispatch(STATEMENTS, parent)? {
                Some(id) => {
                    log::debug!(
                        "statement {} at line {}",
                        self.ast.variant(id),
                        self.ast.get(id).line
                    );
                    statements.push(id);
                }
                None => return Err(self.unexpected()),
            }
            if self.stream.mark() == before {
                let line = self.stream.current().map_or(0, |token| token.line);
                return Err(ParseError::Stalled { line });
            }
        }
        Ok(statements)
    }

    /// Construct the first candidate whose predicate accepts at the cursor
    pub(crate) fn dispatch(
        &mut self,
        candidates: &[Variant],
        parent: NodeId,
    ) -> ParseResult<Option<NodeId>> {
        for &variant in candidates {
            let Some(entry) = descriptor(variant) else {
                continue;
            };
            if !self.is_valid(entry, parent)? {
                continue;
            }
            log::trace!("trying {} at token {}", variant, self.stream.mark());
            return self.construct(entry, parent);
        }
        Ok(None)
    }

    fn is_valid(&mut self, descriptor: &Descriptor, parent: NodeId) -> ParseResult<bool> {
        let pattern_match = descriptor
            .patterns
            .iter()
            .any(|pattern| self.stream.matches_pattern(pattern, descriptor.skip));

        let valid = match descriptor.variant {
            Variant::FunctionCall => {
                pattern_match
                    || (self.ast.variant(parent).holds_statements() && self.at_bare_function())
            }
            Variant::Resource => self.at_resource(),
            Variant::CaseCondition => {
                self.ast.variant(parent) == Variant::CaseStatement
                    && self.speculate(parent, |ctx, owner| {
                        let mut bindings = Bindings::new();
                        ctx.run_steps(&grammar::case_condition_values(), owner, &mut bindings)
                    })?
            }
            Variant::DependencyChain => self.speculate(parent, |ctx, owner| {
                Ok(ctx.dispatch(CHAIN_MEMBERS, owner)?.is_some()
                    && ctx.stream.looking_at(EDGES, NEWLINES))
            })?,
            Variant::Selector => self
                .subject_end()
                .map_or(false, |end| self.kind_after(end) == Some(TokenKind::Qmark)),
            _ => descriptor.patterns.is_empty() || pattern_match,
        };
        Ok(valid)
    }

    fn at_bare_function(&self) -> bool {
        self.stream.peek(NEWLINES).map_or(false, |token| {
            token.kind == TokenKind::Name && BARE_FUNCTIONS.contains(&token.text.as_str())
        })
    }

    fn at_resource(&self) -> bool {
        let stream = &self.stream;
        if stream.looking_at(&[TokenKind::At], NEWLINES)
            || stream.matches_pattern(&[RESOURCE_TYPES, &[TokenKind::Lbrace]], NEWLINES)
            || stream.matches_pattern(&[&[TokenKind::Classref], COLLECTOR_OPENS], NEWLINES)
        {
            return true;
        }
        // Reference override: `Ref[..] {`
        self.subject_end().map_or(false, |end| {
            let indexed = stream.slice(end - 1..end).first().map(|t| t.kind);
            indexed == Some(TokenKind::Rbrack) && self.kind_after(end) == Some(TokenKind::Lbrace)
        })
    }

    /// Index just past the value subject at the cursor: one simple token, plus the `[..]`
    /// groups directly after a reference head. Brackets are matched, not parsed.
    fn subject_end(&self) -> Option<usize> {
        let start = self.stream.mark();
        let tokens = self.stream.slice(start..self.stream.len());
        let head = tokens.iter().position(|t| !NEWLINES.contains(&t.kind))?;
        let kind = tokens[head].kind;
        if !SIMPLE_KINDS.contains(&kind) {
            return None;
        }
        let mut end = head + 1;
        if REFERENCE_HEADS.contains(&kind) {
            while tokens.get(end).map(|t| t.kind) == Some(TokenKind::Lbrack) {
                end = closing_bracket(tokens, end)? + 1;
            }
        }
        Some(start + end)
    }

    /// Kind of the first non-newline token at or after `from`
    fn kind_after(&self, from: usize) -> Option<TokenKind> {
        self.stream
            .slice(from..self.stream.len())
            .iter()
            .find(|t| !NEWLINES.contains(&t.kind))
            .map(|t| t.kind)
    }

    /// Whether a key/value pair starts at the cursor
    pub(crate) fn at_key_value(&self) -> bool {
        self.stream.matches_pattern(&[KEY_KINDS, ARROWS], NEWLINES)
    }

    /// Run a speculative parse and roll it back, whatever the outcome.
    /// Errors inside a speculative parse count as a failed match.
    pub(crate) fn speculate<F>(&mut self, parent: NodeId, check: F) -> ParseResult<bool>
    where
        F: FnOnce(&mut Self, NodeId) -> ParseResult<bool>,
    {
        let checkpoint = self.checkpoint();
        let furthest = self.furthest.clone();
        self.speculating += 1;
        self.stream.skip(NEWLINES);
        let result = check(self, parent);
        self.speculating -= 1;
        self.rollback(checkpoint);
        self.furthest = furthest;
        Ok(result.unwrap_or(false))
    }

    fn construct(
        &mut self,
        descriptor: &Descriptor,
        parent: NodeId,
    ) -> ParseResult<Option<NodeId>> {
        let checkpoint = self.checkpoint();
        self.stream.skip(NEWLINES);
        let line = self.stream.current().map_or(0, |token| token.line);
        let id = self.ast.reserve(descriptor.variant, parent, line);
        self.ast
            .set_spacing(id, descriptor.inner_spacing, descriptor.outer_spacing);

        let mut bindings = Bindings::new();
        let built = if self.run_steps(&descriptor.grammar, id, &mut bindings)? {
            match descriptor.variant {
                Variant::Resource => builders::resource(self, id, &bindings)?,
                variant => builders::build(variant, &bindings),
            }
        } else {
            None
        };

        match built {
            Some(kind) => {
                self.ast.fill(id, kind);
                if descriptor.variant == Variant::DependencyChain {
                    let outer = self
                        .ast
                        .children(id)
                        .into_iter()
                        .any(|member| self.ast.variant(member) == Variant::Resource);
                    self.ast.set_spacing(id, descriptor.inner_spacing, outer);
                }
                Ok(Some(id))
            }
            None => {
                log::trace!("{} failed at line {}, rolling back", descriptor.variant, line);
                self.rollback(checkpoint);
                Ok(None)
            }
        }
    }
}

/// Index of the `]` matching the `[` at `open`
fn closing_bracket(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Lbrack => depth += 1,
            TokenKind::Rbrack => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}
