//! Cursor over the materialized token vector
//!
//!     The stream only moves forward, except on an explicit [reset](TokenStream::reset) to a
//!     previously taken [mark](TokenStream::mark) or an [inject](TokenStream::inject) at the
//!     cursor. All lookahead helpers are side-effect free: they scan by index and never move
//!     the cursor.

use super::core::{Token, TokenKind};
use std::ops::Range;

#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    /// Step past the current token and return the new current token
    pub fn advance(&mut self) -> Option<&Token> {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.current()
    }

    pub fn mark(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, mark: usize) {
        self.pos = mark.min(self.tokens.len());
    }

    /// Index of the first token at or after `from` whose kind is not in `skip`
    fn first_significant(&self, from: usize, skip: &[TokenKind]) -> usize {
        let mut index = from;
        while let Some(token) = self.tokens.get(index) {
            if !skip.contains(&token.kind) {
                break;
            }
            index += 1;
        }
        index
    }

    /// First token at or after the cursor whose kind is not in `skip`
    pub fn peek(&self, skip: &[TokenKind]) -> Option<&Token> {
        self.tokens.get(self.first_significant(self.pos, skip))
    }

    /// Whether the first token not in `skip` has a kind in `kinds`
    pub fn looking_at(&self, kinds: &[TokenKind], skip: &[TokenKind]) -> bool {
        self.peek(skip)
            .map_or(false, |token| kinds.contains(&token.kind))
    }

    /// Whether the tokens ahead spell out `kinds` in order, skipping `skip` kinds before each
    pub fn matches_sequence(&self, kinds: &[TokenKind], skip: &[TokenKind]) -> bool {
        let mut index = self.pos;
        for kind in kinds {
            index = self.first_significant(index, skip);
            match self.tokens.get(index) {
                Some(token) if token.kind == *kind => index += 1,
                _ => return false,
            }
        }
        true
    }

    /// Like [matches_sequence](Self::matches_sequence), but each position accepts a set of kinds
    pub fn matches_pattern(&self, sets: &[&[TokenKind]], skip: &[TokenKind]) -> bool {
        let mut index = self.pos;
        for set in sets {
            index = self.first_significant(index, skip);
            match self.tokens.get(index) {
                Some(token) if set.contains(&token.kind) => index += 1,
                _ => return false,
            }
        }
        true
    }

    /// Splice tokens in at the cursor; the first injected token becomes current
    pub fn inject(&mut self, tokens: Vec<Token>) {
        let at = self.pos;
        self.tokens.splice(at..at, tokens);
    }

    /// Advance past any tokens of the given kinds, returning how many were skipped
    pub fn skip(&mut self, kinds: &[TokenKind]) -> usize {
        let start = self.pos;
        self.pos = self.first_significant(self.pos, kinds);
        self.pos - start
    }

    pub fn slice(&self, range: Range<usize>) -> &[Token] {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        &self.tokens[start..end]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
