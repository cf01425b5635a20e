//! Parser
//!
//!     A backtracking recursive-descent parser driven by a declarative grammar registry.
//!
//!     - [grammar]: per-variant descriptors (prefix patterns, step grammar, spacing).
//!     - [engine]: candidate dispatch, validity predicates, speculative parses and rollback.
//!     - [stepper]: the step interpreter and its bindings.
//!     - [builders]: bindings to nodes, plus the resource body loop.
//!
//!     Parsing is top-down from the manifest root: every container parses its children with
//!     the same "statements until closing brace" loop, and every construction either fully
//!     succeeds or leaves the stream and arena untouched.

pub mod builders;
pub mod engine;
pub mod grammar;
pub mod stepper;

pub use engine::ParseContext;

use crate::manifest::ast::Ast;
use crate::manifest::config::ParsingConfig;
use crate::manifest::error::ParseResult;
use crate::manifest::token::Token;

/// Parse a token vector into a manifest tree
pub fn parse(tokens: Vec<Token>, options: &ParsingConfig) -> ParseResult<Ast> {
    ParseContext::new(tokens, options.clone()).parse()
}
