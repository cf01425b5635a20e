//! Manifest reformatter
//!
//!     Parses Puppet-style manifests and re-emits them in canonical form. The pipeline is:
//!
//!     source → [lexing] → [token] stream → [parsing] → [ast] → key alignment → [formats]
//!
//!     Comments survive the round trip; whitespace is normalized; `=>` arrows of sibling
//!     attributes are aligned; blank lines between blocks are decided by the node types.
//!     Nothing is evaluated: the tool only reformats.
//!
//!     The layered [config] controls indentation, alignment, `else` cuddling, the width
//!     budget for parameter lists and how multi-title resources are split.

pub mod ast;
pub mod config;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod token;

pub use ast::Ast;
pub use self::config::{Loader, PupfmtConfig};
pub use error::{Error, LexError, ParseError};
pub use formats::{FormatError, FormatRegistry, Formatter};

/// Lex and parse manifest source into a tree
pub fn parse_source(source: &str, config: &PupfmtConfig) -> Result<Ast, Error> {
    let tokens = lexing::tokenize(source)?;
    log::debug!("lexed {} tokens", tokens.len());
    Ok(parsing::parse(tokens, &config.parsing)?)
}

/// Parse manifest source and render it in canonical form
pub fn format_source(source: &str, config: &PupfmtConfig) -> Result<String, Error> {
    let ast = parse_source(source, config)?;
    Ok(formats::puppet::render(&ast, &config.formatting))
}
