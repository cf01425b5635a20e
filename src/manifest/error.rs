//! Error types for lexing, parsing and output

use thiserror::Error;

/// Input the lexer could not classify
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: unrecognized input '{text}'\n\n{context}")]
pub struct LexError {
    pub line: u32,
    pub text: String,
    /// Numbered excerpt around the offending line
    pub context: String,
}

/// Errors raised while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No candidate matched at statement level
    #[error("line {line}: unexpected token '{text}'")]
    UnexpectedToken { line: u32, text: String },

    /// A block was left open at the end of input
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A statement loop made no progress; this is a parser bug
    #[error("line {line}: parser made no progress")]
    Stalled { line: u32 },
}

/// Type alias for parser results
pub type ParseResult<T> = Result<T, ParseError>;

/// Umbrella error for the public entry points
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] crate::manifest::formats::FormatError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Format source code context around an error line
///
/// Shows 2 lines before the error, the error line with a >> marker, and 2 lines after.
/// `line` is 1-based, matching token lines.
pub fn format_source_context(source: &str, line: u32) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = (line as usize).saturating_sub(1);

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();
    for (offset, text) in lines[start_line.min(end_line)..end_line].iter().enumerate() {
        let line_num = start_line + offset;
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, text));
    }

    context
}
