//! Lexer
//!
//!     Turns manifest source into the flat token vector the parser consumes. The heavy
//!     lifting is done by the logos table in [core](crate::manifest::token::core); this
//!     module is the thin post-pass around it:
//!
//!     1. Horizontal whitespace is dropped. Newlines and comments are kept, since the
//!        renderer preserves them.
//!     2. NAME tokens whose text is a keyword are re-tagged to the keyword kind.
//!     3. A `/` opens a regex literal when the previous significant token cannot end a
//!        value and a closing `/` appears later on the same line. Otherwise it stays DIV.
//!     4. Every token is stamped with its 1-based line.
//!
//!     Unrecognized input is fatal and reported with a numbered source excerpt.

use crate::manifest::error::{format_source_context, LexError};
use crate::manifest::token::{Token, TokenKind};
use logos::Logos;

/// Tokenize manifest source into line-stamped tokens
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens: Vec<Token> = Vec::new();
    let mut line: u32 = 1;

    while let Some(result) = lexer.next() {
        let mut kind = match result {
            Ok(kind) => kind,
            Err(()) => {
                return Err(LexError {
                    line,
                    text: lexer.slice().to_string(),
                    context: format_source_context(source, line),
                })
            }
        };

        if kind == TokenKind::Div && !previous_ends_value(&tokens) {
            if let Some(len) = regex_body_len(lexer.remainder()) {
                lexer.bump(len);
                kind = TokenKind::Regex;
            }
        }

        let text = lexer.slice();
        if kind == TokenKind::Name {
            if let Some(keyword) = TokenKind::keyword(text) {
                kind = keyword;
            }
        }

        if kind != TokenKind::Whitespace {
            tokens.push(Token::new(kind, text, line));
        }
        line += text.matches('\n').count() as u32;
    }

    Ok(tokens)
}

fn previous_ends_value(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .rev()
        .find(|token| !token.kind.is_trivia())
        .map_or(false, |token| token.kind.ends_value())
}

/// Length of a regex body plus its closing `/`, when one exists before the end of the line
fn regex_body_len(remainder: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, ch) in remainder.char_indices() {
        match ch {
            '\n' => return None,
            '\\' if !escaped => escaped = true,
            '/' if !escaped => return Some(offset + 1),
            _ => escaped = false,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("source to tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_drops_whitespace_keeps_newlines() {
        assert_eq!(
            kinds("$a = 1\n"),
            vec![
                TokenKind::DollarVar,
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Return,
            ]
        );
    }

    #[test]
    fn test_retags_keywords() {
        assert_eq!(
            kinds("if else elsif iffy"),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Elsif,
                TokenKind::Name
            ]
        );
    }

    #[test]
    fn test_regex_after_operator() {
        let tokens = tokenize("$os =~ /^(Debian|Ubuntu)$/").expect("tokenize");
        assert_eq!(tokens[2].kind, TokenKind::Regex);
        assert_eq!(tokens[2].text, "/^(Debian|Ubuntu)$/");
    }

    #[test]
    fn test_regex_with_escaped_slash() {
        let tokens = tokenize(r"/a\/b/: { }").expect("tokenize");
        assert_eq!(tokens[0].kind, TokenKind::Regex);
        assert_eq!(tokens[0].text, r"/a\/b/");
        assert_eq!(tokens[1].kind, TokenKind::Colon);
    }

    #[test]
    fn test_division_after_value() {
        assert_eq!(
            kinds("$a / 2 / 3"),
            vec![
                TokenKind::DollarVar,
                TokenKind::Div,
                TokenKind::Number,
                TokenKind::Div,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_unclosed_slash_is_division() {
        assert_eq!(
            kinds("= /\n/"),
            vec![
                TokenKind::Equals,
                TokenKind::Div,
                TokenKind::Return,
                TokenKind::Div
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\n/* x\ny */\n\"multi\nline\" b").expect("tokenize");
        let lines: Vec<(TokenKind, u32)> = tokens.iter().map(|t| (t.kind, t.line)).collect();
        assert_eq!(
            lines,
            vec![
                (TokenKind::Name, 1),
                (TokenKind::Return, 1),
                (TokenKind::Mlcomment, 2),
                (TokenKind::Return, 3),
                (TokenKind::Dquotes, 4),
                (TokenKind::Name, 5),
            ]
        );
    }

    #[test]
    fn test_unrecognized_input() {
        let err = tokenize("$a = 1\n$b = `x`\n").expect_err("backtick is not lexable");
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "`");
        assert!(err.context.contains(">>   2 | $b = `x`"));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("$a = 1\n/* open\n$b = 2\n").expect_err("comment never closes");
        assert_eq!(err.line, 2);
        assert!(err.text.starts_with("/*"));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = tokenize("/* a\n\n b */\n$x").expect("tokenize");
        assert_eq!(tokens[0].text, "/* a\n\n b */");
        assert_eq!(tokens[2].kind, TokenKind::DollarVar);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize("").expect("tokenize"), vec![]);
    }
}
