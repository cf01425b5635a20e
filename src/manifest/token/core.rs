//! Core token kinds for the manifest language
//!
//!     The token kinds are defined with the logos derive macro. Every kind the parser consumes
//!     is listed here, including the keyword kinds, which logos never produces directly: a
//!     keyword is lexed as a NAME and re-tagged by exact text match (see [TokenKind::keyword]).
//!     REGEX is likewise produced by the lexing post-pass, because a `/` only opens a regex
//!     literal in some positions.
//!
//! Token Groups
//!
//!     | Group       | Kinds                                                             |
//!     |-------------|-------------------------------------------------------------------|
//!     | Structural  | `[ ] { } ( ) , : ; ? @`                                           |
//!     | Operators   | `=> +> = == != >= > < <= =~ !~ + - * / << >> ! += .`              |
//!     | Edges       | `-> <- ~> <~`                                                     |
//!     | Collectors  | `<| |> <<| |>>`                                                   |
//!     | Literals    | names, class references, variables, numbers, strings, regexes     |
//!     | Trivia      | newlines, comments, horizontal whitespace                         |

use logos::Logos;
use serde::Serialize;
use std::fmt;

/// All token kinds of the manifest language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Structural
    #[token("[")]
    Lbrack,
    #[token("]")]
    Rbrack,
    #[token("{")]
    Lbrace,
    #[token("}")]
    Rbrace,
    #[token("(")]
    Lparen,
    #[token(")")]
    Rparen,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semic,
    #[token("?")]
    Qmark,
    #[token("@")]
    At,

    // Operators
    #[token("=>")]
    Farrow,
    #[token("+>")]
    Parrow,
    #[token("=")]
    Equals,
    #[token("==")]
    Isequal,
    #[token("!=")]
    Notequal,
    #[token(">=")]
    Greaterequal,
    #[token(">")]
    Greaterthan,
    #[token("<")]
    Lessthan,
    #[token("<=")]
    Lessequal,
    #[token("=~")]
    Match,
    #[token("!~")]
    Nomatch,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Times,
    #[token("/")]
    Div,
    #[token("<<")]
    Lshift,
    #[token(">>")]
    Rshift,
    #[token("!")]
    Not,
    #[token("+=")]
    Appends,
    #[token(".")]
    Dot,

    // Edges
    #[token("->")]
    InEdge,
    #[token("<-")]
    OutEdge,
    #[token("~>")]
    InEdgeSub,
    #[token("<~")]
    OutEdgeSub,

    // Collectors
    #[token("<|")]
    Lcollect,
    #[token("|>")]
    Rcollect,
    #[token("<<|")]
    Llcollect,
    #[token("|>>")]
    Rrcollect,

    // Literals
    #[regex(r"(::)?[a-z_][A-Za-z0-9_]*(::[a-z_][A-Za-z0-9_]*)*")]
    Name,
    #[regex(r"(::)?[A-Z][A-Za-z0-9_]*(::[A-Z][A-Za-z0-9_]*)*")]
    Classref,
    #[regex(r"\$(::)?[A-Za-z0-9_]+(::[A-Za-z0-9_]+)*")]
    DollarVar,
    #[regex(r"0[xX][0-9a-fA-F]+|[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?")]
    Number,
    #[regex(r"'([^'\\]|\\.)*'")]
    Squotes,
    #[regex(r#""([^"\\]|\\.)*""#)]
    Dquotes,
    /// Produced by the lexing post-pass from a `/` in regex position
    Regex,

    // Trivia
    #[regex(r"\r?\n")]
    Return,
    #[regex(r"#[^\r\n]*")]
    Comment,
    #[token("/*", block_comment)]
    Mlcomment,
    #[regex(r"[ \t\r]+")]
    Whitespace,

    // Keywords, re-tagged from NAME
    Case,
    Class,
    Default,
    Define,
    Import,
    If,
    Elsif,
    Else,
    Inherits,
    Node,
    And,
    Or,
    Undef,
    False,
    True,
    In,
    Include,
}

/// Extend a `/*` match through the closing `*/`. Unterminated comments are a lex error.
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

impl TokenKind {
    /// Keyword kind for an exact NAME text, if the text is a keyword
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "case" => TokenKind::Case,
            "class" => TokenKind::Class,
            "default" => TokenKind::Default,
            "define" => TokenKind::Define,
            "import" => TokenKind::Import,
            "if" => TokenKind::If,
            "elsif" => TokenKind::Elsif,
            "else" => TokenKind::Else,
            "inherits" => TokenKind::Inherits,
            "node" => TokenKind::Node,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "undef" => TokenKind::Undef,
            "false" => TokenKind::False,
            "true" => TokenKind::True,
            "in" => TokenKind::In,
            "include" => TokenKind::Include,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Case
                | TokenKind::Class
                | TokenKind::Default
                | TokenKind::Define
                | TokenKind::Import
                | TokenKind::If
                | TokenKind::Elsif
                | TokenKind::Else
                | TokenKind::Inherits
                | TokenKind::Node
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Undef
                | TokenKind::False
                | TokenKind::True
                | TokenKind::In
                | TokenKind::Include
        )
    }

    /// Newlines, comments and whitespace
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Return | TokenKind::Comment | TokenKind::Mlcomment | TokenKind::Whitespace
        )
    }

    /// Kinds after which a `/` is the division operator rather than a regex opener
    pub fn ends_value(self) -> bool {
        matches!(
            self,
            TokenKind::Name
                | TokenKind::Classref
                | TokenKind::DollarVar
                | TokenKind::Number
                | TokenKind::Squotes
                | TokenKind::Dquotes
                | TokenKind::Regex
                | TokenKind::Rparen
                | TokenKind::Rbrack
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Undef
                | TokenKind::Default
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Lbrack => "LBRACK",
            TokenKind::Rbrack => "RBRACK",
            TokenKind::Lbrace => "LBRACE",
            TokenKind::Rbrace => "RBRACE",
            TokenKind::Lparen => "LPAREN",
            TokenKind::Rparen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Semic => "SEMIC",
            TokenKind::Qmark => "QMARK",
            TokenKind::At => "AT",
            TokenKind::Farrow => "FARROW",
            TokenKind::Parrow => "PARROW",
            TokenKind::Equals => "EQUALS",
            TokenKind::Isequal => "ISEQUAL",
            TokenKind::Notequal => "NOTEQUAL",
            TokenKind::Greaterequal => "GREATEREQUAL",
            TokenKind::Greaterthan => "GREATERTHAN",
            TokenKind::Lessthan => "LESSTHAN",
            TokenKind::Lessequal => "LESSEQUAL",
            TokenKind::Match => "MATCH",
            TokenKind::Nomatch => "NOMATCH",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Div => "DIV",
            TokenKind::Lshift => "LSHIFT",
            TokenKind::Rshift => "RSHIFT",
            TokenKind::Not => "NOT",
            TokenKind::Appends => "APPENDS",
            TokenKind::Dot => "DOT",
            TokenKind::InEdge => "IN_EDGE",
            TokenKind::OutEdge => "OUT_EDGE",
            TokenKind::InEdgeSub => "IN_EDGE_SUB",
            TokenKind::OutEdgeSub => "OUT_EDGE_SUB",
            TokenKind::Lcollect => "LCOLLECT",
            TokenKind::Rcollect => "RCOLLECT",
            TokenKind::Llcollect => "LLCOLLECT",
            TokenKind::Rrcollect => "RRCOLLECT",
            TokenKind::Name => "NAME",
            TokenKind::Classref => "CLASSREF",
            TokenKind::DollarVar => "DOLLAR_VAR",
            TokenKind::Number => "NUMBER",
            TokenKind::Squotes => "SQUOTES",
            TokenKind::Dquotes => "DQUOTES",
            TokenKind::Regex => "REGEX",
            TokenKind::Return => "RETURN",
            TokenKind::Comment => "COMMENT",
            TokenKind::Mlcomment => "MLCOMMENT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Case => "CASE",
            TokenKind::Class => "CLASS",
            TokenKind::Default => "DEFAULT",
            TokenKind::Define => "DEFINE",
            TokenKind::Import => "IMPORT",
            TokenKind::If => "IF",
            TokenKind::Elsif => "ELSIF",
            TokenKind::Else => "ELSE",
            TokenKind::Inherits => "INHERITS",
            TokenKind::Node => "NODE",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Undef => "UNDEF",
            TokenKind::False => "FALSE",
            TokenKind::True => "TRUE",
            TokenKind::In => "IN",
            TokenKind::Include => "INCLUDE",
        };
        f.write_str(name)
    }
}

/// A classified token with its source text and 1-based line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}", self.kind, self.text, self.line)
    }
}
