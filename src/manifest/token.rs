//! Token types and the token stream shared by the lexer and parser.
//!
//!     Core tokens are produced by the logos table in [core]. Keyword and regex tokens are
//!     synthesized by the lexing post-pass, see [lexing](crate::manifest::lexing). The parser
//!     reads tokens through a [TokenStream], which adds marks for backtracking, side-effect
//!     free lookahead and token injection.

pub mod core;
pub mod stream;

pub use core::{Token, TokenKind};
pub use stream::TokenStream;
