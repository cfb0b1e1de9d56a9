//! Frontend
//!
//! Turns a character stream into top-level forms, one at a time.

pub mod core;

pub use self::core::lexer::{
    tokenize, CharSource, ReaderSource, StrSource, Token, TokenKind, TokenQueue, TokenStream,
    Tokenizer,
};
pub use self::core::parser::{parse_all, Node, ParseError, Parser};
