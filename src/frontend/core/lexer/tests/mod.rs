//! Lexer tests

mod numerals;

use crate::frontend::core::lexer::{tokenize, TokenKind};

/// Token kinds of `source`, end-of-input included
pub(super) fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).into_iter().map(|t| t.kind).collect()
}
