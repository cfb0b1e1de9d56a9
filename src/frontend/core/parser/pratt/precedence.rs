//! Binary operator precedence
//!
//! Higher binds tighter. Any token that is not a binary operator reports
//! [`PREC_NONE`], which ends a binary expression.

use crate::frontend::core::lexer::tokens::TokenKind;

pub const PREC_NONE: i32 = -1;
pub const PREC_LOWEST: i32 = 0;
pub const PREC_COMPARISON: i32 = 10;
pub const PREC_TERM: i32 = 20;
pub const PREC_FACTOR: i32 = 40;

/// Precedence of an operator character
pub fn operator_precedence(op: char) -> i32 {
    match op {
        '<' => PREC_COMPARISON,
        '+' | '-' => PREC_TERM,
        '*' | '/' => PREC_FACTOR,
        _ => PREC_NONE,
    }
}

/// Precedence of the token as a binary operator
pub fn token_precedence(kind: &TokenKind) -> i32 {
    match kind {
        TokenKind::Op(c) => operator_precedence(*c),
        _ => PREC_NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(operator_precedence('*') > operator_precedence('+'));
        assert_eq!(operator_precedence('+'), operator_precedence('-'));
        assert!(operator_precedence('-') > operator_precedence('<'));
        assert!(operator_precedence('<') > PREC_LOWEST);
    }

    #[test]
    fn test_non_operators_have_no_precedence() {
        assert_eq!(operator_precedence('%'), PREC_NONE);
        assert_eq!(token_precedence(&TokenKind::Semicolon), PREC_NONE);
        assert_eq!(token_precedence(&TokenKind::Identifier("x".into())), PREC_NONE);
    }
}
