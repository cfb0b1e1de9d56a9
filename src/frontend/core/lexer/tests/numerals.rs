//! Numeral scanning

use super::kinds;
use crate::frontend::core::lexer::TokenKind;

fn int(s: &str) -> TokenKind {
    TokenKind::IntLiteral(s.to_string())
}

fn float(s: &str) -> TokenKind {
    TokenKind::FloatLiteral(s.to_string())
}

#[test]
fn test_integer_text_is_kept_verbatim() {
    assert_eq!(kinds("007"), vec![int("007"), TokenKind::Eof]);
}

#[test]
fn test_float_forms() {
    assert_eq!(
        kinds("2.5 .5 3."),
        vec![float("2.5"), float(".5"), float("3."), TokenKind::Eof]
    );
}

#[test]
fn test_second_dot_starts_new_numeral() {
    assert_eq!(
        kinds("1.2.3"),
        vec![float("1.2"), float(".3"), TokenKind::Eof]
    );
}

#[test]
fn test_lone_dot_is_a_float_numeral() {
    assert_eq!(kinds(". ;"), vec![float("."), TokenKind::Semicolon, TokenKind::Eof]);
}

#[test]
fn test_numeral_stops_at_letter() {
    assert_eq!(
        kinds("12ab"),
        vec![
            int("12"),
            TokenKind::Identifier("ab".to_string()),
            TokenKind::Eof
        ]
    );
}
