//! Token types

use crate::util::span::Span;

/// Token kind
///
/// Identifier, type and literal tokens carry their spelling as written;
/// numerals are parsed to numbers by the parser, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    /// `int`, `float` or `double`
    KwType(String),
    KwInclude,
    KwReturn,
    KwIf,
    KwElse,
    KwFor,

    // Identifiers
    Identifier(String),

    // Literals
    IntLiteral(String),
    FloatLiteral(String),

    // Delimiters
    Semicolon,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,

    /// Any other single character, operators included
    Op(char),

    // Special
    Eof,
}

impl TokenKind {
    /// Spelling carried by identifier, type and literal tokens
    pub fn text(&self) -> Option<&str> {
        match self {
            TokenKind::KwType(s)
            | TokenKind::Identifier(s)
            | TokenKind::IntLiteral(s)
            | TokenKind::FloatLiteral(s) => Some(s),
            _ => None,
        }
    }

    /// Short human-readable name used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            TokenKind::KwType(s) => format!("type `{}`", s),
            TokenKind::KwInclude => "`include`".to_string(),
            TokenKind::KwReturn => "`return`".to_string(),
            TokenKind::KwIf => "`if`".to_string(),
            TokenKind::KwElse => "`else`".to_string(),
            TokenKind::KwFor => "`for`".to_string(),
            TokenKind::Identifier(s) => format!("identifier `{}`", s),
            TokenKind::IntLiteral(s) | TokenKind::FloatLiteral(s) => format!("literal `{}`", s),
            TokenKind::Semicolon => "`;`".to_string(),
            TokenKind::Eq => "`=`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Op(c) => format!("`{}`", c),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// Token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        span: Span,
    ) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl From<TokenKind> for Token {
    fn from(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::dummy(),
        }
    }
}
