//! Keyword recognition

use crate::frontend::core::lexer::tokens::TokenKind;

/// Lexer keyword table
#[derive(Debug, Default)]
pub struct LexerState {}

impl LexerState {
    /// Create new lexer state
    pub fn new() -> Self {
        Self {}
    }

    /// Convert string to keyword token
    pub fn keyword_from_str(
        &self,
        s: &str,
    ) -> Option<TokenKind> {
        match s {
            // Type keywords keep their spelling
            "int" | "float" | "double" => Some(TokenKind::KwType(s.to_string())),

            "include" => Some(TokenKind::KwInclude),
            "return" => Some(TokenKind::KwReturn),

            // Control flow keywords
            "if" => Some(TokenKind::KwIf),
            "else" => Some(TokenKind::KwElse),
            "for" => Some(TokenKind::KwFor),

            _ => None,
        }
    }
}
