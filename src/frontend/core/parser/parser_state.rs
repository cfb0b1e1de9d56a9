//! Parser state and error handling

use thiserror::Error;

use super::ast::{Node, SemanticType};
use super::symbols::SymbolTable;
use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::lexer::TokenStream;
use crate::util::span::Span;

/// Parse error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Expected a specific construct
    #[error("{span}: expected {expected}, found {}", found.describe())]
    ExpectedToken {
        expected: String,
        found: TokenKind,
        span: Span,
    },
    /// Token cannot start an expression
    #[error("{span}: unexpected {} when expecting an expression", found.describe())]
    UnexpectedToken { found: TokenKind, span: Span },
    /// Name has no declared type in scope
    #[error("{span}: unknown identifier `{name}`")]
    UnknownIdentifier { name: String, span: Span },
    #[error("{span}: parameter `{name}` of `{function}` declared twice")]
    DuplicateParameter {
        function: String,
        name: String,
        span: Span,
    },
    #[error("{span}: `{name}` is declared {declared} but initialized with a {found} literal")]
    InitializerMismatch {
        name: String,
        declared: SemanticType,
        found: SemanticType,
        span: Span,
    },
    #[error("{span}: malformed numeric literal `{text}`")]
    MalformedLiteral { text: String, span: Span },
    #[error("{span}: function `{name}` cannot be declared inside another function")]
    NestedFunction { name: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::ExpectedToken { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::UnknownIdentifier { span, .. }
            | ParseError::DuplicateParameter { span, .. }
            | ParseError::InitializerMismatch { span, .. }
            | ParseError::MalformedLiteral { span, .. }
            | ParseError::NestedFunction { span, .. } => *span,
        }
    }
}

/// Incremental parser over a token stream
///
/// The parser never reads past the token that closes a top-level form, so an
/// interactive user sees the result of a line before typing the next one.
/// Each [`Parser::parse_next`] call begins by pulling a fresh token.
pub struct Parser<T> {
    tokens: T,
    current: Token,
    symbols: SymbolTable,
    anon_counter: usize,
    errors: Vec<ParseError>,
}

impl<T: TokenStream> Parser<T> {
    pub fn new(tokens: T) -> Self {
        Self {
            tokens,
            // Placeholder until the first form is requested.
            current: Token::from(TokenKind::Semicolon),
            symbols: SymbolTable::new(),
            anon_counter: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the next top-level form
    ///
    /// Returns `None` when the form was malformed (errors are recorded and
    /// the parser has resynchronized) or skipped. End of input is reported
    /// as `Node::Expr(Expr::EndOfInput)`.
    pub fn parse_next(&mut self) -> Option<Node> {
        self.symbols.checkpoint();
        self.advance();

        let node = match &self.current.kind {
            TokenKind::Eof => return Some(Node::Expr(super::ast::Expr::EndOfInput)),
            TokenKind::KwType(_) => self
                .parse_declaration(super::symbols::GLOBAL_SCOPE)
                .map(Node::Decl),
            TokenKind::KwInclude => {
                self.skip_include();
                return None;
            }
            _ => self.parse_top_level_expr(),
        };

        if node.is_none() {
            self.symbols.rollback();
            self.synchronize();
        }
        node
    }

    /// Undo the symbol table entries of the form last returned by
    /// [`Parser::parse_next`]
    ///
    /// Used when a later stage rejects the form, so that names keep the type
    /// of the declaration that is still live.
    pub fn reject_form(&mut self) {
        self.symbols.rollback();
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn span(&self) -> Span {
        self.current.span
    }

    /// Move to the next token
    pub fn advance(&mut self) {
        self.current = self.tokens.next_token();
    }

    pub fn at(
        &self,
        kind: &TokenKind,
    ) -> bool {
        &self.current.kind == kind
    }

    /// Check the current token without consuming it, recording an error on
    /// mismatch
    pub fn check(
        &mut self,
        kind: &TokenKind,
        expected: &str,
    ) -> Option<()> {
        if self.at(kind) {
            Some(())
        } else {
            self.expected(expected);
            None
        }
    }

    /// Consume the current token if it matches
    pub fn expect(
        &mut self,
        kind: &TokenKind,
        expected: &str,
    ) -> Option<()> {
        self.check(kind, expected)?;
        self.advance();
        Some(())
    }

    /// Record an "expected X, found <current>" error
    pub fn expected(
        &mut self,
        expected: &str,
    ) {
        self.error(ParseError::ExpectedToken {
            expected: expected.to_string(),
            found: self.current.kind.clone(),
            span: self.current.span,
        });
    }

    pub fn error(
        &mut self,
        error: ParseError,
    ) {
        tracing::debug!("parse error: {}", error);
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Drain the errors recorded so far
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Counter used to name the next wrapped top-level expression
    pub fn anon_counter(&self) -> usize {
        self.anon_counter
    }

    pub fn increment_anon_counter(&mut self) {
        self.anon_counter += 1;
    }

    pub fn is_interactive(&self) -> bool {
        self.tokens.is_interactive()
    }

    /// Skip to the next form boundary after an error
    ///
    /// Stops on (without consuming) `;`, `}` or end of input; the next
    /// `parse_next` resumes after it.
    pub fn synchronize(&mut self) {
        while !matches!(
            self.current.kind,
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    /// `include` is recognized but not processed; its operand is skipped
    fn skip_include(&mut self) {
        tracing::warn!("{}: include is not supported, ignoring", self.current.span);
        self.synchronize();
    }
}
