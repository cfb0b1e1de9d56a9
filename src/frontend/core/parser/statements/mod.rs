//! Function bodies

pub mod declarations;

use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::lexer::TokenStream;
use crate::frontend::core::parser::ast::*;
use crate::frontend::core::parser::Parser;

impl<T: TokenStream> Parser<T> {
    /// Parse `{ statements [return expr ;] }`; the current token is `{`,
    /// left on `}`
    ///
    /// Each statement is a variable declaration or an expression, both ended
    /// by `;`. Names resolve in the function's own scope first.
    pub(crate) fn parse_function_body(
        &mut self,
        prototype: Prototype,
    ) -> Option<FunctionDefinition> {
        let scope = prototype.name.clone();
        self.advance();

        let mut body = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::KwReturn | TokenKind::RBrace => break,
                TokenKind::Eof => {
                    self.expected("`}` at the end of the function body");
                    return None;
                }
                TokenKind::KwType(_) => {
                    let decl = self.parse_declaration(&scope)?;
                    self.check(&TokenKind::Semicolon, "`;` after the declaration")?;
                    body.push(Stmt::Declaration(decl));
                }
                _ => {
                    let expr = self.parse_expression(&scope)?;
                    self.check(&TokenKind::Semicolon, "`;` after the statement")?;
                    body.push(Stmt::Expression(expr));
                }
            }
            self.advance();
        }

        let return_expr = if self.at(&TokenKind::KwReturn) {
            self.advance();
            let expr = self.parse_expression(&scope)?;
            self.expect(&TokenKind::Semicolon, "`;` after the return value")?;
            self.check(&TokenKind::RBrace, "`}` after the return statement")?;
            Some(expr)
        } else {
            None
        };

        Some(FunctionDefinition {
            prototype,
            body,
            return_expr,
        })
    }
}
