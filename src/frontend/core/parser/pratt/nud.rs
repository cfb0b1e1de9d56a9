//! Primary expressions

use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::lexer::TokenStream;
use crate::frontend::core::parser::ast::*;
use crate::frontend::core::parser::symbols::scoped_name;
use crate::frontend::core::parser::{ParseError, Parser};

impl<T: TokenStream> Parser<T> {
    /// Parse a primary expression starting at the current token
    pub(crate) fn parse_primary(
        &mut self,
        scope: &str,
    ) -> Option<Expr> {
        match &self.current().kind {
            TokenKind::Identifier(_) => self.parse_identifier_expr(scope),
            TokenKind::IntLiteral(_) => self.parse_int_literal(),
            TokenKind::FloatLiteral(_) => self.parse_float_literal(),
            TokenKind::LParen => self.parse_paren_expr(scope),
            TokenKind::KwIf => self.parse_if_expr(scope),
            found => {
                let error = ParseError::UnexpectedToken {
                    found: found.clone(),
                    span: self.span(),
                };
                self.error(error);
                None
            }
        }
    }

    fn parse_int_literal(&mut self) -> Option<Expr> {
        let span = self.span();
        let text = self.current().kind.text().unwrap_or_default().to_string();
        let value = match text.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(ParseError::MalformedLiteral { text, span });
                return None;
            }
        };
        self.advance();
        Some(Expr::IntLiteral { value, span })
    }

    fn parse_float_literal(&mut self) -> Option<Expr> {
        let span = self.span();
        let text = self.current().kind.text().unwrap_or_default().to_string();
        let value = match text.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(ParseError::MalformedLiteral { text, span });
                return None;
            }
        };
        self.advance();
        Some(Expr::FloatLiteral { value, span })
    }

    /// `name` or `name ( args )`
    fn parse_identifier_expr(
        &mut self,
        scope: &str,
    ) -> Option<Expr> {
        let start = self.span();
        let name = self.current().kind.text().unwrap_or_default().to_string();

        let ty = match self.symbols().lookup(scope, &name) {
            Some(ty) => ty,
            None => {
                self.error(ParseError::UnknownIdentifier {
                    name: scoped_name(scope, &name),
                    span: start,
                });
                return None;
            }
        };
        self.advance();

        if !self.at(&TokenKind::LParen) {
            return Some(Expr::Variable {
                name,
                ty,
                span: start,
            });
        }
        self.advance();

        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(scope)?);
                if self.at(&TokenKind::RParen) {
                    break;
                }
                self.check(&TokenKind::Comma, "`)` or `,` in argument list")?;
                self.advance();
            }
        }

        let span = start.to(self.span());
        self.advance();

        Some(Expr::Call {
            callee: name,
            args,
            ty,
            span,
        })
    }

    /// `( expr )`
    fn parse_paren_expr(
        &mut self,
        scope: &str,
    ) -> Option<Expr> {
        self.advance();
        let expr = self.parse_expression(scope)?;
        self.expect(&TokenKind::RParen, "`)`")?;
        Some(expr)
    }

    /// `if ( cond ) then else otherwise`
    fn parse_if_expr(
        &mut self,
        scope: &str,
    ) -> Option<Expr> {
        let start = self.span();
        self.advance();

        self.expect(&TokenKind::LParen, "`(` after `if`")?;
        let condition = self.parse_expression(scope)?;
        self.expect(&TokenKind::RParen, "`)` after the condition")?;

        let then_branch = self.parse_expression(scope)?;
        self.expect(&TokenKind::KwElse, "`else`")?;
        let else_branch = self.parse_expression(scope)?;

        let span = start.to(else_branch.span());
        Some(Expr::conditional(condition, then_branch, else_branch, span))
    }
}
