//! Expression parsing
//!
//! Primaries are handled in [`nud`]; binary operators are folded by
//! precedence climbing over the table in [`precedence`].

pub mod nud;
pub mod precedence;

pub use precedence::*;

use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::lexer::TokenStream;
use crate::frontend::core::parser::ast::*;
use crate::frontend::core::parser::Parser;

impl<T: TokenStream> Parser<T> {
    /// Parse a full expression; names resolve in `scope` first
    pub fn parse_expression(
        &mut self,
        scope: &str,
    ) -> Option<Expr> {
        let lhs = self.parse_primary(scope)?;
        self.parse_binary_rhs(PREC_LOWEST, lhs, scope)
    }

    /// Fold operators binding at least as tight as `min_prec` onto `lhs`
    fn parse_binary_rhs(
        &mut self,
        min_prec: i32,
        mut lhs: Expr,
        scope: &str,
    ) -> Option<Expr> {
        loop {
            let prec = token_precedence(&self.current().kind);
            if prec < min_prec {
                return Some(lhs);
            }

            let op = match self.current().kind {
                TokenKind::Op(c) => BinaryOperator::from_char(c)?,
                _ => return Some(lhs),
            };
            self.advance();

            let mut rhs = self.parse_primary(scope)?;

            // A tighter operator after the RHS takes it as its own LHS.
            let next_prec = token_precedence(&self.current().kind);
            if prec < next_prec {
                rhs = self.parse_binary_rhs(prec + 1, rhs, scope)?;
            }

            let span = lhs.span().to(rhs.span());
            lhs = Expr::binary(op, promote_int_literal(lhs, &rhs), rhs, span);
        }
    }

    /// Top-level expression: must end at `;`, which is left unconsumed
    ///
    /// A bare call stays an expression; anything else is wrapped as an
    /// anonymous function under the current counter.
    pub(crate) fn parse_top_level_expr(&mut self) -> Option<Node> {
        let expr = self.parse_expression(crate::frontend::core::parser::GLOBAL_SCOPE)?;
        self.check(&TokenKind::Semicolon, "`;` after expression")?;

        if matches!(expr, Expr::Call { .. }) {
            return Some(Node::Expr(expr));
        }
        Some(Node::Anon(AnonymousExpr::new(expr, self.anon_counter())))
    }
}

/// An integer literal combined with a float operand is read as a float
/// literal, so `1 + 2.5` is a float expression
fn promote_int_literal(
    lhs: Expr,
    rhs: &Expr,
) -> Expr {
    match lhs {
        Expr::IntLiteral { value, span } if rhs.ty().is_float() => Expr::FloatLiteral {
            value: value as f64,
            span,
        },
        other => other,
    }
}
