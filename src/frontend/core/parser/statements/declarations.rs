//! Declaration parsing: prototypes, definitions and variables

use crate::frontend::core::lexer::tokens::*;
use crate::frontend::core::lexer::TokenStream;
use crate::frontend::core::parser::ast::*;
use crate::frontend::core::parser::symbols::GLOBAL_SCOPE;
use crate::frontend::core::parser::{ParseError, Parser};
use crate::util::span::Span;

impl<T: TokenStream> Parser<T> {
    /// Parse a declaration starting at its type keyword
    ///
    /// Leaves the closing `;` or `}` as the current token.
    pub fn parse_declaration(
        &mut self,
        scope: &str,
    ) -> Option<Declaration> {
        let start = self.span();
        let ty = self.parse_type("a type")?;
        self.advance();

        let name = match &self.current().kind {
            TokenKind::Identifier(name) => name.clone(),
            _ => {
                self.expected("an identifier after the type");
                return None;
            }
        };
        self.advance();

        match self.current().kind {
            TokenKind::LParen => {
                if scope != GLOBAL_SCOPE {
                    self.error(ParseError::NestedFunction {
                        name,
                        span: start,
                    });
                    return None;
                }
                let prototype = self.parse_prototype(ty, name, start)?;
                self.advance();
                match self.current().kind {
                    TokenKind::Semicolon => Some(Declaration::Prototype(prototype)),
                    TokenKind::LBrace => self.parse_function_body(prototype).map(Declaration::Function),
                    _ => {
                        self.expected("`;` or a function body after the prototype");
                        None
                    }
                }
            }
            TokenKind::Eq => {
                self.symbols_mut().declare(scope, &name, ty);
                self.parse_variable_definition(ty, name, start)
            }
            TokenKind::Semicolon => {
                self.symbols_mut().declare(scope, &name, ty);
                Some(Declaration::VariableDeclaration {
                    ty,
                    name,
                    span: start.to(self.span()),
                })
            }
            _ => {
                self.expected("`;`, `=` or `(` after the declared name");
                None
            }
        }
    }

    fn parse_type(
        &mut self,
        what: &str,
    ) -> Option<SemanticType> {
        let ty = match &self.current().kind {
            TokenKind::KwType(keyword) => SemanticType::from_keyword(keyword),
            _ => None,
        };
        if ty.is_none() {
            self.expected(what);
        }
        ty
    }

    /// `( type name, ... )`; the current token is `(`, left on `)`
    ///
    /// Parameters are recorded in the function's scope and the function name
    /// globally, so the body and later forms can refer to them.
    fn parse_prototype(
        &mut self,
        return_type: SemanticType,
        name: String,
        start: Span,
    ) -> Option<Prototype> {
        self.advance();

        let mut params: Vec<Param> = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let ty = self.parse_type("a parameter type")?;
                self.advance();

                let param_span = self.span();
                let param = match &self.current().kind {
                    TokenKind::Identifier(param) => param.clone(),
                    _ => {
                        self.expected("a parameter name");
                        return None;
                    }
                };
                if params.iter().any(|p| p.name == param) {
                    self.error(ParseError::DuplicateParameter {
                        function: name,
                        name: param,
                        span: param_span,
                    });
                    return None;
                }
                self.symbols_mut().declare(&name, &param, ty);
                params.push(Param { ty, name: param });
                self.advance();

                if !self.at(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.check(&TokenKind::RParen, "`)` at the end of the parameter list")?;

        self.symbols_mut().declare(GLOBAL_SCOPE, &name, return_type);
        Some(Prototype {
            return_type,
            name,
            params,
            span: start.to(self.span()),
        })
    }

    /// `= literal ;`; the current token is `=`, left on `;`
    fn parse_variable_definition(
        &mut self,
        ty: SemanticType,
        name: String,
        start: Span,
    ) -> Option<Declaration> {
        self.advance();

        let literal_span = self.span();
        let (init, found) = match &self.current().kind {
            TokenKind::IntLiteral(text) => match text.parse::<i64>() {
                Ok(value) => (Initializer::Int(value), SemanticType::Int32),
                Err(_) => {
                    let text = text.clone();
                    self.error(ParseError::MalformedLiteral {
                        text,
                        span: literal_span,
                    });
                    return None;
                }
            },
            TokenKind::FloatLiteral(text) => match text.parse::<f64>() {
                Ok(value) => (Initializer::Float(value), SemanticType::Float64),
                Err(_) => {
                    let text = text.clone();
                    self.error(ParseError::MalformedLiteral {
                        text,
                        span: literal_span,
                    });
                    return None;
                }
            },
            _ => {
                self.expected("a numeric literal initializer");
                return None;
            }
        };

        if found != ty {
            self.error(ParseError::InitializerMismatch {
                name,
                declared: ty,
                found,
                span: literal_span,
            });
            return None;
        }
        self.advance();
        self.check(&TokenKind::Semicolon, "`;` after the initializer")?;

        Some(Declaration::VariableDefinition {
            ty,
            name,
            init,
            span: start.to(self.span()),
        })
    }
}
