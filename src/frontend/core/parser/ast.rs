//! Abstract Syntax Tree types

use std::fmt;

use crate::util::span::Span;

/// Prefix shared by the synthesized names of wrapped top-level expressions
pub const ANON_PREFIX: &str = "__anon_expr";

/// Language-level types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Int32,
    Float64,
    Char,
    Void,
}

impl SemanticType {
    /// Map a type keyword spelling to its type
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(SemanticType::Int32),
            "float" | "double" => Some(SemanticType::Float64),
            _ => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, SemanticType::Float64)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            SemanticType::Int32 => "int",
            SemanticType::Float64 => "double",
            SemanticType::Char => "char",
            SemanticType::Void => "void",
        };
        write!(f, "{}", name)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Lt,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(BinaryOperator::Lt),
            '+' => Some(BinaryOperator::Add),
            '-' => Some(BinaryOperator::Sub),
            '*' => Some(BinaryOperator::Mul),
            '/' => Some(BinaryOperator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Lt => '<',
            BinaryOperator::Add => '+',
            BinaryOperator::Sub => '-',
            BinaryOperator::Mul => '*',
            BinaryOperator::Div => '/',
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOperator::Lt)
    }
}

/// Expression
///
/// Every expression carries a [`SemanticType`]; a binary operation takes the
/// type of its left operand and a conditional the type of its then-branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLiteral {
        value: i64,
        span: Span,
    },
    FloatLiteral {
        value: f64,
        span: Span,
    },
    Variable {
        name: String,
        ty: SemanticType,
        span: Span,
    },
    BinaryOp {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        ty: SemanticType,
        span: Span,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    /// Input is exhausted
    EndOfInput,
}

impl Expr {
    pub fn binary(
        op: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
        span: Span,
    ) -> Self {
        Expr::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        }
    }

    pub fn conditional(
        condition: Expr,
        then_branch: Expr,
        else_branch: Expr,
        span: Span,
    ) -> Self {
        Expr::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        }
    }

    /// Declared type of the expression
    pub fn ty(&self) -> SemanticType {
        match self {
            Expr::IntLiteral { .. } => SemanticType::Int32,
            Expr::FloatLiteral { .. } => SemanticType::Float64,
            Expr::Variable { ty, .. } | Expr::Call { ty, .. } => *ty,
            Expr::BinaryOp { lhs, .. } => lhs.ty(),
            Expr::Conditional { then_branch, .. } => then_branch.ty(),
            Expr::EndOfInput => SemanticType::Void,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral { span, .. }
            | Expr::FloatLiteral { span, .. }
            | Expr::Variable { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::Call { span, .. }
            | Expr::Conditional { span, .. } => *span,
            Expr::EndOfInput => Span::dummy(),
        }
    }

    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Expr::EndOfInput)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: SemanticType,
    pub name: String,
}

/// Function signature
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub return_type: SemanticType,
    pub name: String,
    pub params: Vec<Param>,
    pub span: Span,
}

impl Prototype {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_types(&self) -> impl Iterator<Item = SemanticType> + '_ {
        self.params.iter().map(|p| p.ty)
    }
}

/// Literal initializer of a variable definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Int(i64),
    Float(f64),
}

/// Statement inside a function body
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declaration(Declaration),
    Expression(Expr),
}

/// Function with a body
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub prototype: Prototype,
    pub body: Vec<Stmt>,
    /// `None` when the body closes without a `return`
    pub return_expr: Option<Expr>,
}

/// Declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Prototype(Prototype),
    Function(FunctionDefinition),
    VariableDeclaration {
        ty: SemanticType,
        name: String,
        span: Span,
    },
    VariableDefinition {
        ty: SemanticType,
        name: String,
        init: Initializer,
        span: Span,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Prototype(proto) => &proto.name,
            Declaration::Function(def) => &def.prototype.name,
            Declaration::VariableDeclaration { name, .. }
            | Declaration::VariableDefinition { name, .. } => name,
        }
    }
}

/// A top-level expression wrapped as a zero-parameter function
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymousExpr {
    pub prototype: Prototype,
    pub expr: Expr,
}

impl AnonymousExpr {
    /// Wrap `expr` under the name `__anon_expr<counter>`; the return type is
    /// the expression's type
    pub fn new(
        expr: Expr,
        counter: usize,
    ) -> Self {
        let prototype = Prototype {
            return_type: expr.ty(),
            name: anon_name(counter),
            params: Vec::new(),
            span: expr.span(),
        };
        Self { prototype, expr }
    }

    pub fn name(&self) -> &str {
        &self.prototype.name
    }
}

pub fn anon_name(counter: usize) -> String {
    format!("{}{}", ANON_PREFIX, counter)
}

/// One top-level form produced by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(Expr),
    Decl(Declaration),
    Anon(AnonymousExpr),
}

impl Node {
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Node::Expr(Expr::EndOfInput))
    }
}
