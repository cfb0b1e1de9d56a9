//! AST to IR lowering
//!
//! The generator owns the current compilation unit and the function
//! registry. Each top-level form is lowered into the unit; a failed form is
//! rolled back so the unit and registry look exactly as before it.
//!
//! ```text
//! Declaration / AnonymousExpr
//!        |
//!        v
//!  FunctionBuilder (detached) --verify--> PassManager --> Unit
//!                                                          |
//!                                      take_unit() (rotation) --> Backend
//! ```

pub mod coerce;
pub mod error;
pub mod registry;

pub use coerce::{coerce, coercion, Coercion};
pub use error::LowerError;
pub use registry::FunctionRegistry;

use std::collections::HashMap;
use std::sync::Arc;

use crate::backends::Backend;
use crate::frontend::core::parser::ast::{self, Declaration, Expr, Initializer, Prototype, Stmt};
use crate::middle::core::builder::FunctionBuilder;
use crate::middle::core::ir::*;
use crate::middle::passes::{verify_function, PassManager};
use crate::util::config::{JitConfig, OptLevel};
use crate::util::span::Span;

/// Lowering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LowerOptions {
    pub opt_level: OptLevel,
    /// Lower `<` as unsigned integer / unordered float compare
    pub unsigned_compare: bool,
    /// Replace committed bodies instead of rejecting redefinitions
    pub allow_redefinition: bool,
}

impl From<&JitConfig> for LowerOptions {
    fn from(config: &JitConfig) -> Self {
        Self {
            opt_level: config.opt_level,
            unsigned_compare: config.unsigned_compare,
            allow_redefinition: config.allow_redefinition,
        }
    }
}

/// Map a prototype to its externally linked signature
pub fn signature_of(proto: &Prototype) -> Signature {
    Signature {
        name: proto.name.clone(),
        params: proto
            .params
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                ty: NativeType::from_semantic(p.ty),
            })
            .collect(),
        ret: NativeType::from_semantic(proto.return_type),
    }
}

/// Per-function lowering state
struct FunctionContext {
    builder: FunctionBuilder,
    /// Name table of the function being built; replaced for every function
    names: HashMap<String, Operand>,
}

impl FunctionContext {
    fn new(signature: Signature) -> Self {
        let names = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), Operand::Param(i)))
            .collect();
        Self {
            builder: FunctionBuilder::new(signature),
            names,
        }
    }

    fn type_of(
        &self,
        operand: &Operand,
    ) -> NativeType {
        self.builder
            .operand_type(operand)
            .unwrap_or(NativeType::Void)
    }
}

/// AST to IR generator
///
/// Signatures are declared through the backend that will receive the units.
#[derive(Debug)]
pub struct IrGenerator {
    backend: Arc<dyn Backend>,
    unit: Unit,
    registry: FunctionRegistry,
    passes: PassManager,
    options: LowerOptions,
    data_layout: DataLayout,
    units_created: usize,
}

impl IrGenerator {
    pub fn new(
        backend: Arc<dyn Backend>,
        options: LowerOptions,
    ) -> Self {
        let data_layout = backend.data_layout();
        Self {
            backend,
            unit: Unit::new("yapl.0", data_layout),
            registry: FunctionRegistry::new(),
            passes: PassManager::for_level(options.opt_level),
            options,
            data_layout,
            units_created: 1,
        }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn options(&self) -> LowerOptions {
        self.options
    }

    /// Hand out the current unit and start an empty one with the same data
    /// layout
    pub fn take_unit(&mut self) -> Unit {
        let name = format!("yapl.{}", self.units_created);
        self.units_created += 1;
        tracing::debug!("rotating unit {} -> {}", self.unit.name(), name);
        std::mem::replace(&mut self.unit, Unit::new(&name, self.data_layout))
    }

    fn declare(
        &mut self,
        signature: Signature,
    ) -> String {
        self.backend.declare_signature(&mut self.unit, signature)
    }

    /// Lower a top-level declaration
    ///
    /// Returns the emitted symbol, or `None` for declarations that are not
    /// materialized (global variables are only known to the parser).
    pub fn lower_declaration(
        &mut self,
        decl: &Declaration,
    ) -> Result<Option<String>, LowerError> {
        match decl {
            Declaration::Prototype(proto) => self.lower_prototype(proto).map(Some),
            Declaration::Function(def) => self.lower_function_definition(def).map(Some),
            Declaration::VariableDeclaration { name, .. }
            | Declaration::VariableDefinition { name, .. } => {
                tracing::debug!("global `{}` recorded, not materialized", name);
                Ok(None)
            }
        }
    }

    /// Declare an externally linked signature and record it in the registry
    pub fn lower_prototype(
        &mut self,
        proto: &Prototype,
    ) -> Result<String, LowerError> {
        let signature = signature_of(proto);
        self.check_redefinition(proto, &signature, false)?;

        self.drop_stale(&signature);
        self.declare(signature);
        self.registry.record_prototype(Arc::new(proto.clone()));
        tracing::debug!("declared `{}`", proto.name);
        Ok(proto.name.clone())
    }

    /// Build, verify and optimize a function body into the current unit
    pub fn lower_function_definition(
        &mut self,
        def: &ast::FunctionDefinition,
    ) -> Result<String, LowerError> {
        let proto = &def.prototype;
        self.check_redefinition(proto, &signature_of(proto), true)?;

        let function = self.build_in_unit(proto, &def.body, def.return_expr.as_ref())?;
        self.unit.insert(function);
        self.registry.record_definition(Arc::new(proto.clone()));
        tracing::debug!("defined `{}`", proto.name);
        Ok(proto.name.clone())
    }

    /// Lower the synthesized zero-argument function of a bare expression
    pub fn lower_anonymous(
        &mut self,
        anon: &ast::AnonymousExpr,
    ) -> Result<String, LowerError> {
        let function = self.build_in_unit(&anon.prototype, &[], Some(&anon.expr))?;
        self.unit.insert(function);
        Ok(anon.prototype.name.clone())
    }

    /// Signature of `name`, re-declared into the current unit from the
    /// registry when the unit does not hold it yet
    pub fn get_function(
        &mut self,
        name: &str,
    ) -> Option<Signature> {
        if let Some(function) = self.unit.get_function(name) {
            return Some(function.signature.clone());
        }

        let proto = self.registry.get(name)?;
        let signature = signature_of(&proto);
        tracing::trace!("re-declaring `{}` from the registry", name);
        self.declare(signature.clone());
        Some(signature)
    }

    fn check_redefinition(
        &self,
        proto: &Prototype,
        signature: &Signature,
        with_body: bool,
    ) -> Result<(), LowerError> {
        if !self.registry.is_defined(&proto.name) {
            return Ok(());
        }
        let same_shape = self
            .registry
            .get(&proto.name)
            .is_some_and(|known| signature_of(&known).same_shape(signature));
        if !with_body && same_shape {
            return Ok(());
        }
        if self.options.allow_redefinition {
            tracing::warn!("redefining `{}`", proto.name);
            return Ok(());
        }
        Err(LowerError::Redefinition {
            name: proto.name.clone(),
        })
    }

    /// Erase an entry of the unit whose shape no longer matches `signature`
    fn drop_stale(
        &mut self,
        signature: &Signature,
    ) {
        let stale = self
            .unit
            .get_function(&signature.name)
            .is_some_and(|f| !f.signature.same_shape(signature));
        if stale {
            tracing::debug!("replacing stale declaration of `{}`", signature.name);
            self.unit.remove(&signature.name);
        }
    }

    /// Build a function, rolling the unit back if anything fails
    fn build_in_unit(
        &mut self,
        proto: &Prototype,
        body: &[Stmt],
        return_expr: Option<&Expr>,
    ) -> Result<Function, LowerError> {
        let snapshot = self.unit.snapshot();
        let result = self.build_function(proto, body, return_expr);
        if let Err(error) = &result {
            tracing::debug!("discarding `{}`: {}", proto.name, error);
            self.unit.restore(snapshot);
        }
        result
    }

    fn build_function(
        &mut self,
        proto: &Prototype,
        body: &[Stmt],
        return_expr: Option<&Expr>,
    ) -> Result<Function, LowerError> {
        let signature = signature_of(proto);
        // Declared up front so recursive calls resolve.
        self.drop_stale(&signature);
        self.declare(signature.clone());

        let ret = signature.ret;
        let mut cx = FunctionContext::new(signature);

        for stmt in body {
            self.lower_statement(&mut cx, stmt)?;
        }

        let value = match return_expr {
            Some(expr) => {
                let value = self.lower_expression(&mut cx, expr)?;
                Some(coerce(&mut cx.builder, value, ret, expr.span())?)
            }
            None => {
                tracing::debug!("`{}` has no return, returning zero", proto.name);
                ret.zero()
            }
        };
        cx.builder.ret(value);

        let mut function = cx.builder.finish();
        verify_function(&function, &self.unit)?;
        if self.passes.run(&mut function) {
            tracing::trace!("passes changed `{}`", proto.name);
        }
        Ok(function)
    }

    fn lower_statement(
        &mut self,
        cx: &mut FunctionContext,
        stmt: &Stmt,
    ) -> Result<(), LowerError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.lower_expression(cx, expr)?;
            }
            Stmt::Declaration(Declaration::VariableDefinition {
                ty,
                name,
                init,
                span,
            }) => {
                let literal = match init {
                    Initializer::Int(v) => Operand::ConstI32(*v as i32),
                    Initializer::Float(v) => Operand::ConstF64(*v),
                };
                let value = coerce(&mut cx.builder, literal, NativeType::from_semantic(*ty), *span)?;
                cx.names.insert(name.clone(), value);
            }
            Stmt::Declaration(Declaration::VariableDeclaration { ty, name, span }) => {
                let zero = NativeType::from_semantic(*ty)
                    .zero()
                    .ok_or_else(|| LowerError::Unsupported {
                        what: format!("variable `{}` of type {}", name, ty),
                        span: *span,
                    })?;
                cx.names.insert(name.clone(), zero);
            }
            Stmt::Declaration(decl) => {
                return Err(LowerError::Unsupported {
                    what: format!("nested function `{}`", decl.name()),
                    span: Span::dummy(),
                });
            }
        }
        Ok(())
    }

    /// Lower an expression to an operand of the current function
    fn lower_expression(
        &mut self,
        cx: &mut FunctionContext,
        expr: &Expr,
    ) -> Result<Operand, LowerError> {
        match expr {
            Expr::IntLiteral { value, .. } => Ok(Operand::ConstI32(*value as i32)),
            Expr::FloatLiteral { value, .. } => Ok(Operand::ConstF64(*value)),
            Expr::Variable { name, span, .. } => {
                cx.names
                    .get(name)
                    .copied()
                    .ok_or_else(|| LowerError::UnresolvedName {
                        name: name.clone(),
                        span: *span,
                    })
            }
            Expr::BinaryOp { op, lhs, rhs, span } => self.lower_binary(cx, *op, lhs, rhs, *span),
            Expr::Call {
                callee, args, span, ..
            } => self.lower_call(cx, callee, args, *span),
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                span,
            } => self.lower_conditional(cx, condition, then_branch, else_branch, *span),
            Expr::EndOfInput => Err(LowerError::Unsupported {
                what: "end of input as an expression".to_string(),
                span: Span::dummy(),
            }),
        }
    }

    fn lower_binary(
        &mut self,
        cx: &mut FunctionContext,
        op: ast::BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<Operand, LowerError> {
        let l = self.lower_expression(cx, lhs)?;
        let r = self.lower_expression(cx, rhs)?;
        let ty = cx.type_of(&l);
        let r = coerce(&mut cx.builder, r, ty, span)?;

        let opcode = match op {
            ast::BinaryOperator::Add => Some(BinaryOpcode::Add),
            ast::BinaryOperator::Sub => Some(BinaryOpcode::Sub),
            ast::BinaryOperator::Mul => Some(BinaryOpcode::Mul),
            ast::BinaryOperator::Div => Some(BinaryOpcode::Div),
            ast::BinaryOperator::Lt => None,
        };
        let unsigned = self.options.unsigned_compare;
        let builder = &mut cx.builder;

        match (ty, opcode) {
            (NativeType::F64, Some(opcode)) => Ok(builder.float_binary(opcode, l, r)),
            (NativeType::I32, Some(opcode)) => Ok(builder.int_binary(opcode, l, r)),
            (NativeType::F64, None) => {
                let pred = if unsigned {
                    FloatPredicate::Ult
                } else {
                    FloatPredicate::Olt
                };
                let flag = builder.fcmp(pred, l, r);
                Ok(builder.cast(CastOp::UiToFp, flag, NativeType::F64))
            }
            (NativeType::I32, None) => {
                let pred = if unsigned {
                    IntPredicate::Ult
                } else {
                    IntPredicate::Slt
                };
                let flag = builder.icmp(pred, l, r);
                Ok(builder.cast(CastOp::ZExt, flag, NativeType::I32))
            }
            (ty, _) => Err(LowerError::Unsupported {
                what: format!("operator `{}` on {}", op.symbol(), ty),
                span,
            }),
        }
    }

    fn lower_call(
        &mut self,
        cx: &mut FunctionContext,
        callee: &str,
        args: &[Expr],
        span: Span,
    ) -> Result<Operand, LowerError> {
        let signature = self
            .get_function(callee)
            .ok_or_else(|| LowerError::UnknownFunction {
                name: callee.to_string(),
                span,
            })?;

        if signature.params.len() != args.len() {
            return Err(LowerError::ArgumentCount {
                callee: callee.to_string(),
                expected: signature.params.len(),
                found: args.len(),
                span,
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&signature.params) {
            let value = self.lower_expression(cx, arg)?;
            values.push(coerce(&mut cx.builder, value, param.ty, arg.span())?);
        }
        Ok(cx.builder.call(callee, values, signature.ret))
    }

    fn lower_conditional(
        &mut self,
        cx: &mut FunctionContext,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        span: Span,
    ) -> Result<Operand, LowerError> {
        let cond = self.lower_expression(cx, condition)?;
        let cond = coerce(&mut cx.builder, cond, NativeType::F64, condition.span())?;
        let flag = cx
            .builder
            .fcmp(FloatPredicate::One, cond, Operand::ConstF64(0.0));

        let then_block = cx.builder.append_block("then");
        let else_block = cx.builder.append_block("else");
        let merge_block = cx.builder.append_block("ifcont");
        cx.builder.cond_br(flag, then_block, else_block);

        cx.builder.position_at_end(then_block);
        let then_value = self.lower_expression(cx, then_branch)?;
        let then_end = cx.builder.current_block();
        cx.builder.br(merge_block);

        let ty = cx.type_of(&then_value);
        if ty == NativeType::Void {
            return Err(LowerError::Unsupported {
                what: "void branch in a conditional".to_string(),
                span,
            });
        }

        cx.builder.position_at_end(else_block);
        let else_value = self.lower_expression(cx, else_branch)?;
        let else_value = coerce(&mut cx.builder, else_value, ty, else_branch.span())?;
        let else_end = cx.builder.current_block();
        cx.builder.br(merge_block);

        cx.builder.position_at_end(merge_block);
        Ok(cx
            .builder
            .phi(ty, vec![(then_value, then_end), (else_value, else_end)]))
    }
}
