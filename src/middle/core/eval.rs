//! Operation semantics over constant operands
//!
//! Shared by constant folding and the execution engine so that folded and
//! executed code agree bit for bit. Integer arithmetic wraps at 32 bits.

use thiserror::Error;

use super::ir::{BinaryOpcode, CastOp, FloatPredicate, IntPredicate, NativeType, Operand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("integer division by zero")]
    DivisionByZero,
    #[error("operand type mismatch")]
    TypeMismatch,
}

fn as_int(operand: Operand) -> Result<i32, EvalError> {
    match operand {
        Operand::ConstI32(v) => Ok(v),
        Operand::ConstI1(b) => Ok(b as i32),
        _ => Err(EvalError::TypeMismatch),
    }
}

fn as_float(operand: Operand) -> Result<f64, EvalError> {
    match operand {
        Operand::ConstF64(v) => Ok(v),
        _ => Err(EvalError::TypeMismatch),
    }
}

pub fn int_binary(
    op: BinaryOpcode,
    lhs: Operand,
    rhs: Operand,
) -> Result<Operand, EvalError> {
    let (a, b) = (as_int(lhs)?, as_int(rhs)?);
    let value = match op {
        BinaryOpcode::Add => a.wrapping_add(b),
        BinaryOpcode::Sub => a.wrapping_sub(b),
        BinaryOpcode::Mul => a.wrapping_mul(b),
        BinaryOpcode::Div => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
    };
    Ok(Operand::ConstI32(value))
}

pub fn float_binary(
    op: BinaryOpcode,
    lhs: Operand,
    rhs: Operand,
) -> Result<Operand, EvalError> {
    let (a, b) = (as_float(lhs)?, as_float(rhs)?);
    let value = match op {
        BinaryOpcode::Add => a + b,
        BinaryOpcode::Sub => a - b,
        BinaryOpcode::Mul => a * b,
        BinaryOpcode::Div => a / b,
    };
    Ok(Operand::ConstF64(value))
}

pub fn icmp(
    pred: IntPredicate,
    lhs: Operand,
    rhs: Operand,
) -> Result<Operand, EvalError> {
    let (a, b) = (as_int(lhs)?, as_int(rhs)?);
    let result = match pred {
        IntPredicate::Slt => a < b,
        IntPredicate::Ult => (a as u32) < (b as u32),
    };
    Ok(Operand::ConstI1(result))
}

pub fn fcmp(
    pred: FloatPredicate,
    lhs: Operand,
    rhs: Operand,
) -> Result<Operand, EvalError> {
    let (a, b) = (as_float(lhs)?, as_float(rhs)?);
    let unordered = a.is_nan() || b.is_nan();
    let result = match pred {
        FloatPredicate::Olt => !unordered && a < b,
        FloatPredicate::Ult => unordered || a < b,
        FloatPredicate::One => !unordered && a != b,
    };
    Ok(Operand::ConstI1(result))
}

pub fn cast(
    op: CastOp,
    value: Operand,
    to: NativeType,
) -> Result<Operand, EvalError> {
    let result = match (op, value, to) {
        (CastOp::SiToFp, v, NativeType::F64) => Operand::ConstF64(as_int(v)? as f64),
        (CastOp::UiToFp, v, NativeType::F64) => Operand::ConstF64(as_int(v)? as u32 as f64),
        // Saturating; out-of-range values have no defined result anyway.
        (CastOp::FpToSi, v, NativeType::I32) => Operand::ConstI32(as_float(v)? as i32),
        (CastOp::ZExt, Operand::ConstI1(b), NativeType::I32) => Operand::ConstI32(b as i32),
        _ => return Err(EvalError::TypeMismatch),
    };
    Ok(result)
}
