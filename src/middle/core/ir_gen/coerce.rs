//! Numeric coercion table
//!
//! Every implicit conversion the generator inserts goes through
//! [`coerce`]: right operands to their left operand's type, else-branches to
//! the then-branch's type, call arguments to parameter types and return
//! values to the declared return type.

use crate::middle::core::builder::FunctionBuilder;
use crate::middle::core::ir::{CastOp, NativeType, Operand};
use crate::util::span::Span;

use super::LowerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    Cast(CastOp),
    Impossible,
}

/// How a value of type `from` becomes a value of type `to`
pub fn coercion(
    from: NativeType,
    to: NativeType,
) -> Coercion {
    use NativeType::*;

    match (from, to) {
        (from, to) if from == to => Coercion::Identity,
        (I32, F64) => Coercion::Cast(CastOp::SiToFp),
        (I1, F64) => Coercion::Cast(CastOp::UiToFp),
        (F64, I32) => Coercion::Cast(CastOp::FpToSi),
        (I1, I32) => Coercion::Cast(CastOp::ZExt),
        _ => Coercion::Impossible,
    }
}

/// Convert `value` to `to`, emitting a cast when the types differ
pub fn coerce(
    builder: &mut FunctionBuilder,
    value: Operand,
    to: NativeType,
    span: Span,
) -> Result<Operand, LowerError> {
    let from = builder.operand_type(&value).unwrap_or(NativeType::Void);
    match coercion(from, to) {
        Coercion::Identity => Ok(value),
        Coercion::Cast(op) => {
            tracing::trace!("coercing {} to {} via {}", from, to, op);
            Ok(builder.cast(op, value, to))
        }
        Coercion::Impossible => Err(LowerError::TypeMismatch { from, to, span }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NativeType::*;

    #[test]
    fn test_table() {
        assert_eq!(coercion(I32, I32), Coercion::Identity);
        assert_eq!(coercion(F64, F64), Coercion::Identity);
        assert_eq!(coercion(I32, F64), Coercion::Cast(CastOp::SiToFp));
        assert_eq!(coercion(F64, I32), Coercion::Cast(CastOp::FpToSi));
        assert_eq!(coercion(I1, F64), Coercion::Cast(CastOp::UiToFp));
        assert_eq!(coercion(I1, I32), Coercion::Cast(CastOp::ZExt));
    }

    #[test]
    fn test_void_never_converts() {
        assert_eq!(coercion(Void, I32), Coercion::Impossible);
        assert_eq!(coercion(F64, Void), Coercion::Impossible);
        assert_eq!(coercion(I32, I1), Coercion::Impossible);
    }
}
