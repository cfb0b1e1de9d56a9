//! Lowering errors

use thiserror::Error;

use crate::middle::core::ir::NativeType;
use crate::middle::passes::VerifyError;
use crate::util::span::Span;

/// Why a top-level form could not be lowered
///
/// Every variant is scoped to the form being lowered; the unit and the
/// function registry are left as they were before it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    #[error("{span}: cannot convert {from} to {to}")]
    TypeMismatch {
        from: NativeType,
        to: NativeType,
        span: Span,
    },
    #[error("{span}: `{callee}` takes {expected} argument(s), {found} given")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("{span}: unknown variable `{name}`")]
    UnresolvedName { name: String, span: Span },
    #[error("{span}: unknown function `{name}`")]
    UnknownFunction { name: String, span: Span },
    #[error("function `{name}` cannot be redefined")]
    Redefinition { name: String },
    #[error("invalid function discarded: {0}")]
    Verification(#[from] VerifyError),
    #[error("{span}: {what} is not supported")]
    Unsupported { what: String, span: Span },
}
