//! Backend abstraction layer for YAPL execution
//!
//! The IR generator hands every rotated unit to a [`Backend`], which commits
//! it and later resolves symbols to callable handles. The core never looks
//! at what the backend does with the IR.
//!
//! # Architecture
//!
//! ```text
//! Unit (from ir_gen, verified + optimized)
//!         |
//!     finalize()
//!         v
//!    +---------+
//!    | Backend |  (interpreter::Engine)
//!    +---------+
//!         |
//!     lookup(name)
//!         v
//!   CompiledFunction --call(&[Value])--> Value
//! ```

pub mod dev;
pub mod interpreter;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::middle::core::ir::{DataLayout, NativeType, Operand, Signature, Unit};
use crate::middle::passes::VerifyError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// Neither committed code nor a host symbol answers to the name
    #[error("unresolved symbol `{0}`")]
    UnresolvedSymbol(String),
    #[error("integer division by zero in `{function}`")]
    DivisionByZero { function: String },
    #[error("call depth limit of {limit} exceeded in `{function}`")]
    CallDepthExceeded { function: String, limit: usize },
    #[error("`{function}` takes {expected} argument(s), {found} given")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("type mismatch in `{function}`: {detail}")]
    TypeMismatch { function: String, detail: String },
    #[error("unit `{unit}` targets `{found}`, engine expects `{expected}`")]
    LayoutMismatch {
        unit: String,
        expected: DataLayout,
        found: DataLayout,
    },
    #[error("refusing to commit invalid code: {0}")]
    Verification(#[from] VerifyError),
}

/// A runtime value crossing the backend boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I1(bool),
    I32(i32),
    F64(f64),
    Void,
}

impl Value {
    pub fn ty(&self) -> NativeType {
        match self {
            Value::I1(_) => NativeType::I1,
            Value::I32(_) => NativeType::I32,
            Value::F64(_) => NativeType::F64,
            Value::Void => NativeType::Void,
        }
    }

    /// The constant operand carrying this value; `None` for `Void`
    pub fn to_operand(self) -> Option<Operand> {
        match self {
            Value::I1(b) => Some(Operand::ConstI1(b)),
            Value::I32(v) => Some(Operand::ConstI32(v)),
            Value::F64(v) => Some(Operand::ConstF64(v)),
            Value::Void => None,
        }
    }

    /// The value of a constant operand; `None` for params and SSA values
    pub fn from_operand(operand: Operand) -> Option<Self> {
        match operand {
            Operand::ConstI1(b) => Some(Value::I1(b)),
            Operand::ConstI32(v) => Some(Value::I32(v)),
            Operand::ConstF64(v) => Some(Value::F64(v)),
            Operand::Param(_) | Operand::Value(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::I1(b) => write!(f, "{}", *b as i32),
            Value::I32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{:?}", v),
            Value::Void => write!(f, "void"),
        }
    }
}

/// Something a [`CompiledFunction`] can invoke
pub trait Invoke: Send + Sync {
    fn invoke(
        &self,
        args: &[Value],
    ) -> BackendResult<Value>;
}

/// Handle to a committed function, returned by [`Backend::lookup`]
#[derive(Clone)]
pub struct CompiledFunction {
    signature: Signature,
    target: Arc<dyn Invoke>,
}

impl fmt::Debug for CompiledFunction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl CompiledFunction {
    pub fn new(
        signature: Signature,
        target: Arc<dyn Invoke>,
    ) -> Self {
        Self { signature, target }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn return_type(&self) -> NativeType {
        self.signature.ret
    }

    /// Call the function with `args`
    pub fn call(
        &self,
        args: &[Value],
    ) -> BackendResult<Value> {
        if args.len() != self.signature.params.len() {
            return Err(BackendError::ArityMismatch {
                function: self.signature.name.clone(),
                expected: self.signature.params.len(),
                found: args.len(),
            });
        }
        self.target.invoke(args)
    }
}

/// Backend trait - every execution backend implements this
pub trait Backend: std::fmt::Debug {
    /// Layout every unit handed to this backend must share
    fn data_layout(&self) -> DataLayout;

    /// Declare an externally linked signature in `unit`; returns the name
    /// calls should use
    fn declare_signature(
        &self,
        unit: &mut Unit,
        signature: Signature,
    ) -> String {
        unit.declare(signature).name().to_string()
    }

    /// Commit every function body of `unit`; returns how many were committed
    fn finalize(
        &self,
        unit: Unit,
    ) -> BackendResult<usize>;

    /// Resolve `name` to a callable handle
    fn lookup(
        &self,
        name: &str,
    ) -> Option<CompiledFunction>;
}
