//! Core intermediate representation
//!
//! Typed SSA functions grouped into units, the builder that emits them, the
//! constant semantics shared with the execution engine and the AST lowering.

pub mod builder;
pub mod eval;
pub mod ir;
pub mod ir_gen;

pub use builder::FunctionBuilder;
pub use ir::*;
pub use ir_gen::{IrGenerator, LowerError, LowerOptions};
