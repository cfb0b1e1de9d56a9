//! Intermediate representation and function passes
//!
//! This module handles the transformation from AST to verified, optimized
//! units ready for a backend.

pub mod core;
pub mod passes;

pub use self::core::*;
pub use passes::{PassManager, VerifyError};
