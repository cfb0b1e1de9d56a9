//! Interpreter backend for YAPL IR
//!
//! Commits finalized units and executes their functions directly. It walks
//! blocks the way generated code would: instructions in order, then the
//! terminator picks the next block.

pub mod executor;
pub mod ffi;
pub mod frames;


pub use executor::{Engine, DEFAULT_MAX_CALL_DEPTH};
pub use ffi::HostSymbols;
pub use frames::Frame;
