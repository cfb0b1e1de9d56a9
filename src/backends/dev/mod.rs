//! Development tools for YAPL
//!
//! - REPL: the JIT driver loop and the interactive line source

pub mod repl;

pub use repl::{EditorSource, JitDriver, SessionStats};
