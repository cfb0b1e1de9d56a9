//! YAPL Programming Language
//!
//! A tiny C-like language with an incremental read-eval-print compiler:
//! every top-level form is parsed, lowered into a fresh compilation unit,
//! committed to an execution backend and, for bare expressions, run.
//!
//! # Example
//!
//! ```yapl
//! int add(int a, int b) { return a + b; }
//! add(2, 3);
//! ```
//!
//! prints `Evaluated to 5`.

#![warn(rust_2018_idioms)]

// Public modules
pub mod backends;
pub mod frontend;
pub mod middle;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

use std::io::Write;

use tracing::debug;

use crate::backends::dev::repl::{JitDriver, SessionStats};
use crate::backends::interpreter::Engine;
use crate::frontend::core::lexer::{StrSource, TokenStream, Tokenizer};
use crate::frontend::core::parser::Parser;
use crate::util::config::YaplConfig;

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language name
pub const NAME: &str = "YAPL";

/// Run every form of `source`, writing results to `out`
///
/// # Example
///
/// ```no_run
/// use yapl::{run_source, util::config::YaplConfig, Result};
///
/// fn main() -> Result<()> {
///     let mut out = Vec::new();
///     run_source("1 + 2.5;", &YaplConfig::default(), &mut out)?;
///     assert_eq!(String::from_utf8(out)?, "Evaluated to 3.5\n");
///     Ok(())
/// }
/// ```
pub fn run_source<W: Write>(
    source: &str,
    config: &YaplConfig,
    out: W,
) -> Result<SessionStats> {
    debug!("running {} bytes of source", source.len());
    run_tokens(Tokenizer::new(StrSource::new(source)), config, out)
}

/// Drive a session over any token stream with a fresh engine
pub fn run_tokens<T: TokenStream, W: Write>(
    tokens: T,
    config: &YaplConfig,
    out: W,
) -> Result<SessionStats> {
    let mut parser = Parser::new(tokens);
    let mut driver = JitDriver::new(Engine::with_config(&config.jit), &config.jit, out);
    let stats = driver
        .run(&mut parser)
        .context("Failed to write evaluation results")?;
    Ok(stats)
}
