//! JIT driver
//!
//! One iteration per top-level form:
//!
//! ```text
//! parse_next ──► Declaration ──► lower ──► finalize + rotate
//!            └─► expression  ──► wrap as __anon_exprN ──► lower
//!                                 ──► finalize + rotate ──► lookup ──► call ──► print
//! ```
//!
//! Every failure is logged and scoped to its form; the loop only stops at
//! end of input.

use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;

use crate::backends::{Backend, BackendError, Value};
use crate::frontend::core::lexer::TokenStream;
use crate::frontend::core::parser::{AnonymousExpr, Declaration, Node, Parser};
use crate::middle::core::ir_gen::{IrGenerator, LowerError, LowerOptions};
use crate::util::config::JitConfig;

/// Why a form was rejected after parsing
#[derive(Debug, Error)]
enum EvalFailure {
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Counters for one driver session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Top-level forms read, malformed ones included
    pub forms: usize,
    /// Bare expressions that ran and printed a value
    pub evaluated: usize,
    /// Forms that failed to parse, lower, commit or run
    pub failed: usize,
}

/// Drives parser, IR generator and backend
pub struct JitDriver<B: Backend, W: Write> {
    generator: IrGenerator,
    backend: Arc<B>,
    out: W,
    print_ir: bool,
    stats: SessionStats,
}

impl<B: Backend + 'static, W: Write> JitDriver<B, W> {
    /// Create a driver printing results to `out`
    pub fn new(
        backend: B,
        config: &JitConfig,
        out: W,
    ) -> Self {
        let backend = Arc::new(backend);
        let generator = IrGenerator::new(Arc::clone(&backend) as Arc<dyn Backend>, LowerOptions::from(config));
        Self {
            generator,
            backend,
            out,
            print_ir: config.print_ir,
            stats: SessionStats::default(),
        }
    }

    pub fn generator(&self) -> &IrGenerator {
        &self.generator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until end of input
    ///
    /// Only a failure to write a result aborts the loop.
    pub fn run<T: TokenStream>(
        &mut self,
        parser: &mut Parser<T>,
    ) -> io::Result<SessionStats> {
        tracing::debug!("driver started (interactive: {})", parser.is_interactive());
        loop {
            let node = parser.parse_next();

            let errors = parser.take_errors();
            for error in &errors {
                tracing::error!("{}", error);
            }

            let Some(node) = node else {
                // Skipped forms (`include`) carry no error.
                if !errors.is_empty() {
                    self.stats.forms += 1;
                    self.stats.failed += 1;
                }
                continue;
            };
            if node.is_end_of_input() {
                break;
            }
            self.stats.forms += 1;
            if !errors.is_empty() {
                parser.reject_form();
                self.stats.failed += 1;
                continue;
            }

            match node {
                Node::Decl(decl) => {
                    if !self.handle_declaration(&decl) {
                        parser.reject_form();
                    }
                }
                Node::Anon(anon) => {
                    self.handle_expression(&anon)?;
                    parser.increment_anon_counter();
                }
                Node::Expr(expr) => {
                    let anon = AnonymousExpr::new(expr, parser.anon_counter());
                    self.handle_expression(&anon)?;
                    parser.increment_anon_counter();
                }
            }
        }
        self.out.flush()?;
        tracing::debug!("driver finished: {:?}", self.stats);
        Ok(self.stats)
    }

    /// Lower and commit a declaration; false when it was rejected
    fn handle_declaration(
        &mut self,
        decl: &Declaration,
    ) -> bool {
        let result = match self.generator.lower_declaration(decl) {
            Ok(Some(name)) => {
                tracing::debug!("lowered `{}`", name);
                self.commit().map(|_| ()).map_err(EvalFailure::from)
            }
            Ok(None) => Ok(()),
            Err(e) => Err(EvalFailure::from(e)),
        };
        match result {
            Ok(()) => true,
            Err(failure) => {
                tracing::error!("{}", failure);
                self.stats.failed += 1;
                false
            }
        }
    }

    fn handle_expression(
        &mut self,
        anon: &AnonymousExpr,
    ) -> io::Result<()> {
        match self.evaluate(anon) {
            Ok(value) => {
                self.stats.evaluated += 1;
                writeln!(self.out, "Evaluated to {}", value)?;
                self.out.flush()
            }
            Err(failure) => {
                tracing::error!("{}", failure);
                self.stats.failed += 1;
                Ok(())
            }
        }
    }

    fn evaluate(
        &mut self,
        anon: &AnonymousExpr,
    ) -> Result<Value, EvalFailure> {
        let name = self.generator.lower_anonymous(anon)?;
        self.commit()?;

        let function = self
            .backend
            .lookup(&name)
            .ok_or_else(|| BackendError::UnresolvedSymbol(name.clone()))?;
        Ok(function.call(&[])?)
    }

    /// Hand the current unit to the backend and start a new one
    fn commit(&mut self) -> Result<usize, BackendError> {
        let unit = self.generator.take_unit();
        if self.print_ir {
            tracing::info!("\n{}", unit);
        }
        self.backend.finalize(unit)
    }
}
