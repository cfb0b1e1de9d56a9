//! Function passes
//!
//! Run on each function after it is built and verified, before it is
//! committed. Which passes run depends on the optimization level.

pub mod const_fold;
pub mod dce;
pub mod simplify_cfg;
pub mod verify;

#[cfg(test)]
mod tests;

pub use const_fold::ConstantFolding;
pub use dce::DeadCodeElimination;
pub use simplify_cfg::SimplifyCfg;
pub use verify::{verify_function, VerifyError};

use crate::middle::core::ir::{Function, Operand, ValueId};
use crate::util::config::OptLevel;

/// A transformation over one function
pub trait FunctionPass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transform `function`; returns whether anything changed
    fn run(
        &self,
        function: &mut Function,
    ) -> bool;
}

/// Ordered list of function passes
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn FunctionPass>>,
}

impl std::fmt::Debug for PassManager {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PassManager")
            .field("passes", &self.names())
            .finish()
    }
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard pipeline for `level`
    ///
    /// - `O0`: nothing
    /// - `O1`: constant folding, dead code elimination
    /// - `O2`: `O1` plus control-flow simplification, then folding again to
    ///   pick up collapsed phis
    pub fn for_level(level: OptLevel) -> Self {
        let mut manager = Self::new();
        match level {
            OptLevel::O0 => {}
            OptLevel::O1 => {
                manager.add(ConstantFolding);
                manager.add(DeadCodeElimination);
            }
            OptLevel::O2 => {
                manager.add(ConstantFolding);
                manager.add(SimplifyCfg);
                manager.add(ConstantFolding);
                manager.add(DeadCodeElimination);
            }
        }
        manager
    }

    pub fn add<P: FunctionPass + 'static>(
        &mut self,
        pass: P,
    ) {
        self.passes.push(Box::new(pass));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order; returns whether any of them changed the
    /// function
    pub fn run(
        &self,
        function: &mut Function,
    ) -> bool {
        let mut changed = false;
        for pass in &self.passes {
            tracing::trace!("running {} on {}", pass.name(), function.name());
            changed |= pass.run(function);
        }
        changed
    }
}

/// Replace every use of `%id` in `function` with `value`
pub fn replace_uses(
    function: &mut Function,
    id: ValueId,
    value: Operand,
) {
    let target = Operand::Value(id);
    for block in &mut function.blocks {
        for inst in &mut block.instructions {
            for operand in inst.operands_mut() {
                if *operand == target {
                    *operand = value;
                }
            }
        }
        if let Some(term) = &mut block.terminator {
            for operand in term.operands_mut() {
                if *operand == target {
                    *operand = value;
                }
            }
        }
    }
}
