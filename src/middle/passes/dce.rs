//! Dead code elimination
//!
//! Drops instructions without side effects whose result is never used.

use std::collections::HashSet;

use super::FunctionPass;
use crate::middle::core::ir::*;

#[derive(Debug, Default)]
pub struct DeadCodeElimination;

fn used_values(function: &Function) -> HashSet<ValueId> {
    let mut used = HashSet::new();
    for block in &function.blocks {
        for inst in &block.instructions {
            for operand in inst.operands() {
                if let Operand::Value(id) = operand {
                    used.insert(*id);
                }
            }
        }
        if let Some(term) = &block.terminator {
            let operand = match term {
                Terminator::Ret(Some(value)) => Some(value),
                Terminator::CondBr { cond, .. } => Some(cond),
                _ => None,
            };
            if let Some(Operand::Value(id)) = operand {
                used.insert(*id);
            }
        }
    }
    used
}

impl FunctionPass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(
        &self,
        function: &mut Function,
    ) -> bool {
        let mut changed = false;
        loop {
            let used = used_values(function);
            let mut removed = false;
            for block in &mut function.blocks {
                let before = block.instructions.len();
                block
                    .instructions
                    .retain(|inst| inst.has_side_effects() || used.contains(&inst.dst()));
                removed |= block.instructions.len() != before;
            }
            if !removed {
                return changed;
            }
            changed = true;
        }
    }
}
