//! Constant folding
//!
//! Evaluates instructions whose operands are all constants and substitutes
//! the result at every use. Runs to a fixpoint, since block order does not
//! follow dominance once conditionals nest. Integer division by a constant
//! zero is left in place so it fails when executed.

use std::collections::HashMap;

use super::{replace_uses, FunctionPass};
use crate::middle::core::eval;
use crate::middle::core::ir::*;

#[derive(Debug, Default)]
pub struct ConstantFolding;

impl ConstantFolding {
    fn fold(inst: &Instruction) -> Option<Operand> {
        let folded = match inst {
            Instruction::IntBinary { op, lhs, rhs, .. } => eval::int_binary(*op, *lhs, *rhs),
            Instruction::FloatBinary { op, lhs, rhs, .. } => eval::float_binary(*op, *lhs, *rhs),
            Instruction::ICmp { pred, lhs, rhs, .. } => eval::icmp(*pred, *lhs, *rhs),
            Instruction::FCmp { pred, lhs, rhs, .. } => eval::fcmp(*pred, *lhs, *rhs),
            Instruction::Cast { op, value, to, .. } => eval::cast(*op, *value, *to),
            Instruction::Phi { incoming, .. } => {
                let (first, _) = incoming.first()?;
                if first.is_constant() && incoming.iter().all(|(v, _)| v == first) {
                    Ok(*first)
                } else {
                    return None;
                }
            }
            Instruction::Call { .. } => return None,
        };
        folded.ok()
    }
}

impl FunctionPass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn run(
        &self,
        function: &mut Function,
    ) -> bool {
        let mut changed = false;
        loop {
            let mut folded: HashMap<ValueId, Operand> = HashMap::new();
            for block in &mut function.blocks {
                block.instructions.retain(|inst| match Self::fold(inst) {
                    Some(value) => {
                        folded.insert(inst.dst(), value);
                        false
                    }
                    None => true,
                });
            }
            if folded.is_empty() {
                return changed;
            }
            for (id, value) in folded {
                replace_uses(function, id, value);
            }
            changed = true;
        }
    }
}
