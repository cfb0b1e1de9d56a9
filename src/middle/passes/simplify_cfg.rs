//! Control-flow simplification
//!
//! - a conditional branch on a constant becomes a jump
//! - blocks unreachable from the entry are removed
//! - phis left with one incoming value (or one distinct value) are replaced
//!   by that value
//! - a block reached by a plain jump from its only predecessor is merged
//!   into it

use std::collections::HashSet;

use super::{replace_uses, FunctionPass};
use crate::middle::core::ir::*;

#[derive(Debug, Default)]
pub struct SimplifyCfg;

impl SimplifyCfg {
    fn fold_constant_branches(function: &mut Function) -> bool {
        let mut dropped_edges = Vec::new();
        for block in &mut function.blocks {
            if let Some(Terminator::CondBr {
                cond: Operand::ConstI1(taken),
                then_block,
                else_block,
            }) = block.terminator
            {
                let (target, other) = if taken {
                    (then_block, else_block)
                } else {
                    (else_block, then_block)
                };
                block.terminator = Some(Terminator::Br(target));
                if other != target {
                    dropped_edges.push((block.id, other));
                }
            }
        }

        let changed = !dropped_edges.is_empty();
        for (from, to) in dropped_edges {
            if let Some(block) = function.block_mut(to) {
                remove_phi_edges(block, &[from]);
            }
        }
        changed
    }

    fn remove_unreachable(function: &mut Function) -> bool {
        let Some(entry) = function.entry().map(|b| b.id) else {
            return false;
        };

        let mut reachable = HashSet::new();
        let mut stack = vec![entry];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(block) = function.block(id) {
                stack.extend(block.successors());
            }
        }

        let dead: Vec<BlockId> = function
            .blocks
            .iter()
            .map(|b| b.id)
            .filter(|id| !reachable.contains(id))
            .collect();
        if dead.is_empty() {
            return false;
        }

        function.blocks.retain(|b| reachable.contains(&b.id));
        for block in &mut function.blocks {
            remove_phi_edges(block, &dead);
        }
        true
    }

    fn collapse_trivial_phis(function: &mut Function) -> bool {
        let mut replacements = Vec::new();
        for block in &mut function.blocks {
            block.instructions.retain(|inst| match inst {
                Instruction::Phi { dst, incoming, .. } => {
                    let first = incoming.first().map(|(v, _)| *v);
                    match first {
                        Some(value)
                            if incoming.iter().all(|(v, _)| *v == value)
                                && value != Operand::Value(*dst) =>
                        {
                            replacements.push((*dst, value));
                            false
                        }
                        _ => true,
                    }
                }
                _ => true,
            });
        }

        let changed = !replacements.is_empty();
        for (id, value) in replacements {
            replace_uses(function, id, value);
        }
        changed
    }

    fn merge_linear_blocks(function: &mut Function) -> bool {
        let mut changed = false;
        loop {
            let candidate = function.blocks.iter().find_map(|block| {
                let Some(Terminator::Br(target)) = block.terminator else {
                    return None;
                };
                if target == block.id || Some(target) == function.entry().map(|b| b.id) {
                    return None;
                }
                let succ = function.block(target)?;
                let has_phi = succ
                    .instructions
                    .iter()
                    .any(|i| matches!(i, Instruction::Phi { .. }));
                if has_phi || function.predecessors(target) != vec![block.id] {
                    return None;
                }
                Some((block.id, target))
            });

            let Some((pred, succ)) = candidate else {
                return changed;
            };

            let Some(index) = function.blocks.iter().position(|b| b.id == succ) else {
                return changed;
            };
            let merged = function.blocks.remove(index);
            let successors = merged.successors();
            if let Some(block) = function.block_mut(pred) {
                block.instructions.extend(merged.instructions);
                block.terminator = merged.terminator;
            }
            for next in successors {
                if let Some(block) = function.block_mut(next) {
                    retarget_phi_edges(block, succ, pred);
                }
            }
            changed = true;
        }
    }
}

fn remove_phi_edges(
    block: &mut Block,
    from: &[BlockId],
) {
    for inst in &mut block.instructions {
        if let Instruction::Phi { incoming, .. } = inst {
            incoming.retain(|(_, b)| !from.contains(b));
        }
    }
}

fn retarget_phi_edges(
    block: &mut Block,
    old: BlockId,
    new: BlockId,
) {
    for inst in &mut block.instructions {
        if let Instruction::Phi { incoming, .. } = inst {
            for (_, b) in incoming.iter_mut() {
                if *b == old {
                    *b = new;
                }
            }
        }
    }
}

impl FunctionPass for SimplifyCfg {
    fn name(&self) -> &'static str {
        "simplify-cfg"
    }

    fn run(
        &self,
        function: &mut Function,
    ) -> bool {
        let mut changed = false;
        loop {
            let mut round = Self::fold_constant_branches(function);
            round |= Self::remove_unreachable(function);
            round |= Self::collapse_trivial_phis(function);
            round |= Self::merge_linear_blocks(function);
            if !round {
                return changed;
            }
            changed = true;
        }
    }
}
