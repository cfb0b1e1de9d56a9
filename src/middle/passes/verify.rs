//! Structural verification of a function before it is committed

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::middle::core::ir::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyError {
    #[error("`{function}` has no body")]
    NoBody { function: String },
    #[error("block `{block}` in `{function}` has no terminator")]
    MissingTerminator { function: String, block: String },
    #[error("`{function}` branches to missing block {target}")]
    UnknownBlock { function: String, target: BlockId },
    #[error("`{function}` uses undefined value %{value}")]
    UndefinedValue { function: String, value: ValueId },
    #[error("`{function}` uses missing parameter #{index}")]
    UndefinedParam { function: String, index: usize },
    #[error("`{function}`: {what} expects {expected}, found {found}")]
    OperandType {
        function: String,
        what: String,
        expected: NativeType,
        found: NativeType,
    },
    #[error("`{function}` calls `{callee}`, which is not declared in the unit")]
    UnknownCallee { function: String, callee: String },
    #[error("`{function}` calls `{callee}` with {found} arguments, expected {expected}")]
    CallArity {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("phi %{value} in `{function}` does not match the predecessors of its block")]
    PhiEdges { function: String, value: ValueId },
}

/// Check `function` against the unit it will be committed to
///
/// Every block must be terminated, operands defined and typed as their
/// instruction requires, branch targets present, phi edges exactly the
/// block's predecessors, calls consistent with the callee's declaration and
/// returns consistent with the signature.
pub fn verify_function(
    function: &Function,
    unit: &Unit,
) -> Result<(), VerifyError> {
    Verifier::new(function, unit).run()
}

struct Verifier<'a> {
    function: &'a Function,
    unit: &'a Unit,
    defined: HashSet<ValueId>,
}

impl<'a> Verifier<'a> {
    fn new(
        function: &'a Function,
        unit: &'a Unit,
    ) -> Self {
        let defined = function.all_instructions().map(Instruction::dst).collect();
        Self {
            function,
            unit,
            defined,
        }
    }

    fn name(&self) -> String {
        self.function.name().to_string()
    }

    fn run(&self) -> Result<(), VerifyError> {
        if self.function.is_declaration() {
            return Err(VerifyError::NoBody {
                function: self.name(),
            });
        }

        let block_ids: HashSet<BlockId> = self.function.blocks.iter().map(|b| b.id).collect();
        let mut predecessors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();

        for block in &self.function.blocks {
            let term = block
                .terminator
                .as_ref()
                .ok_or_else(|| VerifyError::MissingTerminator {
                    function: self.name(),
                    block: block.label.clone(),
                })?;
            for target in term.successors() {
                if !block_ids.contains(&target) {
                    return Err(VerifyError::UnknownBlock {
                        function: self.name(),
                        target,
                    });
                }
                predecessors.entry(target).or_default().push(block.id);
            }
        }

        for block in &self.function.blocks {
            for inst in &block.instructions {
                self.check_instruction(inst, predecessors.get(&block.id))?;
            }
            if let Some(term) = &block.terminator {
                self.check_terminator(term)?;
            }
        }
        Ok(())
    }

    fn type_of(
        &self,
        operand: &Operand,
    ) -> Result<NativeType, VerifyError> {
        match operand {
            Operand::Value(id) if !self.defined.contains(id) => Err(VerifyError::UndefinedValue {
                function: self.name(),
                value: *id,
            }),
            Operand::Param(index) if *index >= self.function.signature.params.len() => {
                Err(VerifyError::UndefinedParam {
                    function: self.name(),
                    index: *index,
                })
            }
            _ => self
                .function
                .operand_type(operand)
                .ok_or_else(|| VerifyError::UndefinedValue {
                    function: self.name(),
                    value: match operand {
                        Operand::Value(id) => *id,
                        _ => 0,
                    },
                }),
        }
    }

    fn expect_type(
        &self,
        operand: &Operand,
        expected: NativeType,
        what: &str,
    ) -> Result<(), VerifyError> {
        let found = self.type_of(operand)?;
        if found != expected {
            return Err(VerifyError::OperandType {
                function: self.name(),
                what: what.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    fn check_instruction(
        &self,
        inst: &Instruction,
        predecessors: Option<&Vec<BlockId>>,
    ) -> Result<(), VerifyError> {
        match inst {
            Instruction::IntBinary { lhs, rhs, .. } => {
                self.expect_type(lhs, NativeType::I32, "integer arithmetic")?;
                self.expect_type(rhs, NativeType::I32, "integer arithmetic")
            }
            Instruction::FloatBinary { lhs, rhs, .. } | Instruction::FCmp { lhs, rhs, .. } => {
                self.expect_type(lhs, NativeType::F64, "float operation")?;
                self.expect_type(rhs, NativeType::F64, "float operation")
            }
            Instruction::ICmp { lhs, rhs, .. } => {
                let ty = self.type_of(lhs)?;
                if !ty.is_integer() {
                    return Err(VerifyError::OperandType {
                        function: self.name(),
                        what: "icmp".to_string(),
                        expected: NativeType::I32,
                        found: ty,
                    });
                }
                self.expect_type(rhs, ty, "icmp")
            }
            Instruction::Cast { op, value, to, .. } => self.check_cast(*op, value, *to),
            Instruction::Call {
                callee, args, ret, ..
            } => self.check_call(callee, args, *ret),
            Instruction::Phi { dst, ty, incoming } => {
                for (value, _) in incoming {
                    self.expect_type(value, *ty, "phi")?;
                }
                let mut edges: Vec<BlockId> = incoming.iter().map(|(_, b)| *b).collect();
                let mut preds = predecessors.cloned().unwrap_or_default();
                edges.sort_unstable();
                preds.sort_unstable();
                if edges != preds {
                    return Err(VerifyError::PhiEdges {
                        function: self.name(),
                        value: *dst,
                    });
                }
                Ok(())
            }
        }
    }

    fn check_cast(
        &self,
        op: CastOp,
        value: &Operand,
        to: NativeType,
    ) -> Result<(), VerifyError> {
        let from = self.type_of(value)?;
        let (valid_from, expected_to) = match op {
            CastOp::SiToFp | CastOp::UiToFp => (from.is_integer(), NativeType::F64),
            CastOp::FpToSi => (from.is_float(), NativeType::I32),
            CastOp::ZExt => (from == NativeType::I1, NativeType::I32),
        };
        if !valid_from || to != expected_to {
            return Err(VerifyError::OperandType {
                function: self.name(),
                what: format!("{} to {}", op, to),
                expected: expected_to,
                found: from,
            });
        }
        Ok(())
    }

    fn check_call(
        &self,
        callee: &str,
        args: &[Operand],
        ret: NativeType,
    ) -> Result<(), VerifyError> {
        let signature = if callee == self.function.name() {
            &self.function.signature
        } else {
            match self.unit.get_function(callee) {
                Some(function) => &function.signature,
                None => {
                    return Err(VerifyError::UnknownCallee {
                        function: self.name(),
                        callee: callee.to_string(),
                    })
                }
            }
        };

        if signature.params.len() != args.len() {
            return Err(VerifyError::CallArity {
                function: self.name(),
                callee: callee.to_string(),
                expected: signature.params.len(),
                found: args.len(),
            });
        }
        for (arg, param) in args.iter().zip(&signature.params) {
            self.expect_type(arg, param.ty, &format!("argument `{}` of `{}`", param.name, callee))?;
        }
        if signature.ret != ret {
            return Err(VerifyError::OperandType {
                function: self.name(),
                what: format!("result of `{}`", callee),
                expected: signature.ret,
                found: ret,
            });
        }
        Ok(())
    }

    fn check_terminator(
        &self,
        term: &Terminator,
    ) -> Result<(), VerifyError> {
        let ret = self.function.signature.ret;
        match term {
            Terminator::Ret(Some(value)) => self.expect_type(value, ret, "return"),
            Terminator::Ret(None) if ret != NativeType::Void => Err(VerifyError::OperandType {
                function: self.name(),
                what: "return".to_string(),
                expected: ret,
                found: NativeType::Void,
            }),
            Terminator::CondBr { cond, .. } => self.expect_type(cond, NativeType::I1, "branch condition"),
            Terminator::Ret(None) | Terminator::Br(_) => Ok(()),
        }
    }
}
