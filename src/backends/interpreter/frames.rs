//! Call frames for the engine
//!
//! One frame per active call: the arguments, one slot per SSA value of the
//! function, the position of the next instruction and the control-flow
//! position used to resolve phis.

use std::sync::Arc;

use crate::backends::{BackendError, BackendResult};
use crate::middle::core::ir::{BlockId, Function, Operand, ValueId};

/// Call frame for function execution
#[derive(Debug, Clone)]
pub struct Frame {
    /// The function being executed
    pub function: Arc<Function>,
    /// Block being executed
    pub block: BlockId,
    /// Block control came from, if any
    pub previous: Option<BlockId>,
    /// Index of the next instruction in `block`
    pub pc: usize,
    /// Caller slot receiving the return value
    pub return_to: Option<ValueId>,
    args: Vec<Operand>,
    values: Vec<Option<Operand>>,
}

impl Frame {
    /// Create a frame positioned at the entry block
    pub fn with_args(
        function: Arc<Function>,
        args: Vec<Operand>,
    ) -> Self {
        let values = vec![None; function.value_types.len()];
        Self {
            function,
            block: 0,
            previous: None,
            pc: 0,
            return_to: None,
            args,
            values,
        }
    }

    fn name(&self) -> String {
        self.function.name().to_string()
    }

    /// Jump to `target`, remembering where control came from
    pub fn jump(
        &mut self,
        target: BlockId,
    ) {
        self.previous = Some(self.block);
        self.block = target;
        self.pc = 0;
    }

    /// Resolve an operand to a constant
    pub fn get(
        &self,
        operand: &Operand,
    ) -> BackendResult<Operand> {
        let resolved = match operand {
            Operand::Param(index) => self.args.get(*index).copied(),
            Operand::Value(id) => self.values.get(*id).copied().flatten(),
            constant => Some(*constant),
        };
        resolved.ok_or_else(|| BackendError::TypeMismatch {
            function: self.name(),
            detail: format!("operand {:?} has no value", operand),
        })
    }

    pub fn set(
        &mut self,
        id: ValueId,
        value: Operand,
    ) {
        if id >= self.values.len() {
            self.values.resize(id + 1, None);
        }
        self.values[id] = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middle::core::ir::{NativeType, Parameter, Signature};

    fn frame() -> Frame {
        let mut function = Function::declaration(Signature {
            name: "f".to_string(),
            params: vec![Parameter {
                name: "x".to_string(),
                ty: NativeType::I32,
            }],
            ret: NativeType::I32,
        });
        function.value_types.push(NativeType::I32);
        Frame::with_args(Arc::new(function), vec![Operand::ConstI32(7)])
    }

    #[test]
    fn test_operands_resolve() {
        let mut frame = frame();
        assert_eq!(frame.get(&Operand::Param(0)), Ok(Operand::ConstI32(7)));
        assert_eq!(frame.get(&Operand::ConstF64(1.5)), Ok(Operand::ConstF64(1.5)));
        assert!(frame.get(&Operand::Value(0)).is_err());

        frame.set(0, Operand::ConstI32(3));
        assert_eq!(frame.get(&Operand::Value(0)), Ok(Operand::ConstI32(3)));
    }

    #[test]
    fn test_jump_tracks_previous_block() {
        let mut frame = frame();
        assert_eq!(frame.previous, None);
        frame.jump(2);
        frame.pc = 4;
        frame.jump(3);
        assert_eq!((frame.previous, frame.block, frame.pc), (Some(2), 3, 0));
    }
}
