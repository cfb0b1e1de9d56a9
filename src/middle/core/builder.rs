//! Instruction builder
//!
//! Builds one function at a time, detached from any unit, appending to the
//! block the builder is positioned at.

use super::ir::*;

pub struct FunctionBuilder {
    function: Function,
    current: BlockId,
}

impl FunctionBuilder {
    /// Start a definition with an `entry` block, positioned at its end
    pub fn new(signature: Signature) -> Self {
        let mut function = Function::declaration(signature);
        function.blocks.push(Block::new(0, "entry"));
        Self {
            function,
            current: 0,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.function.signature
    }

    /// Append a new block with a unique label derived from `label`
    pub fn append_block(
        &mut self,
        label: &str,
    ) -> BlockId {
        let id = self.function.blocks.len();
        self.function
            .blocks
            .push(Block::new(id, &format!("{}{}", label, id)));
        id
    }

    pub fn position_at_end(
        &mut self,
        block: BlockId,
    ) {
        self.current = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn is_terminated(&self) -> bool {
        self.function.blocks[self.current].terminator.is_some()
    }

    pub fn param(
        &self,
        index: usize,
    ) -> Operand {
        Operand::Param(index)
    }

    pub fn operand_type(
        &self,
        operand: &Operand,
    ) -> Option<NativeType> {
        self.function.operand_type(operand)
    }

    fn new_value(
        &mut self,
        ty: NativeType,
    ) -> ValueId {
        self.function.value_types.push(ty);
        self.function.value_types.len() - 1
    }

    fn emit(
        &mut self,
        inst: Instruction,
    ) -> Operand {
        let dst = inst.dst();
        let block = &mut self.function.blocks[self.current];
        if block.terminator.is_some() {
            tracing::debug!("emitting into terminated block {}", block.label);
        }
        block.instructions.push(inst);
        Operand::Value(dst)
    }

    pub fn int_binary(
        &mut self,
        op: BinaryOpcode,
        lhs: Operand,
        rhs: Operand,
    ) -> Operand {
        let dst = self.new_value(NativeType::I32);
        self.emit(Instruction::IntBinary { dst, op, lhs, rhs })
    }

    pub fn float_binary(
        &mut self,
        op: BinaryOpcode,
        lhs: Operand,
        rhs: Operand,
    ) -> Operand {
        let dst = self.new_value(NativeType::F64);
        self.emit(Instruction::FloatBinary { dst, op, lhs, rhs })
    }

    pub fn icmp(
        &mut self,
        pred: IntPredicate,
        lhs: Operand,
        rhs: Operand,
    ) -> Operand {
        let dst = self.new_value(NativeType::I1);
        self.emit(Instruction::ICmp {
            dst,
            pred,
            lhs,
            rhs,
        })
    }

    pub fn fcmp(
        &mut self,
        pred: FloatPredicate,
        lhs: Operand,
        rhs: Operand,
    ) -> Operand {
        let dst = self.new_value(NativeType::I1);
        self.emit(Instruction::FCmp {
            dst,
            pred,
            lhs,
            rhs,
        })
    }

    pub fn cast(
        &mut self,
        op: CastOp,
        value: Operand,
        to: NativeType,
    ) -> Operand {
        let dst = self.new_value(to);
        self.emit(Instruction::Cast { dst, op, value, to })
    }

    pub fn call(
        &mut self,
        callee: &str,
        args: Vec<Operand>,
        ret: NativeType,
    ) -> Operand {
        let dst = self.new_value(ret);
        self.emit(Instruction::Call {
            dst,
            callee: callee.to_string(),
            args,
            ret,
        })
    }

    pub fn phi(
        &mut self,
        ty: NativeType,
        incoming: Vec<(Operand, BlockId)>,
    ) -> Operand {
        let dst = self.new_value(ty);
        self.emit(Instruction::Phi { dst, ty, incoming })
    }

    fn terminate(
        &mut self,
        term: Terminator,
    ) {
        let block = &mut self.function.blocks[self.current];
        if block.terminator.is_some() {
            tracing::debug!("block {} already terminated", block.label);
            return;
        }
        block.terminator = Some(term);
    }

    pub fn ret(
        &mut self,
        value: Option<Operand>,
    ) {
        self.terminate(Terminator::Ret(value));
    }

    pub fn br(
        &mut self,
        target: BlockId,
    ) {
        self.terminate(Terminator::Br(target));
    }

    pub fn cond_br(
        &mut self,
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    ) {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn finish(self) -> Function {
        self.function
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature() -> Signature {
        Signature {
            name: "f".to_string(),
            params: vec![Parameter {
                name: "x".to_string(),
                ty: NativeType::I32,
            }],
            ret: NativeType::F64,
        }
    }

    #[test]
    fn test_values_are_numbered_in_order() {
        let mut builder = FunctionBuilder::new(signature());
        let sum = builder.int_binary(BinaryOpcode::Add, Operand::Param(0), Operand::ConstI32(1));
        let cast = builder.cast(CastOp::SiToFp, sum, NativeType::F64);
        builder.ret(Some(cast));

        assert_eq!(sum, Operand::Value(0));
        assert_eq!(cast, Operand::Value(1));
        assert_eq!(builder.operand_type(&cast), Some(NativeType::F64));
        assert_eq!(builder.operand_type(&Operand::Param(0)), Some(NativeType::I32));

        let function = builder.finish();
        assert_eq!(function.instruction_count(), 2);
        assert!(!function.is_declaration());
    }

    #[test]
    fn test_blocks_and_branches() {
        let mut builder = FunctionBuilder::new(signature());
        let then_block = builder.append_block("then");
        let merge = builder.append_block("merge");
        builder.cond_br(Operand::ConstI1(true), then_block, merge);
        builder.position_at_end(then_block);
        builder.br(merge);
        builder.position_at_end(merge);
        builder.ret(Some(Operand::ConstF64(0.0)));

        let function = builder.finish();
        assert_eq!(function.blocks.len(), 3);
        assert_eq!(function.predecessors(merge), vec![0, then_block]);
        assert_eq!(function.block(then_block).map(|b| b.label.as_str()), Some("then1"));
    }

    #[test]
    fn test_second_terminator_is_ignored() {
        let mut builder = FunctionBuilder::new(signature());
        builder.ret(Some(Operand::ConstF64(1.0)));
        builder.ret(Some(Operand::ConstF64(2.0)));
        let function = builder.finish();
        assert_eq!(
            function.blocks[0].terminator,
            Some(Terminator::Ret(Some(Operand::ConstF64(1.0))))
        );
    }

    #[test]
    fn test_textual_ir() {
        let mut builder = FunctionBuilder::new(signature());
        let cast = builder.cast(CastOp::SiToFp, Operand::Param(0), NativeType::F64);
        builder.ret(Some(cast));
        let text = builder.finish().to_string();

        assert!(text.starts_with("define double @f(i32 %x) {"));
        assert!(text.contains("%0 = sitofp i32 %x to double"));
        assert!(text.contains("ret double %0"));
    }
}
