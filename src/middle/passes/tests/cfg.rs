use super::*;
use crate::middle::passes::*;

#[test]
fn test_constant_branch_collapses_diamond() {
    let mut function = diamond(Operand::ConstI1(false), Operand::ConstI32(1), Operand::ConstI32(2));

    assert!(SimplifyCfg.run(&mut function));
    assert_eq!(function.blocks.len(), 1);
    assert_eq!(
        function.blocks[0].terminator,
        Some(Terminator::Ret(Some(Operand::ConstI32(2))))
    );
    assert!(verify_function(&function, &empty_unit()).is_ok());
}

#[test]
fn test_dynamic_branch_is_kept() {
    let mut function = diamond(Operand::Param(0), Operand::ConstI32(1), Operand::ConstI32(2));

    assert!(!SimplifyCfg.run(&mut function));
    assert_eq!(function.blocks.len(), 4);
    assert!(verify_function(&function, &empty_unit()).is_ok());
}

#[test]
fn test_identical_phi_inputs_collapse() {
    let mut function = diamond(Operand::Param(0), Operand::ConstI32(7), Operand::ConstI32(7));

    assert!(SimplifyCfg.run(&mut function));
    let has_phi = function
        .all_instructions()
        .any(|i| matches!(i, Instruction::Phi { .. }));
    assert!(!has_phi);
    assert!(verify_function(&function, &empty_unit()).is_ok());
}

#[test]
fn test_linear_chain_merges() {
    let mut builder = FunctionBuilder::new(signature("f", &[NativeType::I32], NativeType::I32));
    let next = builder.append_block("next");
    builder.br(next);
    builder.position_at_end(next);
    let sum = builder.int_binary(BinaryOpcode::Add, Operand::Param(0), Operand::ConstI32(1));
    builder.ret(Some(sum));
    let mut function = builder.finish();

    assert!(SimplifyCfg.run(&mut function));
    assert_eq!(function.blocks.len(), 1);
    assert_eq!(function.instruction_count(), 1);
    assert!(verify_function(&function, &empty_unit()).is_ok());
}
