use super::*;
use crate::middle::passes::*;

#[test]
fn test_folds_constant_arithmetic_chain() {
    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::F64));
    let product = builder.int_binary(BinaryOpcode::Mul, Operand::ConstI32(2), Operand::ConstI32(3));
    let sum = builder.int_binary(BinaryOpcode::Add, Operand::ConstI32(1), product);
    let widened = builder.cast(CastOp::SiToFp, sum, NativeType::F64);
    builder.ret(Some(widened));
    let mut function = builder.finish();

    assert!(ConstantFolding.run(&mut function));
    assert_eq!(function.instruction_count(), 0);
    assert_eq!(
        function.blocks[0].terminator,
        Some(Terminator::Ret(Some(Operand::ConstF64(7.0))))
    );
}

#[test]
fn test_leaves_parameters_alone() {
    let mut builder = FunctionBuilder::new(signature("f", &[NativeType::I32], NativeType::I32));
    let sum = builder.int_binary(BinaryOpcode::Add, Operand::Param(0), Operand::ConstI32(1));
    builder.ret(Some(sum));
    let mut function = builder.finish();

    assert!(!ConstantFolding.run(&mut function));
    assert_eq!(function.instruction_count(), 1);
}

#[test]
fn test_keeps_division_by_zero_for_run_time() {
    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    let quotient = builder.int_binary(BinaryOpcode::Div, Operand::ConstI32(1), Operand::ConstI32(0));
    builder.ret(Some(quotient));
    let mut function = builder.finish();

    assert!(!ConstantFolding.run(&mut function));
    assert_eq!(function.instruction_count(), 1);
}

#[test]
fn test_folds_compare_and_zext() {
    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    let less = builder.icmp(IntPredicate::Slt, Operand::ConstI32(1), Operand::ConstI32(2));
    let widened = builder.cast(CastOp::ZExt, less, NativeType::I32);
    builder.ret(Some(widened));
    let mut function = builder.finish();

    ConstantFolding.run(&mut function);
    assert_eq!(
        function.blocks[0].terminator,
        Some(Terminator::Ret(Some(Operand::ConstI32(1))))
    );
}

#[test]
fn test_dead_code_keeps_calls() {
    let mut builder = FunctionBuilder::new(signature("f", &[NativeType::I32], NativeType::I32));
    builder.int_binary(BinaryOpcode::Add, Operand::Param(0), Operand::ConstI32(1));
    builder.call("g", vec![], NativeType::I32);
    builder.ret(Some(Operand::Param(0)));
    let mut function = builder.finish();

    assert!(DeadCodeElimination.run(&mut function));
    assert_eq!(function.instruction_count(), 1);
    assert!(matches!(
        function.blocks[0].instructions[0],
        Instruction::Call { .. }
    ));
}

#[test]
fn test_pipeline_by_level() {
    use crate::util::config::OptLevel;

    assert!(PassManager::for_level(OptLevel::O0).is_empty());
    assert_eq!(
        PassManager::for_level(OptLevel::O1).names(),
        ["constant-folding", "dead-code-elimination"]
    );
    assert!(PassManager::for_level(OptLevel::O2)
        .names()
        .contains(&"simplify-cfg"));
}
