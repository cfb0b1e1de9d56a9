use super::*;
use crate::middle::passes::*;

#[test]
fn test_accepts_well_formed_function() {
    let function = diamond(Operand::Param(0), Operand::ConstI32(1), Operand::ConstI32(2));
    assert_eq!(verify_function(&function, &empty_unit()), Ok(()));
}

#[test]
fn test_rejects_missing_terminator() {
    let builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    let function = builder.finish();
    assert!(matches!(
        verify_function(&function, &empty_unit()),
        Err(VerifyError::MissingTerminator { .. })
    ));
}

#[test]
fn test_rejects_declaration() {
    let function = Function::declaration(signature("f", &[], NativeType::I32));
    assert!(matches!(
        verify_function(&function, &empty_unit()),
        Err(VerifyError::NoBody { .. })
    ));
}

#[test]
fn test_rejects_mistyped_return() {
    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    builder.ret(Some(Operand::ConstF64(1.0)));
    assert!(matches!(
        verify_function(&builder.finish(), &empty_unit()),
        Err(VerifyError::OperandType { expected: NativeType::I32, found: NativeType::F64, .. })
    ));
}

#[test]
fn test_rejects_mixed_arithmetic() {
    let mut builder = FunctionBuilder::new(signature("f", &[NativeType::F64], NativeType::I32));
    let sum = builder.int_binary(BinaryOpcode::Add, Operand::ConstI32(1), Operand::Param(0));
    builder.ret(Some(sum));
    assert!(matches!(
        verify_function(&builder.finish(), &empty_unit()),
        Err(VerifyError::OperandType { .. })
    ));
}

#[test]
fn test_rejects_undefined_value_and_param() {
    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    builder.ret(Some(Operand::Value(9)));
    assert!(matches!(
        verify_function(&builder.finish(), &empty_unit()),
        Err(VerifyError::UndefinedValue { value: 9, .. })
    ));

    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::I32));
    builder.ret(Some(Operand::Param(0)));
    assert!(matches!(
        verify_function(&builder.finish(), &empty_unit()),
        Err(VerifyError::UndefinedParam { index: 0, .. })
    ));
}

#[test]
fn test_calls_checked_against_unit() {
    let mut unit = empty_unit();
    unit.declare(signature("g", &[NativeType::F64], NativeType::F64));

    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::F64));
    let result = builder.call("g", vec![Operand::ConstF64(1.0)], NativeType::F64);
    builder.ret(Some(result));
    assert_eq!(verify_function(&builder.finish(), &unit), Ok(()));

    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::F64));
    let result = builder.call("g", vec![], NativeType::F64);
    builder.ret(Some(result));
    assert!(matches!(
        verify_function(&builder.finish(), &unit),
        Err(VerifyError::CallArity { expected: 1, found: 0, .. })
    ));

    let mut builder = FunctionBuilder::new(signature("f", &[], NativeType::F64));
    let result = builder.call("h", vec![], NativeType::F64);
    builder.ret(Some(result));
    assert!(matches!(
        verify_function(&builder.finish(), &unit),
        Err(VerifyError::UnknownCallee { .. })
    ));
}

#[test]
fn test_self_call_resolves_without_unit_entry() {
    let mut builder = FunctionBuilder::new(signature("f", &[NativeType::I32], NativeType::I32));
    let result = builder.call("f", vec![Operand::Param(0)], NativeType::I32);
    builder.ret(Some(result));
    assert_eq!(verify_function(&builder.finish(), &empty_unit()), Ok(()));
}

#[test]
fn test_rejects_phi_with_wrong_edges() {
    let mut function = diamond(Operand::Param(0), Operand::ConstI32(1), Operand::ConstI32(2));
    if let Some(Instruction::Phi { incoming, .. }) = function.blocks[3].instructions.first_mut() {
        incoming.pop();
    }
    assert!(matches!(
        verify_function(&function, &empty_unit()),
        Err(VerifyError::PhiEdges { .. })
    ));
}
