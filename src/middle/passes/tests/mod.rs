//! Pass tests

mod cfg;
mod folding;
mod verifier;

use crate::middle::core::builder::FunctionBuilder;
use crate::middle::core::ir::*;

pub(super) fn signature(
    name: &str,
    params: &[NativeType],
    ret: NativeType,
) -> Signature {
    Signature {
        name: name.to_string(),
        params: params
            .iter()
            .enumerate()
            .map(|(i, ty)| Parameter {
                name: format!("p{}", i),
                ty: *ty,
            })
            .collect(),
        ret,
    }
}

pub(super) fn empty_unit() -> Unit {
    Unit::new("test", DataLayout::host())
}

/// `if (cond) then_value else else_value` as a diamond joined by a phi
pub(super) fn diamond(
    cond: Operand,
    then_value: Operand,
    else_value: Operand,
) -> Function {
    let mut builder = FunctionBuilder::new(signature("diamond", &[NativeType::I1], NativeType::I32));
    let then_block = builder.append_block("then");
    let else_block = builder.append_block("else");
    let merge = builder.append_block("merge");
    builder.cond_br(cond, then_block, else_block);

    builder.position_at_end(then_block);
    builder.br(merge);
    builder.position_at_end(else_block);
    builder.br(merge);

    builder.position_at_end(merge);
    let joined = builder.phi(
        NativeType::I32,
        vec![(then_value, then_block), (else_value, else_block)],
    );
    builder.ret(Some(joined));
    builder.finish()
}
