//! Intermediate Representation
//!
//! A small SSA form: functions made of labelled blocks, each a list of
//! instructions closed by one terminator. Values are numbered per function;
//! parameters are referenced positionally.

use std::fmt;

use indexmap::IndexMap;

use crate::frontend::core::parser::ast::SemanticType;

/// Backend-level value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    I1,
    I32,
    F64,
    Void,
}

impl NativeType {
    /// Int32 maps to a 32-bit integer; Float64 and Char share the 64-bit
    /// float representation
    pub fn from_semantic(ty: SemanticType) -> Self {
        match ty {
            SemanticType::Int32 => NativeType::I32,
            SemanticType::Float64 | SemanticType::Char => NativeType::F64,
            SemanticType::Void => NativeType::Void,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, NativeType::I1 | NativeType::I32)
    }

    pub fn is_float(self) -> bool {
        matches!(self, NativeType::F64)
    }

    /// Zero constant of the type; `None` for void
    pub fn zero(self) -> Option<Operand> {
        match self {
            NativeType::I1 => Some(Operand::ConstI1(false)),
            NativeType::I32 => Some(Operand::ConstI32(0)),
            NativeType::F64 => Some(Operand::ConstF64(0.0)),
            NativeType::Void => None,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            NativeType::I1 => "i1",
            NativeType::I32 => "i32",
            NativeType::F64 => "double",
            NativeType::Void => "void",
        };
        write!(f, "{}", name)
    }
}

pub type ValueId = usize;
pub type BlockId = usize;

/// Instruction operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    ConstI1(bool),
    ConstI32(i32),
    ConstF64(f64),
    /// Positional function parameter
    Param(usize),
    /// Result of an instruction
    Value(ValueId),
}

impl Operand {
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Operand::ConstI1(_) | Operand::ConstI32(_) | Operand::ConstF64(_)
        )
    }

    /// Type of a constant operand
    pub fn constant_type(&self) -> Option<NativeType> {
        match self {
            Operand::ConstI1(_) => Some(NativeType::I1),
            Operand::ConstI32(_) => Some(NativeType::I32),
            Operand::ConstF64(_) => Some(NativeType::F64),
            Operand::Param(_) | Operand::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOpcode {
    fn int_mnemonic(self) -> &'static str {
        match self {
            BinaryOpcode::Add => "add",
            BinaryOpcode::Sub => "sub",
            BinaryOpcode::Mul => "mul",
            BinaryOpcode::Div => "sdiv",
        }
    }

    fn float_mnemonic(self) -> &'static str {
        match self {
            BinaryOpcode::Add => "fadd",
            BinaryOpcode::Sub => "fsub",
            BinaryOpcode::Mul => "fmul",
            BinaryOpcode::Div => "fdiv",
        }
    }
}

/// Integer comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    /// Signed less-than
    Slt,
    /// Unsigned less-than
    Ult,
}

/// Float comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatPredicate {
    /// Ordered less-than (false if either side is NaN)
    Olt,
    /// Unordered less-than (true if either side is NaN)
    Ult,
    /// Ordered not-equal
    One,
}

impl fmt::Display for IntPredicate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            IntPredicate::Slt => write!(f, "slt"),
            IntPredicate::Ult => write!(f, "ult"),
        }
    }
}

impl fmt::Display for FloatPredicate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            FloatPredicate::Olt => write!(f, "olt"),
            FloatPredicate::Ult => write!(f, "ult"),
            FloatPredicate::One => write!(f, "one"),
        }
    }
}

/// Conversions between numeric types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    /// Signed integer to float
    SiToFp,
    /// Float to signed integer (truncating)
    FpToSi,
    /// Unsigned integer to float
    UiToFp,
    /// Zero extension
    ZExt,
}

impl fmt::Display for CastOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            CastOp::SiToFp => "sitofp",
            CastOp::FpToSi => "fptosi",
            CastOp::UiToFp => "uitofp",
            CastOp::ZExt => "zext",
        };
        write!(f, "{}", name)
    }
}

/// Instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// 32-bit integer arithmetic
    IntBinary {
        dst: ValueId,
        op: BinaryOpcode,
        lhs: Operand,
        rhs: Operand,
    },
    FloatBinary {
        dst: ValueId,
        op: BinaryOpcode,
        lhs: Operand,
        rhs: Operand,
    },
    ICmp {
        dst: ValueId,
        pred: IntPredicate,
        lhs: Operand,
        rhs: Operand,
    },
    FCmp {
        dst: ValueId,
        pred: FloatPredicate,
        lhs: Operand,
        rhs: Operand,
    },
    Cast {
        dst: ValueId,
        op: CastOp,
        value: Operand,
        to: NativeType,
    },
    /// Call by name; resolved when executed
    Call {
        dst: ValueId,
        callee: String,
        args: Vec<Operand>,
        ret: NativeType,
    },
    Phi {
        dst: ValueId,
        ty: NativeType,
        incoming: Vec<(Operand, BlockId)>,
    },
}

impl Instruction {
    pub fn dst(&self) -> ValueId {
        match self {
            Instruction::IntBinary { dst, .. }
            | Instruction::FloatBinary { dst, .. }
            | Instruction::ICmp { dst, .. }
            | Instruction::FCmp { dst, .. }
            | Instruction::Cast { dst, .. }
            | Instruction::Call { dst, .. }
            | Instruction::Phi { dst, .. } => *dst,
        }
    }

    pub fn result_type(&self) -> NativeType {
        match self {
            Instruction::IntBinary { .. } => NativeType::I32,
            Instruction::FloatBinary { .. } => NativeType::F64,
            Instruction::ICmp { .. } | Instruction::FCmp { .. } => NativeType::I1,
            Instruction::Cast { to, .. } => *to,
            Instruction::Call { ret, .. } => *ret,
            Instruction::Phi { ty, .. } => *ty,
        }
    }

    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Instruction::IntBinary { lhs, rhs, .. }
            | Instruction::FloatBinary { lhs, rhs, .. }
            | Instruction::ICmp { lhs, rhs, .. }
            | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::Cast { value, .. } => vec![value],
            Instruction::Call { args, .. } => args.iter().collect(),
            Instruction::Phi { incoming, .. } => incoming.iter().map(|(v, _)| v).collect(),
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Operand> {
        match self {
            Instruction::IntBinary { lhs, rhs, .. }
            | Instruction::FloatBinary { lhs, rhs, .. }
            | Instruction::ICmp { lhs, rhs, .. }
            | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::Cast { value, .. } => vec![value],
            Instruction::Call { args, .. } => args.iter_mut().collect(),
            Instruction::Phi { incoming, .. } => incoming.iter_mut().map(|(v, _)| v).collect(),
        }
    }

    /// Whether removing the instruction could change observable behavior
    pub fn has_side_effects(&self) -> bool {
        matches!(self, Instruction::Call { .. })
    }
}

/// Block terminator
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Ret(Option<Operand>),
    Br(BlockId),
    CondBr {
        cond: Operand,
        then_block: BlockId,
        else_block: BlockId,
    },
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Ret(_) => Vec::new(),
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Operand> {
        match self {
            Terminator::Ret(Some(value)) => vec![value],
            Terminator::CondBr { cond, .. } => vec![cond],
            Terminator::Ret(None) | Terminator::Br(_) => Vec::new(),
        }
    }
}

/// Basic block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Option<Terminator>,
}

impl Block {
    pub fn new(
        id: BlockId,
        label: &str,
    ) -> Self {
        Self {
            id,
            label: label.to_string(),
            instructions: Vec::new(),
            terminator: None,
        }
    }

    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator
            .as_ref()
            .map(Terminator::successors)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: NativeType,
}

/// Externally linked function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Parameter>,
    pub ret: NativeType,
}

impl Signature {
    pub fn param_types(&self) -> impl Iterator<Item = NativeType> + '_ {
        self.params.iter().map(|p| p.ty)
    }

    /// Same name, parameter types and return type; parameter names may differ
    pub fn same_shape(
        &self,
        other: &Signature,
    ) -> bool {
        self.name == other.name
            && self.ret == other.ret
            && self.param_types().eq(other.param_types())
    }
}

/// Function IR; a function without blocks is a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub signature: Signature,
    pub blocks: Vec<Block>,
    /// Result type of each value, indexed by `ValueId`
    pub value_types: Vec<NativeType>,
}

impl Function {
    pub fn declaration(signature: Signature) -> Self {
        Self {
            signature,
            blocks: Vec::new(),
            value_types: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn entry(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn block(
        &self,
        id: BlockId,
    ) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_mut(
        &mut self,
        id: BlockId,
    ) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn value_type(
        &self,
        id: ValueId,
    ) -> Option<NativeType> {
        self.value_types.get(id).copied()
    }

    /// Type of an operand in the context of this function
    pub fn operand_type(
        &self,
        operand: &Operand,
    ) -> Option<NativeType> {
        match operand {
            Operand::Param(n) => self.signature.params.get(*n).map(|p| p.ty),
            Operand::Value(id) => self.value_type(*id),
            constant => constant.constant_type(),
        }
    }

    /// Predecessors of `id` in block order
    pub fn predecessors(
        &self,
        id: BlockId,
    ) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.successors().contains(&id))
            .map(|b| b.id)
            .collect()
    }

    pub fn all_instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks
            .iter()
            .flat_map(|block| block.instructions.iter())
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    fn operand_text(
        &self,
        operand: &Operand,
    ) -> String {
        match operand {
            Operand::ConstI1(b) => b.to_string(),
            Operand::ConstI32(v) => v.to_string(),
            Operand::ConstF64(v) => format!("{:?}", v),
            Operand::Param(n) => match self.signature.params.get(*n) {
                Some(param) => format!("%{}", param.name),
                None => format!("%arg{}", n),
            },
            Operand::Value(id) => format!("%{}", id),
        }
    }

    fn block_label(
        &self,
        id: BlockId,
    ) -> String {
        match self.block(id) {
            Some(block) => format!("%{}", block.label),
            None => format!("%bb{}", id),
        }
    }

    fn write_instruction(
        &self,
        f: &mut fmt::Formatter<'_>,
        inst: &Instruction,
    ) -> fmt::Result {
        let op = |o: &Operand| self.operand_text(o);
        match inst {
            Instruction::IntBinary { dst, op: code, lhs, rhs } => {
                write!(f, "%{} = {} i32 {}, {}", dst, code.int_mnemonic(), op(lhs), op(rhs))
            }
            Instruction::FloatBinary { dst, op: code, lhs, rhs } => write!(
                f,
                "%{} = {} double {}, {}",
                dst,
                code.float_mnemonic(),
                op(lhs),
                op(rhs)
            ),
            Instruction::ICmp { dst, pred, lhs, rhs } => {
                let ty = self.operand_type(lhs).unwrap_or(NativeType::I32);
                write!(f, "%{} = icmp {} {} {}, {}", dst, pred, ty, op(lhs), op(rhs))
            }
            Instruction::FCmp { dst, pred, lhs, rhs } => {
                write!(f, "%{} = fcmp {} double {}, {}", dst, pred, op(lhs), op(rhs))
            }
            Instruction::Cast { dst, op: cast, value, to } => {
                let from = self.operand_type(value).unwrap_or(NativeType::Void);
                write!(f, "%{} = {} {} {} to {}", dst, cast, from, op(value), to)
            }
            Instruction::Call { dst, callee, args, ret } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|a| {
                        let ty = self.operand_type(a).unwrap_or(NativeType::Void);
                        format!("{} {}", ty, op(a))
                    })
                    .collect();
                if *ret == NativeType::Void {
                    write!(f, "call void @{}({})", callee, args.join(", "))
                } else {
                    write!(f, "%{} = call {} @{}({})", dst, ret, callee, args.join(", "))
                }
            }
            Instruction::Phi { dst, ty, incoming } => {
                let edges: Vec<String> = incoming
                    .iter()
                    .map(|(v, b)| format!("[ {}, {} ]", op(v), self.block_label(*b)))
                    .collect();
                write!(f, "%{} = phi {} {}", dst, ty, edges.join(", "))
            }
        }
    }

    fn write_terminator(
        &self,
        f: &mut fmt::Formatter<'_>,
        term: &Terminator,
    ) -> fmt::Result {
        match term {
            Terminator::Ret(None) => write!(f, "ret void"),
            Terminator::Ret(Some(value)) => {
                let ty = self.operand_type(value).unwrap_or(self.signature.ret);
                write!(f, "ret {} {}", ty, self.operand_text(value))
            }
            Terminator::Br(target) => write!(f, "br label {}", self.block_label(*target)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "br i1 {}, label {}, label {}",
                self.operand_text(cond),
                self.block_label(*then_block),
                self.block_label(*else_block)
            ),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let params: Vec<String> = self
            .signature
            .params
            .iter()
            .map(|p| format!("{} %{}", p.ty, p.name))
            .collect();

        if self.is_declaration() {
            return writeln!(
                f,
                "declare {} @{}({})",
                self.signature.ret,
                self.signature.name,
                params.join(", ")
            );
        }

        writeln!(
            f,
            "define {} @{}({}) {{",
            self.signature.ret,
            self.signature.name,
            params.join(", ")
        )?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for inst in &block.instructions {
                write!(f, "  ")?;
                self.write_instruction(f, inst)?;
                writeln!(f)?;
            }
            match &block.terminator {
                Some(term) => {
                    write!(f, "  ")?;
                    self.write_terminator(f, term)?;
                    writeln!(f)?;
                }
                None => writeln!(f, "  ; no terminator")?,
            }
        }
        writeln!(f, "}}")
    }
}

/// Target data layout shared by every unit of one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLayout {
    pub little_endian: bool,
    pub pointer_bits: u32,
}

impl DataLayout {
    /// Layout of the machine running the compiler
    pub fn host() -> Self {
        Self {
            little_endian: cfg!(target_endian = "little"),
            pointer_bits: usize::BITS,
        }
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for DataLayout {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let endian = if self.little_endian { 'e' } else { 'E' };
        write!(
            f,
            "{}-p:{}:{}-i32:32-f64:64",
            endian, self.pointer_bits, self.pointer_bits
        )
    }
}

/// Snapshot of a unit's functions, used to undo a failed lowering
#[derive(Debug, Clone)]
pub struct UnitSnapshot {
    functions: IndexMap<String, Function>,
}

/// Compilation unit: every signature and body accumulated since the last
/// hand-off to the backend
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    functions: IndexMap<String, Function>,
    data_layout: DataLayout,
}

impl Unit {
    pub fn new(
        name: &str,
        data_layout: DataLayout,
    ) -> Self {
        Self {
            name: name.to_string(),
            functions: IndexMap::new(),
            data_layout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_layout(&self) -> DataLayout {
        self.data_layout
    }

    pub fn get_function(
        &self,
        name: &str,
    ) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.functions.contains_key(name)
    }

    /// Declare `signature` unless the unit already holds that name
    pub fn declare(
        &mut self,
        signature: Signature,
    ) -> &Function {
        self.functions
            .entry(signature.name.clone())
            .or_insert_with(|| Function::declaration(signature))
    }

    /// Insert or replace a function
    pub fn insert(
        &mut self,
        function: Function,
    ) {
        self.functions.insert(function.name().to_string(), function);
    }

    /// Erase a function from the unit
    pub fn remove(
        &mut self,
        name: &str,
    ) -> Option<Function> {
        self.functions.shift_remove(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Consume the unit, yielding its functions in declaration order
    pub fn into_functions(self) -> impl Iterator<Item = Function> {
        self.functions.into_values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            functions: self.functions.clone(),
        }
    }

    pub fn restore(
        &mut self,
        snapshot: UnitSnapshot,
    ) {
        self.functions = snapshot.functions;
    }
}

impl fmt::Display for Unit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "; unit '{}'", self.name)?;
        writeln!(f, "target datalayout = \"{}\"", self.data_layout)?;
        for function in self.functions.values() {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
