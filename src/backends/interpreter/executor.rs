//! Execution engine for YAPL IR
//!
//! Finalized units are committed into a resident code table; calls are
//! resolved by name when they execute, so a function may be declared in one
//! unit and defined in a later one. Names without committed code fall back
//! to the host symbol table.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::backends::interpreter::ffi::HostSymbols;
use crate::backends::interpreter::Frame;
use crate::backends::{Backend, BackendError, BackendResult, CompiledFunction, Invoke, Value};
use crate::middle::core::eval::{self, EvalError};
use crate::middle::core::ir::{DataLayout, Function, Instruction, Operand, Terminator, Unit, ValueId};
use crate::middle::passes::verify_function;
use crate::util::config::JitConfig;

/// Default recursion limit
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

type Args = SmallVec<[Operand; 4]>;

#[derive(Debug)]
struct EngineState {
    code: RwLock<HashMap<String, Arc<Function>>>,
    host: HostSymbols,
    data_layout: DataLayout,
    max_call_depth: usize,
}

/// In-process engine executing committed IR
///
/// Cloning is cheap; clones share the code table.
#[derive(Debug, Clone)]
pub struct Engine {
    state: Arc<EngineState>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(DataLayout::host(), DEFAULT_MAX_CALL_DEPTH)
    }
}

impl Engine {
    pub fn new(
        data_layout: DataLayout,
        max_call_depth: usize,
    ) -> Self {
        Self {
            state: Arc::new(EngineState {
                code: RwLock::new(HashMap::new()),
                host: HostSymbols::with_std(),
                data_layout,
                max_call_depth,
            }),
        }
    }

    /// Engine for the host layout with the configured recursion limit
    pub fn with_config(config: &JitConfig) -> Self {
        Self::new(DataLayout::host(), config.max_call_depth)
    }

    pub fn host_symbols(&self) -> &HostSymbols {
        &self.state.host
    }

    /// Number of committed function bodies
    pub fn committed(&self) -> usize {
        self.state.code.read().len()
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.state.code.read().contains_key(name)
    }

    /// Call `name` with `args`
    pub fn call(
        &self,
        name: &str,
        args: &[Value],
    ) -> BackendResult<Value> {
        let operands = args
            .iter()
            .map(|arg| {
                arg.to_operand().ok_or_else(|| BackendError::TypeMismatch {
                    function: name.to_string(),
                    detail: "void argument".to_string(),
                })
            })
            .collect::<BackendResult<Args>>()?;

        let result = Executor::new(&self.state).call(name, operands)?;
        Ok(result.and_then(Value::from_operand).unwrap_or(Value::Void))
    }
}

impl Backend for Engine {
    fn data_layout(&self) -> DataLayout {
        self.state.data_layout
    }

    fn finalize(
        &self,
        unit: Unit,
    ) -> BackendResult<usize> {
        if unit.data_layout() != self.state.data_layout {
            return Err(BackendError::LayoutMismatch {
                unit: unit.name().to_string(),
                expected: self.state.data_layout,
                found: unit.data_layout(),
            });
        }
        for function in unit.functions().filter(|f| !f.is_declaration()) {
            verify_function(function, &unit)?;
        }

        let name = unit.name().to_string();
        let mut code = self.state.code.write();
        let mut committed = 0;
        for function in unit.into_functions() {
            if function.is_declaration() {
                continue;
            }
            tracing::trace!("committing `{}`", function.name());
            code.insert(function.name().to_string(), Arc::new(function));
            committed += 1;
        }
        tracing::debug!("unit {}: committed {} function(s)", name, committed);
        Ok(committed)
    }

    fn lookup(
        &self,
        name: &str,
    ) -> Option<CompiledFunction> {
        let signature = match self.state.code.read().get(name) {
            Some(function) => function.signature.clone(),
            None => self.state.host.signature(name)?,
        };
        let target = Arc::new(Target {
            engine: self.clone(),
            name: name.to_string(),
        });
        Some(CompiledFunction::new(signature, target))
    }
}

/// Late-bound call target handed out by [`Engine::lookup`]
struct Target {
    engine: Engine,
    name: String,
}

impl Invoke for Target {
    fn invoke(
        &self,
        args: &[Value],
    ) -> BackendResult<Value> {
        self.engine.call(&self.name, args)
    }
}

/// Where a call went
enum Entered {
    /// A frame was pushed for committed code
    Frame,
    /// A host symbol ran to completion
    Returned(Option<Operand>),
}

/// One top-level call and everything it calls
///
/// Calls between committed functions push onto `call_stack` instead of
/// recursing on the host stack, so the depth limit is the only bound.
struct Executor<'a> {
    state: &'a EngineState,
    call_stack: Vec<Frame>,
}

impl<'a> Executor<'a> {
    fn new(state: &'a EngineState) -> Self {
        Self {
            state,
            call_stack: Vec::new(),
        }
    }

    fn call(
        &mut self,
        name: &str,
        args: Args,
    ) -> BackendResult<Option<Operand>> {
        match self.enter(name, args, None)? {
            Entered::Frame => self.execute(),
            Entered::Returned(value) => Ok(value),
        }
    }

    /// Push a frame for `name`, or run it at once when it is a host symbol
    fn enter(
        &mut self,
        name: &str,
        args: Args,
        return_to: Option<ValueId>,
    ) -> BackendResult<Entered> {
        // The lock is released before running so the callee can call back in.
        let function = self.state.code.read().get(name).cloned();
        match function {
            Some(function) => {
                let mut frame = self.check_call(function, args)?;
                frame.return_to = return_to;
                self.push_frame(frame)?;
                Ok(Entered::Frame)
            }
            None => self.call_host(name, &args).map(Entered::Returned),
        }
    }

    fn call_host(
        &self,
        name: &str,
        args: &[Operand],
    ) -> BackendResult<Option<Operand>> {
        if !self.state.host.has(name) {
            return Err(BackendError::UnresolvedSymbol(name.to_string()));
        }
        let values = args
            .iter()
            .map(|a| {
                Value::from_operand(*a).ok_or_else(|| BackendError::TypeMismatch {
                    function: name.to_string(),
                    detail: format!("unresolved argument {:?}", a),
                })
            })
            .collect::<BackendResult<Vec<Value>>>()?;
        Ok(self.state.host.call(name, &values)?.to_operand())
    }

    /// Check `args` against the signature of `function`
    fn check_call(
        &self,
        function: Arc<Function>,
        args: Args,
    ) -> BackendResult<Frame> {
        let name = function.name();
        let params = &function.signature.params;
        if args.len() != params.len() {
            return Err(BackendError::ArityMismatch {
                function: name.to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }
        for (arg, param) in args.iter().zip(params) {
            if arg.constant_type() != Some(param.ty) {
                return Err(BackendError::TypeMismatch {
                    function: name.to_string(),
                    detail: format!("argument `{}` expects {}", param.name, param.ty),
                });
            }
        }
        Ok(Frame::with_args(Arc::clone(&function), args.into_vec()))
    }

    /// Push a frame onto the call stack
    fn push_frame(
        &mut self,
        frame: Frame,
    ) -> BackendResult<()> {
        if self.call_stack.len() >= self.state.max_call_depth {
            return Err(BackendError::CallDepthExceeded {
                function: frame.function.name().to_string(),
                limit: self.state.max_call_depth,
            });
        }
        self.call_stack.push(frame);
        Ok(())
    }

    /// Run until the bottom frame returns
    fn execute(&mut self) -> BackendResult<Option<Operand>> {
        loop {
            let Some(frame) = self.call_stack.last_mut() else {
                return Ok(None);
            };
            let function = Arc::clone(&frame.function);
            let block = function
                .block(frame.block)
                .ok_or_else(|| malformed(frame, format!("missing block {}", frame.block)))?;

            if let Some(inst) = block.instructions.get(frame.pc) {
                frame.pc += 1;
                if let Instruction::Call {
                    dst, callee, args, ..
                } = inst
                {
                    let args = args
                        .iter()
                        .map(|a| frame.get(a))
                        .collect::<BackendResult<Args>>()?;
                    if let Entered::Returned(Some(value)) = self.enter(callee, args, Some(*dst))? {
                        self.set_in_caller(*dst, value);
                    }
                } else if let Some(value) = step(frame, inst)? {
                    frame.set(inst.dst(), value);
                }
                continue;
            }

            match &block.terminator {
                Some(Terminator::Ret(value)) => {
                    let value = value.as_ref().map(|v| frame.get(v)).transpose()?;
                    let return_to = frame.return_to;
                    self.call_stack.pop();
                    if self.call_stack.is_empty() {
                        return Ok(value);
                    }
                    if let (Some(dst), Some(value)) = (return_to, value) {
                        self.set_in_caller(dst, value);
                    }
                }
                Some(Terminator::Br(target)) => frame.jump(*target),
                Some(Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                }) => match frame.get(cond)? {
                    Operand::ConstI1(true) => frame.jump(*then_block),
                    Operand::ConstI1(false) => frame.jump(*else_block),
                    other => return Err(malformed(frame, format!("branch on {:?}", other))),
                },
                None => {
                    return Err(malformed(frame, format!("block {} has no terminator", block.label)));
                }
            }
        }
    }

    fn set_in_caller(
        &mut self,
        dst: ValueId,
        value: Operand,
    ) {
        if let Some(caller) = self.call_stack.last_mut() {
            caller.set(dst, value);
        }
    }
}

/// Execute one non-call instruction, returning the value it defines
fn step(
    frame: &Frame,
    inst: &Instruction,
) -> BackendResult<Option<Operand>> {
    let folded = match inst {
        Instruction::IntBinary { op, lhs, rhs, .. } => {
            eval::int_binary(*op, frame.get(lhs)?, frame.get(rhs)?)
        }
        Instruction::FloatBinary { op, lhs, rhs, .. } => {
            eval::float_binary(*op, frame.get(lhs)?, frame.get(rhs)?)
        }
        Instruction::ICmp { pred, lhs, rhs, .. } => {
            eval::icmp(*pred, frame.get(lhs)?, frame.get(rhs)?)
        }
        Instruction::FCmp { pred, lhs, rhs, .. } => {
            eval::fcmp(*pred, frame.get(lhs)?, frame.get(rhs)?)
        }
        Instruction::Cast { op, value, to, .. } => eval::cast(*op, frame.get(value)?, *to),
        Instruction::Call { callee, .. } => {
            return Err(malformed(frame, format!("call to `{}` outside the call stack", callee)));
        }
        Instruction::Phi { incoming, .. } => {
            let edge = incoming
                .iter()
                .find(|(_, block)| Some(*block) == frame.previous)
                .ok_or_else(|| malformed(frame, "phi without a matching edge".to_string()))?;
            return frame.get(&edge.0).map(Some);
        }
    };
    folded
        .map(Some)
        .map_err(|error| eval_error(frame, inst, error))
}

fn eval_error(
    frame: &Frame,
    inst: &Instruction,
    error: EvalError,
) -> BackendError {
    let function = frame.function.name().to_string();
    match error {
        EvalError::DivisionByZero => BackendError::DivisionByZero { function },
        EvalError::TypeMismatch => BackendError::TypeMismatch {
            function,
            detail: format!("bad operands for %{}", inst.dst()),
        },
    }
}

fn malformed(
    frame: &Frame,
    detail: String,
) -> BackendError {
    BackendError::TypeMismatch {
        function: frame.function.name().to_string(),
        detail,
    }
}
