//! Host symbol table
//!
//! Functions the engine answers for when no committed code carries the name,
//! so a program can declare `double sqrt(double x);` and call it.
//! Every host symbol takes and returns `double`.
//!
//! ```text
//! call @sin(double 1.0)
//!       │  (no committed body)
//!       ▼
//! HostSymbols.call("sin") → handler
//! ```

use std::collections::HashMap;
use std::io::Write;

use crate::backends::{BackendError, BackendResult, Value};
use crate::middle::core::ir::{NativeType, Parameter, Signature};

/// A host function over `double` arguments
pub type NativeHandler = fn(&[f64]) -> f64;

#[derive(Clone)]
struct HostSymbol {
    arity: usize,
    handler: NativeHandler,
}

/// Registry of host functions by name
#[derive(Clone, Default)]
pub struct HostSymbols {
    handlers: HashMap<String, HostSymbol>,
}

impl std::fmt::Debug for HostSymbols {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let mut names = self.registered_functions();
        names.sort_unstable();
        f.debug_struct("HostSymbols")
            .field("registered_functions", &names)
            .finish()
    }
}

impl HostSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the math and output functions available by default
    pub fn with_std() -> Self {
        let mut symbols = Self::new();
        register_std_math(&mut symbols);
        symbols.register("putchard", 1, putchard);
        symbols
    }

    /// Register `handler` under `name`, replacing any previous handler
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        handler: NativeHandler,
    ) {
        self.handlers
            .insert(name.to_string(), HostSymbol { arity, handler });
    }

    pub fn has(
        &self,
        name: &str,
    ) -> bool {
        self.handlers.contains_key(name)
    }

    /// Signature under which `name` links
    pub fn signature(
        &self,
        name: &str,
    ) -> Option<Signature> {
        let symbol = self.handlers.get(name)?;
        Some(Signature {
            name: name.to_string(),
            params: (0..symbol.arity)
                .map(|i| Parameter {
                    name: format!("x{}", i),
                    ty: NativeType::F64,
                })
                .collect(),
            ret: NativeType::F64,
        })
    }

    /// Call a host function
    pub fn call(
        &self,
        name: &str,
        args: &[Value],
    ) -> BackendResult<Value> {
        let symbol = self
            .handlers
            .get(name)
            .ok_or_else(|| BackendError::UnresolvedSymbol(name.to_string()))?;

        if args.len() != symbol.arity {
            return Err(BackendError::ArityMismatch {
                function: name.to_string(),
                expected: symbol.arity,
                found: args.len(),
            });
        }

        let mut floats = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Value::F64(v) => floats.push(*v),
                other => {
                    return Err(BackendError::TypeMismatch {
                        function: name.to_string(),
                        detail: format!("host argument must be double, got {}", other.ty()),
                    })
                }
            }
        }
        Ok(Value::F64((symbol.handler)(&floats)))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn registered_functions(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

fn register_std_math(symbols: &mut HostSymbols) {
    symbols.register("sqrt", 1, |args| args[0].sqrt());
    symbols.register("sin", 1, |args| args[0].sin());
    symbols.register("cos", 1, |args| args[0].cos());
    symbols.register("exp", 1, |args| args[0].exp());
    symbols.register("log", 1, |args| args[0].ln());
    symbols.register("fabs", 1, |args| args[0].abs());
    symbols.register("floor", 1, |args| args[0].floor());
}

/// Write the character with code `args[0]` to stderr
fn putchard(args: &[f64]) -> f64 {
    let code = args[0] as u32;
    if let Some(c) = char::from_u32(code) {
        let mut stderr = std::io::stderr().lock();
        let mut buf = [0u8; 4];
        if let Err(e) = stderr.write_all(c.encode_utf8(&mut buf).as_bytes()) {
            tracing::debug!("putchard: {}", e);
        }
    }
    0.0
}
