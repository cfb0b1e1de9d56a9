//! Function registry
//!
//! Durable map from function name to its declared prototype. It outlives
//! every unit, so a later unit can re-declare (never redefine) a function
//! committed earlier.

use std::collections::HashMap;
use std::sync::Arc;

use crate::frontend::core::parser::ast::Prototype;

#[derive(Debug, Clone)]
struct Entry {
    prototype: Arc<Prototype>,
    defined: bool,
}

#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    entries: HashMap<String, Entry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signature; a body committed earlier stays recorded
    pub fn record_prototype(
        &mut self,
        prototype: Arc<Prototype>,
    ) {
        let defined = self.is_defined(&prototype.name);
        self.entries
            .insert(prototype.name.clone(), Entry { prototype, defined });
    }

    /// Record a signature whose body has been committed
    pub fn record_definition(
        &mut self,
        prototype: Arc<Prototype>,
    ) {
        self.entries.insert(
            prototype.name.clone(),
            Entry {
                prototype,
                defined: true,
            },
        );
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<Arc<Prototype>> {
        self.entries.get(name).map(|e| Arc::clone(&e.prototype))
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_defined(
        &self,
        name: &str,
    ) -> bool {
        self.entries.get(name).is_some_and(|e| e.defined)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
