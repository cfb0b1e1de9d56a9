//! Name-to-type table shared by all top-level forms
//!
//! Globals are keyed by their bare name, function-local names (parameters
//! and body declarations) by `scope::name`. Declarations made since the last
//! checkpoint can be undone when their form is rejected.

use std::collections::HashMap;

use super::ast::SemanticType;

/// Scope name of the global scope
pub const GLOBAL_SCOPE: &str = "";

pub fn scoped_name(
    scope: &str,
    name: &str,
) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", scope, name)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    entries: HashMap<String, SemanticType>,
    /// Entries replaced since the last checkpoint, oldest first
    journal: Vec<(String, Option<SemanticType>)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` in `scope`; a later declaration overwrites the type
    pub fn declare(
        &mut self,
        scope: &str,
        name: &str,
        ty: SemanticType,
    ) {
        let key = scoped_name(scope, name);
        let previous = self.entries.insert(key.clone(), ty);
        self.journal.push((key, previous));
    }

    /// Start a new form; earlier declarations become permanent
    pub fn checkpoint(&mut self) {
        self.journal.clear();
    }

    /// Undo every declaration made since the last checkpoint
    pub fn rollback(&mut self) {
        while let Some((key, previous)) = self.journal.pop() {
            match previous {
                Some(ty) => self.entries.insert(key, ty),
                None => self.entries.remove(&key),
            };
        }
    }

    /// Resolve `name` from inside `scope`, falling back to the global entry
    pub fn lookup(
        &self,
        scope: &str,
        name: &str,
    ) -> Option<SemanticType> {
        if !scope.is_empty() {
            if let Some(ty) = self.entries.get(&scoped_name(scope, name)) {
                return Some(*ty);
            }
        }
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
