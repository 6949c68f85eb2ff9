// src/sema/scope.rs

use rustc_hash::FxHashMap;

use crate::frontend::{Span, Symbol, TypeId};
use crate::sema::builtins::FuncId;

/// What a name resolves to inside the analyzer
#[derive(Debug, Clone, Copy)]
pub enum ScopeEntry {
    Var { ty: TypeId, span: Span },
    Func(FuncId),
}

/// Stack of symbol tables. Insertion never chains; lookup chains outward when
/// asked to.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<FxHashMap<Symbol, ScopeEntry>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the global scope");
    }

    /// Insert into the innermost scope. Returns false if the name is already
    /// declared there.
    pub fn insert(&mut self, name: Symbol, entry: ScopeEntry) -> bool {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(&name) {
            return false;
        }
        scope.insert(name, entry);
        true
    }

    pub fn lookup(&self, name: Symbol, chained: bool) -> Option<ScopeEntry> {
        if chained {
            self.scopes
                .iter()
                .rev()
                .find_map(|scope| scope.get(&name).copied())
        } else {
            self.scopes
                .last()
                .and_then(|scope| scope.get(&name).copied())
        }
    }
}
