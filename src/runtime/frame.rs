// src/runtime/frame.rs

use rustc_hash::FxHashMap;

use crate::frontend::Symbol;
use crate::runtime::Value;

/// One entry of the call/block stack: the bindings this scope owns. Name
/// lookup chains outward through the interpreter's frame stack; control flow
/// is carried by statement results, not frame state.
#[derive(Debug, Default)]
pub struct Frame {
    vars: FxHashMap<Symbol, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Symbol, value: Value) {
        self.vars.insert(name, value);
    }

    pub fn get(&self, name: Symbol) -> Option<&Value> {
        self.vars.get(&name)
    }

    pub fn get_mut(&mut self, name: Symbol) -> Option<&mut Value> {
        self.vars.get_mut(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.vars.contains_key(&name)
    }
}
