// src/frontend/intern.rs

use rustc_hash::FxHashMap;

/// Unique identifier for interned strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// Interns strings to unique Symbol IDs
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

/// Names the pipeline refers to by identity: the entry function, the built-in
/// functions, and the parameter names built-ins bind their arguments under.
#[derive(Debug, Clone, Copy)]
pub struct WellKnown {
    pub main: Symbol,
    pub print: Symbol,
    pub printn: Symbol,
    pub str_fn: Symbol,
    pub int_val: Symbol,
    pub append: Symbol,
    pub len: Symbol,
    // Built-in parameter names
    pub format: Symbol,
    pub val: Symbol,
    pub arr: Symbol,
    pub elem: Symbol,
    pub args: Symbol,
}

impl WellKnown {
    pub fn install(interner: &mut Interner) -> Self {
        Self {
            main: interner.intern("main"),
            print: interner.intern("print"),
            printn: interner.intern("printn"),
            str_fn: interner.intern("str"),
            int_val: interner.intern("_intVal"),
            append: interner.intern("append"),
            len: interner.intern("len"),
            format: interner.intern("format"),
            val: interner.intern("val"),
            arr: interner.intern("arr"),
            elem: interner.intern("elem"),
            args: interner.intern("args"),
        }
    }
}
