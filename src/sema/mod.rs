// src/sema/mod.rs

pub mod analyzer;
pub mod builtins;
pub mod scope;
pub mod sig;

pub use analyzer::{Analysis, Analyzer};
pub use builtins::{Builtin, FuncEntry, FuncId, FuncKind, FuncTable, ParamSig};
pub use scope::{ScopeEntry, ScopeStack};
