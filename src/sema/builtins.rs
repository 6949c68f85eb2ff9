// src/sema/builtins.rs
//! Registry of callable functions: user declarations and the built-ins.

use crate::frontend::{Span, Symbol, TypeId, TypeTable, WellKnown};

/// Index into the function table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub u32);

/// The built-in operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `print(format, ...)` writes the format value as-is
    Print,
    /// `printn(format, ...)` writes the format value plus a newline
    Printn,
    /// `str(val)` renders any value to a string
    Str,
    /// `int(val)`, internally `_intVal`: int passthrough, string parse
    IntVal,
    /// `append(arr, elem)` returns a fresh array with the element added
    Append,
    /// `len(arr)` array length
    Len,
}

#[derive(Debug, Clone, Copy)]
pub enum FuncKind {
    /// Index of the `Decl::Func` in the program's declaration list
    User { decl: usize },
    Builtin(Builtin),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSig {
    pub name: Symbol,
    pub ty: TypeId,
}

/// Everything a call site needs to know about its callee
#[derive(Debug, Clone)]
pub struct FuncEntry {
    pub name: Symbol,
    pub params: Vec<ParamSig>,
    /// Name of the catch-all tail parameter, when the function is variadic
    pub variadic: Option<Symbol>,
    pub ret: TypeId,
    pub kind: FuncKind,
    /// Declaration site; empty for built-ins
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct FuncTable {
    entries: Vec<FuncEntry>,
}

impl FuncTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: FuncEntry) -> FuncId {
        let id = FuncId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: FuncId) -> &FuncEntry {
        &self.entries[id.0 as usize]
    }
}

/// Install the six built-ins and return their ids in table order.
pub fn install_builtins(
    table: &mut FuncTable,
    types: &mut TypeTable,
    wk: &WellKnown,
) -> Vec<FuncId> {
    let array_of_any = types.array_of(TypeTable::ANY);

    let defs = [
        FuncEntry {
            name: wk.print,
            params: vec![ParamSig {
                name: wk.format,
                ty: TypeTable::STRING,
            }],
            variadic: Some(wk.args),
            ret: TypeTable::VOID,
            kind: FuncKind::Builtin(Builtin::Print),
            span: Span::default(),
        },
        FuncEntry {
            name: wk.printn,
            params: vec![ParamSig {
                name: wk.format,
                ty: TypeTable::STRING,
            }],
            variadic: Some(wk.args),
            ret: TypeTable::VOID,
            kind: FuncKind::Builtin(Builtin::Printn),
            span: Span::default(),
        },
        FuncEntry {
            name: wk.str_fn,
            params: vec![ParamSig {
                name: wk.val,
                ty: TypeTable::ANY,
            }],
            variadic: None,
            ret: TypeTable::STRING,
            kind: FuncKind::Builtin(Builtin::Str),
            span: Span::default(),
        },
        FuncEntry {
            name: wk.int_val,
            params: vec![ParamSig {
                name: wk.val,
                ty: TypeTable::ANY,
            }],
            variadic: None,
            ret: TypeTable::INT,
            kind: FuncKind::Builtin(Builtin::IntVal),
            span: Span::default(),
        },
        FuncEntry {
            name: wk.append,
            params: vec![
                ParamSig {
                    name: wk.arr,
                    ty: TypeTable::ANY,
                },
                ParamSig {
                    name: wk.elem,
                    ty: TypeTable::ANY,
                },
            ],
            variadic: None,
            ret: array_of_any,
            kind: FuncKind::Builtin(Builtin::Append),
            span: Span::default(),
        },
        FuncEntry {
            name: wk.len,
            params: vec![ParamSig {
                name: wk.arr,
                ty: array_of_any,
            }],
            variadic: None,
            ret: TypeTable::INT,
            kind: FuncKind::Builtin(Builtin::Len),
            span: Span::default(),
        },
    ];

    defs.into_iter().map(|entry| table.add(entry)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Interner;

    #[test]
    fn builtins_install_with_expected_shapes() {
        let mut interner = Interner::new();
        let wk = WellKnown::install(&mut interner);
        let mut types = TypeTable::new(&mut interner);
        let mut table = FuncTable::new();

        let ids = install_builtins(&mut table, &mut types, &wk);
        assert_eq!(ids.len(), 6);

        let print = table.get(ids[0]);
        assert_eq!(print.name, wk.print);
        assert!(print.variadic.is_some());
        assert_eq!(print.ret, TypeTable::VOID);

        let int_val = table.get(ids[3]);
        assert_eq!(interner.resolve(int_val.name), "_intVal");
        assert_eq!(int_val.ret, TypeTable::INT);

        let append = table.get(ids[4]);
        assert_eq!(append.params.len(), 2);
        assert_eq!(types.signature(append.ret, &interner), "[*");

        let len = table.get(ids[5]);
        assert_eq!(types.signature(len.params[0].ty, &interner), "[*");
    }
}
