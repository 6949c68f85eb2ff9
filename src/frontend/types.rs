// src/frontend/types.rs

use rustc_hash::FxHashMap;

use crate::frontend::{Interner, Span, Symbol};

/// Arena index of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Int,
    Str,
    Void,
    Any,
}

/// Field of a struct type
#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeId,
}

#[derive(Debug, Clone)]
pub enum TypeData {
    Prim(Primitive),
    Array {
        elem: TypeId,
    },
    Struct {
        name: Symbol,
        fields: Vec<Field>,
    },
    /// Placeholder for a named type that is not defined yet. `resolved` is
    /// patched in place, either by a later `type` definition or by the
    /// analyzer's resolution pass.
    Undef {
        name: Symbol,
        resolved: Option<TypeId>,
        span: Span,
    },
}

/// Arena of types plus the name table user `type` definitions populate.
///
/// The table is created by the parser (primitives pre-seeded), completed by
/// the analyzer's resolution pass, and read by the interpreter. It travels
/// through the pipeline as a value; nothing global.
#[derive(Debug)]
pub struct TypeTable {
    types: Vec<TypeData>,
    by_name: FxHashMap<Symbol, TypeId>,
}

impl TypeTable {
    pub const INT: TypeId = TypeId(0);
    pub const STRING: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    pub const ANY: TypeId = TypeId(3);

    pub fn new(interner: &mut Interner) -> Self {
        let types = vec![
            TypeData::Prim(Primitive::Int),
            TypeData::Prim(Primitive::Str),
            TypeData::Prim(Primitive::Void),
            TypeData::Prim(Primitive::Any),
        ];
        let mut by_name = FxHashMap::default();
        by_name.insert(interner.intern("int"), Self::INT);
        by_name.insert(interner.intern("string"), Self::STRING);
        by_name.insert(interner.intern("void"), Self::VOID);
        by_name.insert(interner.intern("any"), Self::ANY);
        Self { types, by_name }
    }

    pub fn alloc(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(data);
        id
    }

    pub fn array_of(&mut self, elem: TypeId) -> TypeId {
        self.alloc(TypeData::Array { elem })
    }

    /// Allocate an unresolved placeholder and register it under its name so
    /// later references share it.
    pub fn undef(&mut self, name: Symbol, span: Span) -> TypeId {
        let id = self.alloc(TypeData::Undef {
            name,
            resolved: None,
            span,
        });
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeData {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.0 as usize]
    }

    pub fn lookup(&self, name: Symbol) -> Option<TypeId> {
        self.by_name.get(&name).copied()
    }

    pub fn insert_name(&mut self, name: Symbol, id: TypeId) {
        self.by_name.insert(name, id);
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len() as u32).map(TypeId)
    }

    /// Chase `Undef.resolved` links to the underlying type. Unresolved
    /// placeholders are returned as-is.
    pub fn resolved(&self, id: TypeId) -> TypeId {
        let mut cur = id;
        while let TypeData::Undef {
            resolved: Some(next),
            ..
        } = self.get(cur)
        {
            cur = *next;
        }
        cur
    }

    /// Compact signature used for type comparison: `I`, `S`, `V`, `*`,
    /// `[` + elem for arrays, `sName;` for structs, `?Name;` when unresolved.
    pub fn signature(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            TypeData::Prim(Primitive::Int) => "I".to_string(),
            TypeData::Prim(Primitive::Str) => "S".to_string(),
            TypeData::Prim(Primitive::Void) => "V".to_string(),
            TypeData::Prim(Primitive::Any) => "*".to_string(),
            TypeData::Array { elem } => format!("[{}", self.signature(*elem, interner)),
            TypeData::Struct { name, .. } => format!("s{};", interner.resolve(*name)),
            TypeData::Undef { name, resolved, .. } => match resolved {
                Some(target) => self.signature(*target, interner),
                None => format!("?{};", interner.resolve(*name)),
            },
        }
    }

    /// Human-readable form for diagnostics
    pub fn describe(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            TypeData::Prim(Primitive::Int) => "int".to_string(),
            TypeData::Prim(Primitive::Str) => "string".to_string(),
            TypeData::Prim(Primitive::Void) => "void".to_string(),
            TypeData::Prim(Primitive::Any) => "any".to_string(),
            TypeData::Array { elem } => format!("[]{}", self.describe(*elem, interner)),
            TypeData::Struct { name, .. } => format!("struct {}", interner.resolve(*name)),
            TypeData::Undef { name, resolved, .. } => match resolved {
                Some(target) => self.describe(*target, interner),
                None => format!("undefined type {}", interner.resolve(*name)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Interner;

    #[test]
    fn primitive_signatures() {
        let mut interner = Interner::new();
        let table = TypeTable::new(&mut interner);
        assert_eq!(table.signature(TypeTable::INT, &interner), "I");
        assert_eq!(table.signature(TypeTable::STRING, &interner), "S");
        assert_eq!(table.signature(TypeTable::VOID, &interner), "V");
        assert_eq!(table.signature(TypeTable::ANY, &interner), "*");
    }

    #[test]
    fn array_and_struct_signatures() {
        let mut interner = Interner::new();
        let mut table = TypeTable::new(&mut interner);

        let arr = table.array_of(TypeTable::INT);
        let nested = table.array_of(arr);
        assert_eq!(table.signature(nested, &interner), "[[I");

        let name = interner.intern("Point");
        let st = table.alloc(TypeData::Struct {
            name,
            fields: vec![],
        });
        assert_eq!(table.signature(st, &interner), "sPoint;");

        let arr_of_struct = table.array_of(st);
        assert_eq!(table.signature(arr_of_struct, &interner), "[sPoint;");
    }

    #[test]
    fn undef_signature_follows_resolution() {
        let mut interner = Interner::new();
        let mut table = TypeTable::new(&mut interner);

        let name = interner.intern("Alias");
        let undef = table.undef(name, Span::default());
        assert_eq!(table.signature(undef, &interner), "?Alias;");

        if let TypeData::Undef { resolved, .. } = table.get_mut(undef) {
            *resolved = Some(TypeTable::INT);
        }
        assert_eq!(table.signature(undef, &interner), "I");
        assert_eq!(table.resolved(undef), TypeTable::INT);
    }

    #[test]
    fn lookup_finds_registered_placeholder() {
        let mut interner = Interner::new();
        let mut table = TypeTable::new(&mut interner);

        let name = interner.intern("T");
        assert!(table.lookup(name).is_none());
        let id = table.undef(name, Span::default());
        assert_eq!(table.lookup(name), Some(id));
    }
}
