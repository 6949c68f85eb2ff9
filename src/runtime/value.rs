// src/runtime/value.rs

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::frontend::{Interner, Symbol};

/// A runtime value. Arrays and structs have reference semantics: bindings
/// share the underlying storage, so mutation through one name is visible
/// through another.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Struct(Rc<RefCell<FxHashMap<Symbol, Value>>>),
    Nil,
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn struct_fields(fields: FxHashMap<Symbol, Value>) -> Value {
        Value::Struct(Rc::new(RefCell::new(fields)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Nil => "None",
        }
    }

    /// Printable form used by `print`, `printn` and `str`. Deterministic:
    /// struct fields render in name order.
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Str(s) => s.clone(),
            Value::Array(items) => {
                let rendered: Vec<String> = items
                    .borrow()
                    .iter()
                    .map(|item| item.render(interner))
                    .collect();
                format!("[{}]", rendered.join(" "))
            }
            Value::Struct(fields) => {
                let fields = fields.borrow();
                let mut names: Vec<Symbol> = fields.keys().copied().collect();
                names.sort_by_key(|sym| interner.resolve(*sym).to_string());
                let rendered: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        format!(
                            "{}: {}",
                            interner.resolve(name),
                            fields[&name].render(interner)
                        )
                    })
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Value::Nil => "None".to_string(),
        }
    }
}
