// src/runtime/builtins.rs
//! Built-in function implementations.
//!
//! Arguments reach a built-in the same way they reach a user function: bound
//! into the freshly pushed frame under the declared parameter names. Each
//! implementation reads them back from there.

use std::io::Write;

use crate::errors::RuntimeError;
use crate::frontend::{Span, Symbol};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::value::Value;
use crate::sema::Builtin;

impl<W: Write> Interpreter<'_, W> {
    pub(super) fn call_builtin(
        &mut self,
        builtin: Builtin,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Print => self.builtin_print(span, false),
            Builtin::Printn => self.builtin_print(span, true),
            Builtin::Str => self.builtin_str(span),
            Builtin::IntVal => self.builtin_int_val(span),
            Builtin::Append => self.builtin_append(span),
            Builtin::Len => self.builtin_len(span),
        }
    }

    /// Writes the format value as-is; there is no format-string
    /// interpolation, extra variadic arguments are ignored.
    fn builtin_print(&mut self, span: Span, newline: bool) -> Result<Value, RuntimeError> {
        let format = self.builtin_arg(self.wk().format, span)?;
        let rendered = format.render(self.interner());
        if newline {
            writeln!(self.out(), "{}", rendered)?;
            self.out().flush()?;
        } else {
            write!(self.out(), "{}", rendered)?;
        }
        Ok(Value::Nil)
    }

    fn builtin_str(&mut self, span: Span) -> Result<Value, RuntimeError> {
        let value = self.builtin_arg(self.wk().val, span)?;
        Ok(Value::Str(value.render(self.interner())))
    }

    /// Ints pass through; strings parse as decimal with 0 on failure
    fn builtin_int_val(&mut self, span: Span) -> Result<Value, RuntimeError> {
        let value = self.builtin_arg(self.wk().val, span)?;
        match value {
            Value::Int(v) => Ok(Value::Int(v)),
            Value::Str(s) => Ok(Value::Int(s.trim().parse::<i64>().unwrap_or(0))),
            other => Err(RuntimeError::TypeMismatch {
                expected: "int or string",
                found: other.type_name(),
                span: span.into(),
            }),
        }
    }

    /// Returns a fresh array; the argument is never mutated
    fn builtin_append(&mut self, span: Span) -> Result<Value, RuntimeError> {
        let arr = self.builtin_arg(self.wk().arr, span)?;
        let elem = self.builtin_arg(self.wk().elem, span)?;
        match arr {
            Value::Array(items) => {
                let mut extended = items.borrow().clone();
                extended.push(elem);
                Ok(Value::array(extended))
            }
            Value::Nil => Err(RuntimeError::NilReference { span: span.into() }),
            other => Err(RuntimeError::TypeMismatch {
                expected: "array",
                found: other.type_name(),
                span: span.into(),
            }),
        }
    }

    fn builtin_len(&mut self, span: Span) -> Result<Value, RuntimeError> {
        let arr = self.builtin_arg(self.wk().arr, span)?;
        match arr {
            Value::Array(items) => Ok(Value::Int(items.borrow().len() as i64)),
            Value::Nil => Err(RuntimeError::NilReference { span: span.into() }),
            other => Err(RuntimeError::TypeMismatch {
                expected: "array",
                found: other.type_name(),
                span: span.into(),
            }),
        }
    }

    /// Read a bound parameter from the call frame
    fn builtin_arg(&self, name: Symbol, span: Span) -> Result<Value, RuntimeError> {
        match self.current_frame().get(name) {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::UndefinedVariable {
                name: self.interner().resolve(name).to_string(),
                span: span.into(),
            }),
        }
    }
}
