// src/errors/runtime.rs
//! Runtime errors (E3xxx). Each carries the span of the failing node so the
//! source line can be reported.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum RuntimeError {
    #[error("division by zero")]
    #[diagnostic(code(E3001))]
    DivisionByZero {
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("index {index} out of range for array of length {len}")]
    #[diagnostic(code(E3002))]
    IndexOutOfRange {
        index: i64,
        len: usize,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("nil reference")]
    #[diagnostic(code(E3003), help("the value was never initialized"))]
    NilReference {
        #[label("dereferenced here")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E3004))]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        #[label("wrong runtime type")]
        span: SourceSpan,
    },

    #[error("call depth exceeded {limit} frames")]
    #[diagnostic(code(E3005), help("check for unbounded recursion"))]
    StackOverflow {
        limit: usize,
        #[label("while entering this call")]
        span: SourceSpan,
    },

    #[error("undefined variable '{name}'")]
    #[diagnostic(code(E3006))]
    UndefinedVariable {
        name: String,
        #[label("no binding in any frame")]
        span: SourceSpan,
    },

    #[error("output error: {0}")]
    #[diagnostic(code(E3007))]
    Io(#[from] std::io::Error),
}
