// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("unresolved type '{name}'")]
    #[diagnostic(code(E2001), help("add a 'type {name} ...' definition"))]
    UnresolvedType {
        name: String,
        #[label("referenced here")]
        span: SourceSpan,
    },

    #[error("duplicate symbol '{name}'")]
    #[diagnostic(code(E2002))]
    DuplicateSymbol {
        name: String,
        #[label("already declared in this scope")]
        span: SourceSpan,
    },

    #[error("undefined variable '{name}'")]
    #[diagnostic(code(E2003))]
    UndefinedVariable {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("undefined function '{name}'")]
    #[diagnostic(code(E2004))]
    UndefinedFunction {
        name: String,
        #[label("no such function")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a function")]
    #[diagnostic(code(E2005))]
    NotAFunction {
        name: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a variable")]
    #[diagnostic(code(E2006))]
    NotAVariable {
        name: String,
        #[label("used as a value here")]
        span: SourceSpan,
    },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(E2007))]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("argument {index} expects {expected}, found {found}")]
    #[diagnostic(code(E2008))]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        found: String,
        #[label("incompatible argument")]
        span: SourceSpan,
    },

    #[error("cannot assign {found} to {expected}")]
    #[diagnostic(code(E2009))]
    AssignTypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("function '{name}' returns {expected}, body produces {found}")]
    #[diagnostic(code(E2010))]
    ReturnTypeMismatch {
        name: String,
        expected: String,
        found: String,
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("branches return different types: {first} and {second}")]
    #[diagnostic(code(E2011))]
    BranchTypeMismatch {
        first: String,
        second: String,
        #[label("in this conditional")]
        span: SourceSpan,
    },

    #[error("break outside of a while loop")]
    #[diagnostic(code(E2012))]
    InvalidBreak {
        #[label("not inside a loop")]
        span: SourceSpan,
    },

    #[error("operator '{op}' is not defined on {ty}")]
    #[diagnostic(code(E2013))]
    InvalidBinaryOperand {
        op: String,
        ty: String,
        #[label("invalid operand type")]
        span: SourceSpan,
    },

    #[error("incompatible operand types: {left} {op} {right}")]
    #[diagnostic(code(E2014))]
    BinaryTypeMismatch {
        op: String,
        left: String,
        right: String,
        #[label("operands disagree")]
        span: SourceSpan,
    },

    #[error("unary '{op}' requires int, found {ty}")]
    #[diagnostic(code(E2015))]
    InvalidUnaryOperand {
        op: String,
        ty: String,
        #[label("invalid operand type")]
        span: SourceSpan,
    },

    #[error("condition must be int or string, found {ty}")]
    #[diagnostic(code(E2016))]
    InvalidCondition {
        ty: String,
        #[label("cannot be used as a condition")]
        span: SourceSpan,
    },

    #[error("cannot 'new' primitive type {ty}")]
    #[diagnostic(code(E2017), help("'new' creates arrays and structs"))]
    NewOnPrimitive {
        ty: String,
        #[label("primitive type")]
        span: SourceSpan,
    },

    #[error("struct {name} has no field '{field}'")]
    #[diagnostic(code(E2018))]
    NoSuchField {
        name: String,
        field: String,
        #[label("unknown field")]
        span: SourceSpan,
    },

    #[error("field access on non-struct type {ty}")]
    #[diagnostic(code(E2019))]
    NotAStruct {
        ty: String,
        #[label("'.' needs a struct")]
        span: SourceSpan,
    },

    #[error("indexing on non-array type {ty}")]
    #[diagnostic(code(E2020))]
    NotAnArray {
        ty: String,
        #[label("'[]' needs an array")]
        span: SourceSpan,
    },

    #[error("array index must be int, found {ty}")]
    #[diagnostic(code(E2021))]
    IndexNotInt {
        ty: String,
        #[label("non-integer index")]
        span: SourceSpan,
    },

    #[error("function 'main' is not defined")]
    #[diagnostic(code(E2022))]
    MissingMain,

    #[error("'main' must not take parameters")]
    #[diagnostic(code(E2023))]
    MainHasParams {
        #[label("parameters declared here")]
        span: SourceSpan,
    },

    #[error("'main' is not a function")]
    #[diagnostic(code(E2024))]
    MainNotAFunction,
}
