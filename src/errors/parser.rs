// src/errors/parser.rs
//! Parser errors (E1xxx). Lexical failures surface here as well: the lexer
//! reports through the parser boundary.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::errors::LexerError;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexer(#[from] LexerError),

    #[error("expected {expected}, found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("expected expression, found '{found}'")]
    #[diagnostic(code(E1002))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("unexpected token '{token}'")]
    #[diagnostic(code(E1003))]
    UnexpectedToken {
        token: String,
        #[label("unexpected")]
        span: SourceSpan,
    },

    #[error("expected type")]
    #[diagnostic(code(E1004))]
    ExpectedType {
        #[label("expected a type here")]
        span: SourceSpan,
    },

    #[error("missing ';' between statements on the same line")]
    #[diagnostic(code(E1005), help("separate statements with ';' or a newline"))]
    MissingSeparator {
        #[label("statement starts here")]
        span: SourceSpan,
    },

    #[error("duplicate definition of type '{name}'")]
    #[diagnostic(code(E1006))]
    DuplicateType {
        name: String,
        #[label("already defined")]
        span: SourceSpan,
    },

    #[error("duplicate field '{name}' in struct")]
    #[diagnostic(code(E1007))]
    DuplicateField {
        name: String,
        #[label("field repeats an earlier name")]
        span: SourceSpan,
    },

    #[error("integer literal out of range")]
    #[diagnostic(code(E1008))]
    InvalidIntLiteral {
        #[label("does not fit in 64 bits")]
        span: SourceSpan,
    },
}
