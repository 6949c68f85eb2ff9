// src/errors/lexer.rs
//! Lexer errors (E0xxx).

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LexerError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(E0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(E0002), help("add a closing '\"' to terminate the string"))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("unknown operator sequence '{found}'")]
    #[diagnostic(code(E0003), help("'&' and '|' only occur as '&&' and '||'"))]
    UnknownSequence {
        found: String,
        #[label("incomplete operator")]
        span: SourceSpan,
    },
}
