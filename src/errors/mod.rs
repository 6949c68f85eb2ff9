// src/errors/mod.rs
//! Structured diagnostics for the Shrew interpreter, one enum per phase:
//! lexer (E0xxx), parser (E1xxx), semantic analysis (E2xxx), runtime (E3xxx).

pub mod lexer;
pub mod parser;
pub mod report;
pub mod runtime;
pub mod sema;

pub use lexer::LexerError;
pub use parser::ParserError;
pub use report::{render_to_stderr, render_to_string, set_color_mode};
pub use runtime::RuntimeError;
pub use sema::SemanticError;
