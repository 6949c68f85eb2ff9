// src/commands/common.rs
//! Shared utilities for CLI commands.

use crate::errors::render_to_stderr;
use crate::frontend::{Interner, Parser, WellKnown, ast::Program};
use crate::sema::{Analysis, Analyzer};

/// Result of parsing and analyzing a source file.
pub struct AnalyzedProgram {
    pub program: Program,
    pub interner: Interner,
    pub wk: WellKnown,
    pub analysis: Analysis,
}

/// Parse and analyze a source file, rendering any diagnostics on error.
///
/// Returns `Ok(AnalyzedProgram)` on success, or `Err(())` if there were
/// errors (diagnostics are rendered to stderr before returning).
pub fn parse_and_analyze(source: &str, file_path: &str) -> Result<AnalyzedProgram, ()> {
    let parse_span = tracing::info_span!("parse", file = %file_path).entered();
    let mut parser = Parser::new(source);
    let mut program = match parser.parse_program() {
        Ok(program) => program,
        Err(e) => {
            render_to_stderr(e, file_path, source);
            return Err(());
        }
    };
    tracing::debug!(declarations = program.decls.len(), "parsed");
    let (interner, types, wk) = parser.into_parts();
    drop(parse_span);

    let _span = tracing::info_span!("sema", file = %file_path).entered();
    match Analyzer::new(types, &interner, wk).analyze(&mut program) {
        Ok(analysis) => Ok(AnalyzedProgram {
            program,
            interner,
            wk,
            analysis,
        }),
        Err(e) => {
            render_to_stderr(e, file_path, source);
            Err(())
        }
    }
}
