// src/commands/run.rs

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::common::parse_and_analyze;
use crate::errors::render_to_stderr;
use crate::runtime::Interpreter;

/// Run a Shrew source file.
pub fn run_file(path: &Path) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let file_path = path.to_string_lossy();

    let Ok(analyzed) = parse_and_analyze(&source, &file_path) else {
        return ExitCode::FAILURE;
    };

    let _span = tracing::info_span!("run", file = %file_path).entered();
    let stdout = std::io::stdout();
    let mut interpreter = Interpreter::new(
        &analyzed.program,
        &analyzed.analysis,
        &analyzed.interner,
        analyzed.wk,
        stdout.lock(),
    );

    match interpreter.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            render_to_stderr(e, &file_path, &source);
            ExitCode::FAILURE
        }
    }
}
