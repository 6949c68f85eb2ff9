// src/commands/check.rs

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::common::parse_and_analyze;

/// Check a Shrew source file for errors without running it.
pub fn check_file(path: &Path) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match parse_and_analyze(&source, &path.to_string_lossy()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
