// src/errors/report.rs
//! Rendering utilities for miette diagnostics.

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, Report, ThemeCharacters,
    ThemeStyles,
};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::cli::ColorMode;

/// Global color mode setting (set once at startup)
static COLOR_MODE: AtomicU8 = AtomicU8::new(0); // 0 = Auto, 1 = Always, 2 = Never

/// Set the global color mode (call once at startup)
pub fn set_color_mode(mode: ColorMode) {
    let value = match mode {
        ColorMode::Auto => 0,
        ColorMode::Always => 1,
        ColorMode::Never => 2,
    };
    COLOR_MODE.store(value, Ordering::SeqCst);
}

fn should_use_color() -> bool {
    match COLOR_MODE.load(Ordering::SeqCst) {
        1 => true,
        2 => false,
        _ => std::io::stderr().is_terminal(),
    }
}

fn terminal_handler() -> GraphicalReportHandler {
    let styles = if should_use_color() {
        ThemeStyles::ansi()
    } else {
        ThemeStyles::none()
    };
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles,
    };
    GraphicalReportHandler::new_themed(theme)
}

fn plain_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Attach the source text to a diagnostic and render it to stderr.
pub fn render_to_stderr<E>(err: E, file: &str, source: &str)
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report =
        Report::new(err).with_source_code(NamedSource::new(file, source.to_string()));
    let handler = terminal_handler();
    let mut output = String::new();
    if handler.render_report(&mut output, report.as_ref()).is_ok() {
        eprint!("{}", output);
    }
}

/// Render without colors, ascii only. Deterministic output for tests.
pub fn render_to_string<E>(err: E, file: &str, source: &str) -> String
where
    E: Diagnostic + Send + Sync + 'static,
{
    let report =
        Report::new(err).with_source_code(NamedSource::new(file, source.to_string()));
    let handler = plain_handler();
    let mut output = String::new();
    let _ = handler.render_report(&mut output, report.as_ref());
    output
}
