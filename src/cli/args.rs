// src/cli/args.rs

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Color output mode
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Shrew programming language interpreter
#[derive(Parser)]
#[command(name = "shrew")]
#[command(version = "0.1.0")]
#[command(about = "Shrew programming language", long_about = None)]
pub struct Cli {
    /// Path to the .shrew source file to execute
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Parse and analyze without executing
    #[arg(long)]
    pub check: bool,

    /// Color output: auto, always, never
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}
