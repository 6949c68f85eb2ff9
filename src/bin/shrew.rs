// src/bin/shrew.rs

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use shrew::cli::Cli;
use shrew::commands::check::check_file;
use shrew::commands::run::run_file;
use shrew::errors::set_color_mode;

fn main() -> ExitCode {
    // Opt-in tracing via SHREW_LOG (env-filter syntax)
    if let Ok(filter) = EnvFilter::try_from_env("SHREW_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
        tracing::debug!("tracing initialized");
    }

    let cli = Cli::parse();
    set_color_mode(cli.color);

    let Some(file) = cli.file else {
        // no source file: usage on stdout, successful exit
        let mut command = Cli::command();
        let _ = command.print_help();
        return ExitCode::SUCCESS;
    };

    if cli.check {
        check_file(&file)
    } else {
        run_file(&file)
    }
}
