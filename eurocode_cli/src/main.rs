//! # eurocode CLI
//!
//! Generates EN 1990 load combinations from a JSON load table.
//!
//! ## Exit codes
//!
//! - `0`: combinations printed
//! - `1`: unreadable input, bad settings or malformed data
//! - `2`: the load table was refused (e.g. no variable load)

use anyhow::Result;
use clap::Parser;
use eurocode_core::CalcError;

mod cli;
mod commands;
mod config;
mod logging;
mod report;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_categories, run_demo, run_generate};
use crate::config::Config;
use crate::logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => report_error(&error),
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Categories => run_categories(),
        Command::Generate(args) => run_generate(args, &Config::load(cli.config.as_deref())?),
        Command::Demo(args) => run_demo(args, &Config::load(cli.config.as_deref())?),
    }
}

/// Print the error and pick the exit code.
fn report_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CalcError>() {
        Some(calc) if calc.is_user_facing() => {
            eprintln!("{calc}");
            2
        }
        Some(calc) => {
            eprintln!("error: {error:#}");
            if let Ok(json) = serde_json::to_string_pretty(calc) {
                eprintln!("{json}");
            }
            1
        }
        None => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        ..LogConfig::default()
    }
}
