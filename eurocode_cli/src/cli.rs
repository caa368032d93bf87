//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "eurocode",
    version,
    about = "EN 1990 load combinations - ELU and ELS from a load table",
    long_about = "Generate the Eurocode 0 load combinations for a table of permanent and\n\
                  variable loads: fundamental ELU plus characteristic, frequent and\n\
                  quasi-permanent ELS."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Settings file (default: ./eurocode.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate combinations from a JSON load table.
    Generate(GenerateArgs),

    /// Generate combinations for the built-in two-load example.
    Demo(OutputArgs),

    /// Print the ψ coefficient table.
    Categories,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// JSON file holding `{ "custom_coefficients": bool, "loads": [...] }`.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Clone, Copy)]
pub struct OutputArgs {
    /// Output format (overrides the settings file).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Show formulas with values instead of load names.
    #[arg(long = "numeric")]
    pub numeric: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from(["eurocode", "generate", "loads.json", "--numeric", "--format", "json"]).unwrap();
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.input, PathBuf::from("loads.json"));
                assert!(args.output.numeric);
                assert_eq!(args.output.format, Some(OutputFormatArg::Json));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["eurocode", "demo", "--config", "site.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        assert!(matches!(cli.command, Command::Demo(_)));
    }
}
