use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eurocode_core::loads::{generate_with, CombinationSet, FormulaStyle, Load, LoadRegistry, LoadTable};
use serde::Serialize;
use tracing::info;

use crate::cli::{GenerateArgs, OutputArgs, OutputFormatArg};
use crate::config::{Config, OutputFormat};
use crate::report::{categories_table, combinations_table, governing_lines, loads_table};

/// JSON export: the load table next to the combinations built from it.
#[derive(Serialize)]
struct Export<'a> {
    loads: &'a [Load],
    #[serde(flatten)]
    combinations: &'a CombinationSet,
}

pub fn run_generate(args: &GenerateArgs, config: &Config) -> Result<()> {
    let registry = read_load_table(&args.input)?;
    info!(path = %args.input.display(), loads = registry.len(), "load table read");
    run_registry(&registry, &args.output, config)
}

pub fn run_demo(args: &OutputArgs, config: &Config) -> Result<()> {
    run_registry(&LoadRegistry::with_seed_data(), args, config)
}

pub fn run_categories() -> Result<()> {
    println!("{}", categories_table());
    Ok(())
}

pub fn read_load_table(path: &Path) -> Result<LoadRegistry> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let table: LoadTable =
        serde_json::from_str(&content).with_context(|| format!("{} is not a valid load table", path.display()))?;
    Ok(LoadRegistry::from_table(table)?)
}

fn run_registry(registry: &LoadRegistry, output: &OutputArgs, config: &Config) -> Result<()> {
    let set = generate_with(&registry.snapshot(), &config.generation_settings())?;

    let format = match output.format {
        Some(OutputFormatArg::Table) => OutputFormat::Table,
        Some(OutputFormatArg::Json) => OutputFormat::Json,
        None => config.output,
    };
    match format {
        OutputFormat::Json => println!("{}", export_json(registry, &set)?),
        OutputFormat::Table => {
            let style = if output.numeric { FormulaStyle::Numeric } else { FormulaStyle::Symbolic };
            println!("{}", loads_table(registry, set.settings.significant_digits));
            println!("{}", combinations_table(&set, style));
            for line in governing_lines(&set) {
                println!("{line}");
            }
            for warning in registry.out_of_range_coefficients() {
                println!("note: {warning}");
            }
        }
    }
    Ok(())
}

fn export_json(registry: &LoadRegistry, set: &CombinationSet) -> Result<String> {
    let export = Export {
        loads: registry.loads(),
        combinations: set,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
