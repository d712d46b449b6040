//! Polyfunc Probe Binary
//!
//! Run with: `polyfunc-probe [OPTIONS] <COMMAND>`

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use polyfunc::TableConfig;
use polyfunc_probe::{error_origin, explain, grammar, parse_args, report, TableSpec};

#[derive(Parser)]
#[command(name = "polyfunc-probe")]
#[command(about = "Resolve argument lists against a polyfunc dispatch table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one argument list against a table definition
    Resolve {
        /// Table definition file (JSON)
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        /// Arguments as JSON; an array is the argument list (reads stdin if omitted)
        #[arg(value_name = "ARGS_JSON")]
        args: Option<String>,

        /// Also report every binding's verdict
        #[arg(short, long)]
        explain: bool,
    },
    /// List the rule grammar
    Tags,
    /// Print the default table configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Commands::Resolve {
            table,
            args,
            explain,
        } => resolve(table, args.as_deref(), *explain),
        Commands::Tags => {
            for line in grammar() {
                println!("{}", line);
            }
            Ok(())
        }
        Commands::Config => {
            let config = TableConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn resolve(path: &Path, args: Option<&str>, show_verdicts: bool) -> Result<()> {
    debug!("Loading table: {}", path.display());

    let definition = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table file: {}", path.display()))?;
    let spec = TableSpec::from_json_str(&definition)
        .with_context(|| format!("Failed to parse table file: {}", path.display()))?;
    let table = spec.build().map_err(|e| {
        let origin = error_origin(&e);
        anyhow::Error::new(e).context(format!(
            "Invalid {} in table file: {}",
            origin,
            path.display()
        ))
    })?;

    let source = match args {
        Some(args) => args.to_string(),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read arguments from stdin")?;
            source
        }
    };
    let args = parse_args(&source).context("Failed to parse arguments")?;

    if show_verdicts {
        for verdict in explain(&table, &args) {
            println!("{}", verdict);
        }
    }

    let resolution = table.resolve(&args);
    println!("{}", report(&table, &resolution));
    info!(
        "Resolved {} argument(s) against '{}' ({} binding(s))",
        args.len(),
        table.config().name,
        table.len()
    );

    Ok(())
}
