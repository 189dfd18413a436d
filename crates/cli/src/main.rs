// stockcheck CLI - stock ledger reconciliation from CSV exports

mod check;
mod exit_codes;
mod export;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use check::OutputArgs;
use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "stockcheck")]
#[command(about = "Reconcile a product catalog against stock-in and stock-out records")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  stockcheck run stock.toml
  stockcheck run stock.toml --json > report.json
  stockcheck run stock.toml --output out/summary.csv --serials
  stockcheck run stock.toml --strict -q")]
    Run {
        /// Path to the config file; CSV paths inside it resolve against its directory
        #[arg(env = "STOCKCHECK_CONFIG")]
        config: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run reconciliation on three CSV files using the default column names
    #[command(after_help = "\
Examples:
  stockcheck analyze --products products.csv --stock-in in.csv --stock-out out.csv")]
    Analyze {
        /// Product catalog CSV
        #[arg(long, value_name = "CSV")]
        products: PathBuf,

        /// Stock-in log CSV
        #[arg(long, value_name = "CSV")]
        stock_in: PathBuf,

        /// Stock-out log CSV
        #[arg(long, value_name = "CSV")]
        stock_out: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Validate a config file without running
    Validate {
        #[arg(env = "STOCKCHECK_CONFIG")]
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::from(EXIT_SUCCESS),
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, output } => check::cmd_run(config, output),
        Commands::Analyze { products, stock_in, stock_out, output } => {
            check::cmd_analyze(products, stock_in, stock_out, output)
        }
        Commands::Validate { config } => check::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}
