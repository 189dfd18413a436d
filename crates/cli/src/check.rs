//! `stockcheck run|analyze|validate`: load CSVs, reconcile, render and export.

use std::path::{Path, PathBuf};

use clap::Args;

use stockcheck_recon::load::{load_events, load_products, read_source};
use stockcheck_recon::config::EventSourceConfig;
use stockcheck_recon::model::{EventSource, StockEvent, StockInput};
use stockcheck_recon::{StockConfig, StockError};

use crate::exit_codes::EXIT_FINDINGS;
use crate::export::write_summary_file;
use crate::render::{render_report, RenderOptions};
use crate::CliError;

#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Print the JSON report to stdout instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Summary CSV path (overrides the config's output.summary_csv)
    #[arg(long, short = 'o', value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Also write the JSON report to this file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Include the serial ledger in the text report
    #[arg(long)]
    pub serials: bool,

    /// Exit with code 3 when any integrity finding is present
    #[arg(long)]
    pub strict: bool,

    /// Suppress the report on stdout (files are still written)
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

fn read_config(config_path: &Path) -> Result<StockConfig, CliError> {
    let config_str = read_source(config_path).map_err(load_err)?;
    StockConfig::from_toml(&config_str).map_err(|e| CliError::config(e.to_string()))
}

fn load_err(e: StockError) -> CliError {
    let err = CliError::runtime(e.to_string());
    match e {
        StockError::MissingColumn { source, .. } => {
            err.with_hint(format!("set the header name under [{source}.columns] in the config"))
        }
        _ => err,
    }
}

fn read_csv(path: &Path) -> Result<String, CliError> {
    read_source(path).map_err(load_err)
}

/// Load all three tables, resolving file names against `base_dir`.
fn load_input(config: &StockConfig, base_dir: &Path) -> Result<StockInput, CliError> {
    let products_csv = read_csv(&base_dir.join(&config.products.file))?;
    let products = load_products(&products_csv, &config.products.columns)
        .map_err(load_err)?;

    let stock_in = load_event_file(EventSource::StockIn, &config.stock_in, base_dir)?;
    let stock_out = load_event_file(EventSource::StockOut, &config.stock_out, base_dir)?;

    Ok(StockInput { products, stock_in, stock_out })
}

fn load_event_file(
    source: EventSource,
    cfg: &EventSourceConfig,
    base_dir: &Path,
) -> Result<Vec<StockEvent>, CliError> {
    let csv_data = read_csv(&base_dir.join(&cfg.file))?;
    load_events(source, &csv_data, &cfg.columns).map_err(load_err)
}

pub fn cmd_run(config_path: PathBuf, opts: OutputArgs) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    execute(&config, base_dir, &opts)
}

pub fn cmd_analyze(
    products: PathBuf,
    stock_in: PathBuf,
    stock_out: PathBuf,
    opts: OutputArgs,
) -> Result<(), CliError> {
    let config = StockConfig::with_files(
        &products.to_string_lossy(),
        &stock_in.to_string_lossy(),
        &stock_out.to_string_lossy(),
    );
    execute(&config, Path::new("."), &opts)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "config ok: {} (products: {}, stock_in: {}, stock_out: {})",
        config.name, config.products.file, config.stock_in.file, config.stock_out.file
    );
    Ok(())
}

fn execute(config: &StockConfig, base_dir: &Path, opts: &OutputArgs) -> Result<(), CliError> {
    let input = load_input(config, base_dir)?;
    let report = stockcheck_recon::run(config, &input);

    let json_str = if opts.json || opts.json_output.is_some() || config.output.json.is_some() {
        Some(
            serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?,
        )
    } else {
        None
    };

    if !opts.quiet {
        match (&json_str, opts.json) {
            (Some(json), true) => println!("{json}"),
            _ => {
                let text = render_report(
                    &report,
                    &RenderOptions {
                        sample_limit: config.report.sample_limit,
                        show_serials: opts.serials,
                    },
                );
                print!("{text}");
            }
        }
    }

    let csv_path = opts
        .output
        .clone()
        .unwrap_or_else(|| base_dir.join(&config.output.summary_csv));
    write_summary_file(&csv_path, &report.summaries)?;
    eprintln!("wrote {}", csv_path.display());

    let json_path = opts
        .json_output
        .clone()
        .or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let (Some(path), Some(json)) = (json_path, &json_str) {
        std::fs::write(&path, json)
            .map_err(|e| CliError::runtime(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    let t = &report.totals;
    eprintln!(
        "{} products: {} normal, {} low/out of stock, {} anomalous; {} integrity findings",
        t.total_products,
        t.normal,
        t.warning,
        t.critical,
        report.integrity.len()
    );

    if opts.strict && !report.integrity.is_empty() {
        return Err(CliError {
            code: EXIT_FINDINGS,
            message: format!("{} integrity findings", report.integrity.len()),
            hint: Some("rerun without --strict to accept the findings".into()),
        });
    }
    Ok(())
}
