//! # quebra: Breakage Ledger Command Line
//!
//! ```text
//! quebra [--config PATH] [--json] [--verbose] <command>
//!
//!   record    add | edit | delete | purge | list
//!   price     set | edit | delete | list
//!   import    <FILE> --filial --mes --ano
//!   report    --inicio --fim [--filial ..] [--produto ..] [--csv | --xlsx]
//!   dashboard [--ano] [--filial ..] [--produto ..] [--medida ..]
//! ```
//!
//! Results go to stdout, warnings to stderr prefixed `aviso:`. A failed
//! command prints `erro [kind]: message` and exits with a code per kind.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use quebra_store::{AppState, ErrorKind, StoreConfig, StoreError};
use serde::Serialize;
use tracing::{debug, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::{DashboardArgs, ImportArgs, PriceCommands, RecordCommands, ReportArgs};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "quebra", about = "Inventory breakage ledger and monthly dashboard", version)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Configuration file (default: user config dir)")]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Log debug details to stderr"
    )]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Breakage records
    #[command(subcommand)]
    Record(RecordCommands),
    /// Price catalog
    #[command(subcommand)]
    Price(PriceCommands),
    /// Import a monthly breakage spreadsheet
    Import(ImportArgs),
    /// Filtered ledger report
    Report(ReportArgs),
    /// Branch x month dashboard for one year
    Dashboard(DashboardArgs),
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = store_error_kind(&err);
            report_error(&err, kind, json);
            ExitCode::from(exit_code(kind))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = StoreConfig::load(cli.config.clone()).context("failed to load configuration")?;
    debug!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let mut state = AppState::open(config)?;

    match cli.command {
        Commands::Record(command) => commands::record::handle(&mut state, command, cli.json),
        Commands::Price(command) => commands::price::handle(&mut state, command, cli.json),
        Commands::Import(args) => commands::import::handle(&mut state, args, cli.json),
        Commands::Report(args) => commands::report::handle_report(&state, args, cli.json),
        Commands::Dashboard(args) => commands::report::handle_dashboard(&state, args, cli.json),
    }
}

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` wins over `--verbose` when set.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(verbose));
    build_subscriber(filter).init();
}

/// Level used when `RUST_LOG` is unset.
fn fallback_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

fn build_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}

// =============================================================================
// Error Reporting
// =============================================================================

/// JSON shape of a failed command.
#[derive(Debug, Serialize)]
struct CliError {
    code: String,
    message: String,
}

fn store_error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<StoreError>())
        .map(StoreError::kind)
}

fn report_error(err: &anyhow::Error, kind: Option<ErrorKind>, json: bool) {
    let code = kind.map_or_else(|| "internal".to_string(), |kind| kind.to_string());
    let message = format!("{err:#}");

    if json {
        let body = CliError { code, message };
        match serde_json::to_string_pretty(&body) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => eprintln!("erro [{}]: {}", body.code, body.message),
        }
    } else {
        eprintln!("erro [{code}]: {message}");
    }
}

fn exit_code(kind: Option<ErrorKind>) -> u8 {
    match kind {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::Schema) => 3,
        Some(ErrorKind::NotFound) => 4,
        Some(ErrorKind::Persistence) => 5,
        Some(ErrorKind::Config) => 6,
        None => 1,
    }
}
