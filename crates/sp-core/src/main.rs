//! sales-pipeline: batch cleaning, aggregation, and outlier split for sales
//! records.

use clap::{Args, Parser, Subcommand};
use sp_common::{OutputFormat, SCHEMA_VERSION};
use sp_config::{resolve_settings, LogFormat, Overrides, ResolvedSettings};
use sp_core::exit_codes::ExitCode;
use sp_core::logging::init_tracing;
use sp_core::query_cli::{run_query, QueryArgs};
use std::path::PathBuf;
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[command(name = "sales-pipeline", version, about)]
struct Cli {
    /// Log encoding on stderr (text or json)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full batch and replace every store
    Run(RunArgs),
    /// Read persisted stores
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input CSV file
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Config file (default: <config_dir>/sales_pipeline/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Summary format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    let code = match &cli.command {
        Commands::Run(args) => run_command(&cli, args),
        Commands::Query(args) => query_command(&cli, args),
    };
    std::process::exit(code.as_i32());
}

/// Resolve settings and install logging. Logging falls back to defaults when
/// resolution fails so the failure itself is still reported.
fn setup(cli: &Cli, overrides: Overrides) -> Result<ResolvedSettings, ExitCode> {
    match resolve_settings(&overrides) {
        Ok(resolved) => {
            let logging = &resolved.settings.logging;
            init_tracing(logging.format, &logging.filter, cli.verbose);
            debug!(
                config_file = ?resolved.config_file,
                input_source = ?resolved.input_source,
                database_source = ?resolved.database_source,
                "resolved settings"
            );
            Ok(resolved)
        }
        Err(e) => {
            init_tracing(cli.log_format.unwrap_or_default(), "info", cli.verbose);
            let err = sp_common::Error::from(e);
            error!(error = %err, "configuration rejected");
            eprintln!("Error: {err}");
            Err(ExitCode::for_error(&err))
        }
    }
}

fn run_command(cli: &Cli, args: &RunArgs) -> ExitCode {
    let overrides = Overrides {
        config: args.config.clone(),
        input: args.input.clone(),
        database: args.database.clone(),
        log_format: cli.log_format,
    };
    let resolved = match setup(cli, overrides) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };

    match sp_core::run(&resolved.settings) {
        Ok(summary) => {
            match args.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "generated_at": chrono::Utc::now().to_rfc3339(),
                        "command": "run",
                        "summary": summary,
                    });
                    match serde_json::to_string_pretty(&output) {
                        Ok(text) => println!("{text}"),
                        Err(e) => {
                            eprintln!("Failed to serialize: {e}");
                            return ExitCode::InternalError;
                        }
                    }
                }
                OutputFormat::Text => print!("{}", summary.render_text()),
            }
            ExitCode::Clean
        }
        Err(err) => {
            let code = ExitCode::for_error(&err);
            error!(error = %err, code = err.code(), "run failed");
            match args.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "command": "run",
                        "error": {
                            "code": err.code(),
                            "message": err.to_string(),
                            "store": err.store(),
                        },
                    });
                    println!("{output}");
                }
                OutputFormat::Text => eprintln!("Error: {err}"),
            }
            code
        }
    }
}

fn query_command(cli: &Cli, args: &QueryArgs) -> ExitCode {
    let overrides = Overrides {
        config: args.config.clone(),
        database: args.database.clone(),
        log_format: cli.log_format,
        ..Default::default()
    };
    match setup(cli, overrides) {
        Ok(resolved) => run_query(&resolved.settings.database, &args.command),
        Err(code) => code,
    }
}
