use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use connectors::{adapter::connection_source, sql::mysql::source::redact_url};
use engine_config::{report::summary::RunSummary, settings::JobConfig};
use engine_runtime::{
    error::TransferError,
    execution::{export::ExportExecutor, import::ImportExecutor},
};
use model::execution::modes::DdlMode;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "batch-transfer", version = "0.1.0", about = "Bulk import/export between flat files and MySQL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { config, output } => {
            let job = JobConfig::from_file(Path::new(&config))?;
            let source = connection_source(&job.url)?;
            let result = ImportExecutor::new(job, source)?.execute().await;
            finish(result, output.as_deref()).await?;
        }
        Commands::Export { config, output } => {
            let job = JobConfig::from_file(Path::new(&config))?;
            let source = connection_source(&job.url)?;
            let result = ExportExecutor::from_config(job, source)?.execute().await;
            finish(result, output.as_deref()).await?;
        }
        Commands::Ddl { config } => {
            let mut job = JobConfig::from_file(Path::new(&config))?;
            job.import.ddl_mode = DdlMode::DdlOnly;
            let source = connection_source(&job.url)?;
            let result = ImportExecutor::new(job, source)?.execute().await;
            finish(result, None).await?;
        }
        Commands::TestConn { url } => {
            let source = connection_source(&url)?;
            let mut conn = source.connect().await?;
            let tables = conn.list_tables().await?;
            drop(conn);
            source.shutdown().await?;
            info!(url = %redact_url(&url), tables = tables.len(), "Connection OK");
            println!("{}", serde_json::to_string_pretty(&tables)?);
        }
    }

    Ok(())
}

/// Prints the summary, including the partial one of a failed run, then hands
/// the failure back so the process exits non-zero.
async fn finish(
    result: Result<RunSummary, TransferError>,
    output: Option<&str>,
) -> Result<(), CliError> {
    match result {
        Ok(summary) => output::report(&summary, output).await,
        Err(err) => {
            if let Some(summary) = err.summary() {
                output::report(summary, output).await?;
            }
            Err(err.into())
        }
    }
}
