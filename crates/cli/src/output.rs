use crate::error::CliError;
use engine_config::report::summary::RunSummary;

pub async fn write_report(summary: &RunSummary, path: &str) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub fn print_report(summary: &RunSummary) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}

pub async fn report(summary: &RunSummary, output: Option<&str>) -> Result<(), CliError> {
    match output {
        Some(path) => write_report(summary, path).await,
        None => print_report(summary),
    }
}
