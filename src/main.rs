mod config;
mod exit_code;
mod input;
mod junit;
mod models;
mod parser;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::{Level, debug, error, log_enabled, trace};
use tokio::io::AsyncWriteExt;

use config::Config;

/// Read a plenary.nvim transcript on stdin and write a JUnit report to stdout.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("Converting plenary test output to JUnit XML report: {e:#}");
            ExitCode::from(exit_code::TOOL_FAILURE)
        }
    }
}

async fn run() -> Result<u8> {
    let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(&workspace);

    let lines = input::read_lines(tokio::io::stdin())
        .await
        .context("reading input from stdin")?;
    debug!("read {} lines from stdin", lines.len());

    let conversion = parser::convert(&lines, &config.report);
    let report = conversion.report();
    debug!(
        "suite {:?}: {} tests, {} failures, {} skipped, {} errors",
        report.suite_name, report.tests, report.failures, report.skipped, report.errors
    );
    if log_enabled!(Level::Trace) {
        trace!("report model: {}", serde_json::to_string(report)?);
    }

    let xml = junit::render(report).context("marshalling test suite to XML")?;
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(xml.as_bytes())
        .await
        .context("writing report to stdout")?;
    stdout.flush().await.context("flushing stdout")?;

    Ok(exit_code::for_conversion(&conversion))
}
