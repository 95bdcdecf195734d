// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays a clean report)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the report
// 5. Exit with proper code (0 = success, 1 = broken links, 2 = error)
// =============================================================================

mod checker; // src/checker/ - fetching, link extraction, verification
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - defaults and runtime settings
mod crawl; // src/crawl/ - breadth-first website crawling
mod report; // src/report.rs - Markdown / JSON reports
mod scan; // src/scan.rs - the scan and check operations

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::{CheckerConfig, ScanParams};
use report::{CheckReport, ScanReport};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins; otherwise -v flags pick the level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = no broken links
//   Ok(1) = broken links found
//   Err = unexpected error (exit code 2)
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.checker_config();

    match cli.command {
        Commands::Scan {
            url,
            max_depth,
            include_external,
            timeout,
            json,
        } => {
            let params = cli::scan_params(max_depth, include_external, timeout);
            handle_scan(&config, &url, params, json).await
        }
        Commands::Check { urls, json, .. } => handle_check(&config, &urls, json).await,
    }
}

async fn handle_scan(
    config: &CheckerConfig,
    url: &str,
    params: ScanParams,
    json: bool,
) -> Result<i32> {
    tracing::info!(
        url,
        max_depth = params.max_depth,
        include_external = params.include_external,
        "scanning website"
    );

    let output = scan::scan_website_links(config, url, &params).await?;
    let report = ScanReport::assemble(url, params, output);

    print_report(&report, json)?;
    Ok(if report.has_broken() { 1 } else { 0 })
}

async fn handle_check(config: &CheckerConfig, urls: &[String], json: bool) -> Result<i32> {
    tracing::info!(count = urls.len(), "checking links");

    let outcomes = scan::check_specific_links(config, urls, config.timeout).await?;
    let report = CheckReport::new(urls, outcomes);

    print_report(&report, json)?;
    Ok(if report.has_broken() { 1 } else { 0 })
}

// Prints a report either as pretty JSON or as Markdown
fn print_report<R>(report: &R, json: bool) -> Result<()>
where
    R: Serialize + std::fmt::Display,
{
    if json {
        let output = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{output}");
    } else {
        print!("{report}");
    }
    Ok(())
}
