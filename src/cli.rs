// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands map onto the two operations in scan.rs:
// - scan:  crawl a website and check every link found
// - check: check a list of URLs directly
//
// Options that tune the HTTP client (user agent, concurrency) are global and
// may appear before or after the subcommand.
// =============================================================================

use clap::{ArgAction, Parser, Subcommand};
use std::time::Duration;

use crate::config::{
    CheckerConfig, ScanParams, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

#[derive(Parser, Debug)]
#[command(
    name = "link-sentry",
    version,
    about = "Crawl a website and report broken links",
    long_about = "link-sentry crawls a website breadth-first, collects every hyperlink and \
                  embedded resource it can reach within a depth limit, and checks each one. \
                  Broken links are reported together with the pages they were found on."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// User agent sent with every request
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum number of link checks in flight at once
    #[arg(long, global = true, default_value_t = DEFAULT_CONCURRENCY_LIMIT)]
    pub concurrency: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and check every link found
    ///
    /// Example: link-sentry scan https://example.com --max-depth 2
    Scan {
        /// Website URL to start from (e.g., https://example.com)
        url: String,

        /// Maximum crawl depth (0 = only the starting page)
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Keep and check links pointing to other sites
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        include_external: bool,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Output results in JSON format instead of a Markdown report
        #[arg(long)]
        json: bool,
    },

    /// Check the status of specific URLs
    ///
    /// Example: link-sentry check https://example.com https://example.com/docs
    Check {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        /// Output results in JSON format instead of a Markdown report
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Client settings for this invocation
    pub fn checker_config(&self) -> CheckerConfig {
        let timeout = match &self.command {
            Commands::Scan { timeout, .. } | Commands::Check { timeout, .. } => *timeout,
        };
        CheckerConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(timeout),
            concurrency_limit: self.concurrency,
            ..Default::default()
        }
    }
}

pub fn scan_params(max_depth: usize, include_external: bool, timeout: u64) -> ScanParams {
    ScanParams {
        max_depth,
        include_external,
        timeout: Duration::from_secs(timeout),
    }
}
