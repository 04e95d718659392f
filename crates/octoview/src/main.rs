//! octoview - GitHub profile and repositories from the terminal
//!
//! Main entry point for the octoview CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;
mod prompt;

use commands::{auth, cache, profile, repos};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// octoview - GitHub profile and repositories from the terminal
#[derive(Parser)]
#[command(name = "octoview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (default: platform config dir)
    #[arg(long, global = true, env = "OCTOVIEW_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to GitHub, log out, or show session status
    Auth(auth::AuthArgs),

    /// Show the authenticated user's profile
    Profile(profile::ProfileArgs),

    /// List the authenticated user's repositories
    Repos(repos::ReposArgs),

    /// Manage the local response cache
    Cache(cache::CacheArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Every crate in the workspace, as tracing targets.
const LOG_TARGETS: &[&str] = &[
    "octoview",
    "octoview_domain",
    "octoview_client",
    "octoview_cache",
    "octoview_oauth",
    "octoview_config",
];

/// `level` for workspace crates, `fallback` for everything else.
fn log_filter(level: &str, fallback: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push(fallback.to_string());
    directives.join(",")
}

fn console_filter(verbose: bool) -> String {
    if verbose {
        log_filter("debug", "warn")
    } else {
        log_filter("warn", "error")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => octoview_config::xdg_config_dir()
            .context("Could not determine config directory; pass --config-dir")?,
    };

    // Console layer for humans, daily-rotated JSON file for everything
    let log_dir = config_dir.join("logs");
    let file_appender = tracing_appender::rolling::daily(&log_dir, "octoview.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(cli.verbose)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(console_filter(cli.verbose))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(log_filter("trace", "info"))),
        )
        .init();

    let ctx = bootstrap::build_context(config_dir, cli.json, cli.verbose)?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Profile(args) => profile::run(args, &ctx).await,
        Commands::Repos(args) => repos::run(args, &ctx).await,
        Commands::Cache(args) => cache::run(args, &ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_filter_covers_every_crate() {
        for verbose in [false, true] {
            let filter = console_filter(verbose);
            for target in LOG_TARGETS {
                let level = if verbose { "debug" } else { "warn" };
                assert!(
                    filter.split(',').any(|d| d == format!("{target}={level}")),
                    "{target} missing from {filter}"
                );
            }
        }
        assert!(console_filter(false).contains("octoview_cache=warn"));
        assert!(console_filter(false).contains("octoview_config=warn"));
        assert!(console_filter(false).ends_with(",error"));
    }

    #[test]
    fn test_console_filter_parses() {
        tracing_subscriber::EnvFilter::try_new(console_filter(false)).unwrap();
        tracing_subscriber::EnvFilter::try_new(log_filter("trace", "info")).unwrap();
    }
}
