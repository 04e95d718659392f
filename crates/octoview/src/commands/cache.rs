//! Cache command - local response cache management.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::{Context, print_json};

/// Arguments for the cache command.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove cached responses
    Clear {
        /// Only remove this entry (e.g. "github:user", "github:repositories")
        #[arg(long)]
        key: Option<String>,
    },
}

/// Run the cache command.
pub async fn run(args: CacheArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CacheCommand::Clear { key } => cmd_clear(key, ctx).await,
    }
}

async fn cmd_clear(key: Option<String>, ctx: &Context) -> Result<()> {
    match &key {
        Some(key) => ctx.cache.invalidate(key).await,
        None => ctx.cache.invalidate_all().await,
    }

    if ctx.json_output {
        return print_json(&json!({ "cleared": key.as_deref().unwrap_or("all") }));
    }
    match key {
        Some(key) => println!("Cleared cache entry '{}'.", key),
        None => println!("Cleared all cached responses."),
    }
    Ok(())
}
