//! Repos command - the authenticated user's repositories.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, SESSION_EXPIRED, explain, print_json};

/// Arguments for the repos command.
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// Bypass the cache and fetch from GitHub
    #[arg(short, long)]
    pub refresh: bool,
}

/// Run the repos command.
pub async fn run(args: ReposArgs, ctx: &Context) -> Result<()> {
    let repos = ctx
        .session
        .get_repositories(args.refresh)
        .await
        .map_err(explain)?
        .ok_or_else(|| anyhow::anyhow!(SESSION_EXPIRED))?;

    if ctx.json_output {
        return print_json(&repos);
    }

    if repos.is_empty() {
        println!("No repositories.");
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("{} ({})", style("Repositories").bold(), repos.len());
    println!("{}", dim.apply_to("─".repeat(40)));
    for repo in &repos {
        match &repo.description {
            Some(description) if !description.is_empty() => {
                println!("  {}  {}", style(&repo.name).cyan(), dim.apply_to(description))
            }
            _ => println!("  {}", style(&repo.name).cyan()),
        }
    }
    println!();
    Ok(())
}
