//! Profile command - the authenticated user's GitHub profile.

use anyhow::Result;
use clap::Args;
use console::{Style, style};

use super::{Context, SESSION_EXPIRED, explain, print_json};

/// Arguments for the profile command.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Bypass the cache and fetch from GitHub
    #[arg(short, long)]
    pub refresh: bool,
}

/// Run the profile command.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let user = ctx
        .session
        .get_user_profile(args.refresh)
        .await
        .map_err(explain)?
        .ok_or_else(|| anyhow::anyhow!(SESSION_EXPIRED))?;

    if ctx.json_output {
        return print_json(&user);
    }

    let dim = Style::new().dim();
    let name = if user.name.is_empty() {
        "(no name)"
    } else {
        user.name.as_str()
    };
    println!();
    println!("{}", style(name).bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("  {} {}", dim.apply_to("ID:"), user.id);
    println!("  {} {}", dim.apply_to("Followers:"), user.number_of_followers);
    println!("  {} {}", dim.apply_to("Following:"), user.number_of_following);
    println!("  {} {}", dim.apply_to("Avatar:"), user.avatar_url);
    println!();
    Ok(())
}
