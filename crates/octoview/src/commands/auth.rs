//! Auth command - GitHub session management.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use console::{Style, style};
use serde::Serialize;

use super::{Context, print_json};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Authenticate with GitHub via OAuth
    Login,

    /// Clear the stored GitHub token
    Logout,

    /// Show authentication status
    Status,
}

/// Session state for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    logged_in: bool,
    expires_at: Option<DateTime<Utc>>,
    token_location: String,
    revocation_url: Option<String>,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login => cmd_login(ctx).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
        AuthCommand::Status => cmd_status(ctx).await,
    }
}

async fn cmd_login(ctx: &Context) -> Result<()> {
    let session = &ctx.session;

    if session.is_logged_in().await
        && let Some(token) = session.current_token()
    {
        if ctx.json_output {
            return print_status(ctx).await;
        }
        println!(
            "Already authenticated (expires in {})",
            token.expires_in_display()
        );
        println!("Run 'octoview auth logout' first to re-authenticate.");
        return Ok(());
    }

    match session.login().await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {
            eprintln!("Login cancelled.");
            return Ok(());
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Login failed")),
    }

    if ctx.json_output {
        return print_status(ctx).await;
    }

    let expires = session
        .current_token()
        .map(|t| t.expires_in_display())
        .unwrap_or_default();
    println!();
    println!("{}", Style::new().green().apply_to("Authentication successful!"));
    println!("Session expires in: {}", expires);
    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let had_token = ctx.session.current_token().is_some();
    ctx.session.logout().await?;

    if ctx.json_output {
        return print_status(ctx).await;
    }
    if had_token {
        println!("GitHub token removed.");
    } else {
        println!("No GitHub token found.");
    }
    Ok(())
}

async fn cmd_status(ctx: &Context) -> Result<()> {
    if ctx.json_output {
        return print_status(ctx).await;
    }

    let dim = Style::new().dim();
    println!("{}", style("Authentication Status").bold());
    println!("{}", dim.apply_to("─".repeat(40)));

    match ctx.session.current_token() {
        Some(token) if !token.is_expired() => {
            println!("GitHub: {}", Style::new().green().apply_to("authenticated"));
            println!("  Expires: {}", token.expires_in_display());
        }
        Some(_) => {
            println!("GitHub: {}", Style::new().yellow().apply_to("session expired"));
            println!("  Run 'octoview auth login' to sign in again");
        }
        None => {
            println!("GitHub: not authenticated");
            println!("  Run 'octoview auth login' to authenticate");
        }
    }
    println!("  Token: {}", ctx.token_location);

    println!();
    match &ctx.oauth {
        Ok(oauth) => {
            println!("OAuth app: {}", oauth.client_id);
            println!("  Revoke access: {}", oauth.revocation_url);
        }
        Err(reason) => println!("OAuth app: not configured ({})", reason),
    }
    if ctx.verbose {
        println!();
        println!("Config dir: {}", ctx.config_dir.display());
        println!("API: {}", ctx.config.api_base_url());
        println!("Cache TTL: {}s", ctx.config.cache_ttl().as_secs());
    }

    Ok(())
}

async fn print_status(ctx: &Context) -> Result<()> {
    let token = ctx.session.current_token();
    print_json(&StatusOutput {
        logged_in: ctx.session.is_logged_in().await,
        expires_at: token.map(|t| t.expires_at),
        token_location: ctx.token_location.clone(),
        revocation_url: ctx.oauth.as_ref().ok().map(|o| o.revocation_url.clone()),
    })
}
