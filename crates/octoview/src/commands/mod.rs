//! CLI command handlers.

pub mod auth;
pub mod cache;
pub mod profile;
pub mod repos;

use std::path::PathBuf;
use std::sync::Arc;

use octoview_cache::ResponseCache;
use octoview_config::OctoviewConfig;
use octoview_domain::SessionService;
use octoview_oauth::OAuthConfig;

/// Shared context for all commands.
#[derive(Debug)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Directory holding config.toml, logs and the token file.
    pub config_dir: PathBuf,
    /// Merged configuration.
    pub config: OctoviewConfig,
    /// The process-wide session.
    pub session: Arc<SessionService>,
    /// Response cache shared with the API client.
    pub cache: ResponseCache,
    /// OAuth client settings, or why they could not be resolved.
    pub oauth: Result<OAuthConfig, String>,
    /// Human-readable location of the stored token.
    pub token_location: String,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a session error into a user-facing message.
pub fn explain(err: octoview_domain::DomainError) -> anyhow::Error {
    if err.is_unauthenticated() {
        anyhow::anyhow!("Not logged in. Run 'octoview auth login' first.")
    } else {
        anyhow::Error::new(err)
    }
}

/// Message used when a data request found the session expired.
pub const SESSION_EXPIRED: &str = "Session expired. Run 'octoview auth login' to sign in again.";
