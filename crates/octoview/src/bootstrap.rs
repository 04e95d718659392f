//! Composition root: config → OAuth → token store → cache → client → session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use octoview_cache::ResponseCache;
use octoview_client::GithubClient;
use octoview_config::{OctoviewConfig, TokenBackend, resolve_client_id, resolve_client_secret};
use octoview_domain::SessionService;
use octoview_oauth::{
    AuthExchange, AuthResponse, Authenticator, FileTokenStore, OAuthConfig, OAuthError,
    SharedTokenStore,
};
use tracing::{debug, warn};

use crate::commands::Context;
use crate::prompt::ConsolePrompt;

/// Load config and wire every service the commands need.
pub fn build_context(config_dir: PathBuf, json_output: bool, verbose: bool) -> Result<Context> {
    let loaded = octoview_config::load_config_with_options(None, Some(&config_dir))
        .context("Failed to load configuration")?;
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    for path in loaded.loaded_from() {
        debug!(path = %path.display(), "Loaded config");
    }
    let config = loaded.config;

    let oauth = oauth_config(&config).map_err(|e| e.to_string());
    let authenticator: Arc<dyn Authenticator> = match &oauth {
        Ok(oauth) => Arc::new(AuthExchange::new(oauth.clone(), Arc::new(ConsolePrompt))),
        Err(reason) => Arc::new(Unconfigured(reason.clone())),
    };

    let (store, token_location) = token_store(&config, &config_dir)?;

    let cache_dir = config
        .cache_dir()
        .unwrap_or_else(|| config_dir.join("cache"));
    let cache = ResponseCache::on_disk(&cache_dir).with_config(
        octoview_cache::CacheConfig::new().with_default_ttl(config.cache_ttl()),
    );
    debug!(dir = %cache_dir.display(), "Response cache");

    let client = GithubClient::builder()
        .base_url(config.api_base_url())
        .timeout(config.http_timeout())
        .cache(cache.clone())
        .cache_ttl(config.cache_ttl())
        .build()
        .context("Failed to build GitHub client")?;

    let session = Arc::new(SessionService::new(authenticator, Arc::new(client), store));

    Ok(Context {
        json_output,
        verbose,
        config_dir,
        config,
        session,
        cache,
        oauth,
        token_location,
    })
}

fn oauth_config(config: &OctoviewConfig) -> octoview_config::Result<OAuthConfig> {
    let client_id = resolve_client_id(config)?;
    let client_secret = resolve_client_secret(config)?;
    debug!(client_id_source = %client_id.source, "Resolved OAuth client");

    Ok(OAuthConfig::github(client_id.value, client_secret.value)
        .with_base_url(&config.oauth_base_url())
        .with_redirect_uri(config.redirect_uri())
        .with_scopes(config.scopes())
        .with_timeout(config.http_timeout()))
}

fn token_store(
    config: &OctoviewConfig,
    config_dir: &std::path::Path,
) -> Result<(SharedTokenStore, String)> {
    match config.token_backend() {
        TokenBackend::File => {
            let path = config.token_path_in(config_dir);
            let location = path.display().to_string();
            Ok((Arc::new(FileTokenStore::new(path)), location))
        }
        #[cfg(feature = "keyring")]
        TokenBackend::Keyring => Ok((
            Arc::new(octoview_oauth::KeyringTokenStore::new()),
            "system keyring".to_string(),
        )),
        #[cfg(not(feature = "keyring"))]
        TokenBackend::Keyring => anyhow::bail!(
            "token_backend = \"keyring\" requires octoview built with the `keyring` feature"
        ),
    }
}

/// Used when no OAuth client is configured. Login fails with the
/// resolution error.
struct Unconfigured(String);

#[async_trait]
impl Authenticator for Unconfigured {
    async fn login(&self) -> octoview_oauth::Result<AuthResponse> {
        Err(OAuthError::InvalidRequest(self.0.clone()))
    }
}
