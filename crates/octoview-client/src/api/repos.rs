//! Repositories API.

use octoview_types::RawRepository;
use serde_json::Value;

use crate::client::GithubClient;
use crate::error::Result;

/// Cache key of the authenticated user's repository list.
pub const REPOS_CACHE_KEY: &str = "github:repositories";

/// Repositories API client.
pub struct ReposApi {
    client: GithubClient,
}

impl ReposApi {
    pub(crate) fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// List repositories of the user owning the current token.
    ///
    /// A successful response that is not a JSON array yields an empty list.
    pub async fn list(&self, ignore_cache: bool) -> Result<Vec<RawRepository>> {
        let token = self.client.require_token()?;

        if !ignore_cache
            && let Some(repos) = self.client.cached::<Vec<RawRepository>>(REPOS_CACHE_KEY).await
        {
            return Ok(repos);
        }

        let body: Value = self.client.get("user/repos", &token).await?;
        let repos = match body {
            Value::Array(_) => serde_json::from_value(body)?,
            other => {
                tracing::warn!(kind = value_kind(&other), "Repository list was not an array");
                Vec::new()
            }
        };

        self.client.store(REPOS_CACHE_KEY, &repos).await;
        Ok(repos)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
