//! User API.

use octoview_types::AuthenticatedUser;

use crate::client::GithubClient;
use crate::error::Result;

/// Cache key of the authenticated user's profile.
pub const USER_CACHE_KEY: &str = "github:user";

/// User API client.
pub struct UserApi {
    client: GithubClient,
}

impl UserApi {
    pub(crate) fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// Get the profile of the user owning the current token.
    pub async fn authenticated(&self, ignore_cache: bool) -> Result<AuthenticatedUser> {
        let token = self.client.require_token()?;

        if !ignore_cache
            && let Some(user) = self.client.cached::<AuthenticatedUser>(USER_CACHE_KEY).await
        {
            return Ok(user);
        }

        let user: AuthenticatedUser = self.client.get("user", &token).await?;
        self.client.store(USER_CACHE_KEY, &user).await;
        Ok(user)
    }
}
