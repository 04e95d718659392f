//! API endpoint implementations.

mod repos;
mod user;

use async_trait::async_trait;
use octoview_types::{AuthenticatedUser, RawRepository};

use crate::client::GithubClient;
use crate::error::Result;

pub use repos::{REPOS_CACHE_KEY, ReposApi};
pub use user::{USER_CACHE_KEY, UserApi};

/// The authenticated GitHub surface the session layer depends on.
///
/// With `ignore_cache == false`, a cached response younger than the TTL is
/// returned without a request. Otherwise the network is hit and a successful
/// response refreshes the cache. Both fail with
/// [`Error::Unauthenticated`](crate::Error::Unauthenticated) when no bearer
/// credential is set, even if a cached entry exists.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Replace or clear the credential used for subsequent requests.
    fn set_bearer_token(&self, token: Option<String>);

    /// `GET /user`.
    async fn fetch_authenticated_user(&self, ignore_cache: bool) -> Result<AuthenticatedUser>;

    /// `GET /user/repos`.
    async fn fetch_repositories(&self, ignore_cache: bool) -> Result<Vec<RawRepository>>;
}

#[async_trait]
impl GithubApi for GithubClient {
    fn set_bearer_token(&self, token: Option<String>) {
        self.set_token(token);
    }

    async fn fetch_authenticated_user(&self, ignore_cache: bool) -> Result<AuthenticatedUser> {
        self.user().authenticated(ignore_cache).await
    }

    async fn fetch_repositories(&self, ignore_cache: bool) -> Result<Vec<RawRepository>> {
        self.repos().list(ignore_cache).await
    }
}
