//! Cached, authenticated access to the GitHub REST API.
//!
//! # Example
//!
//! ```no_run
//! use octoview_client::{GithubApi, GithubClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = GithubClient::builder()
//!     .cache(octoview_cache::ResponseCache::on_disk("/tmp/octoview-cache"))
//!     .build()?;
//! client.set_bearer_token(Some("gho_example".to_string()));
//!
//! // Served from cache for five minutes after the first call.
//! let user = client.fetch_authenticated_user(false).await?;
//! println!("{} has {} followers", user.login, user.followers);
//!
//! // Always hits the network, then refreshes the cache.
//! let repos = client.fetch_repositories(true).await?;
//! println!("{} repositories", repos.len());
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **User**: `GET /user`
//! - **Repositories**: `GET /user/repos`

pub mod api;
pub mod client;
pub mod error;

pub use api::{GithubApi, REPOS_CACHE_KEY, ReposApi, USER_CACHE_KEY, UserApi};
pub use client::{ClientBuilder, GithubClient};
pub use error::{Error, Result};
