//! Raw GitHub REST API shapes.
//!
//! Only the fields octoview reads are typed. Everything else lands in
//! `extra` so a cached response round-trips without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response body of `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One element of the `GET /user/repos` response array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
