//! Domain shapes and the conversions from raw API responses.

use serde::{Deserialize, Serialize};

use crate::github::{AuthenticatedUser, RawRepository};

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub avatar_url: String,
    pub id: u64,
    pub number_of_followers: u64,
    pub number_of_following: u64,
}

/// A repository owned by or visible to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

impl From<AuthenticatedUser> for User {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            name: user.name.unwrap_or_default(),
            avatar_url: user.avatar_url,
            id: user.id,
            number_of_followers: user.followers,
            number_of_following: user.following,
        }
    }
}

impl From<RawRepository> for Repository {
    fn from(repo: RawRepository) -> Self {
        Self {
            id: repo.id,
            name: repo.name,
            description: repo.description,
        }
    }
}

/// Convert a raw repository listing, preserving order.
pub fn repositories_from(raw: Vec<RawRepository>) -> Vec<Repository> {
    raw.into_iter().map(Repository::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_user_from_raw() {
        let raw = AuthenticatedUser {
            id: 12345,
            login: "tester".to_string(),
            name: Some("Test User".to_string()),
            avatar_url: "https://example.com/avatar.png".to_string(),
            followers: 10,
            following: 20,
            extra: Map::new(),
        };
        let user = User::from(raw);
        assert_eq!(
            user,
            User {
                name: "Test User".to_string(),
                avatar_url: "https://example.com/avatar.png".to_string(),
                id: 12345,
                number_of_followers: 10,
                number_of_following: 20,
            }
        );
    }

    #[test]
    fn test_missing_name_becomes_empty() {
        let raw = AuthenticatedUser {
            id: 1,
            login: "anon".to_string(),
            name: None,
            avatar_url: String::new(),
            followers: 0,
            following: 0,
            extra: Map::new(),
        };
        assert_eq!(User::from(raw).name, "");
    }

    #[test]
    fn test_repositories_from_keeps_order() {
        let raw = vec![
            RawRepository {
                id: 1,
                name: "repo1".to_string(),
                description: Some("Test repo 1".to_string()),
                extra: Map::new(),
            },
            RawRepository {
                id: 2,
                name: "repo2".to_string(),
                description: None,
                extra: Map::new(),
            },
        ];
        let repos = repositories_from(raw);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "repo1");
        assert_eq!(repos[1].description, None);
    }
}
