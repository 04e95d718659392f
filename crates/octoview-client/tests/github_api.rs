//! Cache-consultation behaviour of the GitHub client against a mock server.

use octoview_cache::ResponseCache;
use octoview_client::{Error, GithubApi, GithubClient, REPOS_CACHE_KEY, USER_CACHE_KEY};
use octoview_types::AuthenticatedUser;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_body(followers: u64) -> serde_json::Value {
    json!({
        "login": "octocat",
        "id": 583231,
        "name": "The Octocat",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "followers": followers,
        "following": 9
    })
}

fn client_for(server: &MockServer, cache: ResponseCache) -> GithubClient {
    let client = GithubClient::builder()
        .base_url(server.uri())
        .cache(cache)
        .build()
        .unwrap();
    client.set_bearer_token(Some("gho_test".to_string()));
    client
}

#[tokio::test]
async fn test_user_sends_github_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "token gho_test"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(20)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ResponseCache::in_memory());
    let user = client.fetch_authenticated_user(true).await.unwrap();
    assert_eq!(user.login, "octocat");
    assert_eq!(user.followers, 20);
}

#[tokio::test]
async fn test_fresh_cache_entry_avoids_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(20)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ResponseCache::in_memory());
    let first = client.fetch_authenticated_user(false).await.unwrap();
    let second = client.fetch_authenticated_user(false).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_ignore_cache_refetches_and_refreshes() {
    let server = MockServer::start().await;
    let cache = ResponseCache::in_memory();
    cache
        .set(
            USER_CACHE_KEY,
            &serde_json::from_value::<AuthenticatedUser>(user_body(1)).unwrap(),
        )
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(42)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, cache.clone());
    assert_eq!(client.fetch_authenticated_user(false).await.unwrap().followers, 1);
    assert_eq!(client.fetch_authenticated_user(true).await.unwrap().followers, 42);

    let cached: AuthenticatedUser = cache.get(USER_CACHE_KEY).await.unwrap();
    assert_eq!(cached.followers, 42);
}

#[tokio::test]
async fn test_stale_cache_entry_is_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(5)))
        .expect(2)
        .mount(&server)
        .await;

    let client = GithubClient::builder()
        .base_url(server.uri())
        .bearer_token("gho_test")
        .cache_ttl(std::time::Duration::ZERO)
        .build()
        .unwrap();

    client.fetch_authenticated_user(false).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    client.fetch_authenticated_user(false).await.unwrap();
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated_even_with_cache() {
    let server = MockServer::start().await;
    let cache = ResponseCache::in_memory();
    cache
        .set(
            USER_CACHE_KEY,
            &serde_json::from_value::<AuthenticatedUser>(user_body(1)).unwrap(),
        )
        .await;

    let client = client_for(&server, cache);
    client.set_bearer_token(None);

    let err = client.fetch_authenticated_user(false).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
    let err = client.fetch_repositories(false).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"message":"Bad credentials"}"#),
        )
        .mount(&server)
        .await;

    let cache = ResponseCache::in_memory();
    let client = client_for(&server, cache.clone());
    let err = client.fetch_authenticated_user(true).await.unwrap_err();
    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Bad credentials"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert!(cache.get::<AuthenticatedUser>(USER_CACHE_KEY).await.is_none());
}

#[tokio::test]
async fn test_repositories_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "hello-world", "description": "My first repo", "private": false},
            {"id": 2, "name": "dotfiles", "description": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ResponseCache::in_memory());
    let repos = client.fetch_repositories(false).await.unwrap();
    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].name, "hello-world");
    assert_eq!(repos[1].description, None);

    // Second call is served from cache.
    assert_eq!(client.fetch_repositories(false).await.unwrap(), repos);
}

#[tokio::test]
async fn test_repositories_non_array_is_empty_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let cache = ResponseCache::in_memory();
    let client = client_for(&server, cache.clone());
    let repos = client.fetch_repositories(true).await.unwrap();
    assert!(repos.is_empty());

    let cached: Vec<serde_json::Value> = cache.get(REPOS_CACHE_KEY).await.unwrap();
    assert!(cached.is_empty());
}

#[tokio::test]
async fn test_on_disk_cache_survives_new_client() {
    let temp = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(7)))
        .expect(1)
        .mount(&server)
        .await;

    let first = client_for(&server, ResponseCache::on_disk(temp.path()));
    first.fetch_authenticated_user(false).await.unwrap();

    let second = client_for(&server, ResponseCache::on_disk(temp.path()));
    assert_eq!(second.fetch_authenticated_user(false).await.unwrap().followers, 7);
}
