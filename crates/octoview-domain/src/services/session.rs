//! Session service.
//!
//! Owns the session token and keeps three places in agreement: the
//! in-memory copy, the persisted copy in the [`TokenStore`], and the bearer
//! credential on the [`GithubApi`] client.

use std::sync::Arc;

use chrono::Duration;
use octoview_client::GithubApi;
use octoview_oauth::{Authenticator, SharedTokenStore, is_token_expired};
use octoview_types::{Repository, SessionToken, User, repositories_from};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::Result;
use crate::events::SessionEvent;

/// How long a freshly issued token is trusted.
pub const SESSION_LIFETIME: Duration = Duration::hours(7);

/// Invoked synchronously at the end of every logout.
pub type LogoutCallback = Arc<dyn Fn() + Send + Sync>;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Login state and authenticated data access.
///
/// One instance per process, shared as `Arc<SessionService>`.
pub struct SessionService {
    auth: Arc<dyn Authenticator>,
    api: Arc<dyn GithubApi>,
    store: SharedTokenStore,
    token: RwLock<Option<SessionToken>>,
    on_logout: Mutex<Option<LogoutCallback>>,
    // Serializes login/logout so their store and memory updates never interleave.
    transition: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("store", &self.store)
            .field("logged_in", &self.token.read().is_some())
            .field("has_logout_callback", &self.on_logout.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl SessionService {
    /// Build the service and restore any persisted token.
    ///
    /// The restored token is handed to the API client as-is, even if it has
    /// already expired; expiry is enforced on the next data request.
    pub fn new(
        auth: Arc<dyn Authenticator>,
        api: Arc<dyn GithubApi>,
        store: SharedTokenStore,
    ) -> Self {
        let token = store.get_token_sync();
        api.set_bearer_token(token.as_ref().map(|t| t.access_token.clone()));
        if let Some(t) = &token {
            debug!(expires_at = %t.expires_at, "Restored session token");
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            auth,
            api,
            store,
            token: RwLock::new(token),
            on_logout: Mutex::new(None),
            transition: tokio::sync::Mutex::new(()),
            events,
        }
    }

    /// Profile of the logged-in user.
    ///
    /// Returns `Ok(None)` after logging out if the session has expired.
    pub async fn get_user_profile(&self, ignore_cache: bool) -> Result<Option<User>> {
        if self.expire_if_needed().await? {
            return Ok(None);
        }
        let user = self.api.fetch_authenticated_user(ignore_cache).await?;
        Ok(Some(User::from(user)))
    }

    /// Repositories of the logged-in user.
    ///
    /// Returns `Ok(None)` after logging out if the session has expired.
    pub async fn get_repositories(&self, ignore_cache: bool) -> Result<Option<Vec<Repository>>> {
        if self.expire_if_needed().await? {
            return Ok(None);
        }
        let repos = self.api.fetch_repositories(ignore_cache).await?;
        Ok(Some(repositories_from(repos)))
    }

    /// Run the OAuth flow and start a new session.
    ///
    /// Nothing changes if authorization or persistence fails.
    pub async fn login(&self) -> Result<()> {
        let _guard = self.transition.lock().await;

        let response = self.auth.login().await?;
        let token = SessionToken::issued_now(response.token, SESSION_LIFETIME);
        self.store.save_token(&token).await?;

        self.api.set_bearer_token(Some(token.access_token.clone()));
        info!(expires_at = %token.expires_at, "Logged in");
        *self.token.write() = Some(token);

        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// End the session. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.transition.lock().await;
        self.logout_locked().await
    }

    /// Replace the callback invoked after every logout.
    pub fn set_logout_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_logout.lock() = Some(Arc::new(callback));
    }

    /// Receive every subsequent [`SessionEvent`].
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// True if the token store holds an unexpired token.
    pub async fn is_logged_in(&self) -> bool {
        self.store
            .get_token()
            .await
            .is_some_and(|token| !is_token_expired(token.expires_at))
    }

    /// The in-memory session token, if any.
    pub fn current_token(&self) -> Option<SessionToken> {
        self.token.read().clone()
    }

    /// Log out if the held token is past its expiry. Returns whether it did.
    async fn expire_if_needed(&self) -> Result<bool> {
        let expired = self.held_token_expired();
        if !expired {
            return Ok(false);
        }

        let _guard = self.transition.lock().await;
        // A concurrent login may have replaced the token while we waited.
        let still_expired = self.held_token_expired();
        if still_expired {
            info!("Session expired");
            self.emit(SessionEvent::Expired);
            self.logout_locked().await?;
        }
        Ok(still_expired)
    }

    fn held_token_expired(&self) -> bool {
        self.token
            .read()
            .as_ref()
            .is_some_and(|token| is_token_expired(token.expires_at))
    }

    async fn logout_locked(&self) -> Result<()> {
        self.store.remove_token().await?;
        let had_token = self.token.write().take().is_some();
        self.api.set_bearer_token(None);
        if had_token {
            info!("Logged out");
        }

        let callback = self.on_logout.lock().clone();
        if let Some(callback) = callback {
            callback();
        }

        self.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;
    use octoview_oauth::{
        AuthResponse, FileTokenStore, InMemoryTokenStore, OAuthError, TokenStore,
    };
    use octoview_types::{AuthenticatedUser, RawRepository};
    use serde_json::Map;

    use crate::DomainError;

    // ─────────────────────────────────────────────────────────────────────
    // Test doubles
    // ─────────────────────────────────────────────────────────────────────

    struct MockAuth {
        token: Option<&'static str>,
        gate: Option<Arc<Gate>>,
    }

    /// Holds a login inside the authorization step until released.
    #[derive(Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    impl MockAuth {
        fn returning(token: Option<&'static str>) -> Self {
            Self { token, gate: None }
        }

        fn gated(token: &'static str, gate: Arc<Gate>) -> Self {
            Self {
                token: Some(token),
                gate: Some(gate),
            }
        }
    }

    #[async_trait]
    impl Authenticator for MockAuth {
        async fn login(&self) -> octoview_oauth::Result<AuthResponse> {
            if let Some(gate) = &self.gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            match self.token {
                Some(token) => Ok(AuthResponse {
                    code: "code".to_string(),
                    token: token.to_string(),
                    state: "state".to_string(),
                }),
                None => Err(OAuthError::LoginCancelled),
            }
        }
    }

    #[derive(Default)]
    struct MockApi {
        bearer: RwLock<Option<String>>,
        calls: AtomicUsize,
        last_ignore_cache: Mutex<Option<bool>>,
    }

    impl MockApi {
        fn bearer(&self) -> Option<String> {
            self.bearer.read().clone()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self, ignore_cache: bool) -> octoview_client::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_ignore_cache.lock() = Some(ignore_cache);
            if self.bearer.read().is_none() {
                return Err(octoview_client::Error::Unauthenticated);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl GithubApi for MockApi {
        fn set_bearer_token(&self, token: Option<String>) {
            *self.bearer.write() = token;
        }

        async fn fetch_authenticated_user(
            &self,
            ignore_cache: bool,
        ) -> octoview_client::Result<AuthenticatedUser> {
            self.record(ignore_cache)?;
            Ok(AuthenticatedUser {
                id: 583231,
                login: "octocat".to_string(),
                name: None,
                avatar_url: "https://example.com/a.png".to_string(),
                followers: 10,
                following: 2,
                extra: Map::new(),
            })
        }

        async fn fetch_repositories(
            &self,
            ignore_cache: bool,
        ) -> octoview_client::Result<Vec<RawRepository>> {
            self.record(ignore_cache)?;
            Ok(vec![RawRepository {
                id: 1,
                name: "hello-world".to_string(),
                description: Some("first".to_string()),
                extra: Map::new(),
            }])
        }
    }

    struct Fixture {
        api: Arc<MockApi>,
        store: Arc<InMemoryTokenStore>,
        service: Arc<SessionService>,
    }

    fn fixture(auth_token: Option<&'static str>, stored: Option<SessionToken>) -> Fixture {
        fixture_with(MockAuth::returning(auth_token), stored)
    }

    fn fixture_with(auth: MockAuth, stored: Option<SessionToken>) -> Fixture {
        let api = Arc::new(MockApi::default());
        let store = Arc::new(match stored {
            Some(token) => InMemoryTokenStore::with_token(token),
            None => InMemoryTokenStore::new(),
        });
        let service = Arc::new(SessionService::new(
            Arc::new(auth),
            api.clone(),
            store.clone(),
        ));
        Fixture {
            api,
            store,
            service,
        }
    }

    fn expired_token() -> SessionToken {
        SessionToken {
            access_token: "abc".to_string(),
            expires_at: Utc::now() - Duration::hours(2),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Initialization
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn test_new_restores_token_and_bearer() {
        let token = SessionToken::issued_now("gho_saved", Duration::hours(1));
        let f = fixture(None, Some(token.clone()));

        assert_eq!(f.service.current_token(), Some(token));
        assert_eq!(f.api.bearer().as_deref(), Some("gho_saved"));
    }

    #[test]
    fn test_new_without_token_clears_bearer() {
        let f = fixture(None, None);
        assert!(f.service.current_token().is_none());
        assert!(f.api.bearer().is_none());
    }

    #[tokio::test]
    async fn test_new_reads_file_store() {
        let temp = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTokenStore::new(temp.path().join("token.json")));
        store
            .save_token(&SessionToken::issued_now("gho_file", Duration::hours(3)))
            .await
            .unwrap();

        let api = Arc::new(MockApi::default());
        let service = SessionService::new(Arc::new(MockAuth::returning(None)), api.clone(), store);
        assert_eq!(api.bearer().as_deref(), Some("gho_file"));
        assert!(service.is_logged_in().await);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Login
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_login_sets_seven_hour_session() {
        let f = fixture(Some("gho_new"), None);
        let mut events = f.service.subscribe();

        f.service.login().await.unwrap();

        let token = f.service.current_token().unwrap();
        assert_eq!(token.access_token, "gho_new");
        let remaining = token.expires_at - Utc::now();
        assert!(remaining > Duration::minutes(6 * 60 + 54));
        assert!(remaining < Duration::minutes(7 * 60 + 6));

        assert_eq!(f.store.get_token().await, Some(token));
        assert_eq!(f.api.bearer().as_deref(), Some("gho_new"));
        assert!(f.service.is_logged_in().await);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn);
    }

    #[tokio::test]
    async fn test_login_cancelled_leaves_state_untouched() {
        let f = fixture(None, None);
        let err = f.service.login().await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(f.service.current_token().is_none());
        assert!(f.api.bearer().is_none());
        assert!(f.store.get_token().await.is_none());
    }

    #[tokio::test]
    async fn test_login_persistence_failure_propagates() {
        let f = fixture(Some("gho_new"), None);
        f.store.set_fail_writes(true);

        let err = f.service.login().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(OAuthError::Persistence(_))));
        assert!(f.service.current_token().is_none());
        assert!(f.api.bearer().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Data access and expiry
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_profile_maps_to_domain_user() {
        let f = fixture(Some("gho_new"), None);
        f.service.login().await.unwrap();

        let user = f.service.get_user_profile(true).await.unwrap().unwrap();
        assert_eq!(user.name, "");
        assert_eq!(user.id, 583231);
        assert_eq!(user.number_of_followers, 10);
        assert_eq!(user.number_of_following, 2);
        assert_eq!(*f.api.last_ignore_cache.lock(), Some(true));
    }

    #[tokio::test]
    async fn test_repositories_map_to_domain() {
        let f = fixture(Some("gho_new"), None);
        f.service.login().await.unwrap();

        let repos = f.service.get_repositories(false).await.unwrap().unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "hello-world");
        assert_eq!(repos[0].description.as_deref(), Some("first"));
        assert_eq!(*f.api.last_ignore_cache.lock(), Some(false));
    }

    #[tokio::test]
    async fn test_expired_session_logs_out_without_api_call() {
        let f = fixture(None, Some(expired_token()));
        let logouts = Arc::new(AtomicUsize::new(0));
        let counter = logouts.clone();
        f.service.set_logout_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut events = f.service.subscribe();

        assert!(f.service.get_user_profile(false).await.unwrap().is_none());

        assert_eq!(f.api.calls(), 0);
        assert!(f.service.current_token().is_none());
        assert!(f.store.get_token().await.is_none());
        assert!(f.api.bearer().is_none());
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_expired_session_repositories_returns_none() {
        let f = fixture(None, Some(expired_token()));

        assert!(f.service.get_repositories(true).await.unwrap().is_none());
        assert_eq!(f.api.calls(), 0);
        assert!(!f.service.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_never_logged_in_is_unauthenticated() {
        let f = fixture(None, None);

        let err = f.service.get_user_profile(false).await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(f.api.calls(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Logout
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_logout_twice_is_idempotent() {
        let f = fixture(Some("gho_new"), None);
        f.service.login().await.unwrap();

        f.service.logout().await.unwrap();
        let after_first = (f.service.current_token(), f.api.bearer());
        f.service.logout().await.unwrap();
        let after_second = (f.service.current_token(), f.api.bearer());

        assert_eq!(after_first, (None, None));
        assert_eq!(after_first, after_second);
        assert!(f.store.get_token().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_callback_is_replaced() {
        let f = fixture(None, None);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let c = first.clone();
        f.service.set_logout_callback(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = second.clone();
        f.service.set_logout_callback(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        f.service.logout().await.unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_logout_persistence_failure_keeps_session() {
        let f = fixture(Some("gho_new"), None);
        f.service.login().await.unwrap();
        f.store.set_fail_writes(true);

        let err = f.service.logout().await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(OAuthError::Persistence(_))));
        assert!(f.service.current_token().is_some());
        assert_eq!(f.api.bearer().as_deref(), Some("gho_new"));
    }

    #[tokio::test]
    async fn test_logout_emits_event() {
        let f = fixture(None, None);
        let mut events = f.service.subscribe();

        f.service.logout().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Concurrency
    // ─────────────────────────────────────────────────────────────────────

    fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn test_expiry_check_waits_for_in_flight_login() {
        let gate = Arc::new(Gate::default());
        let f = fixture_with(MockAuth::gated("gho_new", gate.clone()), Some(expired_token()));
        let mut events = f.service.subscribe();

        let service = f.service.clone();
        let login = tokio::spawn(async move { service.login().await });
        gate.entered.notified().await;

        let service = f.service.clone();
        let profile = tokio::spawn(async move { service.get_user_profile(false).await });
        tokio::task::yield_now().await;
        assert_eq!(f.api.calls(), 0);

        gate.release.notify_one();
        login.await.unwrap().unwrap();
        let user = profile.await.unwrap().unwrap();

        assert!(user.is_some());
        assert_eq!(f.api.calls(), 1);
        assert_eq!(f.service.current_token().unwrap().access_token, "gho_new");
        assert_eq!(f.store.get_token().await.unwrap().access_token, "gho_new");
        assert_eq!(f.api.bearer().as_deref(), Some("gho_new"));
        assert_eq!(drain(&mut events), vec![SessionEvent::LoggedIn]);
    }

    #[tokio::test]
    async fn test_logout_waits_for_in_flight_login() {
        let gate = Arc::new(Gate::default());
        let f = fixture_with(MockAuth::gated("gho_new", gate.clone()), None);
        let mut events = f.service.subscribe();

        let service = f.service.clone();
        let login = tokio::spawn(async move { service.login().await });
        gate.entered.notified().await;

        let service = f.service.clone();
        let logout = tokio::spawn(async move { service.logout().await });
        tokio::task::yield_now().await;
        assert!(drain(&mut events).is_empty());

        gate.release.notify_one();
        login.await.unwrap().unwrap();
        logout.await.unwrap().unwrap();

        assert!(f.service.current_token().is_none());
        assert!(f.store.get_token().await.is_none());
        assert!(f.api.bearer().is_none());
        assert_eq!(
            drain(&mut events),
            vec![SessionEvent::LoggedIn, SessionEvent::LoggedOut]
        );
    }
}
