use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sporlplay::management::*;
use sporlplay::types::{Credential, TokenResponse};

// Token endpoint double that counts calls and answers after a short delay
struct FakeEndpoint {
    refreshes: AtomicUsize,
    exchanges: AtomicUsize,
    refresh_result: Result<TokenResponse, AuthError>,
}

impl FakeEndpoint {
    fn succeeding(access: &str, refresh: Option<&str>) -> Self {
        Self {
            refreshes: AtomicUsize::new(0),
            exchanges: AtomicUsize::new(0),
            refresh_result: Ok(token_response(access, refresh)),
        }
    }

    fn failing(err: AuthError) -> Self {
        Self {
            refreshes: AtomicUsize::new(0),
            exchanges: AtomicUsize::new(0),
            refresh_result: Err(err),
        }
    }

    fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenEndpoint for FakeEndpoint {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse, AuthError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        assert_eq!(code, "the-code");
        assert_eq!(code_verifier, Some("the-verifier"));
        Ok(token_response("signed-in", Some("first-refresh")))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        assert_eq!(refresh_token, "refresh");
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        self.refresh_result.clone()
    }
}

fn token_response(access: &str, refresh: Option<&str>) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        expires_in: 3600,
        refresh_token: refresh.map(str::to_string),
        scope: String::new(),
        token_type: "Bearer".to_string(),
    }
}

fn credential(access: &str, refresh: Option<&str>, expires_in_secs: i64) -> Credential {
    Credential {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
    }
}

async fn manager_with(
    endpoint: Arc<FakeEndpoint>,
    credential: Credential,
) -> (TokenManager, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_credential(&credential));
    let tokens = TokenManager::load(endpoint, store.clone()).await.unwrap();
    (tokens, store)
}

async fn concurrent_tokens(tokens: &TokenManager, callers: usize) -> Vec<Result<String, AuthError>> {
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let tokens = tokens.clone();
            tokio::spawn(async move { tokens.get_valid_token().await })
        })
        .collect();

    let mut results = Vec::with_capacity(callers);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(start_paused = true)]
async fn test_valid_token_is_returned_without_refresh() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", None));
    let (tokens, store) = manager_with(endpoint.clone(), credential("current", Some("refresh"), 3600)).await;

    assert_eq!(tokens.get_valid_token().await.unwrap(), "current");
    assert_eq!(endpoint.refresh_count(), 0);
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_one_refresh() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", None));
    let (tokens, store) = manager_with(endpoint.clone(), credential("stale", Some("refresh"), 60)).await;

    let results = concurrent_tokens(&tokens, 10).await;

    assert_eq!(endpoint.refresh_count(), 1);
    assert!(results.iter().all(|r| r.as_deref() == Ok("fresh")));
    assert!(!tokens.is_refreshing().await);

    // New credential is cached and persisted, refresh token carried over
    let current = tokens.credential().await.unwrap();
    assert_eq!(current.access_token, "fresh");
    assert_eq!(current.refresh_token.as_deref(), Some("refresh"));
    assert!(!current.should_refresh(Utc::now()));
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.entry(ACCESS_TOKEN_KEY).await.as_deref(), Some("fresh"));
    assert_eq!(store.entry(REFRESH_TOKEN_KEY).await.as_deref(), Some("refresh"));

    // Subsequent calls use the cache
    assert_eq!(tokens.get_valid_token().await.unwrap(), "fresh");
    assert_eq!(endpoint.refresh_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rotated_refresh_token_is_stored() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", Some("rotated")));
    let (tokens, store) = manager_with(endpoint, credential("stale", Some("refresh"), 0)).await;

    assert_eq!(tokens.get_valid_token().await.unwrap(), "fresh");
    assert_eq!(store.entry(REFRESH_TOKEN_KEY).await.as_deref(), Some("rotated"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_reaches_every_caller() {
    let rejected = AuthError::Rejected {
        status: 400,
        body: "invalid_grant".to_string(),
    };
    let endpoint = Arc::new(FakeEndpoint::failing(rejected.clone()));
    let stale = credential("stale", Some("refresh"), 10);
    let (tokens, store) = manager_with(endpoint.clone(), stale.clone()).await;

    let results = concurrent_tokens(&tokens, 5).await;

    assert_eq!(endpoint.refresh_count(), 1);
    assert!(results.iter().all(|r| r.as_ref() == Err(&rejected)));
    assert!(rejected.requires_sign_in());

    // Nothing replaced and nothing written
    assert_eq!(tokens.credential().await, Some(stale));
    assert_eq!(store.save_count(), 0);
    assert!(!tokens.is_refreshing().await);

    // A later call is free to try again
    assert_eq!(tokens.get_valid_token().await, Err(rejected));
    assert_eq!(endpoint.refresh_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_network_failure_is_propagated() {
    let endpoint = Arc::new(FakeEndpoint::failing(AuthError::Network(
        "connection reset".to_string(),
    )));
    let (tokens, _store) = manager_with(endpoint, credential("stale", Some("refresh"), -30)).await;

    assert!(matches!(
        tokens.get_valid_token().await,
        Err(AuthError::Network(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_signed_out_and_missing_refresh_token() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", None));

    let tokens = TokenManager::new(endpoint.clone(), Arc::new(MemoryCredentialStore::new()));
    assert!(!tokens.is_signed_in().await);
    assert_eq!(tokens.get_valid_token().await, Err(AuthError::NotSignedIn));

    let (tokens, _store) = manager_with(endpoint.clone(), credential("stale", None, 30)).await;
    assert_eq!(
        tokens.get_valid_token().await,
        Err(AuthError::MissingRefreshToken)
    );
    assert_eq!(endpoint.refresh_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_exchange_authorization_code_persists_credential() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", None));
    let store = Arc::new(MemoryCredentialStore::new());
    let tokens = TokenManager::new(endpoint.clone(), store.clone());

    tokens
        .exchange_authorization_code("the-code", Some("the-verifier"))
        .await
        .unwrap();

    assert_eq!(endpoint.exchanges.load(Ordering::SeqCst), 1);
    assert!(tokens.is_signed_in().await);
    assert_eq!(tokens.get_valid_token().await.unwrap(), "signed-in");
    assert_eq!(store.entry(ACCESS_TOKEN_KEY).await.as_deref(), Some("signed-in"));
    assert_eq!(
        store.entry(REFRESH_TOKEN_KEY).await.as_deref(),
        Some("first-refresh")
    );
    assert!(store.entry(EXPIRATION_DATE_KEY).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_clears_cache_and_store() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", None));
    let (tokens, store) = manager_with(endpoint, credential("current", Some("refresh"), 3600)).await;

    tokens.sign_out().await.unwrap();

    assert!(!tokens.is_signed_in().await);
    assert!(store.entry(ACCESS_TOKEN_KEY).await.is_none());
    assert_eq!(tokens.get_valid_token().await, Err(AuthError::NotSignedIn));
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_during_refresh_stays_signed_out() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", Some("rotated")));
    let (tokens, store) = manager_with(endpoint.clone(), credential("stale", Some("refresh"), 10)).await;

    let caller = tokens.clone();
    let pending = tokio::spawn(async move { caller.get_valid_token().await });
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert!(tokens.is_refreshing().await);

    tokens.sign_out().await.unwrap();
    let result = pending.await.unwrap();

    assert_eq!(endpoint.refresh_count(), 1);
    assert_eq!(result, Err(AuthError::NotSignedIn));
    assert!(!tokens.is_signed_in().await);
    assert!(store.entry(ACCESS_TOKEN_KEY).await.is_none());
    assert!(store.entry(REFRESH_TOKEN_KEY).await.is_none());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_during_refresh_keeps_new_credential() {
    let endpoint = Arc::new(FakeEndpoint::succeeding("fresh", Some("rotated")));
    let (tokens, store) = manager_with(endpoint.clone(), credential("stale", Some("refresh"), 10)).await;

    let caller = tokens.clone();
    let pending = tokio::spawn(async move { caller.get_valid_token().await });
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    tokens
        .exchange_authorization_code("the-code", Some("the-verifier"))
        .await
        .unwrap();
    let result = pending.await.unwrap();

    // Waiters get the token from the new sign-in, not the refreshed old one
    assert_eq!(result.as_deref(), Ok("signed-in"));
    let current = tokens.credential().await.unwrap();
    assert_eq!(current.access_token, "signed-in");
    assert_eq!(current.refresh_token.as_deref(), Some("first-refresh"));
    assert_eq!(store.entry(ACCESS_TOKEN_KEY).await.as_deref(), Some("signed-in"));
    assert_eq!(
        store.entry(REFRESH_TOKEN_KEY).await.as_deref(),
        Some("first-refresh")
    );
    assert_eq!(store.save_count(), 1);
}
