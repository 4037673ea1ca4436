use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, oneshot};

use crate::{
    management::store::{CredentialStore, StoreError},
    types::{Credential, TokenResponse},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("no refresh token available, sign in again")]
    MissingRefreshToken,
    #[error("token request failed: {0}")]
    Network(String),
    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("token response could not be decoded: {0}")]
    Decode(String),
    #[error("credential store failed: {0}")]
    Store(String),
    #[error("token refresh was abandoned")]
    RefreshAborted,
}

impl AuthError {
    /// Every failure on the token path ends the session; recovery is a full sign-in.
    pub fn requires_sign_in(&self) -> bool {
        !matches!(self, AuthError::Store(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

/// The OAuth token endpoint.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;
}

type RefreshWaiter = oneshot::Sender<Result<String, AuthError>>;

enum RefreshState {
    Idle,
    Refreshing(Vec<RefreshWaiter>),
}

struct TokenState {
    credential: Option<Credential>,
    refresh: RefreshState,
    /// Bumped on sign-in and sign-out; a refresh started under an older
    /// epoch must not install its result.
    epoch: u64,
}

struct Shared {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    state: Mutex<TokenState>,
}

/// Hands out valid bearer tokens, refreshing at most once at a time.
///
/// Cloning is cheap and every clone shares the same credential and refresh
/// state, so one instance is created at startup and passed to consumers.
#[derive(Clone)]
pub struct TokenManager {
    shared: Arc<Shared>,
}

impl TokenManager {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_credential(endpoint, store, None)
    }

    /// Seeds the manager from whatever the store holds.
    pub async fn load(
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, AuthError> {
        let credential = store.load().await?;
        Ok(Self::with_credential(endpoint, store, credential))
    }

    fn with_credential(
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                endpoint,
                store,
                state: Mutex::new(TokenState {
                    credential,
                    refresh: RefreshState::Idle,
                    epoch: 0,
                }),
            }),
        }
    }

    pub async fn is_signed_in(&self) -> bool {
        self.shared.state.lock().await.credential.is_some()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.shared.state.lock().await.credential.clone()
    }

    pub async fn is_refreshing(&self) -> bool {
        matches!(
            self.shared.state.lock().await.refresh,
            RefreshState::Refreshing(_)
        )
    }

    /// Returns a token that is not within the refresh margin of expiry.
    ///
    /// A due token starts a single refresh; callers arriving while it is in
    /// flight wait for the same outcome instead of starting another one.
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        let waiter = {
            let mut state = self.shared.state.lock().await;

            if let RefreshState::Refreshing(waiters) = &mut state.refresh {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                tracing::debug!(waiting = waiters.len(), "token refresh in flight, queued");
                rx
            } else {
                let credential = state.credential.as_ref().ok_or(AuthError::NotSignedIn)?;
                if !credential.should_refresh(Utc::now()) {
                    return Ok(credential.access_token.clone());
                }

                let refresh_token = credential
                    .refresh_token
                    .clone()
                    .ok_or(AuthError::MissingRefreshToken)?;

                let (tx, rx) = oneshot::channel();
                state.refresh = RefreshState::Refreshing(vec![tx]);
                let epoch = state.epoch;

                let shared = Arc::clone(&self.shared);
                tokio::spawn(async move { shared.run_refresh(refresh_token, epoch).await });
                rx
            }
        };

        waiter.await.map_err(|_| AuthError::RefreshAborted)?
    }

    /// One-shot sign-in: trades an authorization code for the first credential.
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<(), AuthError> {
        let response = self
            .shared
            .endpoint
            .exchange_code(code, code_verifier)
            .await?;
        let credential = Credential::issued(response, None, Utc::now());

        let mut state = self.shared.state.lock().await;
        self.shared.store.save(&credential).await?;
        state.credential = Some(credential);
        state.epoch += 1;
        drop(state);

        tracing::info!("authorization code exchanged");
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.shared.state.lock().await;
        state.credential = None;
        state.epoch += 1;
        self.shared.store.clear().await?;
        drop(state);
        tracing::info!("signed out");
        Ok(())
    }
}

impl Shared {
    /// Store writes happen under the state lock so they stay ordered with
    /// sign-in and sign-out.
    async fn run_refresh(&self, refresh_token: String, epoch: u64) {
        tracing::info!("refreshing access token");
        let outcome = self.endpoint.refresh(&refresh_token).await;

        let mut state = self.state.lock().await;
        let waiters = match std::mem::replace(&mut state.refresh, RefreshState::Idle) {
            RefreshState::Refreshing(waiters) => waiters,
            RefreshState::Idle => Vec::new(),
        };

        let result = if state.epoch != epoch {
            tracing::info!("credential changed during refresh, result discarded");
            state
                .credential
                .as_ref()
                .map(|current| current.access_token.clone())
                .ok_or(AuthError::NotSignedIn)
        } else {
            match outcome {
                Ok(response) => {
                    let credential = Credential::issued(response, Some(refresh_token), Utc::now());
                    if let Err(e) = self.store.save(&credential).await {
                        tracing::warn!(error = %e, "refreshed token could not be persisted");
                    }
                    tracing::info!(expires_at = %credential.expires_at, "access token refreshed");
                    let token = credential.access_token.clone();
                    state.credential = Some(credential);
                    Ok(token)
                }
                Err(err) => {
                    tracing::error!(error = %err, waiters = waiters.len(), "token refresh failed");
                    Err(err)
                }
            }
        };
        drop(state);

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}
