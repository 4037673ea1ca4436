use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config::{self, ConfigError},
    management::{AuthError, TokenEndpoint, TokenManager},
    server::start_api_server,
    types::{PendingSignIn, TokenResponse},
    utils, warning,
};

const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(60);

/// Spotify's `/api/token` endpoint.
pub struct SpotifyTokenEndpoint {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl SpotifyTokenEndpoint {
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: Option<String>,
        redirect_uri: String,
    ) -> Self {
        Self {
            client: Client::new(),
            token_url,
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    pub fn from_config() -> Result<Self, ConfigError> {
        Ok(Self::new(
            config::spotify_apitoken_url(),
            config::spotify_client_id()?,
            config::spotify_client_secret(),
            config::spotify_redirect_uri()?,
        ))
    }

    fn basic_authorization(&self) -> Option<String> {
        self.client_secret.as_ref().map(|secret| {
            let credentials = STANDARD.encode(format!("{}:{}", self.client_id, secret));
            format!("Basic {credentials}")
        })
    }

    async fn request_token(
        &self,
        mut form: Vec<(&str, String)>,
    ) -> Result<TokenResponse, AuthError> {
        let mut request = self.client.post(&self.token_url);
        match self.basic_authorization() {
            Some(header) => request = request.header(AUTHORIZATION, header),
            None => form.push(("client_id", self.client_id.clone())),
        }

        let response = request
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TokenEndpoint for SpotifyTokenEndpoint {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<TokenResponse, AuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", self.redirect_uri.clone()),
        ];
        if let Some(verifier) = code_verifier {
            form.push(("code_verifier", verifier.to_string()));
        }
        self.request_token(form).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        self.request_token(vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ])
        .await
    }
}

/// Builds the user-facing authorization URL for a PKCE sign-in.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    code_challenge: &str,
    state: &str,
) -> crate::Res<Url> {
    let url = Url::parse_with_params(
        auth_url,
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("scope", scope),
            ("redirect_uri", redirect_uri),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("state", state),
            ("show_dialog", "true"),
        ],
    )?;
    Ok(url)
}

/// Runs the interactive sign-in: serves the callback locally, opens the
/// browser and waits for the code exchange to finish.
pub async fn sign_in(tokens: TokenManager) -> crate::Res<()> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let auth_url = authorize_url(
        &config::spotify_apiauth_url(),
        &config::spotify_client_id()?,
        &config::spotify_redirect_uri()?,
        &config::spotify_scope(),
        &code_challenge,
        &state,
    )?;

    let pending = Arc::new(Mutex::new(Some(PendingSignIn {
        code_verifier,
        state,
        outcome: None,
    })));

    let server_state = Arc::clone(&pending);
    let server_tokens = tokens.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state, server_tokens).await {
            tracing::error!(error = %e, "callback server failed");
            warning!("Callback server failed: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_sign_in(pending).await;
    server.abort();

    match outcome {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(e.into()),
        None => Err("Authentication timed out.".into()),
    }
}

async fn wait_for_sign_in(pending: Arc<Mutex<Option<PendingSignIn>>>) -> Option<Result<(), String>> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < SIGN_IN_TIMEOUT {
        let lock = pending.lock().await;
        if let Some(outcome) = lock.as_ref().and_then(|p| p.outcome.clone()) {
            return Some(outcome);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
