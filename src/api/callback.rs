use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{management::TokenManager, types::PendingSignIn, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingSignIn>>>>,
    Extension(tokens): Extension<TokenManager>,
) -> Html<&'static str> {
    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No sign-in in progress.</h4>");
    };

    if pending.outcome.is_some() {
        return Html("<h4>Sign-in already completed.</h4>");
    }

    if params.get("state") != Some(&pending.state) {
        return Html("<h4>State mismatch, sign-in rejected.</h4>");
    }

    if let Some(error) = params.get("error") {
        warning!("Authorization was denied: {}", error);
        pending.outcome = Some(Err(format!("authorization denied: {error}")));
        return Html("<h4>Login failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match tokens
        .exchange_authorization_code(code, Some(&pending.code_verifier))
        .await
    {
        Ok(()) => {
            pending.outcome = Some(Ok(()));
            Html("<h2>Authentication successful.</h2><p>Close the browser window.</p>")
        }
        Err(e) => {
            tracing::warn!(error = %e, "token exchange failed");
            pending.outcome = Some(Err(e.to_string()));
            Html("<h4>Login failed.</h4>")
        }
    }
}
