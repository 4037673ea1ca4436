use crate::{cli::load_tokens, error, info, spotify, success, warning};

pub async fn auth() {
    let tokens = load_tokens().await;
    if tokens.is_signed_in().await {
        info!("Already signed in, signing in again replaces the stored credential.");
    }

    match spotify::auth::sign_in(tokens).await {
        Ok(()) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

pub async fn logout() {
    let tokens = load_tokens().await;
    if !tokens.is_signed_in().await {
        warning!("Not signed in.");
        return;
    }

    match tokens.sign_out().await {
        Ok(()) => success!("Signed out."),
        Err(e) => error!("Failed to remove stored credential: {}", e),
    }
}
