use chrono::{Local, Utc};

use crate::{cli::load_tokens, error, info, success, warning};

/// Shows when the stored token expires. With `check`, obtains a valid token,
/// refreshing it when it is inside the refresh margin.
pub async fn token(check: bool) {
    let tokens = load_tokens().await;
    let Some(credential) = tokens.credential().await else {
        warning!("Not signed in. Please run sporlplay auth");
        return;
    };

    let now = Utc::now();
    info!(
        "Access token expires at {}",
        credential.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    if credential.refresh_token.is_none() {
        warning!("No refresh token stored; the session ends when the token expires.");
    }
    if credential.should_refresh(now) {
        info!("Token is due for refresh.");
    }

    if !check {
        return;
    }

    match tokens.get_valid_token().await {
        Ok(_) => {
            if let Some(current) = tokens.credential().await {
                success!(
                    "Token is valid until {}",
                    current.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
        Err(e) if e.requires_sign_in() => {
            error!("Token refresh failed: {}\nPlease run sporlplay auth", e)
        }
        Err(e) => error!("Token check failed: {}", e),
    }
}
