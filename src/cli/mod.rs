//! # CLI Module
//!
//! User-facing commands. Each command builds the services it needs once
//! (token manager, API client, player) and hands them to the layers below;
//! nothing is held in global state.
//!
//! ## Commands
//!
//! - [`auth`] - interactive sign-in through the browser
//! - [`logout`] - forget the stored credential
//! - [`token`] - show the credential's expiry, optionally fetching a valid token
//! - [`play`] - play a track, album, playlist or recommendations
//! - [`home`] - new releases, featured playlists and recommendations
//!
//! ## Error handling
//!
//! Commands print through the `info!`/`success!`/`warning!` macros and end
//! with `error!` only for failures the user has to act on, such as a refresh
//! failure that requires signing in again.

mod auth;
mod home;
mod play;
mod token;

pub use auth::auth;
pub use auth::logout;
pub use home::home;
pub use play::PlayTarget;
pub use play::play;
pub use token::token;

use std::sync::Arc;

use crate::{
    error,
    management::{FileCredentialStore, TokenManager},
    spotify::{api::ApiClient, auth::SpotifyTokenEndpoint},
};

async fn load_tokens() -> TokenManager {
    let endpoint = match SpotifyTokenEndpoint::from_config() {
        Ok(endpoint) => Arc::new(endpoint),
        Err(e) => error!("Configuration error: {}", e),
    };

    match TokenManager::load(endpoint, Arc::new(FileCredentialStore::default())).await {
        Ok(tokens) => tokens,
        Err(e) => error!("Failed to load credentials: {}", e),
    }
}

async fn signed_in_client() -> ApiClient {
    let tokens = load_tokens().await;
    if !tokens.is_signed_in().await {
        error!("Not signed in. Please run sporlplay auth");
    }
    ApiClient::from_config(tokens)
}
