use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, management::TokenManager, types::PendingSignIn};

pub fn router(state: Arc<Mutex<Option<PendingSignIn>>>, tokens: TokenManager) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(tokens))
        .layer(Extension(state))
}

pub async fn start_api_server(
    state: Arc<Mutex<Option<PendingSignIn>>>,
    tokens: TokenManager,
) -> crate::Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "callback server listening");
    axum::serve(listener, router(state, tokens)).await?;
    Ok(())
}
