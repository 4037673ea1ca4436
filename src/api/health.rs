use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::PendingSignIn;

pub async fn health(
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingSignIn>>>>,
) -> Json<Value> {
    let sign_in = match shared_state.lock().await.as_ref().map(|p| &p.outcome) {
        None => "idle",
        Some(None) => "pending",
        Some(Some(Ok(()))) => "complete",
        Some(Some(Err(_))) => "failed",
    };

    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "sign_in": sign_in,
    }))
}
