//! # API Module
//!
//! HTTP endpoints served by the local callback server during sign-in.
//!
//! - [`callback`] - receives Spotify's redirect, checks the `state` value and
//!   trades the authorization code (plus PKCE verifier) for the first
//!   credential through the [`crate::management::TokenManager`].
//! - [`health`] - reports status and version.
//!
//! ```rust,ignore
//! let app = sporlplay::server::router(pending, tokens);
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
