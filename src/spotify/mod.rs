//! # Spotify Integration Module
//!
//! The collaborators the player core talks to: the OAuth token endpoint and
//! the typed Web API lookups.
//!
//! ## Architecture
//!
//! ```text
//! CLI (auth, play, home)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth    (token endpoint, authorize URL, sign-in flow)
//!     ├── api     (authenticated requests, track/album/playlist lookups)
//!     └── browse  (home feed, concurrent section fetches)
//!          ↓
//! management::TokenManager  (valid bearer token per request)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] signs in with the authorization-code flow. A PKCE verifier is
//! always sent; the client secret is added as a `Basic` header when one is
//! configured. Tokens are refreshed by the [`crate::management::TokenManager`]
//! five minutes before they expire, with one refresh in flight at a time.
//!
//! ## Playable items
//!
//! [`api`] turns tracks into [`crate::types::PlaybackItem`]s and drops every
//! track without a preview URL before the player sees it.
//!
//! ## Endpoints
//!
//! - `POST /api/token` - code exchange and refresh
//! - `GET /tracks/{id}`, `GET /albums/{id}`, `GET /playlists/{id}`
//! - `GET /recommendations/available-genre-seeds`, `GET /recommendations`
//! - `GET /browse/new-releases`, `GET /browse/featured-playlists`

pub mod api;
pub mod auth;
pub mod browse;
