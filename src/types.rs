use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

/// Lead time before expiry at which a bearer token is treated as due for refresh.
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// Length of a Spotify preview clip.
pub const PREVIEW_CLIP_SECONDS: f64 = 30.0;

/// Body returned by the token endpoint for both grant types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub token_type: String,
}

/// Cached OAuth credential.
///
/// `access_token` and `expires_at` are always replaced together. The refresh
/// token survives a refresh response that does not carry a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn issued(
        response: TokenResponse,
        previous_refresh_token: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh_token),
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

/// Sign-in in progress, shared between the CLI and the callback server.
#[derive(Debug, Clone)]
pub struct PendingSignIn {
    pub code_verifier: String,
    pub state: String,
    pub outcome: Option<Result<(), String>>,
}

/// A playable entry as the player sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackItem {
    pub id: String,
    pub preview_url: Option<String>,
    pub duration_seconds: f64,
    pub display_name: String,
    pub display_subtitle: String,
    pub artwork_url: Option<String>,
}

impl PlaybackItem {
    pub fn is_playable(&self) -> bool {
        self.preview_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Builds an item from a track, falling back to `album` for artwork when
    /// the track is a simplified album track.
    pub fn from_track(track: &Track, album: Option<&AlbumRef>) -> Self {
        let artwork_url = track
            .album
            .as_ref()
            .or(album)
            .and_then(|a| a.images.first())
            .map(|image| image.url.clone());

        Self {
            id: track.id.clone().unwrap_or_default(),
            preview_url: track.preview_url.clone(),
            duration_seconds: (track.duration_ms as f64 / 1000.0).min(PREVIEW_CLIP_SECONDS),
            display_name: track.name.clone(),
            display_subtitle: track
                .artists
                .first()
                .map(|artist| artist.name.clone())
                .unwrap_or_default(),
            artwork_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: u64,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumDetailsResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub tracks: Page<Track>,
}

impl AlbumDetailsResponse {
    pub fn as_album_ref(&self) -> AlbumRef {
        AlbumRef {
            id: self.id.clone(),
            name: self.name.clone(),
            images: self.images.clone(),
            artists: self.artists.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDetailsResponse {
    pub id: String,
    pub name: String,
    pub tracks: Page<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReleasesResponse {
    pub albums: Page<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedPlaylistsResponse {
    pub playlists: Page<PlaylistRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<Track>,
}

#[derive(Tabled)]
pub struct QueueTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artist: String,
    pub length: String,
}

impl QueueTableRow {
    pub fn from_item(position: usize, item: &PlaybackItem) -> Self {
        Self {
            position,
            name: item.display_name.clone(),
            artist: item.display_subtitle.clone(),
            length: utils::format_time(item.duration_seconds),
        }
    }
}

#[derive(Tabled)]
pub struct FeedTableRow {
    pub name: String,
    pub detail: String,
}
