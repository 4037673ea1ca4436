use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config,
    management::{AuthError, TokenManager},
    types::{
        AlbumDetailsResponse, AlbumRef, FeaturedPlaylistsResponse, GenresResponse,
        NewReleasesResponse, PlaybackItem, PlaylistDetailsResponse, PlaylistRef,
        RecommendationsResponse, Track,
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Spotify API returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl ApiError {
    pub fn requires_sign_in(&self) -> bool {
        match self {
            ApiError::Auth(e) => e.requires_sign_in(),
            ApiError::Status { status, .. } => *status == 401,
            ApiError::Request(_) => false,
        }
    }
}

/// Authenticated access to the Spotify Web API.
///
/// Every request asks the [`TokenManager`] for a valid token first, so callers
/// never handle expiry themselves.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenManager,
}

impl ApiClient {
    pub fn new(base_url: String, tokens: TokenManager) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn from_config(tokens: TokenManager) -> Self {
        Self::new(config::spotify_apiurl(), tokens)
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.tokens.get_valid_token().await?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn track_item(&self, id: &str) -> Result<PlaybackItem, ApiError> {
        let track: Track = self.get(&format!("/tracks/{id}")).await?;
        Ok(PlaybackItem::from_track(&track, None))
    }

    pub async fn album_items(&self, id: &str) -> Result<Vec<PlaybackItem>, ApiError> {
        let album: AlbumDetailsResponse = self.get(&format!("/albums/{id}")).await?;
        let album_ref = album.as_album_ref();
        Ok(playable_items(
            album.tracks.items.iter(),
            Some(&album_ref),
        ))
    }

    pub async fn playlist_items(&self, id: &str) -> Result<Vec<PlaybackItem>, ApiError> {
        let playlist: PlaylistDetailsResponse = self.get(&format!("/playlists/{id}")).await?;
        Ok(playable_items(
            playlist.tracks.items.iter().filter_map(|entry| entry.track.as_ref()),
            None,
        ))
    }

    pub async fn genre_seeds(&self) -> Result<Vec<String>, ApiError> {
        let genres: GenresResponse = self
            .get("/recommendations/available-genre-seeds")
            .await?;
        Ok(genres.genres)
    }

    /// No seeds means no recommendations; the API rejects an empty seed list.
    pub async fn recommendation_items(&self, seeds: &[String]) -> Result<Vec<PlaybackItem>, ApiError> {
        if seeds.is_empty() {
            return Ok(Vec::new());
        }
        let response: RecommendationsResponse = self
            .get(&format!(
                "/recommendations?limit=100&seed_genres={}",
                seeds.join(",")
            ))
            .await?;
        Ok(playable_items(response.tracks.iter(), None))
    }

    pub async fn new_releases(&self) -> Result<Vec<AlbumRef>, ApiError> {
        let response: NewReleasesResponse = self.get("/browse/new-releases?limit=50").await?;
        Ok(response.albums.items)
    }

    pub async fn featured_playlists(&self) -> Result<Vec<PlaylistRef>, ApiError> {
        let response: FeaturedPlaylistsResponse =
            self.get("/browse/featured-playlists?limit=20").await?;
        Ok(response.playlists.items)
    }
}

/// Keeps only tracks with a preview; the player never sees the rest.
pub fn playable_items<'a>(
    tracks: impl Iterator<Item = &'a Track>,
    album: Option<&AlbumRef>,
) -> Vec<PlaybackItem> {
    tracks
        .map(|track| PlaybackItem::from_track(track, album))
        .filter(PlaybackItem::is_playable)
        .collect()
}
