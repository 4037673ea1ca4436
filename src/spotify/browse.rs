use crate::{
    spotify::api::{ApiClient, ApiError},
    types::{AlbumRef, PlaybackItem, PlaylistRef},
    utils,
};

const GENRE_SEED_COUNT: usize = 5;

/// The browse screen's three sections. A section that failed to load is
/// `None` and its error is kept in `failures`.
#[derive(Debug, Default)]
pub struct HomeFeed {
    pub new_releases: Option<Vec<AlbumRef>>,
    pub featured_playlists: Option<Vec<PlaylistRef>>,
    pub recommendations: Option<Vec<PlaybackItem>>,
    pub failures: Vec<String>,
}

impl HomeFeed {
    pub fn from_results(
        new_releases: Result<Vec<AlbumRef>, ApiError>,
        featured_playlists: Result<Vec<PlaylistRef>, ApiError>,
        recommendations: Result<Vec<PlaybackItem>, ApiError>,
    ) -> Self {
        let mut failures = Vec::new();
        Self {
            new_releases: keep(new_releases, "new releases", &mut failures),
            featured_playlists: keep(featured_playlists, "featured playlists", &mut failures),
            recommendations: keep(recommendations, "recommendations", &mut failures),
            failures,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_releases.is_none()
            && self.featured_playlists.is_none()
            && self.recommendations.is_none()
    }
}

fn keep<T>(result: Result<T, ApiError>, section: &str, failures: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(section, error = %e, "home feed section failed");
            failures.push(format!("{section}: {e}"));
            None
        }
    }
}

/// Fetches every section concurrently and returns once all of them settled.
pub async fn home_feed(api: &ApiClient) -> HomeFeed {
    let (new_releases, featured_playlists, recommendations) = tokio::join!(
        api.new_releases(),
        api.featured_playlists(),
        recommended(api),
    );
    HomeFeed::from_results(new_releases, featured_playlists, recommendations)
}

/// Seeds recommendations with a handful of random genres.
pub async fn recommended(api: &ApiClient) -> Result<Vec<PlaybackItem>, ApiError> {
    let genres = api.genre_seeds().await?;
    let seeds = utils::pick_genre_seeds(&genres, GENRE_SEED_COUNT);
    api.recommendation_items(&seeds).await
}
