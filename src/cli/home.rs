use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::signed_in_client,
    error, info,
    spotify::browse,
    types::FeedTableRow,
    utils, warning,
};

pub async fn home() {
    let api = signed_in_client().await;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Loading home feed...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let feed = browse::home_feed(&api).await;
    pb.finish_and_clear();

    for failure in &feed.failures {
        warning!("Could not load {}", failure);
    }
    if feed.is_empty() {
        error!("Home feed unavailable. If this persists, run sporlplay auth");
    }

    if let Some(albums) = &feed.new_releases {
        let rows: Vec<FeedTableRow> = albums
            .iter()
            .map(|album| FeedTableRow {
                name: album.name.clone(),
                detail: album
                    .artists
                    .iter()
                    .map(|artist| artist.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();
        info!("New releases\n{}", Table::new(rows));
    }

    if let Some(playlists) = &feed.featured_playlists {
        let rows: Vec<FeedTableRow> = playlists
            .iter()
            .map(|playlist| FeedTableRow {
                name: playlist.name.clone(),
                detail: playlist.description.clone().unwrap_or_default(),
            })
            .collect();
        info!("Featured playlists\n{}", Table::new(rows));
    }

    if let Some(tracks) = &feed.recommendations {
        info!(
            "Recommended tracks with a preview\n{}",
            Table::new(utils::queue_table_rows(tracks))
        );
    }
}
