use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric, seq::IndexedRandom};
use sha2::{Digest, Sha256};

use crate::types::{PlaybackItem, QueueTableRow};

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value sent as the OAuth `state` parameter and checked on callback.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Formats elapsed seconds as `mm:ss`. Negative and non-finite input shows `00:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Picks up to `count` distinct genres at random.
pub fn pick_genre_seeds(genres: &[String], count: usize) -> Vec<String> {
    let mut rng = rand::rng();
    genres
        .choose_multiple(&mut rng, count)
        .cloned()
        .collect()
}

/// Extracts a Spotify id of the given kind from a raw id, a `spotify:<kind>:<id>`
/// URI or an `open.spotify.com/<kind>/<id>` link.
pub fn parse_spotify_id(input: &str, kind: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let uri_prefix = format!("spotify:{kind}:");
    if let Some(id) = input.strip_prefix(&uri_prefix) {
        return valid_id(id);
    }

    let path_marker = format!("/{kind}/");
    if let Some(pos) = input.find(&path_marker) {
        let rest = &input[pos + path_marker.len()..];
        let id = rest.split(['?', '/', '#']).next().unwrap_or_default();
        return valid_id(id);
    }

    if input.contains(':') || input.contains('/') {
        return None;
    }

    valid_id(input)
}

fn valid_id(id: &str) -> Option<String> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}

pub fn queue_table_rows(items: &[PlaybackItem]) -> Vec<QueueTableRow> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| QueueTableRow::from_item(i + 1, item))
        .collect()
}
