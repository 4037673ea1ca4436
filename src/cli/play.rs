use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::signed_in_client,
    error, info,
    playback::{ClockEngineFactory, PlaybackDelegate, PlaybackSession, Player},
    spotify::{api::ApiError, browse},
    types::PlaybackItem,
    utils, warning,
};

#[derive(Debug, Clone)]
pub enum PlayTarget {
    Track(String),
    Album(String),
    Playlist(String),
    Recommended,
}

/// Renders the player screen as a progress bar.
struct ConsoleDelegate {
    bar: ProgressBar,
}

impl ConsoleDelegate {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{prefix} {msg} [{bar:30.green/white}] {pos}s / {len}s")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl PlaybackDelegate for ConsoleDelegate {
    fn on_tick(&self, elapsed_seconds: f64) {
        self.bar.set_position(elapsed_seconds.max(0.0) as u64);
    }

    fn on_item_changed(&self, item: &PlaybackItem) {
        self.bar.set_length(item.duration_seconds.ceil() as u64);
        self.bar.set_position(0);
        self.bar
            .set_message(format!("{} - {}", item.display_name, item.display_subtitle));
    }

    fn on_queue_wrapped(&self) {
        self.bar
            .println("End of queue, back to the first track. Press p to play again.");
    }

    fn on_play_state_changed(&self, is_playing: bool) {
        self.bar.set_prefix(if is_playing { "▶" } else { "⏸" });
    }
}

enum Command {
    PlayPause,
    Next,
    Previous,
    Seek(f64),
    Quit,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "p" | "play" | "pause" => Command::PlayPause,
        "n" | "next" => Command::Next,
        "b" | "back" | "prev" => Command::Previous,
        "s" | "seek" => Command::Seek(parts.next()?.parse::<f64>().ok()?),
        "q" | "quit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        _ => return None,
    };
    Some(command)
}

const HELP: &str = "p: play/pause  n: next  b: back  s <sec>: seek  q: quit";

pub async fn play(target: PlayTarget) {
    let api = signed_in_client().await;

    let delegate = Arc::new(ConsoleDelegate::new());
    let session =
        PlaybackSession::new(Arc::new(ClockEngineFactory)).with_delegate(delegate.clone());
    let player = Player::new(session);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Fetching tracks...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let started = match &target {
        PlayTarget::Track(id) => player.start_single_with(api.track_item(id)).await,
        PlayTarget::Album(id) => player.start_queue_with(api.album_items(id)).await,
        PlayTarget::Playlist(id) => player.start_queue_with(api.playlist_items(id)).await,
        PlayTarget::Recommended => player.start_queue_with(browse::recommended(&api)).await,
    };
    spinner.finish_and_clear();

    match started {
        Ok(true) => {}
        Ok(false) => {
            warning!("Nothing to play, no preview is available.");
            return;
        }
        Err(e) => report_fetch_error(e),
    }

    {
        let session = player.session();
        let session = session.lock().await;
        if session.items().len() > 1 {
            info!("Queue:\n{}", Table::new(utils::queue_table_rows(session.items())));
        }
    }
    info!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read input");
                break;
            }
        };

        match parse_command(&line) {
            Some(Command::PlayPause) => player.play_pause().await,
            Some(Command::Next) => player.next().await,
            Some(Command::Previous) => player.previous().await,
            Some(Command::Seek(seconds)) => player.seek(seconds).await,
            Some(Command::Quit) => break,
            Some(Command::Help) => delegate.bar.println(HELP),
            None => delegate.bar.println(format!("Unknown command. {HELP}")),
        }
    }

    player.teardown().await;
    delegate.bar.finish_and_clear();
}

fn report_fetch_error(e: ApiError) -> ! {
    tracing::error!(error = %e, "cannot start playback");
    if e.requires_sign_in() {
        error!("Session expired: {}\nPlease run sporlplay auth", e)
    }
    error!("Failed to fetch tracks: {}", e)
}
