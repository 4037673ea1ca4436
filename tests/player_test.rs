use std::sync::{Arc, Mutex};
use std::time::Duration;

use sporlplay::playback::*;
use sporlplay::types::PlaybackItem;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Tick(f64),
    Item(String),
    Wrapped,
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn ticks(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Tick(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackDelegate for Recorder {
    fn on_tick(&self, elapsed_seconds: f64) {
        self.events.lock().unwrap().push(Event::Tick(elapsed_seconds));
    }

    fn on_item_changed(&self, item: &PlaybackItem) {
        self.events.lock().unwrap().push(Event::Item(item.id.clone()));
    }

    fn on_queue_wrapped(&self) {
        self.events.lock().unwrap().push(Event::Wrapped);
    }
}

fn create_test_item(id: &str, duration_seconds: f64) -> PlaybackItem {
    PlaybackItem {
        id: id.to_string(),
        preview_url: Some(format!("https://p.scdn.co/mp3-preview/{id}")),
        duration_seconds,
        display_name: format!("Track {id}"),
        display_subtitle: "Artist".to_string(),
        artwork_url: None,
    }
}

fn setup() -> (Player, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let session =
        PlaybackSession::new(Arc::new(ClockEngineFactory)).with_delegate(recorder.clone());
    (Player::new(session), recorder)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_ticker_reports_elapsed_every_second() {
    let (player, recorder) = setup();

    assert!(player.start_single(create_test_item("a", 30.0)).await);
    assert!(player.is_ticking().await);

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let ticks = recorder.ticks();
    assert_eq!(ticks.len(), 3);
    assert_close(ticks[0], 1.0);
    assert_close(ticks[1], 2.0);
    assert_close(ticks[2], 3.0);

    player.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_paused_playback_reports_frozen_time() {
    let (player, recorder) = setup();
    player.start_single(create_test_item("a", 30.0)).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    player.play_pause().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let ticks = recorder.ticks();
    let last = ticks.last().copied().unwrap();
    assert_close(last, 1.5);
    assert!(!player.session().lock().await.is_playing());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_ticks() {
    let (player, recorder) = setup();
    player
        .start_queue(vec![create_test_item("a", 30.0), create_test_item("b", 30.0)])
        .await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    player.teardown().await;
    let seen = recorder.ticks().len();

    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(recorder.ticks().len(), seen);
    assert!(!player.is_ticking().await);
    assert!(!player.session().lock().await.is_active());

    // Second teardown is harmless
    player.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_items_advance_and_queue_wraps() {
    let (player, recorder) = setup();
    player
        .start_queue(vec![create_test_item("a", 2.0), create_test_item("b", 2.0)])
        .await;

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(player.session().lock().await.current_index(), Some(1));

    tokio::time::sleep(Duration::from_secs(2)).await;
    {
        let session = player.session();
        let session = session.lock().await;
        assert_eq!(session.current_index(), Some(0));
        assert!(!session.is_playing());
        assert_eq!(session.elapsed(), 0.0);
    }

    let events = recorder.events();
    assert!(events.contains(&Event::Item("b".into())));
    assert!(events.contains(&Event::Wrapped));
    assert_eq!(events.last(), Some(&Event::Wrapped));

    // Wrapped and paused: the clock stands still
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(player.session().lock().await.elapsed(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_start_is_discarded() {
    let (player, _recorder) = setup();

    let slow = player.start_queue_with(async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok::<_, String>(vec![create_test_item("old", 30.0)])
    });
    let fast = player.start_queue_with(async {
        Ok::<_, String>(vec![create_test_item("new", 30.0)])
    });

    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow, Ok(false));
    assert_eq!(fast, Ok(true));

    let session = player.session();
    let session = session.lock().await;
    assert_eq!(session.items().len(), 1);
    assert_eq!(session.items()[0].id, "new");
}

#[tokio::test(start_paused = true)]
async fn test_teardown_during_fetch_cancels_start() {
    let (player, _recorder) = setup();

    let start = player.start_single_with(async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok::<_, String>(create_test_item("late", 30.0))
    });
    let close = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        player.teardown().await;
    };

    let (started, ()) = tokio::join!(start, close);

    assert_eq!(started, Ok(false));
    assert!(!player.session().lock().await.is_active());
    assert!(!player.is_ticking().await);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_is_returned() {
    let (player, _recorder) = setup();

    let started = player
        .start_queue_with(async { Err::<Vec<PlaybackItem>, _>("lookup failed".to_string()) })
        .await;

    assert_eq!(started, Err("lookup failed".to_string()));
    assert!(!player.is_ticking().await);
}

#[tokio::test(start_paused = true)]
async fn test_transport_commands_reach_session() {
    let (player, _recorder) = setup();
    player
        .start_queue(vec![
            create_test_item("a", 30.0),
            create_test_item("b", 30.0),
            create_test_item("c", 30.0),
        ])
        .await;

    player.next().await;
    player.next().await;
    player.previous().await;
    player.seek(10.0).await;

    let session = player.session();
    let session = session.lock().await;
    assert_eq!(session.current_index(), Some(1));
    assert!(session.is_playing());
    assert_close(session.elapsed(), 10.0);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_starts_keep_one_ticker() {
    let (player, recorder) = setup();
    let player = Arc::new(player);

    // Both starts get past their setup while the session is busy
    let busy = player.session();
    let guard = busy.lock().await;
    let first = tokio::spawn({
        let player = Arc::clone(&player);
        async move { player.start_queue(vec![create_test_item("old", 30.0)]).await }
    });
    let second = tokio::spawn({
        let player = Arc::clone(&player);
        async move { player.start_queue(vec![create_test_item("new", 30.0)]).await }
    });
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    drop(guard);

    let first = first.await.unwrap();
    let second = second.await.unwrap();
    assert!(first ^ second, "exactly one start wins");
    let winner = if first { "old" } else { "new" };
    assert_eq!(player.session().lock().await.items()[0].id, winner);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(recorder.ticks().len(), 3);

    // Nothing keeps ticking after teardown, and a fresh start ticks once a second
    player.teardown().await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(recorder.ticks().len(), 3);

    player.start_single(create_test_item("again", 30.0)).await;
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(recorder.ticks().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_newer_start_is_not_replaced_by_older_one() {
    let (player, _recorder) = setup();

    let older = player.start_queue_with(async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, String>(vec![create_test_item("older", 30.0)])
    });
    let newer = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        player.start_queue(vec![create_test_item("newer", 30.0)]).await
    };

    let (older, newer) = tokio::join!(older, newer);

    assert_eq!(older, Ok(false));
    assert!(newer);
    assert_eq!(player.session().lock().await.items()[0].id, "newer");
}

#[tokio::test(start_paused = true)]
async fn test_zero_length_item_finishes_once_playing() {
    let items = vec![create_test_item("empty", 0.0), create_test_item("b", 2.0)];
    let mut engine = ClockEngine::new(&items);

    // Paused on a zero-length item: nothing to finish yet
    assert!(!engine.has_finished_item());
    engine.play();
    assert!(engine.has_finished_item());

    engine.select(1);
    assert!(!engine.has_finished_item());
}

#[tokio::test(start_paused = true)]
async fn test_queue_moves_past_zero_length_item() {
    let (player, _recorder) = setup();
    player
        .start_queue(vec![create_test_item("empty", 0.0), create_test_item("b", 30.0)])
        .await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let session = player.session();
    let session = session.lock().await;
    assert_eq!(session.current_index(), Some(1));
    assert!(session.is_playing());
}
