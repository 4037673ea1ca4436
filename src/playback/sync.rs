use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::{playback::session::PlaybackSession, types::PlaybackItem};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives a [`PlaybackSession`] from the UI: serializes transport commands,
/// runs the once-per-second ticker and resolves overlapping starts.
pub struct Player {
    session: Arc<Mutex<PlaybackSession>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl Player {
    pub fn new(session: PlaybackSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            ticker: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> Arc<Mutex<PlaybackSession>> {
        Arc::clone(&self.session)
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn start_single(&self, item: PlaybackItem) -> bool {
        let generation = self.supersede();
        self.begin(generation, |session| session.start_single(item))
            .await
    }

    pub async fn start_queue(&self, items: Vec<PlaybackItem>) -> bool {
        let generation = self.supersede();
        self.begin(generation, |session| session.start_queue(items))
            .await
    }

    /// Starts a single track once `fetch` resolves. Returns `Ok(false)` when a
    /// newer start or a teardown happened in the meantime.
    pub async fn start_single_with<F, E>(&self, fetch: F) -> Result<bool, E>
    where
        F: Future<Output = Result<PlaybackItem, E>>,
    {
        let generation = self.supersede();
        let item = fetch.await?;
        if !self.is_current(generation) {
            tracing::debug!("discarding superseded single-track start");
            return Ok(false);
        }
        Ok(self
            .begin(generation, |session| session.start_single(item))
            .await)
    }

    /// Queue counterpart of [`Player::start_single_with`].
    pub async fn start_queue_with<F, E>(&self, fetch: F) -> Result<bool, E>
    where
        F: Future<Output = Result<Vec<PlaybackItem>, E>>,
    {
        let generation = self.supersede();
        let items = fetch.await?;
        if !self.is_current(generation) {
            tracing::debug!("discarding superseded queue start");
            return Ok(false);
        }
        Ok(self
            .begin(generation, |session| session.start_queue(items))
            .await)
    }

    pub async fn play_pause(&self) {
        self.session.lock().await.play_pause();
    }

    pub async fn next(&self) {
        self.session.lock().await.next();
    }

    pub async fn previous(&self) {
        self.session.lock().await.previous();
    }

    pub async fn seek(&self, seconds: f64) {
        self.session.lock().await.seek(seconds);
    }

    /// Stops the ticker, then releases the session. Safe to repeat.
    pub async fn teardown(&self) {
        self.supersede();
        self.stop_ticker().await;
        self.session.lock().await.teardown();
    }

    fn supersede(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Replaces the running session unless a newer start or a teardown got
    /// there first.
    ///
    /// The ticker lock is held from the generation check until the new
    /// ticker is stored, so concurrent starts cannot leave a ticker behind.
    async fn begin<F>(&self, generation: u64, start: F) -> bool
    where
        F: FnOnce(&mut PlaybackSession) -> bool,
    {
        let mut ticker = self.ticker.lock().await;
        let mut session = self.session.lock().await;
        if !self.is_current(generation) {
            tracing::debug!("discarding superseded start");
            return false;
        }

        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        let started = start(&mut session);
        drop(session);

        if started {
            if let Some(stale) = ticker.replace(self.spawn_ticker()) {
                stale.abort();
            }
        }
        started
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let session = Arc::clone(&self.session);
        tokio::spawn(async move {
            let mut ticks = interval(TICK_INTERVAL);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                session.lock().await.tick();
            }
        })
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}
