use std::sync::Arc;

use crate::{
    playback::engine::{EngineFactory, MediaEngine},
    types::PlaybackItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Single,
    Queue,
}

/// Receives UI refreshes from the session.
pub trait PlaybackDelegate: Send + Sync {
    fn on_tick(&self, elapsed_seconds: f64);
    fn on_item_changed(&self, item: &PlaybackItem);
    fn on_queue_wrapped(&self);
    fn on_play_state_changed(&self, _is_playing: bool) {}
}

/// Transport state for one player screen.
///
/// Single-track playback is a queue of length one; the two modes differ only
/// in what they report through [`PlaybackSession::current_index`].
pub struct PlaybackSession {
    factory: Arc<dyn EngineFactory>,
    delegate: Option<Arc<dyn PlaybackDelegate>>,
    engine: Option<Box<dyn MediaEngine>>,
    mode: Option<PlaybackMode>,
    items: Vec<PlaybackItem>,
    index: usize,
    is_playing: bool,
}

impl PlaybackSession {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            delegate: None,
            engine: None,
            mode: None,
            items: Vec::new(),
            index: 0,
            is_playing: false,
        }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn PlaybackDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn PlaybackDelegate>>) {
        self.delegate = delegate;
    }

    pub fn mode(&self) -> Option<PlaybackMode> {
        self.mode
    }

    pub fn items(&self) -> &[PlaybackItem] {
        &self.items
    }

    /// Position in the queue. Single-track sessions have no index.
    pub fn current_index(&self) -> Option<usize> {
        match self.mode {
            Some(PlaybackMode::Queue) => Some(self.index),
            _ => None,
        }
    }

    pub fn current_item(&self) -> Option<&PlaybackItem> {
        self.items.get(self.index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    pub fn elapsed(&self) -> f64 {
        self.engine.as_ref().map_or(0.0, |engine| engine.elapsed())
    }

    /// Starts a single track. An item without a preview is skipped, not an error.
    pub fn start_single(&mut self, item: PlaybackItem) -> bool {
        self.teardown();
        if !item.is_playable() {
            tracing::warn!(id = %item.id, "track has no preview, nothing to play");
            return false;
        }
        self.establish(PlaybackMode::Single, vec![item]);
        true
    }

    /// Starts a queue of the playable entries of `items`, in order.
    pub fn start_queue(&mut self, items: Vec<PlaybackItem>) -> bool {
        self.teardown();
        let requested = items.len();
        let playable: Vec<PlaybackItem> = items.into_iter().filter(|i| i.is_playable()).collect();
        if playable.len() < requested {
            tracing::debug!(
                requested,
                playable = playable.len(),
                "dropped items without a preview"
            );
        }
        if playable.is_empty() {
            tracing::warn!("queue has no playable items, nothing to play");
            return false;
        }
        self.establish(PlaybackMode::Queue, playable);
        true
    }

    fn establish(&mut self, mode: PlaybackMode, items: Vec<PlaybackItem>) {
        let mut engine = self.factory.create(&items);
        engine.play();

        self.engine = Some(engine);
        self.mode = Some(mode);
        self.items = items;
        self.index = 0;
        self.is_playing = true;

        tracing::info!(?mode, items = self.items.len(), "playback started");
        self.notify_item_changed();
        self.notify_play_state();
    }

    pub fn play_pause(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if self.is_playing {
            engine.pause();
        } else {
            engine.play();
        }
        self.is_playing = !self.is_playing;
        self.notify_play_state();
    }

    /// Moves to the following item and keeps playing. On the last item this
    /// only pauses; it never wraps.
    pub fn next(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if self.index + 1 < self.items.len() {
            self.index += 1;
            engine.select(self.index);
            engine.play();
            self.notify_item_changed();
            if !self.is_playing {
                self.is_playing = true;
                self.notify_play_state();
            }
        } else if self.is_playing {
            engine.pause();
            self.is_playing = false;
            self.notify_play_state();
        }
    }

    /// Steps back one item, or restarts the first item from time zero. The
    /// play state from before the call carries over.
    pub fn previous(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if self.index > 0 {
            self.index -= 1;
            engine.select(self.index);
        } else {
            engine.seek(0.0);
        }
        if self.is_playing {
            engine.play();
        }

        self.notify_item_changed();
        self.notify_tick(0.0);
    }

    pub fn seek(&mut self, seconds: f64) {
        if let Some(engine) = self.engine.as_mut() {
            engine.seek(seconds.max(0.0));
        }
    }

    /// Engine reported the current item played out.
    ///
    /// Advances while items remain. After the last item the session wraps to
    /// a fresh engine on item 0, paused, with the elapsed display reset.
    pub fn reached_end_of_item(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if self.index + 1 < self.items.len() {
            self.index += 1;
            engine.select(self.index);
            engine.play();
            self.is_playing = true;
            self.notify_item_changed();
            return;
        }

        engine.pause();
        engine.release();
        self.engine = Some(self.factory.create(&self.items));
        self.index = 0;
        self.is_playing = false;

        tracing::info!(items = self.items.len(), "queue finished, back to the start");
        self.notify_tick(0.0);
        self.notify_item_changed();
        if let Some(delegate) = &self.delegate {
            delegate.on_queue_wrapped();
        }
        self.notify_play_state();
    }

    /// One UI-sync step: handles a finished item, otherwise reports elapsed
    /// time once the engine is ready.
    pub fn tick(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if engine.has_finished_item() {
            self.reached_end_of_item();
            return;
        }
        if !engine.is_ready() {
            return;
        }
        let elapsed = engine.elapsed();
        self.notify_tick(elapsed);
    }

    /// Releases the engine and returns to the initial state. Safe to repeat.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.pause();
            engine.release();
            tracing::debug!("playback torn down");
        }
        self.mode = None;
        self.items.clear();
        self.index = 0;
        self.is_playing = false;
    }

    fn notify_tick(&self, elapsed: f64) {
        if let Some(delegate) = &self.delegate {
            delegate.on_tick(elapsed);
        }
    }

    fn notify_item_changed(&self) {
        if let (Some(delegate), Some(item)) = (&self.delegate, self.items.get(self.index)) {
            delegate.on_item_changed(item);
        }
    }

    fn notify_play_state(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_play_state_changed(self.is_playing);
        }
    }
}
