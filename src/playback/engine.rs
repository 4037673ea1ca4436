use tokio::time::Instant;

use crate::types::PlaybackItem;

/// A single-pass media engine over a fixed list of items.
///
/// Engines start paused on item 0. Once the last item has played out the
/// engine is exhausted; the session builds a new one instead of rewinding.
pub trait MediaEngine: Send {
    fn play(&mut self);
    fn pause(&mut self);
    /// Whether the current item is loaded and its elapsed time is meaningful.
    fn is_ready(&self) -> bool;
    fn elapsed(&self) -> f64;
    fn seek(&mut self, seconds: f64);
    /// Makes `index` the current item at time zero. Play state is kept.
    fn select(&mut self, index: usize);
    fn has_finished_item(&self) -> bool;
    fn release(&mut self);
}

pub trait EngineFactory: Send + Sync {
    fn create(&self, items: &[PlaybackItem]) -> Box<dyn MediaEngine>;
}

/// Silent engine that plays each item for its duration against the tokio clock.
pub struct ClockEngine {
    durations: Vec<f64>,
    current: usize,
    position: f64,
    resumed_at: Option<Instant>,
    released: bool,
}

impl ClockEngine {
    pub fn new(items: &[PlaybackItem]) -> Self {
        Self {
            durations: items.iter().map(|item| item.duration_seconds.max(0.0)).collect(),
            current: 0,
            position: 0.0,
            resumed_at: None,
            released: false,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    fn duration(&self) -> f64 {
        self.durations.get(self.current).copied().unwrap_or(0.0)
    }

    fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }
}

impl MediaEngine for ClockEngine {
    fn play(&mut self) {
        if self.is_ready() && !self.is_running() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        if self.is_running() {
            self.position = self.elapsed();
            self.resumed_at = None;
        }
    }

    fn is_ready(&self) -> bool {
        !self.released && self.current < self.durations.len()
    }

    fn elapsed(&self) -> f64 {
        let running = self
            .resumed_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.position + running).min(self.duration())
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds.clamp(0.0, self.duration());
        if self.is_running() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn select(&mut self, index: usize) {
        if index >= self.durations.len() {
            return;
        }
        self.current = index;
        self.position = 0.0;
        if self.is_running() {
            self.resumed_at = Some(Instant::now());
        }
    }

    /// A zero-length item is finished as soon as it plays.
    fn has_finished_item(&self) -> bool {
        if !self.is_ready() {
            return false;
        }
        if self.duration() <= 0.0 {
            return self.is_running();
        }
        self.elapsed() >= self.duration()
    }

    fn release(&mut self) {
        self.resumed_at = None;
        self.position = 0.0;
        self.durations.clear();
        self.released = true;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ClockEngineFactory;

impl EngineFactory for ClockEngineFactory {
    fn create(&self, items: &[PlaybackItem]) -> Box<dyn MediaEngine> {
        Box::new(ClockEngine::new(items))
    }
}
