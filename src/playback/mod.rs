//! # Playback Module
//!
//! Preview playback for the player screen.
//!
//! - [`session`] - the transport state machine. Single-track playback is a
//!   queue of length one; next/previous/end-of-item keep the index inside the
//!   queue and a finished queue wraps to its start, paused.
//! - [`engine`] - the media engine seam and the clock-driven engine used by
//!   the CLI.
//! - [`sync`] - the [`Player`] facade that owns the once-per-second ticker
//!   feeding elapsed time and engine events back to the UI.
//!
//! UI updates flow through [`PlaybackDelegate`]; the session never reaches
//! into the UI directly.

pub mod engine;
pub mod session;
pub mod sync;

pub use engine::{ClockEngine, ClockEngineFactory, EngineFactory, MediaEngine};
pub use session::{PlaybackDelegate, PlaybackMode, PlaybackSession};
pub use sync::{Player, TICK_INTERVAL};
