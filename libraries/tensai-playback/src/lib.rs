//! Tensai - Playback Queue & Transport Engine
//!
//! This crate provides:
//! - Play queue with shuffle and repeat (positional, duplicates allowed)
//! - Shuffle order that never displaces the playing track
//! - Bounded, deduplicated session history
//! - Transport over a pluggable output sink and source resolver
//! - Transport controller state machine with stale-event rejection
//! - Single-task session runtime with a cloneable intent handle
//!
//! # Architecture
//!
//! The engine is platform-agnostic. Audio/video output and locator
//! resolution are supplied through the [`OutputSink`] and [`SourceResolver`]
//! traits; the library comes from any [`tensai_core::LibraryProvider`].
//!
//! Queue slots and play-order steps are separate index types
//! ([`QueuePosition`], [`TraversalCursor`]); [`ShuffleOrder`] translates
//! between them.
//!
//! # Example: Queue Model
//!
//! ```rust
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use tensai_core::Track;
//! use tensai_playback::{PlayQueue, PlaybackModes, QueuePosition};
//!
//! let tracks: Vec<_> = ["a", "b", "c"]
//!     .iter()
//!     .map(|id| Arc::new(Track::from_path(*id, PathBuf::from(format!("/m/{id}.mp3"))).with_id(*id)))
//!     .collect();
//!
//! let mut queue = PlayQueue::new(PlaybackModes { shuffle: true, repeat: false });
//! queue.set_queue(tracks, QueuePosition(1));
//!
//! // The chosen slot always plays first under shuffle
//! assert_eq!(queue.current().unwrap().id.as_str(), "b");
//! assert_eq!(queue.shuffle_order().as_slice()[0], 1);
//!
//! // The playing slot cannot be removed
//! assert!(queue.remove_at(QueuePosition(1)).is_err());
//! ```

mod controller;
mod error;
mod events;
mod history;
mod intent;
mod position;
mod queue;
mod session;
mod shuffle;
pub mod transport;
pub mod types;

// Public exports
pub use controller::{PlaybackSession, TransportController};
pub use error::{PlaybackError, Result};
pub use events::{format_time, PlaybackEvent, ProgressView, QueueEntry, QueueSnapshot};
pub use history::History;
pub use intent::Intent;
pub use position::{QueuePosition, TraversalCursor};
pub use queue::PlayQueue;
pub use session::{NullPresenter, PlayerSession, Presenter, SessionHandle, SessionStatus};
pub use shuffle::ShuffleOrder;
pub use transport::{
    EventEmitter, LoadToken, MediaHandle, MediaInfo, OutputSink, SourceResolver, Transport,
    TransportEvent, TransportEventKind,
};
pub use types::{PlaybackConfig, PlaybackModes, TransportState};
