//! Playback Events
//!
//! One-way notifications for the presentation layer. The controller queues
//! them while handling an intent or transport event; the session runtime
//! drains and forwards them.

use crate::position::QueuePosition;
use crate::queue::PlayQueue;
use crate::types::{PlaybackModes, TransportState};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tensai_core::{MediaType, TrackId};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new state
        state: TransportState,
    },

    /// A track was loaded and is now current
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// Display name of the new track
        name: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track reached its end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update for the current track
    Progress(ProgressView),

    /// Volume changed
    VolumeChanged {
        /// New volume (0.0-1.0)
        volume: f32,
    },

    /// Shuffle or repeat toggled
    ModesChanged {
        /// New modes
        modes: PlaybackModes,
    },

    /// Queue contents or current slot changed
    QueueChanged(QueueSnapshot),

    /// Session history changed
    HistoryChanged {
        /// Ids, most recent first
        track_ids: Vec<TrackId>,
    },

    /// User-visible failure
    Error {
        /// Error message
        message: String,
    },
}

/// Formatted transport progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    /// Elapsed time in milliseconds
    pub position_ms: u64,

    /// Total duration in milliseconds, if known
    pub duration_ms: Option<u64>,

    /// Elapsed time as `m:ss`
    pub elapsed: String,

    /// Total duration as `m:ss` (`0:00` when unknown)
    pub total: String,

    /// Progress fill, 0-100 (0 when the duration is unknown)
    pub percent: f64,
}

impl ProgressView {
    /// Build a view from raw transport times
    pub fn new(position: Duration, duration: Option<Duration>) -> Self {
        let duration = duration.filter(|d| !d.is_zero());
        let percent = duration.map_or(0.0, |total| {
            (position.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        });

        Self {
            position_ms: millis(position),
            duration_ms: duration.map(millis),
            elapsed: format_time(position),
            total: duration.map_or_else(|| format_time(Duration::ZERO), format_time),
            percent,
        }
    }
}

/// Format a duration as `m:ss`
///
/// Minutes are not wrapped into hours: 75 minutes renders as `75:00`.
pub fn format_time(time: Duration) -> String {
    let total = time.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

fn millis(time: Duration) -> u64 {
    u64::try_from(time.as_millis()).unwrap_or(u64::MAX)
}

/// Queue entry as shown in the queue panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Slot in the queue
    pub position: QueuePosition,
    /// Track at that slot
    pub track_id: TrackId,
    /// Display name
    pub name: String,
    /// Audio or video
    pub media_type: MediaType,
}

/// Queue contents plus the slot to highlight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Entries in stored order
    pub entries: Vec<QueueEntry>,
    /// Slot currently playing or loading
    pub playing: Option<QueuePosition>,
    /// Shuffle and repeat flags
    pub modes: PlaybackModes,
}

impl QueueSnapshot {
    /// Capture a queue
    pub fn of(queue: &PlayQueue) -> Self {
        Self {
            entries: queue
                .tracks()
                .iter()
                .enumerate()
                .map(|(i, track)| QueueEntry {
                    position: QueuePosition(i),
                    track_id: track.id.clone(),
                    name: track.name.clone(),
                    media_type: track.media_type,
                })
                .collect(),
            playing: queue.current_position(),
            modes: queue.modes(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
