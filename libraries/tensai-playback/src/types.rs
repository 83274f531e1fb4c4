//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// No track loaded
    Idle,

    /// Resolving and opening a track
    Loading,

    /// Currently playing
    Playing,

    /// Loaded, not playing
    Paused,

    /// Reached the end of the loaded track
    Ended,

    /// Load or play failed; waits for the next intent
    Error,
}

impl TransportState {
    /// Whether a track is loaded in this state
    pub fn has_loaded_track(&self) -> bool {
        matches!(
            self,
            TransportState::Playing | TransportState::Paused | TransportState::Ended
        )
    }
}

/// Shuffle and repeat flags
///
/// `repeat` on a single-item queue loops that item; on a longer queue it
/// wraps to the start after the last item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackModes {
    /// Traverse the queue through a shuffle order
    pub shuffle: bool,

    /// Loop single track / wrap queue
    pub repeat: bool,
}

/// Configuration for the transport controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 10)
    pub history_size: usize,

    /// Initial volume (0.0-1.0, default: 0.7)
    pub volume: f32,

    /// Advance to the next queue item when a track ends (default: true)
    pub auto_play_next: bool,

    /// Reserved, not implemented (default: false)
    pub gapless_playback: bool,

    /// Elapsed time after which "previous" restarts the track (default: 3s)
    #[serde(with = "duration_secs")]
    pub restart_threshold: Duration,

    /// Initial modes (default: both off)
    pub modes: PlaybackModes,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 10,
            volume: 0.7,
            auto_play_next: true,
            gapless_playback: false,
            restart_threshold: Duration::from_secs(3),
            modes: PlaybackModes::default(),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|e| {
            serde::de::Error::custom(format!("duration must be a non-negative number of seconds: {e}"))
        })
    }
}
