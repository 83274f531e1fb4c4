//! User intents accepted by the transport controller

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tensai_core::{PlaylistId, TrackId};

/// A discrete request from the user-intent source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Play a library item now; the queue becomes the whole library rotated
    /// so the item is first
    PlayTrack(TrackId),

    /// Replace the queue with a playlist's songs and play from the first
    PlayPlaylist(PlaylistId),

    /// Play if paused, pause if playing; loads the current item if nothing is
    /// loaded yet
    TogglePlayPause,

    Play,

    Pause,

    Next,

    /// Restart the current track, or step back if near its start
    Previous,

    /// Seek to an absolute time
    Seek(Duration),

    /// Seek to a fraction (0.0-1.0) of the duration
    SeekPercent(f64),

    /// Set volume (0.0-1.0)
    SetVolume(f32),

    ToggleShuffle,

    ToggleRepeat,

    /// Append a library item to the queue
    AddToQueue(TrackId),

    /// Append every song of a playlist to the queue
    QueuePlaylist(PlaylistId),

    /// Remove the item at a queue slot
    RemoveFromQueue(usize),

    /// Collapse the queue to the playing item
    ClearQueue,

    /// Jump to a queue slot
    SelectQueueIndex(usize),

    /// Drop a track that was deleted from the library
    ForgetTrack(TrackId),

    /// Gate auto-advance on track end
    SetAutoPlayNext(bool),

    /// Stop playback and empty the queue and history
    Reset,
}

impl Intent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Intent::PlayTrack(_) => "play_track",
            Intent::PlayPlaylist(_) => "play_playlist",
            Intent::TogglePlayPause => "toggle_play_pause",
            Intent::Play => "play",
            Intent::Pause => "pause",
            Intent::Next => "next",
            Intent::Previous => "previous",
            Intent::Seek(_) => "seek",
            Intent::SeekPercent(_) => "seek_percent",
            Intent::SetVolume(_) => "set_volume",
            Intent::ToggleShuffle => "toggle_shuffle",
            Intent::ToggleRepeat => "toggle_repeat",
            Intent::AddToQueue(_) => "add_to_queue",
            Intent::QueuePlaylist(_) => "queue_playlist",
            Intent::RemoveFromQueue(_) => "remove_from_queue",
            Intent::ClearQueue => "clear_queue",
            Intent::SelectQueueIndex(_) => "select_queue_index",
            Intent::ForgetTrack(_) => "forget_track",
            Intent::SetAutoPlayNext(_) => "set_auto_play_next",
            Intent::Reset => "reset",
        }
    }
}
