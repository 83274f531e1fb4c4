//! Error types for playback management

use crate::transport::LoadToken;
use tensai_core::{CoreError, PlaylistId, TrackId};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The track's locator could not be resolved or opened
    #[error("Cannot read source for track {track_id}: {reason}")]
    SourceUnreadable { track_id: TrackId, reason: String },

    /// The output declined to start playback
    #[error("Playback rejected: {reason}")]
    PlaybackRejected { reason: String },

    /// Attempted to remove the queue slot that is currently playing
    #[error("Cannot remove queue position {index}: it is the current track")]
    QueueInvariantViolation { index: usize },

    /// A transport event arrived for a superseded load
    #[error("Stale transport event for load {token}")]
    StaleEvent { token: LoadToken },

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Library has no such track
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Library has no such playlist
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// The session task has stopped
    #[error("Playback session closed")]
    SessionClosed,

    /// Error from a core collaborator
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl PlaybackError {
    /// Whether the error should be shown to the user as a playback failure
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            PlaybackError::SourceUnreadable { .. } | PlaybackError::PlaybackRejected { .. }
        )
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
