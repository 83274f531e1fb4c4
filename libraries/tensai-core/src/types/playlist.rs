/// Playlist domain type
use crate::types::{PlaylistId, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-defined ordered list of library items
///
/// Songs are stored by id; a playlist never contains the same id twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Ordered song ids
    #[serde(default)]
    pub songs: Vec<TrackId>,

    /// Cover image (data URL or path)
    #[serde(default)]
    pub cover: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new, empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            songs: Vec::new(),
            cover: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the playlist already holds this track
    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.songs.iter().any(|id| id == track_id)
    }

    /// Append a track unless already present
    ///
    /// Returns `true` if the playlist changed.
    pub fn add_track(&mut self, track_id: TrackId) -> bool {
        if self.contains(&track_id) {
            return false;
        }
        self.songs.push(track_id);
        true
    }

    /// Remove a track
    ///
    /// Returns `true` if the playlist changed.
    pub fn remove_track(&mut self, track_id: &TrackId) -> bool {
        match self.songs.iter().position(|id| id == track_id) {
            Some(index) => {
                self.songs.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the playlist has no songs
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
