//! Session history tracking
//!
//! Maintains a bounded, deduplicated list of recently played tracks

use std::collections::VecDeque;
use std::sync::Arc;
use tensai_core::{Track, TrackId};

/// Recently played tracks
///
/// Most recent at the front. Replaying a track moves it to the front instead
/// of adding a second entry; past the bound the oldest entry is discarded.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = front)
    tracks: VecDeque<Arc<Track>>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a successfully activated track
    pub fn record(&mut self, track: Arc<Track>) {
        if self.max_size == 0 {
            return;
        }

        if let Some(existing) = self.tracks.iter().position(|t| t.id == track.id) {
            self.tracks.remove(existing);
        }
        self.tracks.push_front(track);
        self.tracks.truncate(self.max_size);
    }

    /// Most recently played track
    pub fn latest(&self) -> Option<&Arc<Track>> {
        self.tracks.front()
    }

    /// Whether a track id is present
    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    /// All entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.tracks.iter()
    }

    /// Entry ids, most recent first
    pub fn ids(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id.clone()).collect()
    }

    /// Get number of tracks in history
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(10)
    }
}
