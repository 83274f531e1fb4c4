//! Library provider contract and in-memory library
//!
//! The playback engine asks a `LibraryProvider` for `Arc<Track>` references;
//! it never owns or mutates library entries.

use crate::error::{CoreError, Result};
use crate::types::{Playlist, PlaylistId, Track, TrackId};
use std::sync::{Arc, RwLock};

/// Source of playable items and playlists
pub trait LibraryProvider: Send + Sync {
    /// Look up a track by id
    fn track(&self, id: &TrackId) -> Option<Arc<Track>>;

    /// All tracks in library order
    fn tracks(&self) -> Vec<Arc<Track>>;

    /// Look up a playlist by id
    fn playlist(&self, id: &PlaylistId) -> Option<Playlist>;

    /// All library items rotated so `id` comes first
    ///
    /// Backs "play this item now": the item plays, then the rest of the
    /// library follows in order, wrapping around.
    fn rotated_from(&self, id: &TrackId) -> Option<Vec<Arc<Track>>> {
        let mut tracks = self.tracks();
        let index = tracks.iter().position(|t| &t.id == id)?;
        tracks.rotate_left(index);
        Some(tracks)
    }

    /// Ordered songs of a playlist
    ///
    /// Song ids no longer present in the library are skipped.
    fn playlist_tracks(&self, id: &PlaylistId) -> Option<Vec<Arc<Track>>> {
        let playlist = self.playlist(id)?;
        Some(
            playlist
                .songs
                .iter()
                .filter_map(|song| self.track(song))
                .collect(),
        )
    }
}

/// In-memory library: tracks in insertion order plus playlists
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    tracks: Vec<Arc<Track>>,
    playlists: Vec<Playlist>,
}

impl MediaLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from persisted parts
    pub fn from_parts(tracks: Vec<Track>, playlists: Vec<Playlist>) -> Self {
        Self {
            tracks: tracks.into_iter().map(Arc::new).collect(),
            playlists,
        }
    }

    /// Add a track, returning its id
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id.clone();
        self.tracks.push(Arc::new(track));
        id
    }

    /// Remove a track from the library and from every playlist
    ///
    /// Returns the removed track and the ids of playlists that changed.
    pub fn remove_track(&mut self, id: &TrackId) -> Result<(Arc<Track>, Vec<PlaylistId>)> {
        let index = self
            .tracks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;
        let track = self.tracks.remove(index);

        let changed = self
            .playlists
            .iter_mut()
            .filter_map(|p| p.remove_track(id).then(|| p.id.clone()))
            .collect();

        Ok((track, changed))
    }

    /// Rename a track
    ///
    /// Tracks are shared immutably, so the entry is replaced by an updated copy.
    pub fn rename_track(&mut self, id: &TrackId, name: impl Into<String>) -> Result<Arc<Track>> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::invalid_input("track name is empty"));
        }
        let slot = self
            .tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;

        let mut updated = Track::clone(slot);
        updated.name = name.trim().to_string();
        *slot = Arc::new(updated);
        Ok(Arc::clone(slot))
    }

    /// Create an empty playlist
    pub fn create_playlist(&mut self, name: impl Into<String>) -> Result<PlaylistId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::invalid_input("playlist name is empty"));
        }
        let playlist = Playlist::new(name.trim());
        let id = playlist.id.clone();
        self.playlists.push(playlist);
        Ok(id)
    }

    /// Add a track to a playlist (no-op if already present)
    pub fn add_to_playlist(&mut self, playlist_id: &PlaylistId, track_id: &TrackId) -> Result<bool> {
        if !self.tracks.iter().any(|t| &t.id == track_id) {
            return Err(CoreError::TrackNotFound(track_id.clone()));
        }
        let playlist = self.playlist_mut(playlist_id)?;
        Ok(playlist.add_track(track_id.clone()))
    }

    /// Remove a track from a playlist
    pub fn remove_from_playlist(
        &mut self,
        playlist_id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<bool> {
        let playlist = self.playlist_mut(playlist_id)?;
        Ok(playlist.remove_track(track_id))
    }

    /// Delete a playlist
    pub fn delete_playlist(&mut self, id: &PlaylistId) -> Result<Playlist> {
        let index = self
            .playlists
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CoreError::PlaylistNotFound(id.clone()))?;
        Ok(self.playlists.remove(index))
    }

    /// All playlists
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the library has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn playlist_mut(&mut self, id: &PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::PlaylistNotFound(id.clone()))
    }
}

impl LibraryProvider for MediaLibrary {
    fn track(&self, id: &TrackId) -> Option<Arc<Track>> {
        self.tracks.iter().find(|t| &t.id == id).cloned()
    }

    fn tracks(&self) -> Vec<Arc<Track>> {
        self.tracks.clone()
    }

    fn playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.playlists.iter().find(|p| &p.id == id).cloned()
    }
}

// Shared, editable library. A poisoned lock still holds consistent data
// because every mutation above completes before returning.
impl<L: LibraryProvider> LibraryProvider for RwLock<L> {
    fn track(&self, id: &TrackId) -> Option<Arc<Track>> {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.track(id)
    }

    fn tracks(&self) -> Vec<Arc<Track>> {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.tracks()
    }

    fn playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        let guard = self.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.playlist(id)
    }
}
