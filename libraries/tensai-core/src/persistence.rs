//! Persistence provider contract
//!
//! Durable storage for library items, playlists and settings. Queue, shuffle,
//! repeat and history state are never persisted: a session always starts with
//! an empty queue.

use crate::error::{CoreError, Result};
use crate::types::{Playlist, PlaylistId, Settings, Track, TrackId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Durable store for library, playlists and settings
///
/// Implementations may fail; callers log failures and keep their in-memory
/// state.
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    /// Store or replace a library item
    async fn save_track(&self, track: &Track) -> Result<()>;

    /// Load all library items in insertion order
    async fn load_library(&self) -> Result<Vec<Track>>;

    /// Delete a library item
    async fn delete_track(&self, id: &TrackId) -> Result<()>;

    /// Store or replace a playlist
    async fn save_playlist(&self, playlist: &Playlist) -> Result<()>;

    /// Load all playlists
    async fn load_playlists(&self) -> Result<Vec<Playlist>>;

    /// Delete a playlist
    async fn delete_playlist(&self, id: &PlaylistId) -> Result<()>;

    /// Store settings
    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Load settings, `None` when nothing was stored yet
    async fn load_settings(&self) -> Result<Option<Settings>>;

    /// Remove everything
    async fn clear_all(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    tracks: Vec<Track>,
    playlists: BTreeMap<String, Playlist>,
    settings: Option<Settings>,
}

/// In-memory persistence provider
///
/// Useful for tests and for running without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceProvider for MemoryStore {
    async fn save_track(&self, track: &Track) -> Result<()> {
        let mut state = self.state.write().await;
        match state.tracks.iter_mut().find(|t| t.id == track.id) {
            Some(existing) => *existing = track.clone(),
            None => state.tracks.push(track.clone()),
        }
        Ok(())
    }

    async fn load_library(&self) -> Result<Vec<Track>> {
        Ok(self.state.read().await.tracks.clone())
    }

    async fn delete_track(&self, id: &TrackId) -> Result<()> {
        let mut state = self.state.write().await;
        let before = state.tracks.len();
        state.tracks.retain(|t| &t.id != id);
        if state.tracks.len() == before {
            return Err(CoreError::TrackNotFound(id.clone()));
        }
        Ok(())
    }

    async fn save_playlist(&self, playlist: &Playlist) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .playlists
            .insert(playlist.id.as_str().to_string(), playlist.clone());
        Ok(())
    }

    async fn load_playlists(&self) -> Result<Vec<Playlist>> {
        Ok(self.state.read().await.playlists.values().cloned().collect())
    }

    async fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .playlists
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| CoreError::PlaylistNotFound(id.clone()))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.state.write().await.settings = Some(settings.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>> {
        Ok(self.state.read().await.settings.clone())
    }

    async fn clear_all(&self) -> Result<()> {
        *self.state.write().await = MemoryState::default();
        Ok(())
    }
}
