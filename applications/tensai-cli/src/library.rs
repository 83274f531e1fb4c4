//! Library manifest import and persisted library edits
//!
//! The in-memory [`MediaLibrary`] is the source of truth for the running
//! session. Edits are applied there first and then written through to the
//! persistence provider; a failed write is logged and never rolled back.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tensai_core::{
    MediaLibrary, MediaType, PersistenceProvider, Playlist, PlaylistId, SourceLocator, Track,
    TrackId,
};

/// One item of a library manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// JSON document listing items to import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryManifest {
    #[serde(default)]
    pub tracks: Vec<ManifestEntry>,
}

impl ManifestEntry {
    fn into_track(self) -> Option<Track> {
        let source = match (self.path, self.url) {
            (Some(path), _) => SourceLocator::Path(path),
            (None, Some(url)) => SourceLocator::Url(url),
            (None, None) => return None,
        };

        let (name, media_type) = match &source {
            SourceLocator::Path(path) => (
                self.name.unwrap_or_else(|| file_stem(path)),
                MediaType::from_path(path),
            ),
            SourceLocator::Url(url) | SourceLocator::Blob(url) => (
                self.name.unwrap_or_else(|| url.clone()),
                MediaType::from_path(Path::new(url)),
            ),
        };

        let mut track = Track::new(name, media_type, source);
        if let Some(id) = self.id {
            track = track.with_id(id);
        }
        track.artist = self.artist;
        track.album = self.album;
        if let Some(secs) = self.duration_secs {
            match Duration::try_from_secs_f64(secs) {
                Ok(hint) => track.set_duration_hint(hint),
                Err(e) => tracing::warn!(track = %track.id, secs, error = %e, "Ignoring duration hint"),
            }
        }
        Some(track)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Import manifest items not yet present in the store
///
/// Items are matched by locator; returns the number of new items.
pub async fn import_manifest(store: &dyn PersistenceProvider, path: &Path) -> Result<usize> {
    let data = tokio::fs::read(path).await?;
    let manifest: LibraryManifest = serde_json::from_slice(&data)?;

    let existing: HashSet<SourceLocator> = store
        .load_library()
        .await?
        .into_iter()
        .map(|t| t.source)
        .collect();

    let mut imported = 0;
    for entry in manifest.tracks {
        let Some(track) = entry.into_track() else {
            tracing::warn!(manifest = %path.display(), "Skipping manifest entry without path or url");
            continue;
        };
        if existing.contains(&track.source) {
            continue;
        }
        store.save_track(&track).await?;
        imported += 1;
    }

    tracing::info!(imported, manifest = %path.display(), "Imported library manifest");
    Ok(imported)
}

/// Shared library with write-through persistence
#[derive(Clone)]
pub struct LibraryStore {
    library: Arc<RwLock<MediaLibrary>>,
    store: Arc<dyn PersistenceProvider>,
}

impl LibraryStore {
    /// Load the persisted library
    pub async fn load(store: Arc<dyn PersistenceProvider>) -> Result<Self> {
        let tracks = store.load_library().await?;
        let playlists = store.load_playlists().await?;
        tracing::info!(
            tracks = tracks.len(),
            playlists = playlists.len(),
            "Library loaded"
        );

        Ok(Self {
            library: Arc::new(RwLock::new(MediaLibrary::from_parts(tracks, playlists))),
            store,
        })
    }

    /// Library as seen by the playback session
    pub fn shared(&self) -> Arc<RwLock<MediaLibrary>> {
        Arc::clone(&self.library)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MediaLibrary> {
        self.library
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MediaLibrary> {
        self.library
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delete a track from the library and from every playlist
    pub async fn delete_track(&self, id: &TrackId) -> Result<Arc<Track>> {
        let (track, changed) = self.write().remove_track(id)?;

        if let Err(e) = self.store.delete_track(id).await {
            tracing::warn!(track = %id, error = %e, "Failed to persist track deletion");
        }
        for playlist_id in changed {
            self.persist_playlist(&playlist_id).await;
        }

        tracing::info!(track = %id, name = %track.name, "Track deleted");
        Ok(track)
    }

    /// Create an empty playlist
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistId> {
        let id = self.write().create_playlist(name)?;
        self.persist_playlist(&id).await;
        Ok(id)
    }

    /// Add a track to a playlist; returns false if it was already there
    pub async fn add_to_playlist(&self, playlist: &PlaylistId, track: &TrackId) -> Result<bool> {
        let added = self.write().add_to_playlist(playlist, track)?;
        if added {
            self.persist_playlist(playlist).await;
        }
        Ok(added)
    }

    /// Remove a track from a playlist; returns false if it was not there
    pub async fn remove_from_playlist(&self, playlist: &PlaylistId, track: &TrackId) -> Result<bool> {
        let removed = self.write().remove_from_playlist(playlist, track)?;
        if removed {
            self.persist_playlist(playlist).await;
        }
        Ok(removed)
    }

    /// Rename a library item
    pub async fn rename_track(&self, id: &TrackId, name: &str) -> Result<Arc<Track>> {
        let track = self.write().rename_track(id, name)?;
        if let Err(e) = self.store.save_track(&track).await {
            tracing::warn!(track = %id, error = %e, "Failed to persist rename");
        }
        tracing::info!(track = %id, name = %track.name, "Track renamed");
        Ok(track)
    }

    /// Drop every track and playlist, on disk first
    pub async fn reset(&self) -> Result<()> {
        self.store.clear_all().await?;
        *self.write() = MediaLibrary::new();
        tracing::info!("Library cleared");
        Ok(())
    }

    /// Delete a playlist
    pub async fn delete_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        let playlist = self.write().delete_playlist(id)?;
        if let Err(e) = self.store.delete_playlist(id).await {
            tracing::warn!(playlist = %id, error = %e, "Failed to persist playlist deletion");
        }
        Ok(playlist)
    }

    async fn persist_playlist(&self, id: &PlaylistId) {
        let playlist = self
            .read()
            .playlists()
            .iter()
            .find(|p| &p.id == id)
            .cloned();

        if let Some(playlist) = playlist {
            if let Err(e) = self.store.save_playlist(&playlist).await {
                tracing::warn!(playlist = %id, error = %e, "Failed to persist playlist");
            }
        }
    }
}
