/// JSON file persistence - library, playlists and settings on disk
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tensai_core::{
    CoreError, PersistenceProvider, Playlist, PlaylistId, Result, Settings, Track, TrackId,
};
use tokio::fs;
use tokio::sync::Mutex;

const STATE_FILE: &str = "state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredState {
    tracks: Vec<Track>,
    playlists: Vec<Playlist>,
    settings: Option<Settings>,
}

/// Persistence provider backed by a single JSON document
///
/// Every write replaces the document through a temporary file so a crash
/// never leaves half-written state behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or create) the store in `dir`
    pub async fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).await?;
        Ok(Self {
            path: dir.join(STATE_FILE),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoredState> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredState::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, state: &StoredState) -> Result<()> {
        let data = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update<T>(&self, apply: impl FnOnce(&mut StoredState) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut state = self.read().await?;
        let value = apply(&mut state)?;
        self.write(&state).await?;
        Ok(value)
    }
}

#[async_trait]
impl PersistenceProvider for JsonFileStore {
    async fn save_track(&self, track: &Track) -> Result<()> {
        self.update(|state| {
            match state.tracks.iter_mut().find(|t| t.id == track.id) {
                Some(existing) => *existing = track.clone(),
                None => state.tracks.push(track.clone()),
            }
            Ok(())
        })
        .await
    }

    async fn load_library(&self) -> Result<Vec<Track>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.tracks)
    }

    async fn delete_track(&self, id: &TrackId) -> Result<()> {
        self.update(|state| {
            let before = state.tracks.len();
            state.tracks.retain(|t| &t.id != id);
            if state.tracks.len() == before {
                return Err(CoreError::TrackNotFound(id.clone()));
            }
            Ok(())
        })
        .await
    }

    async fn save_playlist(&self, playlist: &Playlist) -> Result<()> {
        self.update(|state| {
            match state.playlists.iter_mut().find(|p| p.id == playlist.id) {
                Some(existing) => *existing = playlist.clone(),
                None => state.playlists.push(playlist.clone()),
            }
            Ok(())
        })
        .await
    }

    async fn load_playlists(&self) -> Result<Vec<Playlist>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.playlists)
    }

    async fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        self.update(|state| {
            let before = state.playlists.len();
            state.playlists.retain(|p| &p.id != id);
            if state.playlists.len() == before {
                return Err(CoreError::PlaylistNotFound(id.clone()));
            }
            Ok(())
        })
        .await
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.update(|state| {
            state.settings = Some(settings.clone());
            Ok(())
        })
        .await
    }

    async fn load_settings(&self) -> Result<Option<Settings>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.settings)
    }

    async fn clear_all(&self) -> Result<()> {
        self.update(|state| {
            *state = StoredState::default();
            Ok(())
        })
        .await
    }
}
