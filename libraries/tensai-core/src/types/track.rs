/// Track domain type
use crate::types::TrackId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Kind of playable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Audio-only item
    Audio,
    /// Video item (played through the same transport)
    Video,
}

impl MediaType {
    /// Guess the media type from a file extension
    ///
    /// `mp4` is video, everything else (including unknown extensions) is audio.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("mp4") => MediaType::Video,
            _ => MediaType::Audio,
        }
    }

    /// Lowercase label used by presentation layers
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
        }
    }
}

/// Opaque handle an external provider resolves into a playable stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SourceLocator {
    /// File on disk
    Path(PathBuf),

    /// Temporary in-memory blob reference (must be revoked after use)
    Blob(String),

    /// Remote or pre-converted URL
    Url(String),
}

impl SourceLocator {
    /// Whether resolving this locator yields a transient handle
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceLocator::Blob(_))
    }
}

/// Playable library item
///
/// Owned by the library; the playback engine holds `Arc<Track>` references only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Display name
    pub name: String,

    /// Audio or video
    pub media_type: MediaType,

    /// Where the playable stream comes from
    pub source: SourceLocator,

    /// Artist name
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Thumbnail image (data URL or path)
    #[serde(default)]
    pub thumbnail: Option<String>,

    /// Duration hint in milliseconds (the transport reports the real value)
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// When the track was added to the library
    pub added_at: DateTime<Utc>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(name: impl Into<String>, media_type: MediaType, source: SourceLocator) -> Self {
        Self {
            id: TrackId::generate(),
            name: name.into(),
            media_type,
            source,
            artist: None,
            album: None,
            thumbnail: None,
            duration_ms: None,
            added_at: Utc::now(),
        }
    }

    /// Create a track backed by a file, guessing the media type from its extension
    pub fn from_path(name: impl Into<String>, path: PathBuf) -> Self {
        let media_type = MediaType::from_path(&path);
        Self::new(name, media_type, SourceLocator::Path(path))
    }

    /// Replace the generated id (for loading persisted items)
    pub fn with_id(mut self, id: impl Into<TrackId>) -> Self {
        self.id = id.into();
        self
    }

    /// Get the duration hint as a Duration
    pub fn duration_hint(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    /// Set the duration hint from a Duration
    pub fn set_duration_hint(&mut self, duration: Duration) {
        self.duration_ms = Some(duration.as_millis() as u64);
    }
}
