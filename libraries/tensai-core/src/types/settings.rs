/// Persisted application settings
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How imported files are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Play files from where they are
    #[default]
    Direct,

    /// Copy files into the managed library path on import
    Copy,
}

/// Settings blob stored by the persistence provider
///
/// Only `auto_play_next` influences the playback engine; `gapless_playback` is
/// reserved and carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File handling mode
    pub file_mode: FileMode,

    /// Folder watched for new media
    pub watch_folder: Option<PathBuf>,

    /// Managed library location
    pub library_path: PathBuf,

    /// Copy files on import
    pub copy_on_import: bool,

    /// Advance to the next queue item when a track ends
    pub auto_play_next: bool,

    /// Reserved
    pub gapless_playback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file_mode: FileMode::Direct,
            watch_folder: None,
            library_path: PathBuf::from("~/Music/Tensai"),
            copy_on_import: true,
            auto_play_next: true,
            gapless_playback: false,
        }
    }
}
