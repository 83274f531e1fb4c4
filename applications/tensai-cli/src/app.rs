//! Command dispatch
//!
//! Routes parsed commands to the running session, the library and the
//! settings store.

use crate::commands::{Command, HELP};
use crate::error::Result;
use crate::library::LibraryStore;
use crate::presenter::render_queue;
use std::sync::Arc;
use tensai_core::{LibraryProvider, PersistenceProvider, Settings};
use tensai_playback::{format_time, Intent, PlaybackError, SessionHandle};

/// What the input loop does after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Option<String>),
    Quit,
}

pub struct App {
    handle: SessionHandle,
    library: LibraryStore,
    store: Arc<dyn PersistenceProvider>,
    settings: Settings,
}

impl App {
    pub fn new(
        handle: SessionHandle,
        library: LibraryStore,
        store: Arc<dyn PersistenceProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            handle,
            library,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run one command
    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        let output = match command {
            Command::Intent(intent) => {
                self.dispatch(intent).await?;
                None
            }
            Command::Status => Some(self.status().await?),
            Command::Queue => Some(render_queue(&self.handle.status().await?.queue)),
            Command::History => {
                let history = self.handle.status().await?.history;
                let library = self.library.read();
                let lines: Vec<String> = history
                    .iter()
                    .enumerate()
                    .map(|(i, id)| {
                        let name = library.track(id).map(|t| t.name.clone()).unwrap_or_default();
                        format!("{:>2}. {name} [{id}]", i + 1)
                    })
                    .collect();
                Some(if lines.is_empty() {
                    "no history yet".to_string()
                } else {
                    lines.join("\n")
                })
            }
            Command::Library => {
                let library = self.library.read();
                let lines: Vec<String> = library
                    .tracks()
                    .iter()
                    .map(|t| {
                        format!(
                            "{} [{}] {} ({})",
                            t.name,
                            t.id,
                            format_hint(t.duration_ms),
                            t.media_type.as_str()
                        )
                    })
                    .collect();
                Some(if lines.is_empty() {
                    "library is empty".to_string()
                } else {
                    lines.join("\n")
                })
            }
            Command::Playlists => {
                let library = self.library.read();
                let lines: Vec<String> = library
                    .playlists()
                    .iter()
                    .map(|p| format!("{} [{}] {} songs", p.name, p.id, p.len()))
                    .collect();
                Some(if lines.is_empty() {
                    "no playlists".to_string()
                } else {
                    lines.join("\n")
                })
            }
            Command::DeleteTrack(id) => {
                // The playing slot stays queued; the library entry goes anyway
                match self.handle.send(Intent::ForgetTrack(id.clone())).await {
                    Ok(()) | Err(PlaybackError::QueueInvariantViolation { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
                let track = self.library.delete_track(&id).await?;
                Some(format!("deleted {}", track.name))
            }
            Command::RenameTrack(id, name) => {
                let track = self.library.rename_track(&id, &name).await?;
                Some(format!("renamed to {}", track.name))
            }
            Command::CreatePlaylist(name) => {
                let id = self.library.create_playlist(&name).await?;
                Some(format!("created playlist {id}"))
            }
            Command::DeletePlaylist(id) => {
                let playlist = self.library.delete_playlist(&id).await?;
                Some(format!("deleted playlist {}", playlist.name))
            }
            Command::AddToPlaylist(playlist, track) => {
                let added = self.library.add_to_playlist(&playlist, &track).await?;
                Some(if added {
                    "added".to_string()
                } else {
                    "already in playlist".to_string()
                })
            }
            Command::RemoveFromPlaylist(playlist, track) => {
                let removed = self.library.remove_from_playlist(&playlist, &track).await?;
                Some(if removed {
                    "removed".to_string()
                } else {
                    "not in playlist".to_string()
                })
            }
            Command::Reset => {
                self.handle.send(Intent::Reset).await?;
                self.library.reset().await?;
                self.settings = Settings::default();
                self.handle
                    .send(Intent::SetAutoPlayNext(self.settings.auto_play_next))
                    .await?;
                Some("all data cleared".to_string())
            }
            Command::Help => Some(HELP.to_string()),
            Command::Quit => return Ok(Flow::Quit),
        };

        Ok(Flow::Continue(output))
    }

    async fn dispatch(&mut self, intent: Intent) -> Result<()> {
        let auto_play = match &intent {
            Intent::SetAutoPlayNext(enabled) => Some(*enabled),
            _ => None,
        };

        self.handle.send(intent).await?;

        if let Some(enabled) = auto_play {
            self.settings.auto_play_next = enabled;
            if let Err(e) = self.store.save_settings(&self.settings).await {
                tracing::warn!(error = %e, "Failed to persist settings");
            }
        }
        Ok(())
    }

    async fn status(&self) -> Result<String> {
        let status = self.handle.status().await?;
        let current = match &status.current_track {
            Some(id) => {
                let name = self
                    .library
                    .read()
                    .track(id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| id.to_string());
                format!("{name} [{id}]")
            }
            None => "nothing loaded".to_string(),
        };

        Ok(format!(
            "{:?}: {current}\n{} / {} · volume {:.0}% · shuffle {} · repeat {} · autoplay {}\n{} queued, {} in history",
            status.state,
            status.progress.elapsed,
            status.progress.total,
            status.volume * 100.0,
            status.queue.modes.shuffle,
            status.queue.modes.repeat,
            status.auto_play_next,
            status.queue.len(),
            status.history.len(),
        ))
    }
}

/// Duration hint for listings
fn format_hint(ms: Option<u64>) -> String {
    ms.map(|ms| format_time(std::time::Duration::from_millis(ms)))
        .unwrap_or_else(|| "-:--".to_string())
}
