//! Transport: the single output the controller drives
//!
//! The platform side plugs in through two traits:
//! - [`SourceResolver`] turns a track's locator into a playable handle
//! - [`OutputSink`] decodes/renders an opened handle
//!
//! Every load mints a fresh [`LoadToken`]. The sink reports progress and
//! terminal events through an [`EventEmitter`] stamped with that token, so
//! the controller can tell events of the current load from leftovers of a
//! superseded one.

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tensai_core::{SourceLocator, Track};
use tokio::sync::mpsc;

/// Identifies one load of the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadToken(u64);

impl LoadToken {
    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened on the output
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEventKind {
    /// Periodic position report
    Progress {
        position: Duration,
        duration: Option<Duration>,
    },

    /// Output started rendering
    Started,

    /// Output paused
    Paused,

    /// Reached the end of the media
    Ended,

    /// Output failed mid-playback
    Error(String),
}

/// Event reported by the output for a specific load
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub token: LoadToken,
    pub kind: TransportEventKind,
}

/// Sends events for one load back to the controller
#[derive(Debug, Clone)]
pub struct EventEmitter {
    token: LoadToken,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl EventEmitter {
    /// Create an emitter for `token`
    pub fn new(token: LoadToken, tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { token, tx }
    }

    /// Load this emitter reports for
    pub fn token(&self) -> LoadToken {
        self.token
    }

    /// Send an event; returns `false` once the controller is gone
    pub fn emit(&self, kind: TransportEventKind) -> bool {
        self.tx
            .send(TransportEvent {
                token: self.token,
                kind,
            })
            .is_ok()
    }

    pub fn progress(&self, position: Duration, duration: Option<Duration>) -> bool {
        self.emit(TransportEventKind::Progress { position, duration })
    }

    pub fn started(&self) -> bool {
        self.emit(TransportEventKind::Started)
    }

    pub fn paused(&self) -> bool {
        self.emit(TransportEventKind::Paused)
    }

    pub fn ended(&self) -> bool {
        self.emit(TransportEventKind::Ended)
    }

    pub fn error(&self, reason: impl Into<String>) -> bool {
        self.emit(TransportEventKind::Error(reason.into()))
    }
}

/// Playable handle produced by a [`SourceResolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    /// Locator the handle was resolved from
    pub locator: SourceLocator,

    /// Address the sink opens (file path, URL, blob reference)
    pub uri: String,

    /// Handle must be released when superseded
    pub transient: bool,
}

/// Metadata primed by the sink on open
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaInfo {
    /// Media duration, if known
    pub duration: Option<Duration>,
}

/// Resolves track locators into playable handles
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve a locator; failure means the source is unreadable
    async fn resolve(&self, locator: &SourceLocator) -> tensai_core::Result<MediaHandle>;

    /// Release a transient handle
    async fn release(&self, handle: &MediaHandle);
}

/// Audio/video output
///
/// `open` and `play` are the only operations that complete asynchronously.
/// Everything the sink reports afterwards goes through the emitter handed to
/// `open`.
#[async_trait]
pub trait OutputSink: Send {
    /// Open a handle and prime its metadata
    async fn open(&mut self, handle: &MediaHandle, events: EventEmitter) -> Result<MediaInfo>;

    /// Start or resume rendering; may be refused by the platform
    async fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Jump to a position already clamped to the media
    fn seek(&mut self, position: Duration);

    /// Set volume, already clamped to `[0, 1]`
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;

    fn duration(&self) -> Option<Duration>;

    fn is_paused(&self) -> bool;

    /// Stop rendering and drop the open handle
    fn close(&mut self);
}

#[derive(Debug)]
struct LoadedMedia {
    token: LoadToken,
    track: Arc<Track>,
    handle: MediaHandle,
    duration: Option<Duration>,
}

/// Drives one output sink
///
/// Holds at most one loaded media session. Loading replaces the session: the
/// previous one is closed and its transient handle released before the new
/// locator is resolved.
pub struct Transport {
    sink: Box<dyn OutputSink>,
    resolver: Arc<dyn SourceResolver>,
    events: mpsc::UnboundedSender<TransportEvent>,
    loaded: Option<LoadedMedia>,
    last_token: u64,
    volume: f32,
}

impl Transport {
    /// Create a transport and the receiver its events arrive on
    pub fn new(
        sink: Box<dyn OutputSink>,
        resolver: Arc<dyn SourceResolver>,
        volume: f32,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let transport = Self {
            sink,
            resolver,
            events,
            loaded: None,
            last_token: 0,
            volume: clamp_volume(volume, 1.0),
        };
        (transport, rx)
    }

    /// Load a track, superseding whatever was loaded
    ///
    /// Returns the token its events will carry. Failures leave nothing loaded
    /// and are reported as [`PlaybackError::SourceUnreadable`].
    pub async fn load(&mut self, track: Arc<Track>) -> Result<LoadToken> {
        self.last_token += 1;
        let token = LoadToken(self.last_token);

        self.release().await;

        let unreadable = |reason: String| PlaybackError::SourceUnreadable {
            track_id: track.id.clone(),
            reason,
        };

        let handle = self
            .resolver
            .resolve(&track.source)
            .await
            .map_err(|e| unreadable(e.to_string()))?;

        let emitter = EventEmitter::new(token, self.events.clone());
        let info = match self.sink.open(&handle, emitter).await {
            Ok(info) => info,
            Err(e) => {
                if handle.transient {
                    self.resolver.release(&handle).await;
                }
                return Err(match e {
                    PlaybackError::SourceUnreadable { .. } => e,
                    other => unreadable(other.to_string()),
                });
            }
        };

        self.sink.set_volume(self.volume);
        tracing::debug!(%token, track = %track.id, "Loaded track");

        self.loaded = Some(LoadedMedia {
            token,
            duration: info.duration.or_else(|| track.duration_hint()),
            track,
            handle,
        });
        Ok(token)
    }

    /// Start or resume playback of the loaded track
    pub async fn play(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }

        self.sink.play().await.map_err(|e| match e {
            PlaybackError::PlaybackRejected { .. } => e,
            other => PlaybackError::PlaybackRejected {
                reason: other.to_string(),
            },
        })
    }

    /// Pause the loaded track
    pub fn pause(&mut self) -> Result<()> {
        if self.loaded.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        self.sink.pause();
        Ok(())
    }

    /// Seek, clamped to `[0, duration]`
    ///
    /// No-op when nothing is loaded or the duration is unknown. Returns the
    /// position actually applied.
    pub fn seek(&mut self, position: Duration) -> Option<Duration> {
        let duration = self.known_duration()?;
        let target = position.min(duration);
        self.sink.seek(target);
        Some(target)
    }

    /// Jump back to the start of the loaded track
    ///
    /// Unlike [`seek`](Self::seek) this works with an unknown duration.
    pub fn restart(&mut self) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        self.sink.seek(Duration::ZERO);
        true
    }

    /// Seek to a fraction of the duration, clamped to `[0, 1]`
    pub fn seek_percent(&mut self, fraction: f64) -> Option<Duration> {
        let duration = self.known_duration()?;
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.seek(duration.mul_f64(fraction))
    }

    /// Set volume, clamped to `[0, 1]`; returns the applied value
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume, self.volume);
        self.sink.set_volume(self.volume);
        self.volume
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Elapsed time of the loaded track
    pub fn current_time(&self) -> Duration {
        if self.loaded.is_some() {
            self.sink.position()
        } else {
            Duration::ZERO
        }
    }

    /// Duration of the loaded track, if known
    pub fn duration(&self) -> Option<Duration> {
        let loaded = self.loaded.as_ref()?;
        self.sink.duration().or(loaded.duration)
    }

    pub fn is_paused(&self) -> bool {
        self.loaded.is_none() || self.sink.is_paused()
    }

    /// Track last successfully loaded
    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.loaded.as_ref().map(|l| &l.track)
    }

    /// Token of the current load
    pub fn token(&self) -> Option<LoadToken> {
        self.loaded.as_ref().map(|l| l.token)
    }

    /// Tear down the loaded session, releasing a transient handle
    pub async fn release(&mut self) {
        let Some(loaded) = self.loaded.take() else {
            return;
        };

        self.sink.close();
        if loaded.handle.transient {
            self.resolver.release(&loaded.handle).await;
        }
        tracing::debug!(token = %loaded.token, "Released media session");
    }

    fn known_duration(&self) -> Option<Duration> {
        self.duration().filter(|d| !d.is_zero())
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("loaded", &self.loaded)
            .field("last_token", &self.last_token)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

fn clamp_volume(volume: f32, fallback: f32) -> f32 {
    if volume.is_nan() {
        fallback
    } else {
        volume.clamp(0.0, 1.0)
    }
}
