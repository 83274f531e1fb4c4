//! Common test utilities: scripted output sink, resolver and library fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tensai_core::{CoreError, MediaLibrary, MediaType, SourceLocator, Track, TrackId};
use tensai_playback::{
    EventEmitter, History, MediaHandle, MediaInfo, OutputSink, PlayQueue, PlaybackConfig,
    PlaybackError, PlaybackEvent, PlaybackModes, PlaybackSession, Presenter, SourceResolver,
    Transport, TransportController, TransportEvent,
};
use tokio::sync::mpsc;

/// Everything the mock sink and resolver observed
#[derive(Debug, Default)]
pub struct SinkLog {
    pub opened: Vec<String>,
    pub plays: usize,
    pub pauses: usize,
    pub seeks: Vec<Duration>,
    pub closed: usize,
    pub released: Vec<String>,
    pub emitters: Vec<EventEmitter>,
    pub position: Duration,
    pub paused: bool,
    pub volume: f32,
    pub refuse_play: bool,
}

impl SinkLog {
    /// Emitter of the most recent load
    pub fn current_emitter(&self) -> EventEmitter {
        self.emitters.last().cloned().expect("nothing was opened")
    }
}

pub type SharedLog = Arc<Mutex<SinkLog>>;

/// Output sink that records commands and lets the test drive its clock
pub struct MockSink {
    log: SharedLog,
    duration: Option<Duration>,
}

#[async_trait]
impl OutputSink for MockSink {
    async fn open(
        &mut self,
        handle: &MediaHandle,
        events: EventEmitter,
    ) -> tensai_playback::Result<MediaInfo> {
        let mut log = self.log.lock().unwrap();
        log.opened.push(handle.uri.clone());
        log.emitters.push(events);
        log.position = Duration::ZERO;
        log.paused = true;
        Ok(MediaInfo {
            duration: self.duration,
        })
    }

    async fn play(&mut self) -> tensai_playback::Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.refuse_play {
            return Err(PlaybackError::PlaybackRejected {
                reason: "autoplay blocked".to_string(),
            });
        }
        log.plays += 1;
        log.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.pauses += 1;
        log.paused = true;
    }

    fn seek(&mut self, position: Duration) {
        let mut log = self.log.lock().unwrap();
        log.seeks.push(position);
        log.position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().unwrap().volume = volume;
    }

    fn position(&self) -> Duration {
        self.log.lock().unwrap().position
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.log.lock().unwrap().paused
    }

    fn close(&mut self) {
        self.log.lock().unwrap().closed += 1;
    }
}

/// Resolver that fails for paths under `/missing`
pub struct MockResolver {
    log: SharedLog,
}

#[async_trait]
impl SourceResolver for MockResolver {
    async fn resolve(&self, locator: &SourceLocator) -> tensai_core::Result<MediaHandle> {
        let uri = match locator {
            SourceLocator::Path(path) => {
                if path.starts_with("/missing") {
                    return Err(CoreError::not_found("file", path.display().to_string()));
                }
                path.display().to_string()
            }
            SourceLocator::Blob(key) | SourceLocator::Url(key) => key.clone(),
        };
        Ok(MediaHandle {
            locator: locator.clone(),
            uri,
            transient: locator.is_transient(),
        })
    }

    async fn release(&self, handle: &MediaHandle) {
        self.log.lock().unwrap().released.push(handle.uri.clone());
    }
}

/// Presenter that collects every event
#[derive(Clone, Default)]
pub struct CollectingPresenter {
    pub events: Arc<Mutex<Vec<PlaybackEvent>>>,
}

impl Presenter for CollectingPresenter {
    fn present(&mut self, event: &PlaybackEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Sink and resolver sharing one log
pub fn mock_output(duration: Option<Duration>) -> (MockSink, MockResolver, SharedLog) {
    let log: SharedLog = Arc::new(Mutex::new(SinkLog::default()));
    let sink = MockSink {
        log: Arc::clone(&log),
        duration,
    };
    let resolver = MockResolver {
        log: Arc::clone(&log),
    };
    (sink, resolver, log)
}

pub fn create_track(id: &str) -> Track {
    let path = PathBuf::from(format!("/music/{id}.mp3"));
    Track::from_path(id.to_uppercase(), path).with_id(id)
}

pub fn missing_track(id: &str) -> Track {
    let path = PathBuf::from(format!("/missing/{id}.mp3"));
    Track::new(id.to_uppercase(), MediaType::Audio, SourceLocator::Path(path)).with_id(id)
}

/// Library with the given track ids, in order
pub fn library_of(ids: &[&str]) -> MediaLibrary {
    let mut library = MediaLibrary::new();
    for id in ids {
        library.add_track(create_track(id));
    }
    library
}

pub fn id(value: &str) -> TrackId {
    TrackId::new(value)
}

/// Controller wired to the mock sink
pub struct Harness {
    pub controller: TransportController,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub log: SharedLog,
}

impl Harness {
    pub fn new(config: PlaybackConfig) -> Self {
        Self::with_duration(config, Some(Duration::from_secs(180)))
    }

    pub fn with_duration(config: PlaybackConfig, duration: Option<Duration>) -> Self {
        let (sink, resolver, log) = mock_output(duration);
        let (transport, events) = Transport::new(Box::new(sink), Arc::new(resolver), config.volume);
        let session = PlaybackSession::new(
            PlayQueue::with_seed(config.modes, 7),
            History::new(config.history_size),
        );
        let controller = TransportController::with_session(transport, session, &config);
        Self {
            controller,
            events,
            log,
        }
    }

    pub fn with_modes(modes: PlaybackModes) -> Self {
        Self::new(PlaybackConfig {
            modes,
            ..PlaybackConfig::default()
        })
    }

    /// Set the sink clock
    pub fn set_position(&self, position: Duration) {
        self.log.lock().unwrap().position = position;
    }

    /// Emitter of the most recent load
    pub fn emitter(&self) -> EventEmitter {
        self.log.lock().unwrap().current_emitter()
    }

    /// Deliver every queued transport event to the controller
    pub async fn pump(&mut self) -> Vec<tensai_playback::Result<()>> {
        let mut results = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            results.push(self.controller.handle_event(event).await);
        }
        results
    }

    pub fn current_id(&self) -> Option<String> {
        self.controller
            .current_track()
            .map(|t| t.id.as_str().to_string())
    }
}
