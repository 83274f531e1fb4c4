//! Transport controller - the playback state machine
//!
//! Reacts to user intents and transport events by driving the play queue and
//! the transport together.
//!
//! ```text
//! Idle --load--> Loading --loaded--> Paused --play--> Playing
//! Playing <--pause/play--> Paused
//! Playing/Paused --ended--> Ended --> (restart | load next | Idle)
//! any --load/play failure--> Error
//! ```
//!
//! Only events carrying the token of the current load are acted on; events
//! from superseded loads are dropped.

use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, ProgressView, QueueSnapshot};
use crate::history::History;
use crate::intent::Intent;
use crate::position::QueuePosition;
use crate::queue::PlayQueue;
use crate::transport::{LoadToken, Transport, TransportEvent, TransportEventKind};
use crate::types::{PlaybackConfig, TransportState};
use std::sync::Arc;
use std::time::Duration;
use tensai_core::{LibraryProvider, PlaylistId, Track, TrackId};

/// Queue and history of one playback session
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub queue: PlayQueue,
    pub history: History,
}

impl PlaybackSession {
    pub fn new(queue: PlayQueue, history: History) -> Self {
        Self { queue, history }
    }
}

/// Playback state machine
#[derive(Debug)]
pub struct TransportController {
    transport: Transport,
    session: PlaybackSession,
    state: TransportState,

    /// Token of the load whose events are current
    expected: Option<LoadToken>,

    auto_play_next: bool,
    restart_threshold: Duration,

    // Event queue for the presentation layer
    pending_events: Vec<PlaybackEvent>,
}

impl TransportController {
    /// Create a controller with an empty queue
    pub fn new(transport: Transport, config: &PlaybackConfig) -> Self {
        let session = PlaybackSession::new(
            PlayQueue::new(config.modes),
            History::new(config.history_size),
        );
        Self::with_session(transport, session, config)
    }

    /// Create a controller around an existing session
    pub fn with_session(transport: Transport, session: PlaybackSession, config: &PlaybackConfig) -> Self {
        Self {
            transport,
            session,
            state: TransportState::Idle,
            expected: None,
            auto_play_next: config.auto_play_next,
            restart_threshold: config.restart_threshold,
            pending_events: Vec::new(),
        }
    }

    // ===== Intents =====

    /// Dispatch a user intent
    pub async fn handle_intent(&mut self, intent: Intent, library: &dyn LibraryProvider) -> Result<()> {
        tracing::debug!(intent = intent.name(), state = ?self.state, "Handling intent");

        match intent {
            Intent::PlayTrack(id) => self.play_track(&id, library).await,
            Intent::PlayPlaylist(id) => self.play_playlist(&id, library).await,
            Intent::TogglePlayPause => self.toggle_play_pause().await,
            Intent::Play => self.play().await,
            Intent::Pause => self.pause(),
            Intent::Next => self.next().await,
            Intent::Previous => self.previous().await,
            Intent::Seek(position) => self.seek(position),
            Intent::SeekPercent(fraction) => self.seek_percent(fraction),
            Intent::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            Intent::ToggleShuffle => {
                self.toggle_shuffle();
                Ok(())
            }
            Intent::ToggleRepeat => {
                self.toggle_repeat();
                Ok(())
            }
            Intent::AddToQueue(id) => {
                let track = library
                    .track(&id)
                    .ok_or(PlaybackError::TrackNotFound(id))?;
                self.enqueue(vec![track]);
                Ok(())
            }
            Intent::QueuePlaylist(id) => {
                let tracks = library
                    .playlist_tracks(&id)
                    .ok_or(PlaybackError::PlaylistNotFound(id))?;
                self.enqueue(tracks);
                Ok(())
            }
            Intent::RemoveFromQueue(index) => self.remove_from_queue(QueuePosition(index)).map(|_| ()),
            Intent::ClearQueue => {
                self.clear_queue();
                Ok(())
            }
            Intent::SelectQueueIndex(index) => self.select(QueuePosition(index)).await,
            Intent::ForgetTrack(id) => self.forget_track(&id),
            Intent::SetAutoPlayNext(enabled) => {
                self.set_auto_play_next(enabled);
                Ok(())
            }
            Intent::Reset => {
                self.reset().await;
                Ok(())
            }
        }
    }

    /// Play a library item now, queueing the whole library after it
    pub async fn play_track(&mut self, id: &TrackId, library: &dyn LibraryProvider) -> Result<()> {
        let tracks = library
            .rotated_from(id)
            .ok_or_else(|| PlaybackError::TrackNotFound(id.clone()))?;
        self.play_queue(tracks, QueuePosition(0)).await
    }

    /// Replace the queue with a playlist and play its first song
    pub async fn play_playlist(&mut self, id: &PlaylistId, library: &dyn LibraryProvider) -> Result<()> {
        let tracks = library
            .playlist_tracks(id)
            .ok_or_else(|| PlaybackError::PlaylistNotFound(id.clone()))?;

        if tracks.is_empty() {
            tracing::warn!(playlist = %id, "Playlist has no playable songs");
            return Ok(());
        }
        self.play_queue(tracks, QueuePosition(0)).await
    }

    /// Replace the queue and play from `start`
    pub async fn play_queue(&mut self, tracks: Vec<Arc<Track>>, start: QueuePosition) -> Result<()> {
        self.session.queue.set_queue(tracks, start);
        self.emit_queue_changed();

        match self.session.queue.current() {
            Some(track) => self.load_and_play(track).await,
            None => {
                self.stop().await;
                Ok(())
            }
        }
    }

    /// Start or resume playback
    ///
    /// With nothing loaded, loads the current queue item first.
    pub async fn play(&mut self) -> Result<()> {
        match self.state {
            TransportState::Playing => Ok(()),
            TransportState::Paused | TransportState::Ended => self.start_playback().await,
            TransportState::Idle | TransportState::Loading | TransportState::Error => {
                match self.session.queue.current() {
                    Some(track) => self.load_and_play(track).await,
                    None => Err(PlaybackError::NoTrackLoaded),
                }
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.state == TransportState::Playing {
            self.transport.pause()?;
            self.set_state(TransportState::Paused);
        }
        Ok(())
    }

    /// Pause if playing, otherwise play
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        if self.state == TransportState::Playing {
            self.pause()
        } else {
            self.play().await
        }
    }

    /// Skip to the next item in play order
    ///
    /// At the end of the queue with repeat off this is a no-op.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<()> {
        match self.session.queue.advance() {
            Some(track) => {
                self.emit_queue_changed();
                self.load_and_play(track).await
            }
            None => {
                tracing::debug!("Already at the end of the queue");
                Ok(())
            }
        }
    }

    /// Restart the current track, or go back one item
    ///
    /// Past the restart threshold the current track restarts in place and
    /// the queue cursor does not move. At the first item this is a no-op.
    pub async fn previous(&mut self) -> Result<()> {
        if self.transport.current_track().is_some()
            && self.transport.current_time() > self.restart_threshold
        {
            self.transport.restart();
            self.emit_progress();
            return Ok(());
        }

        match self.session.queue.retreat() {
            Some(track) => {
                self.emit_queue_changed();
                self.load_and_play(track).await
            }
            None => Ok(()),
        }
    }

    /// Seek to an absolute position
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.require_loaded()?;
        if self.transport.seek(position).is_some() {
            self.emit_progress();
        }
        Ok(())
    }

    /// Seek to a fraction of the duration
    pub fn seek_percent(&mut self, fraction: f64) -> Result<()> {
        self.require_loaded()?;
        if self.transport.seek_percent(fraction).is_some() {
            self.emit_progress();
        }
        Ok(())
    }

    /// Set volume (clamped to 0.0-1.0)
    pub fn set_volume(&mut self, volume: f32) {
        let volume = self.transport.set_volume(volume);
        self.pending_events.push(PlaybackEvent::VolumeChanged { volume });
    }

    /// Flip shuffle, keeping the current track; returns the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.session.queue.toggle_shuffle();
        self.emit_modes_changed();
        self.emit_queue_changed();
        enabled
    }

    /// Flip repeat; returns the new value
    pub fn toggle_repeat(&mut self) -> bool {
        let enabled = self.session.queue.toggle_repeat();
        self.emit_modes_changed();
        enabled
    }

    /// Append tracks to the end of the queue
    pub fn enqueue(&mut self, tracks: Vec<Arc<Track>>) {
        if tracks.is_empty() {
            return;
        }
        for track in tracks {
            self.session.queue.append(track);
        }
        self.emit_queue_changed();
    }

    /// Remove the item at a queue slot
    ///
    /// The playing slot cannot be removed; that is reported as
    /// [`PlaybackError::QueueInvariantViolation`].
    pub fn remove_from_queue(&mut self, position: QueuePosition) -> Result<Arc<Track>> {
        let removed = self.session.queue.remove_at(position).map_err(|e| {
            tracing::warn!(error = %e, "Queue removal rejected");
            e
        })?;
        self.emit_queue_changed();
        Ok(removed)
    }

    /// Collapse the queue to the playing item
    ///
    /// With nothing loaded the queue is emptied.
    pub fn clear_queue(&mut self) {
        if self.transport.current_track().is_some() {
            self.session.queue.clear_to_current();
        } else {
            self.session.queue.clear();
        }
        self.emit_queue_changed();
    }

    /// Jump to a queue slot and play it
    pub async fn select(&mut self, position: QueuePosition) -> Result<()> {
        let track = self.session.queue.select(position)?;
        self.emit_queue_changed();
        self.load_and_play(track).await
    }

    /// Drop a deleted library track from the queue
    ///
    /// Removes the first queue occurrence. If that is the playing slot,
    /// playback is paused and the removal is refused.
    pub fn forget_track(&mut self, id: &TrackId) -> Result<()> {
        let Some(position) = self.session.queue.position_of(id) else {
            return Ok(());
        };

        if self.session.queue.current_position() == Some(position) {
            self.pause()?;
        }
        self.remove_from_queue(position).map(|_| ())
    }

    /// Release the loaded media and go idle; the queue is kept
    pub async fn shutdown(&mut self) {
        self.stop().await;
    }

    /// Release the loaded media, then empty the queue and history
    pub async fn reset(&mut self) {
        self.stop().await;
        self.session.queue.clear();
        self.session.history.clear();
        self.emit_queue_changed();
        self.pending_events.push(PlaybackEvent::HistoryChanged {
            track_ids: Vec::new(),
        });
    }

    /// Gate auto-advance on track end
    pub fn set_auto_play_next(&mut self, enabled: bool) {
        self.auto_play_next = enabled;
    }

    // ===== Transport events =====

    /// React to an event reported by the transport
    ///
    /// Events from superseded loads are dropped without effect.
    pub async fn handle_event(&mut self, event: TransportEvent) -> Result<()> {
        if let Err(stale) = self.check_current(event.token) {
            tracing::debug!(error = %stale, kind = ?event.kind, "Dropping transport event");
            return Ok(());
        }

        match event.kind {
            TransportEventKind::Progress { position, duration } => {
                self.pending_events
                    .push(PlaybackEvent::Progress(ProgressView::new(position, duration)));
                Ok(())
            }
            TransportEventKind::Started => {
                if self.state == TransportState::Paused {
                    self.set_state(TransportState::Playing);
                }
                Ok(())
            }
            TransportEventKind::Paused => {
                if self.state == TransportState::Playing {
                    self.set_state(TransportState::Paused);
                }
                Ok(())
            }
            TransportEventKind::Ended => self.track_ended().await,
            TransportEventKind::Error(reason) => {
                let track_id = self
                    .transport
                    .current_track()
                    .map(|t| t.id.clone())
                    .unwrap_or_else(|| TrackId::new(""));
                Err(self.fail(PlaybackError::SourceUnreadable { track_id, reason }))
            }
        }
    }

    async fn track_ended(&mut self) -> Result<()> {
        if let Some(track) = self.transport.current_track() {
            let track_id = track.id.clone();
            self.pending_events.push(PlaybackEvent::TrackFinished { track_id });
        }
        self.set_state(TransportState::Ended);

        let modes = self.session.queue.modes();
        if modes.repeat && !modes.shuffle && self.session.queue.len() == 1 {
            tracing::debug!("Looping single track");
            self.transport.restart();
            return self.start_playback().await;
        }

        if self.auto_play_next {
            if let Some(track) = self.session.queue.advance() {
                self.emit_queue_changed();
                return self.load_and_play(track).await;
            }
            tracing::info!("Reached the end of the queue");
        }

        self.stop().await;
        Ok(())
    }

    fn check_current(&self, token: LoadToken) -> Result<()> {
        if self.expected == Some(token) {
            Ok(())
        } else {
            Err(PlaybackError::StaleEvent { token })
        }
    }

    // ===== Internal =====

    async fn load_and_play(&mut self, track: Arc<Track>) -> Result<()> {
        let previous_track_id = self.transport.current_track().map(|t| t.id.clone());

        // Anything the old load still reports is stale from here on
        self.expected = None;
        self.set_state(TransportState::Loading);

        let token = match self.transport.load(Arc::clone(&track)).await {
            Ok(token) => token,
            Err(e) => return Err(self.fail(e)),
        };
        self.expected = Some(token);
        self.set_state(TransportState::Paused);

        tracing::info!(track = %track.id, name = %track.name, %token, "Track activated");
        self.session.history.record(Arc::clone(&track));
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            name: track.name.clone(),
            previous_track_id,
        });
        self.pending_events.push(PlaybackEvent::HistoryChanged {
            track_ids: self.session.history.ids(),
        });

        self.start_playback().await
    }

    async fn start_playback(&mut self) -> Result<()> {
        match self.transport.play().await {
            Ok(()) => {
                self.set_state(TransportState::Playing);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Release the loaded media and go idle
    async fn stop(&mut self) {
        self.transport.release().await;
        self.expected = None;
        self.set_state(TransportState::Idle);
    }

    fn fail(&mut self, error: PlaybackError) -> PlaybackError {
        tracing::warn!(error = %error, "Playback failed");
        self.set_state(TransportState::Error);
        if error.is_user_visible() {
            self.pending_events.push(PlaybackEvent::Error {
                message: error.to_string(),
            });
        }
        error
    }

    fn require_loaded(&self) -> Result<()> {
        if self.transport.current_track().is_some() {
            Ok(())
        } else {
            Err(PlaybackError::NoTrackLoaded)
        }
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state;
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_queue_changed(&mut self) {
        let snapshot = QueueSnapshot::of(&self.session.queue);
        self.pending_events.push(PlaybackEvent::QueueChanged(snapshot));
    }

    fn emit_modes_changed(&mut self) {
        let modes = self.session.queue.modes();
        self.pending_events.push(PlaybackEvent::ModesChanged { modes });
    }

    fn emit_progress(&mut self) {
        let view = ProgressView::new(self.transport.current_time(), self.transport.duration());
        self.pending_events.push(PlaybackEvent::Progress(view));
    }

    // ===== Queries =====

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.session.queue
    }

    pub fn history(&self) -> &History {
        &self.session.history
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Track the transport has loaded
    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.transport.current_track()
    }

    pub fn current_time(&self) -> Duration {
        self.transport.current_time()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.transport.duration()
    }

    pub fn volume(&self) -> f32 {
        self.transport.volume()
    }

    pub fn auto_play_next(&self) -> bool {
        self.auto_play_next
    }

    /// Token events must carry to be acted on
    pub fn expected_token(&self) -> Option<LoadToken> {
        self.expected
    }

    // ===== Events =====

    /// Drain pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }
}
