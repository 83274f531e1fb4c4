//! Session runtime
//!
//! Runs the controller on one task. Intents from any number of
//! [`SessionHandle`]s and events from the transport are interleaved by a
//! single `select!` loop, so queue mutation and transport commands never
//! overlap.

use crate::controller::TransportController;
use crate::error::{PlaybackError, Result};
use crate::events::{PlaybackEvent, ProgressView, QueueSnapshot};
use crate::intent::Intent;
use crate::transport::{OutputSink, SourceResolver, Transport, TransportEvent};
use crate::types::{PlaybackConfig, TransportState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tensai_core::{LibraryProvider, TrackId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Receives presentation events, fire-and-forget
pub trait Presenter: Send {
    fn present(&mut self, event: &PlaybackEvent);
}

/// Presenter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _event: &PlaybackEvent) {}
}

/// Point-in-time view of the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: TransportState,
    pub current_track: Option<TrackId>,
    pub queue: QueueSnapshot,
    pub history: Vec<TrackId>,
    pub progress: ProgressView,
    pub volume: f32,
    pub auto_play_next: bool,
}

impl SessionStatus {
    fn of(controller: &TransportController) -> Self {
        Self {
            state: controller.state(),
            current_track: controller.current_track().map(|t| t.id.clone()),
            queue: QueueSnapshot::of(controller.queue()),
            history: controller.history().ids(),
            progress: ProgressView::new(controller.current_time(), controller.duration()),
            volume: controller.volume(),
            auto_play_next: controller.auto_play_next(),
        }
    }
}

enum Command {
    Intent(Intent, oneshot::Sender<Result<()>>),
    Status(oneshot::Sender<SessionStatus>),
    Shutdown(oneshot::Sender<()>),
}

/// Owns the controller, its library and its presenter
pub struct PlayerSession {
    controller: TransportController,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    library: Arc<dyn LibraryProvider>,
    presenter: Box<dyn Presenter>,
}

impl PlayerSession {
    /// Assemble a session from an existing controller
    pub fn new(
        controller: TransportController,
        events: mpsc::UnboundedReceiver<TransportEvent>,
        library: Arc<dyn LibraryProvider>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            controller,
            events,
            library,
            presenter,
        }
    }

    /// Build transport, controller and session in one go
    pub fn build(
        sink: Box<dyn OutputSink>,
        resolver: Arc<dyn SourceResolver>,
        library: Arc<dyn LibraryProvider>,
        presenter: Box<dyn Presenter>,
        config: &PlaybackConfig,
    ) -> Self {
        let (transport, events) = Transport::new(sink, resolver, config.volume);
        let controller = TransportController::new(transport, config);
        Self::new(controller, events, library, presenter)
    }

    /// Start the session task
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(self.run(rx));
        (SessionHandle { tx }, task)
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!("Playback session started");

        loop {
            // Transport events already queued are handled before the next intent
            tokio::select! {
                biased;

                Some(event) = self.events.recv() => {
                    if let Err(e) = self.controller.handle_event(event).await {
                        tracing::debug!(error = %e, "Transport event handling failed");
                    }
                    self.flush_events();
                }
                command = commands.recv() => {
                    match command {
                        Some(Command::Intent(intent, reply)) => {
                            let result = self
                                .controller
                                .handle_intent(intent, self.library.as_ref())
                                .await;
                            self.flush_events();
                            // Caller may have stopped waiting
                            let _ = reply.send(result);
                        }
                        Some(Command::Status(reply)) => {
                            let _ = reply.send(SessionStatus::of(&self.controller));
                        }
                        Some(Command::Shutdown(reply)) => {
                            self.controller.shutdown().await;
                            self.flush_events();
                            let _ = reply.send(());
                            break;
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::debug!("Playback session stopped");
    }

    fn flush_events(&mut self) {
        for event in self.controller.drain_events() {
            self.presenter.present(&event);
        }
    }
}

/// Sends intents to a running session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Dispatch an intent and wait for its outcome
    pub async fn send(&self, intent: Intent) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Intent(intent, reply))
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// Current session status
    pub async fn status(&self) -> Result<SessionStatus> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Status(reply))
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Release the output and stop the session task
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Shutdown(reply))
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Whether the session task is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Intent(intent, _) => f.debug_tuple("Intent").field(intent).finish(),
            Command::Status(_) => f.write_str("Status"),
            Command::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}
