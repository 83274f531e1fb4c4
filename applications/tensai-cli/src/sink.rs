//! Simulated output sink
//!
//! Renders nothing; a clock task advances the position while playing and
//! reports progress and the end of the media through the load's emitter.
//! Lets the CLI exercise the whole transport without an audio device.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tensai_playback::{EventEmitter, MediaHandle, MediaInfo, OutputSink, PlaybackError, Result};
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Clock {
    position: Duration,
    duration: Duration,
    playing: bool,
    emitter: Option<EventEmitter>,
}

/// Output sink driven by a tokio timer
#[derive(Debug)]
pub struct ClockSink {
    clock: Arc<Mutex<Clock>>,
    track_length: Duration,
    tick: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl ClockSink {
    /// Every opened item lasts `track_length`; progress is reported every `tick`
    pub fn new(track_length: Duration, tick: Duration) -> Self {
        Self {
            clock: Arc::new(Mutex::new(Clock::default())),
            track_length,
            tick: tick.max(Duration::from_millis(10)),
            ticker: None,
        }
    }

    fn clock(&self) -> MutexGuard<'_, Clock> {
        lock(&self.clock)
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn lock(clock: &Mutex<Clock>) -> MutexGuard<'_, Clock> {
    clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Tick {
    Idle,
    Report(bool),
    Detached,
}

fn advance(clock: &Mutex<Clock>, tick: Duration) -> Tick {
    let mut clock = lock(clock);
    if !clock.playing {
        return Tick::Idle;
    }
    let Some(emitter) = clock.emitter.clone() else {
        return Tick::Detached;
    };

    clock.position = (clock.position + tick).min(clock.duration);
    if clock.position >= clock.duration {
        clock.playing = false;
        Tick::Report(emitter.ended())
    } else {
        Tick::Report(emitter.progress(clock.position, Some(clock.duration)))
    }
}

async fn run_clock(clock: Arc<Mutex<Clock>>, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        match advance(&clock, tick) {
            Tick::Idle | Tick::Report(true) => {}
            Tick::Report(false) => {
                tracing::debug!("Controller gone, stopping clock");
                break;
            }
            Tick::Detached => break,
        }
    }
}

#[async_trait]
impl OutputSink for ClockSink {
    async fn open(&mut self, handle: &MediaHandle, events: EventEmitter) -> Result<MediaInfo> {
        self.stop_ticker();

        {
            let mut clock = self.clock();
            clock.position = Duration::ZERO;
            clock.duration = self.track_length;
            clock.playing = false;
            clock.emitter = Some(events);
        }

        self.ticker = Some(tokio::spawn(run_clock(Arc::clone(&self.clock), self.tick)));
        tracing::debug!(uri = %handle.uri, length = ?self.track_length, "Opened simulated output");

        Ok(MediaInfo {
            duration: Some(self.track_length),
        })
    }

    async fn play(&mut self) -> Result<()> {
        let mut clock = self.clock();
        let Some(emitter) = clock.emitter.clone() else {
            return Err(PlaybackError::PlaybackRejected {
                reason: "no media opened".to_string(),
            });
        };
        if !clock.playing {
            clock.playing = true;
            emitter.started();
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut clock = self.clock();
        if clock.playing {
            clock.playing = false;
            if let Some(emitter) = &clock.emitter {
                emitter.paused();
            }
        }
    }

    fn seek(&mut self, position: Duration) {
        self.clock().position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        tracing::trace!(volume, "Simulated volume change");
    }

    fn position(&self) -> Duration {
        self.clock().position
    }

    fn duration(&self) -> Option<Duration> {
        let clock = self.clock();
        clock.emitter.as_ref().map(|_| clock.duration)
    }

    fn is_paused(&self) -> bool {
        !self.clock().playing
    }

    fn close(&mut self) {
        self.stop_ticker();
        *self.clock() = Clock::default();
    }
}

impl Drop for ClockSink {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
