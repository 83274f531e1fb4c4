/// Terminal presenter - prints playback events as status lines
use std::io::Write;
use tensai_playback::{PlaybackEvent, Presenter, QueueSnapshot, TransportState};

pub struct TerminalPresenter {
    out: Box<dyn Write + Send>,
    show_progress: bool,
}

impl TerminalPresenter {
    pub fn stdout(show_progress: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), show_progress)
    }

    pub fn new(out: Box<dyn Write + Send>, show_progress: bool) -> Self {
        Self { out, show_progress }
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, event: &PlaybackEvent) {
        let Some(line) = render(event, self.show_progress) else {
            return;
        };
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::debug!(error = %e, "Failed to write event");
        }
    }
}

/// One status line per event; `None` for events not worth printing
pub fn render(event: &PlaybackEvent, show_progress: bool) -> Option<String> {
    match event {
        PlaybackEvent::StateChanged { state } => match state {
            TransportState::Playing => Some("▶ playing".to_string()),
            TransportState::Paused => Some("⏸ paused".to_string()),
            TransportState::Idle => Some("■ stopped".to_string()),
            TransportState::Loading | TransportState::Ended | TransportState::Error => None,
        },
        PlaybackEvent::TrackChanged { name, track_id, .. } => {
            Some(format!("♪ {name} [{track_id}]"))
        }
        PlaybackEvent::TrackFinished { .. } => None,
        PlaybackEvent::Progress(view) => show_progress.then(|| {
            format!("  {} / {} ({:.0}%)", view.elapsed, view.total, view.percent)
        }),
        PlaybackEvent::VolumeChanged { volume } => {
            Some(format!("volume {:.0}%", volume * 100.0))
        }
        PlaybackEvent::ModesChanged { modes } => Some(format!(
            "shuffle {} · repeat {}",
            on_off(modes.shuffle),
            on_off(modes.repeat)
        )),
        PlaybackEvent::QueueChanged(_) | PlaybackEvent::HistoryChanged { .. } => None,
        PlaybackEvent::Error { message } => Some(format!("error: {message}")),
    }
}

/// Queue listing with the playing slot marked
pub fn render_queue(queue: &QueueSnapshot) -> String {
    if queue.is_empty() {
        return "queue is empty".to_string();
    }

    queue
        .entries
        .iter()
        .map(|entry| {
            let marker = if queue.playing == Some(entry.position) {
                '>'
            } else {
                ' '
            };
            format!(
                "{marker} {:>3}. {} [{}] ({})",
                entry.position.0,
                entry.name,
                entry.track_id,
                entry.media_type.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
