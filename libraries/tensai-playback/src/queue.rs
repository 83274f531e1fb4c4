//! Play queue
//!
//! Ordered track references, a traversal cursor and the shuffle order.
//!
//! ```text
//! queue (stored order):     [A, B, C, D]      <- QueuePosition
//! shuffle order:            [2, 0, 3, 1]      <- indexed by TraversalCursor
//! cursor = 1  =>  playing queue slot 0 (A)
//! ```
//!
//! With shuffle off the cursor addresses the queue directly. All queue
//! mutation goes through this type so the cursor keeps pointing at the same
//! logical track.

use crate::error::{PlaybackError, Result};
use crate::position::{QueuePosition, TraversalCursor};
use crate::shuffle::ShuffleOrder;
use crate::types::PlaybackModes;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tensai_core::{Track, TrackId};

/// Playback queue with shuffle and repeat semantics
#[derive(Debug, Clone)]
pub struct PlayQueue {
    /// Tracks in stored order (duplicates allowed)
    tracks: Vec<Arc<Track>>,

    /// Step in play order
    cursor: TraversalCursor,

    /// Only consulted while shuffle is on
    shuffle_order: ShuffleOrder,

    modes: PlaybackModes,

    rng: StdRng,
}

impl PlayQueue {
    /// Create an empty queue
    pub fn new(modes: PlaybackModes) -> Self {
        Self::with_rng(modes, StdRng::from_entropy())
    }

    /// Create an empty queue with a deterministic shuffle source
    pub fn with_seed(modes: PlaybackModes, seed: u64) -> Self {
        Self::with_rng(modes, StdRng::seed_from_u64(seed))
    }

    fn with_rng(modes: PlaybackModes, rng: StdRng) -> Self {
        Self {
            tracks: Vec::new(),
            cursor: TraversalCursor::START,
            shuffle_order: ShuffleOrder::new(),
            modes,
            rng,
        }
    }

    /// Replace the queue wholesale
    ///
    /// `start` becomes the current slot; an out-of-range start falls back to
    /// slot 0. With shuffle on, a fresh order is generated with `start` first.
    pub fn set_queue(&mut self, tracks: Vec<Arc<Track>>, start: QueuePosition) {
        self.tracks = tracks;
        self.shuffle_order.clear();

        let start = if start.0 < self.tracks.len() {
            start
        } else {
            QueuePosition(0)
        };

        if self.modes.shuffle && !self.tracks.is_empty() {
            self.shuffle_order = ShuffleOrder::generate(self.tracks.len(), start, &mut self.rng);
            self.cursor = TraversalCursor::START;
        } else {
            self.cursor = TraversalCursor(start.0);
        }

        tracing::debug!(len = self.tracks.len(), %start, "Queue replaced");
    }

    /// Push a track to the end of the queue
    ///
    /// Under shuffle the new slot is scheduled last in traversal order.
    pub fn append(&mut self, track: Arc<Track>) -> QueuePosition {
        let position = QueuePosition(self.tracks.len());
        let order_in_sync = self.shuffle_order.is_consistent_with(self.tracks.len());

        self.tracks.push(track);
        if self.modes.shuffle && order_in_sync {
            self.shuffle_order.push(position);
        }

        position
    }

    /// Remove the track at a queue slot
    ///
    /// The playing slot cannot be removed: that reports
    /// [`PlaybackError::QueueInvariantViolation`] and leaves the queue as is.
    pub fn remove_at(&mut self, position: QueuePosition) -> Result<Arc<Track>> {
        if position.0 >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(position.0));
        }
        if self.current_position() == Some(position) {
            return Err(PlaybackError::QueueInvariantViolation {
                index: position.0,
            });
        }

        let traversing_shuffled = self.shuffle_active();
        let removed = self.tracks.remove(position.0);

        if traversing_shuffled {
            if let Some(step) = self.shuffle_order.remove(position) {
                if step < self.cursor {
                    self.cursor = TraversalCursor(self.cursor.0 - 1);
                }
            }
        } else {
            self.shuffle_order.clear();
            if position.0 < self.cursor.0 {
                self.cursor = TraversalCursor(self.cursor.0 - 1);
            }
        }

        tracing::debug!(%position, cursor = %self.cursor, "Removed queue item");
        Ok(removed)
    }

    /// Collapse the queue to the playing track, or to empty if there is none
    pub fn clear_to_current(&mut self) {
        let current = self.current();
        self.cursor = TraversalCursor::START;

        match current {
            Some(track) => {
                self.tracks = vec![track];
                self.shuffle_order = ShuffleOrder::single();
            }
            None => {
                self.tracks.clear();
                self.shuffle_order.clear();
            }
        }
    }

    /// Drop every track
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.shuffle_order.clear();
        self.cursor = TraversalCursor::START;
    }

    /// Step forward in play order
    ///
    /// At the end, wraps to the first step when repeat is on (drawing a fresh
    /// shuffle order first); otherwise returns `None` and the cursor stays.
    pub fn advance(&mut self) -> Option<Arc<Track>> {
        if self.tracks.is_empty() {
            return None;
        }
        self.ensure_shuffle_order();

        let next = self.cursor.0 + 1;
        if next < self.tracks.len() {
            self.cursor = TraversalCursor(next);
        } else if self.modes.repeat {
            if self.modes.shuffle {
                self.shuffle_order =
                    ShuffleOrder::generate(self.tracks.len(), QueuePosition(0), &mut self.rng);
            }
            self.cursor = TraversalCursor::START;
        } else {
            return None;
        }

        self.current()
    }

    /// Step back in play order; `None` at the first step (no wraparound)
    pub fn retreat(&mut self) -> Option<Arc<Track>> {
        if self.tracks.is_empty() {
            return None;
        }
        self.ensure_shuffle_order();
        if self.cursor == TraversalCursor::START {
            return None;
        }

        self.cursor = TraversalCursor(self.cursor.0 - 1);
        self.current()
    }

    /// Make a queue slot current
    ///
    /// Under shuffle the slot is looked up in the shuffle order; if it is not
    /// found the slot is used as the cursor directly.
    pub fn select(&mut self, position: QueuePosition) -> Result<Arc<Track>> {
        if position.0 >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(position.0));
        }

        self.cursor = if self.modes.shuffle {
            self.shuffle_order
                .cursor_of(position)
                .unwrap_or(TraversalCursor(position.0))
        } else {
            TraversalCursor(position.0)
        };

        self.current()
            .ok_or(PlaybackError::IndexOutOfBounds(position.0))
    }

    /// Track at the current traversal step
    pub fn current(&self) -> Option<Arc<Track>> {
        self.current_position()
            .and_then(|position| self.tracks.get(position.0))
            .cloned()
    }

    /// Queue slot at the current traversal step
    pub fn current_position(&self) -> Option<QueuePosition> {
        if self.tracks.is_empty() {
            return None;
        }

        let position = if self.shuffle_active() {
            self.shuffle_order.position_at(self.cursor)?
        } else {
            QueuePosition(self.cursor.0)
        };

        (position.0 < self.tracks.len()).then_some(position)
    }

    /// Draw a new shuffle order with the playing slot first
    ///
    /// No-op while shuffle is off.
    pub fn regenerate_shuffle_order(&mut self) {
        if !self.modes.shuffle {
            return;
        }
        let anchor = self.current_position().unwrap_or(QueuePosition(0));
        self.shuffle_order = ShuffleOrder::generate(self.tracks.len(), anchor, &mut self.rng);
        self.cursor = TraversalCursor::START;
    }

    /// Install an explicit shuffle order
    ///
    /// Accepted only while shuffle is on and when the order covers the whole
    /// queue. The cursor moves to the step that plays the current slot.
    pub fn set_shuffle_order(&mut self, order: ShuffleOrder) -> bool {
        if !self.modes.shuffle || !order.is_consistent_with(self.tracks.len()) {
            return false;
        }

        let playing = self.current_position();
        self.cursor = playing
            .and_then(|position| order.cursor_of(position))
            .unwrap_or(TraversalCursor::START);
        self.shuffle_order = order;
        true
    }

    /// Turn shuffle on or off, keeping the same track current
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.modes.shuffle == enabled {
            return;
        }

        let playing = self.current_position();
        self.modes.shuffle = enabled;

        if enabled {
            let anchor = playing.unwrap_or(QueuePosition(0));
            self.shuffle_order = ShuffleOrder::generate(self.tracks.len(), anchor, &mut self.rng);
            self.cursor = TraversalCursor::START;
        } else {
            self.shuffle_order.clear();
            self.cursor = playing.map_or(TraversalCursor::START, |p| TraversalCursor(p.0));
        }
    }

    /// Flip shuffle, returning the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.modes.shuffle);
        self.modes.shuffle
    }

    /// Set repeat
    pub fn set_repeat(&mut self, enabled: bool) {
        self.modes.repeat = enabled;
    }

    /// Flip repeat, returning the new value
    pub fn toggle_repeat(&mut self) -> bool {
        self.modes.repeat = !self.modes.repeat;
        self.modes.repeat
    }

    /// Current modes
    pub fn modes(&self) -> PlaybackModes {
        self.modes
    }

    /// Tracks in stored order
    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    /// First queue slot holding a track id
    pub fn position_of(&self, id: &TrackId) -> Option<QueuePosition> {
        self.tracks
            .iter()
            .position(|t| &t.id == id)
            .map(QueuePosition)
    }

    /// Current traversal step
    pub fn cursor(&self) -> TraversalCursor {
        self.cursor
    }

    /// Current shuffle order
    pub fn shuffle_order(&self) -> &ShuffleOrder {
        &self.shuffle_order
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn shuffle_active(&self) -> bool {
        self.modes.shuffle && self.shuffle_order.is_consistent_with(self.tracks.len())
    }

    /// Regenerate a stale shuffle order, anchored at the slot the cursor
    /// addresses directly
    fn ensure_shuffle_order(&mut self) {
        if !self.modes.shuffle || self.shuffle_active() {
            return;
        }

        let anchor = QueuePosition(self.cursor.0.min(self.tracks.len().saturating_sub(1)));
        tracing::debug!(%anchor, "Regenerating stale shuffle order");
        self.shuffle_order = ShuffleOrder::generate(self.tracks.len(), anchor, &mut self.rng);
        self.cursor = TraversalCursor::START;
    }
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self::new(PlaybackModes::default())
    }
}
