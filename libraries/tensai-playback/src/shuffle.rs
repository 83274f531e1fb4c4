//! Shuffle order for queue traversal
//!
//! A shuffle order is a permutation of queue positions: entry `c` is the
//! queue slot played at traversal step `c`. The queue itself is never
//! reordered, so turning shuffle off restores the stored order for free.

use crate::position::{QueuePosition, TraversalCursor};
use rand::seq::SliceRandom;
use rand::Rng;
use std::iter;

/// Permutation mapping traversal steps onto queue positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShuffleOrder {
    order: Vec<usize>,
}

impl ShuffleOrder {
    /// Empty order
    pub fn new() -> Self {
        Self::default()
    }

    /// Order for a single-item queue
    pub fn single() -> Self {
        Self { order: vec![0] }
    }

    /// Generate a fresh order for a queue of `len` items
    ///
    /// `anchor` always lands on traversal step 0; the remaining positions are
    /// Fisher-Yates shuffled. An out-of-range anchor is treated as position 0.
    pub fn generate<R: Rng + ?Sized>(len: usize, anchor: QueuePosition, rng: &mut R) -> Self {
        if len == 0 {
            return Self::new();
        }

        let anchor = if anchor.0 < len { anchor.0 } else { 0 };
        let mut rest: Vec<usize> = (0..len).filter(|&i| i != anchor).collect();
        rest.shuffle(rng);

        Self {
            order: iter::once(anchor).chain(rest).collect(),
        }
    }

    /// Build an order from an explicit permutation
    ///
    /// Returns `None` unless `order` is a permutation of `0..order.len()`.
    pub fn from_permutation(order: Vec<usize>) -> Option<Self> {
        let mut seen = vec![false; order.len()];
        for &position in &order {
            let slot = seen.get_mut(position)?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Self { order })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the order has no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in traversal order
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Whether the order can be used for a queue of `queue_len` items
    pub fn is_consistent_with(&self, queue_len: usize) -> bool {
        self.order.len() == queue_len
    }

    /// Queue position played at `cursor`
    pub fn position_at(&self, cursor: TraversalCursor) -> Option<QueuePosition> {
        self.order.get(cursor.0).copied().map(QueuePosition)
    }

    /// Traversal step that plays `position`
    pub fn cursor_of(&self, position: QueuePosition) -> Option<TraversalCursor> {
        self.order
            .iter()
            .position(|&p| p == position.0)
            .map(TraversalCursor)
    }

    /// Schedule a newly appended queue position last
    pub fn push(&mut self, position: QueuePosition) {
        self.order.push(position.0);
    }

    /// Drop a removed queue position
    ///
    /// Every entry above `position` shifts down by one so the order keeps
    /// pointing at the same tracks. Returns the traversal step the removed
    /// position occupied, if it was present.
    pub fn remove(&mut self, position: QueuePosition) -> Option<TraversalCursor> {
        let removed = self.cursor_of(position);
        if let Some(cursor) = removed {
            self.order.remove(cursor.0);
        }
        for entry in &mut self.order {
            if *entry > position.0 {
                *entry -= 1;
            }
        }
        removed
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.order.clear();
    }
}
