//! Queue index spaces
//!
//! A queue is addressed two ways:
//! - `QueuePosition`: a slot in the queue as stored (what the queue panel shows)
//! - `TraversalCursor`: a step in play order, which is the queue order itself
//!   when shuffle is off and the shuffle order when it is on
//!
//! `ShuffleOrder` is the only place that translates between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot in the queue as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueuePosition(pub usize);

impl QueuePosition {
    /// Raw index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for QueuePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraversalCursor(pub usize);

impl TraversalCursor {
    /// First step
    pub const START: TraversalCursor = TraversalCursor(0);

    /// Raw index
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TraversalCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
