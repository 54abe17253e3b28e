//! Bounded FIFO of deferred transitions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::CrossfadeError;
use crate::ids::ClipId;

/// A deferred `(clip, blend duration)` request.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub clip: ClipId,
    /// Crossfade length in seconds; `0.0` is a hard cut.
    pub blend: f32,
}

/// Behavior of a push onto a full queue.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflow {
    /// Drop the incoming entry.
    #[default]
    RejectNewest,
    /// Evict the front entry to make room.
    DropOldest,
    /// Fail with [`CrossfadeError::QueueFull`].
    Error,
}

/// Result of a successful push.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PushOutcome {
    Accepted,
    Rejected(QueueEntry),
    Evicted(QueueEntry),
}

#[derive(Clone, Debug)]
pub struct TransitionQueue {
    entries: VecDeque<QueueEntry>,
    capacity: usize,
    overflow: QueueOverflow,
}

impl TransitionQueue {
    pub fn new(capacity: usize, overflow: QueueOverflow) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            overflow,
        }
    }

    pub fn push(&mut self, entry: QueueEntry) -> crate::Result<PushOutcome> {
        if self.entries.len() < self.capacity {
            self.entries.push_back(entry);
            return Ok(PushOutcome::Accepted);
        }
        match self.overflow {
            QueueOverflow::RejectNewest => Ok(PushOutcome::Rejected(entry)),
            QueueOverflow::DropOldest => {
                let evicted = self.entries.pop_front();
                self.entries.push_back(entry);
                // capacity is at least 1, so a full queue always has a front
                Ok(evicted.map_or(PushOutcome::Accepted, PushOutcome::Evicted))
            }
            QueueOverflow::Error => Err(CrossfadeError::QueueFull {
                capacity: self.capacity,
            }),
        }
    }

    #[inline]
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    #[inline]
    pub fn front(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }
}
