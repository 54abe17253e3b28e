//! Playback events recorded while operating the player.
//!
//! Events accumulate across calls and are drained by the caller, typically
//! once per frame after `proc`.

use serde::{Deserialize, Serialize};

use crate::ids::ClipId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlaybackEvent {
    /// `play` started a clip (hard cut when `blend` is zero).
    Started { clip: ClipId, blend: f32 },
    /// A transition was deferred into the queue.
    Queued { clip: ClipId, blend: f32 },
    /// The front queue entry became the active clip.
    QueueAdvanced { clip: ClipId },
    /// A crossfade finished; `clip` now owns the active channel alone.
    BlendCompleted { clip: ClipId },
    /// A clamped clip reached its end and the player went idle.
    Ended { clip: ClipId },
    Stopped,
    /// Blend onto the already active clip was ignored.
    BlendSkipped { clip: ClipId },
    /// An entry was dropped because the queue was full.
    QueueOverflow { clip: ClipId },
}

/// Event buffer holding at most `capacity` entries; the oldest are dropped first.
#[derive(Clone, Debug)]
pub struct EventLog {
    events: Vec<PlaybackEvent>,
    capacity: usize,
    dropped: usize,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Vec::with_capacity(capacity.min(64)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: PlaybackEvent) {
        if self.events.len() == self.capacity {
            self.events.remove(0);
            self.dropped += 1;
        }
        self.events.push(event);
    }

    #[inline]
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn as_slice(&self) -> &[PlaybackEvent] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded because nobody drained the log in time.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
