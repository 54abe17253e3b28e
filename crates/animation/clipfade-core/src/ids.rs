//! Identifiers for clips and mixer channels.

use serde::{Deserialize, Serialize};

/// Stable index of a clip inside the clip set given to `initialize`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u32);

impl ClipId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for ClipId {
    fn from(v: u32) -> Self {
        ClipId(v)
    }
}

/// One of the two mixer input slots.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[default]
    First,
    Second,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::First, Channel::Second];

    /// Mixer input index (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::First => 0,
            Channel::Second => 1,
        }
    }

    /// The alternate slot.
    #[inline]
    pub fn other(self) -> Channel {
        match self {
            Channel::First => Channel::Second,
            Channel::Second => Channel::First,
        }
    }
}
