use serde::{Deserialize, Serialize};

/// Playback state of a crossfade player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing is advancing; `proc` does not step the graph
    #[default]
    Idle,
    /// A single clip owns the active channel
    Playing,
    /// Two channels are crossfading
    Blending,
    /// Playing, with a deferred transition armed against the clip end
    Queued,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Blending => "blending",
            Self::Queued => "queued",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
