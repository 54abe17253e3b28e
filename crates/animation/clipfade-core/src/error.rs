//! Error types for the crossfade player

use serde::{Deserialize, Serialize};

use crate::ids::ClipId;

/// Errors surfaced by the player and its backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CrossfadeError {
    /// Operation issued before `initialize` or after `release`
    #[error("crossfade player is not initialized")]
    NotInitialized,

    /// No clips were supplied to `initialize`
    #[error("no animation clips supplied")]
    EmptyClipSet,

    /// The pose consumer is already driven by its own controller
    #[error("pose consumer '{consumer}' already has a controller attached")]
    ConflictingController { consumer: String },

    /// Clip id outside the initialized clip set
    #[error("unknown clip {id:?} (clip set holds {clip_count} clips)")]
    UnknownClip { id: ClipId, clip_count: usize },

    /// Transition queue is at capacity and the overflow policy is `Error`
    #[error("transition queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// Negative or non-finite blend duration / start offset
    #[error("invalid duration: {value}")]
    InvalidDuration { value: f32 },

    /// Failure reported by the pose backend
    #[error("backend error: {reason}")]
    Backend { reason: String },

    /// Configuration could not be parsed
    #[error("invalid config: {reason}")]
    Config { reason: String },
}

impl CrossfadeError {
    /// Error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotInitialized | Self::EmptyClipSet | Self::ConflictingController { .. } => {
                "lifecycle"
            }
            Self::UnknownClip { .. } | Self::InvalidDuration { .. } => "validation",
            Self::QueueFull { .. } => "queue",
            Self::Backend { .. } => "backend",
            Self::Config { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for CrossfadeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(CrossfadeError::NotInitialized.category(), "lifecycle");
        assert_eq!(
            CrossfadeError::UnknownClip {
                id: ClipId(9),
                clip_count: 3
            }
            .category(),
            "validation"
        );
        assert_eq!(CrossfadeError::QueueFull { capacity: 2 }.category(), "queue");
    }

    #[test]
    fn display_mentions_consumer() {
        let err = CrossfadeError::ConflictingController {
            consumer: "hero".into(),
        };
        assert!(err.to_string().contains("hero"));
    }

    #[test]
    fn serialization_roundtrip() {
        let error = CrossfadeError::QueueFull { capacity: 4 };
        let s = serde_json::to_string(&error).unwrap();
        let back: CrossfadeError = serde_json::from_str(&s).unwrap();
        assert_eq!(error, back);
    }
}
