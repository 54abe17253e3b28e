//! Clip metadata as seen by the player.

use serde::{Deserialize, Serialize};

/// How a clip behaves when its playhead passes the authored end.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Hold the last pose; the player treats the end as a boundary.
    #[default]
    Clamp,
    /// Wrap around forever; boundary-driven transitions are suppressed.
    Loop,
}

impl WrapMode {
    #[inline]
    pub fn is_loop(self) -> bool {
        matches!(self, WrapMode::Loop)
    }
}

/// Authored properties of a clip. Immutable once the player is initialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub name: String,
    /// Length in seconds.
    pub duration: f32,
    #[serde(default)]
    pub wrap_mode: WrapMode,
}

impl ClipMetadata {
    pub fn new(name: impl Into<String>, duration: f32, wrap_mode: WrapMode) -> Self {
        Self {
            name: name.into(),
            duration,
            wrap_mode,
        }
    }
}
