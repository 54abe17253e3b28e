//! Player configuration.

use serde::{Deserialize, Serialize};

use crate::error::CrossfadeError;
use crate::queue::QueueOverflow;

/// Tunables for a [`CrossfadePlayer`](crate::CrossfadePlayer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// A blend counts as finished once its remaining time is at or below this.
    pub epsilon: f32,

    /// What `play_queued` does when the queue is already full.
    pub overflow: QueueOverflow,

    /// Name given to the backend graph on creation.
    pub graph_name: String,

    /// Upper bound for the queue capacity requested in `initialize`.
    pub max_queue_capacity: usize,

    /// Events kept between drains; older ones are dropped once this is reached.
    pub max_events: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epsilon: 1e-5,
            overflow: QueueOverflow::RejectNewest,
            graph_name: "Animation Player".to_string(),
            max_queue_capacity: 16,
            max_events: 1024,
        }
    }
}

impl Config {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(CrossfadeError::Config {
                reason: format!(
                    "epsilon must be finite and non-negative, got {}",
                    self.epsilon
                ),
            });
        }
        if self.max_events == 0 {
            return Err(CrossfadeError::Config {
                reason: "max_events must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Clamp a requested queue capacity into `1..=max_queue_capacity`.
    #[inline]
    pub fn clamp_capacity(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_queue_capacity.max(1))
    }
}
