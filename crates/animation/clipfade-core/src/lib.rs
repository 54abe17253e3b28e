//! Clipfade Core (engine-agnostic)
//!
//! Crossfades a skeletal pose between a fixed set of authored clips using two
//! mixer channels and manual, caller-stepped time. The crate owns the
//! playback/blend/queue state machine; pose evaluation is delegated to a host
//! [`PoseBackend`]. [`sim::SimGraph`] is an in-memory backend for tests and tools.

pub mod backend;
pub mod clip;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod ids;
pub mod player;
pub mod queue;
pub mod sim;
pub mod state;

// Re-exports for consumers (adapters)
pub use backend::{PoseBackend, PoseConsumer};
pub use clip::{ClipMetadata, WrapMode};
pub use config::Config;
pub use driver::{ClipDriver, DriverSettings};
pub use error::CrossfadeError;
pub use events::PlaybackEvent;
pub use ids::{Channel, ClipId};
pub use player::CrossfadePlayer;
pub use queue::{QueueEntry, QueueOverflow};
pub use sim::{ClipSet, GraphCall, PoseSample, SimClip, SimConsumer, SimGraph, SimNode};
pub use state::PlaybackState;

/// Crossfade result type
pub type Result<T> = core::result::Result<T, CrossfadeError>;
