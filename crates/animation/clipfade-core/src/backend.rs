//! Pose-evaluation backend contract.
//!
//! The player never evaluates poses itself. Hosts implement [`PoseBackend`]
//! over their own clip/mixer/output graph and hand it to
//! `CrossfadePlayer::initialize`, which owns it until `release`.

use std::fmt::Debug;

use crate::clip::ClipMetadata;
use crate::ids::Channel;

/// Skeletal pose consumer bound to the graph output.
pub trait PoseConsumer {
    fn name(&self) -> &str;

    /// True when the consumer is already driven by a built-in controller.
    fn has_controller(&self) -> bool;
}

/// Clip nodes, a two-input mixer, an output sink and manual stepping.
pub trait PoseBackend {
    /// Clip asset the host loads nodes from.
    type Clip;
    type Consumer: PoseConsumer;
    /// Opaque clip-node handle.
    type Node: Copy + Eq + Debug;

    /// Create the graph in manual update mode, with a two-input mixer whose
    /// output is bound to `consumer`.
    fn create_graph(&mut self, name: &str, consumer: &Self::Consumer) -> crate::Result<()>;
    fn is_valid(&self) -> bool;
    fn destroy(&mut self);

    fn create_clip(&mut self, clip: &Self::Clip) -> crate::Result<Self::Node>;
    fn clip_metadata(&self, node: Self::Node) -> ClipMetadata;

    /// Local playhead of a node in seconds. Not wrapped.
    fn time(&self, node: Self::Node) -> f32;
    fn set_time(&mut self, node: Self::Node, seconds: f32);
    fn set_speed(&mut self, node: Self::Node, multiplier: f32);

    fn connect(&mut self, channel: Channel, node: Self::Node);
    fn disconnect(&mut self, channel: Channel);
    /// `weight` is in `[0, 1]`.
    fn set_weight(&mut self, channel: Channel, weight: f32);

    /// Advance the whole graph by `dt` seconds and push the pose to the output.
    fn evaluate(&mut self, dt: f32);
}
