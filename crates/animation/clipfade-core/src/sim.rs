//! In-memory reference backend.
//!
//! `SimGraph` implements [`PoseBackend`] without a host engine: connected clip
//! nodes advance by `dt * speed` on every `evaluate`, the mixer stores two
//! weights, and every capability call is recorded as a [`GraphCall`] so tests
//! can assert on exactly what the player asked for.

use serde::{Deserialize, Serialize};

use crate::backend::{PoseBackend, PoseConsumer};
use crate::clip::{ClipMetadata, WrapMode};
use crate::error::CrossfadeError;
use crate::ids::{Channel, ClipId};

/// Authored clip for the simulated backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimClip {
    pub name: String,
    pub duration: f32,
    #[serde(default)]
    pub wrap_mode: WrapMode,
}

impl SimClip {
    pub fn new(name: impl Into<String>, duration: f32, wrap_mode: WrapMode) -> Self {
        Self {
            name: name.into(),
            duration,
            wrap_mode,
        }
    }
}

/// Ordered clip list; position is the clip's [`ClipId`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipSet {
    #[serde(default)]
    pub name: String,
    clips: Vec<SimClip>,
}

impl ClipSet {
    pub fn new(clips: Vec<SimClip>) -> Self {
        Self {
            name: String::new(),
            clips,
        }
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn clips(&self) -> &[SimClip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Look up a clip id by name.
    pub fn id_of(&self, name: &str) -> Option<ClipId> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .map(|i| ClipId(i as u32))
    }
}

/// Pose consumer stand-in.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConsumer {
    pub name: String,
    pub controller: bool,
}

impl SimConsumer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: false,
        }
    }

    /// A consumer that already has its own controller attached.
    pub fn with_controller(mut self) -> Self {
        self.controller = true;
        self
    }
}

impl PoseConsumer for SimConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_controller(&self) -> bool {
        self.controller
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SimNode(pub usize);

/// One recorded capability call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GraphCall {
    CreateGraph { name: String, consumer: String },
    Destroy,
    CreateClip { node: SimNode, name: String },
    SetTime { node: SimNode, seconds: f32 },
    SetSpeed { node: SimNode, multiplier: f32 },
    Connect { channel: Channel, node: SimNode },
    Disconnect { channel: Channel },
    SetWeight { channel: Channel, weight: f32 },
    Evaluate { dt: f32 },
}

/// One channel's contribution to the evaluated pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub channel: Channel,
    pub clip: String,
    /// Playhead after wrapping (Loop) or clamping (Clamp).
    pub local_time: f32,
    pub weight: f32,
}

#[derive(Clone, Debug)]
struct NodeState {
    clip: SimClip,
    time: f32,
    speed: f32,
}

impl NodeState {
    fn local_time(&self) -> f32 {
        let d = self.clip.duration;
        if d <= 0.0 {
            return 0.0;
        }
        match self.clip.wrap_mode {
            WrapMode::Loop => self.time.rem_euclid(d),
            WrapMode::Clamp => self.time.clamp(0.0, d),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SimGraph {
    valid: bool,
    name: String,
    output: Option<String>,
    nodes: Vec<NodeState>,
    inputs: [Option<SimNode>; 2],
    weights: [f32; 2],
    keep_calls: bool,
    calls: Vec<GraphCall>,
    evaluations: usize,
}

impl SimGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`SimGraph::new`], but every backend call is kept in [`SimGraph::calls`].
    pub fn recording() -> Self {
        Self {
            keep_calls: true,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the consumer bound to the output, if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Backend calls seen so far; always empty unless built with `recording()`.
    pub fn calls(&self) -> &[GraphCall] {
        &self.calls
    }

    fn record(&mut self, call: GraphCall) {
        if self.keep_calls {
            self.calls.push(call);
        }
    }

    /// Number of `evaluate` calls since creation.
    pub fn evaluate_count(&self) -> usize {
        self.evaluations
    }

    pub fn weight(&self, channel: Channel) -> f32 {
        self.weights[channel.index()]
    }

    pub fn input(&self, channel: Channel) -> Option<SimNode> {
        self.inputs[channel.index()]
    }

    /// Node created for the clip at `index` in the clip set.
    pub fn node_of(&self, index: usize) -> SimNode {
        SimNode(index)
    }

    /// Channel currently holding the clip at `index`.
    pub fn channel_of(&self, index: usize) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|ch| self.inputs[ch.index()] == Some(SimNode(index)))
    }

    pub fn node_time(&self, node: SimNode) -> f32 {
        self.nodes.get(node.0).map_or(0.0, |n| n.time)
    }

    pub fn node_speed(&self, node: SimNode) -> f32 {
        self.nodes.get(node.0).map_or(0.0, |n| n.speed)
    }

    /// Evaluated pose: every connected channel with its wrapped playhead and weight.
    pub fn sample(&self) -> Vec<PoseSample> {
        Channel::ALL
            .into_iter()
            .filter_map(|ch| {
                let node = self.inputs[ch.index()]?;
                let state = self.nodes.get(node.0)?;
                Some(PoseSample {
                    channel: ch,
                    clip: state.clip.name.clone(),
                    local_time: state.local_time(),
                    weight: self.weights[ch.index()],
                })
            })
            .collect()
    }
}

impl PoseBackend for SimGraph {
    type Clip = SimClip;
    type Consumer = SimConsumer;
    type Node = SimNode;

    fn create_graph(&mut self, name: &str, consumer: &SimConsumer) -> crate::Result<()> {
        self.valid = true;
        self.name = name.to_string();
        self.output = Some(consumer.name.clone());
        self.nodes.clear();
        self.inputs = [None, None];
        self.weights = [0.0, 0.0];
        self.record(GraphCall::CreateGraph {
            name: name.to_string(),
            consumer: consumer.name.clone(),
        });
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn destroy(&mut self) {
        self.valid = false;
        self.output = None;
        self.inputs = [None, None];
        self.weights = [0.0, 0.0];
        self.record(GraphCall::Destroy);
    }

    fn create_clip(&mut self, clip: &SimClip) -> crate::Result<SimNode> {
        if !self.valid {
            return Err(CrossfadeError::Backend {
                reason: format!("cannot create clip '{}' on a destroyed graph", clip.name),
            });
        }
        let node = SimNode(self.nodes.len());
        self.nodes.push(NodeState {
            clip: clip.clone(),
            time: 0.0,
            speed: 1.0,
        });
        self.record(GraphCall::CreateClip {
            node,
            name: clip.name.clone(),
        });
        Ok(node)
    }

    fn clip_metadata(&self, node: SimNode) -> ClipMetadata {
        match self.nodes.get(node.0) {
            Some(n) => ClipMetadata::new(n.clip.name.clone(), n.clip.duration, n.clip.wrap_mode),
            None => ClipMetadata::new("", 0.0, WrapMode::Clamp),
        }
    }

    fn time(&self, node: SimNode) -> f32 {
        self.node_time(node)
    }

    fn set_time(&mut self, node: SimNode, seconds: f32) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.time = seconds;
        }
        self.record(GraphCall::SetTime { node, seconds });
    }

    fn set_speed(&mut self, node: SimNode, multiplier: f32) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.speed = multiplier;
        }
        self.record(GraphCall::SetSpeed { node, multiplier });
    }

    fn connect(&mut self, channel: Channel, node: SimNode) {
        self.inputs[channel.index()] = Some(node);
        self.record(GraphCall::Connect { channel, node });
    }

    fn disconnect(&mut self, channel: Channel) {
        self.inputs[channel.index()] = None;
        self.weights[channel.index()] = 0.0;
        self.record(GraphCall::Disconnect { channel });
    }

    fn set_weight(&mut self, channel: Channel, weight: f32) {
        self.weights[channel.index()] = weight.clamp(0.0, 1.0);
        self.record(GraphCall::SetWeight { channel, weight });
    }

    fn evaluate(&mut self, dt: f32) {
        self.evaluations += 1;
        self.record(GraphCall::Evaluate { dt });
        if !self.valid {
            return;
        }
        let [first, second] = self.inputs;
        // a node wired to both inputs still advances once
        let second = second.filter(|n| Some(*n) != first);
        for node in [first, second].into_iter().flatten() {
            if let Some(n) = self.nodes.get_mut(node.0) {
                n.time += dt * n.speed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(clips: &[SimClip]) -> SimGraph {
        let mut g = SimGraph::new();
        g.create_graph("test", &SimConsumer::new("rig")).unwrap();
        for c in clips {
            g.create_clip(c).unwrap();
        }
        g
    }

    #[test]
    fn only_connected_nodes_advance() {
        let mut g = graph_with(&[
            SimClip::new("a", 1.0, WrapMode::Clamp),
            SimClip::new("b", 1.0, WrapMode::Clamp),
        ]);
        g.connect(Channel::First, SimNode(0));
        g.evaluate(0.25);
        assert_eq!(g.node_time(SimNode(0)), 0.25);
        assert_eq!(g.node_time(SimNode(1)), 0.0);
    }

    #[test]
    fn shared_node_advances_once() {
        let mut g = graph_with(&[SimClip::new("a", 1.0, WrapMode::Clamp)]);
        g.connect(Channel::First, SimNode(0));
        g.connect(Channel::Second, SimNode(0));
        g.evaluate(0.1);
        assert!((g.node_time(SimNode(0)) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn speed_scales_advance() {
        let mut g = graph_with(&[SimClip::new("a", 1.0, WrapMode::Clamp)]);
        g.connect(Channel::First, SimNode(0));
        g.set_speed(SimNode(0), 0.0);
        g.evaluate(0.5);
        assert_eq!(g.node_time(SimNode(0)), 0.0);
    }

    #[test]
    fn sample_wraps_and_clamps() {
        let mut g = graph_with(&[
            SimClip::new("walk", 1.0, WrapMode::Loop),
            SimClip::new("jump", 1.0, WrapMode::Clamp),
        ]);
        g.connect(Channel::First, SimNode(0));
        g.connect(Channel::Second, SimNode(1));
        g.set_weight(Channel::First, 0.25);
        g.set_weight(Channel::Second, 0.75);
        g.evaluate(1.5);
        let pose = g.sample();
        assert_eq!(pose.len(), 2);
        assert!((pose[0].local_time - 0.5).abs() < 1e-6);
        assert_eq!(pose[1].local_time, 1.0);
        assert_eq!(pose[1].weight, 0.75);
    }

    #[test]
    fn disconnect_zeroes_weight() {
        let mut g = graph_with(&[SimClip::new("a", 1.0, WrapMode::Clamp)]);
        g.connect(Channel::Second, SimNode(0));
        g.set_weight(Channel::Second, 1.0);
        g.disconnect(Channel::Second);
        assert_eq!(g.weight(Channel::Second), 0.0);
        assert!(g.sample().is_empty());
    }

    #[test]
    fn create_clip_after_destroy_fails() {
        let mut g = graph_with(&[]);
        g.destroy();
        assert!(!g.is_valid());
        let err = g
            .create_clip(&SimClip::new("a", 1.0, WrapMode::Clamp))
            .unwrap_err();
        assert_eq!(err.category(), "backend");
    }

    #[test]
    fn calls_are_kept_only_when_recording() {
        let clip = SimClip::new("a", 1.0, WrapMode::Clamp);
        let mut quiet = graph_with(std::slice::from_ref(&clip));
        quiet.connect(Channel::First, SimNode(0));
        for _ in 0..1000 {
            quiet.evaluate(0.01);
        }
        assert!(quiet.calls().is_empty());
        assert_eq!(quiet.evaluate_count(), 1000);

        let mut loud = SimGraph::recording();
        loud.create_graph("test", &SimConsumer::new("rig")).unwrap();
        loud.create_clip(&clip).unwrap();
        loud.evaluate(0.01);
        assert_eq!(loud.calls().len(), 3);
        assert_eq!(loud.calls()[2], GraphCall::Evaluate { dt: 0.01 });
    }

    #[test]
    fn clip_set_from_json() {
        let set = ClipSet::from_json_str(
            r#"{ "name": "demo", "clips": [
                { "name": "idle", "duration": 2.0, "wrap_mode": "loop" },
                { "name": "wave", "duration": 1.0 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.id_of("wave"), Some(ClipId(1)));
        assert_eq!(set.clips()[0].wrap_mode, WrapMode::Loop);
    }
}
