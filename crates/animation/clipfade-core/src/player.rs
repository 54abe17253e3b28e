//! Crossfade player: clip selection, two-channel blending and queued transitions.
//!
//! The caller mutates intent with `play`/`play_queued`/`stop`/`end_loop` and then
//! calls `proc(dt)` once per frame. `proc` runs the state machine, pushes channel
//! weights and connections to the backend, and issues one manual graph step.

use std::fmt;

use log::{debug, trace, warn};

use crate::backend::{PoseBackend, PoseConsumer};
use crate::clip::{ClipMetadata, WrapMode};
use crate::config::Config;
use crate::error::CrossfadeError;
use crate::events::{EventLog, PlaybackEvent};
use crate::ids::{Channel, ClipId};
use crate::queue::{PushOutcome, QueueEntry, TransitionQueue};
use crate::state::PlaybackState;

/// A clip node created at initialization plus its authored metadata.
#[derive(Clone, Debug)]
struct ClipSlot<N> {
    node: N,
    meta: ClipMetadata,
}

/// Everything that exists between `initialize` and `release`.
struct Session<B: PoseBackend> {
    backend: B,
    clips: Vec<ClipSlot<B::Node>>,
    queue: TransitionQueue,
    epsilon: f32,
    events: EventLog,

    state: PlaybackState,
    active_channel: Channel,
    connected: [Option<ClipId>; 2],
    active_clip: Option<ClipId>,
    /// Authored duration, shortened by the front queue entry's blend while Queued.
    active_duration: f32,
    active_wrap: WrapMode,
    remaining: f32,
    target: f32,
    /// One-shot time carried into the next `proc`.
    add_time: f32,
}

/// Drives a [`PoseBackend`] by crossfading between a fixed clip set.
pub struct CrossfadePlayer<B: PoseBackend> {
    cfg: Config,
    session: Option<Session<B>>,
}

fn check_duration(value: f32) -> crate::Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CrossfadeError::InvalidDuration { value })
    }
}

impl<B: PoseBackend> CrossfadePlayer<B> {
    pub fn new(cfg: Config) -> Self {
        Self { cfg, session: None }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Take ownership of `backend`, build the graph bound to `consumer` and
    /// create one clip node per entry of `clips`.
    ///
    /// Calling this on an initialized player is a no-op and drops `backend`.
    pub fn initialize(
        &mut self,
        mut backend: B,
        consumer: &B::Consumer,
        clips: &[B::Clip],
        queue_capacity: usize,
    ) -> crate::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        self.cfg.validate()?;
        if clips.is_empty() {
            return Err(CrossfadeError::EmptyClipSet);
        }
        if consumer.has_controller() {
            return Err(CrossfadeError::ConflictingController {
                consumer: consumer.name().to_string(),
            });
        }

        backend.create_graph(&self.cfg.graph_name, consumer)?;
        let slots = match load_clips(&mut backend, clips) {
            Ok(slots) => slots,
            Err(err) => {
                if backend.is_valid() {
                    backend.destroy();
                }
                return Err(err);
            }
        };

        let capacity = self.cfg.clamp_capacity(queue_capacity);
        debug!(
            "initialize: graph '{}' for '{}' with {} clips, queue capacity {}",
            self.cfg.graph_name,
            consumer.name(),
            slots.len(),
            capacity
        );
        self.session = Some(Session {
            backend,
            clips: slots,
            queue: TransitionQueue::new(capacity, self.cfg.overflow),
            epsilon: self.cfg.epsilon,
            events: EventLog::with_capacity(self.cfg.max_events),
            state: PlaybackState::Idle,
            active_channel: Channel::First,
            connected: [None, None],
            active_clip: None,
            active_duration: 0.0,
            active_wrap: WrapMode::Clamp,
            remaining: 0.0,
            target: 0.0,
            add_time: 0.0,
        });
        Ok(())
    }

    /// Destroy the backend graph if it is still valid and hand the backend back.
    pub fn release(&mut self) -> Option<B> {
        let mut session = self.session.take()?;
        if session.backend.is_valid() {
            session.backend.destroy();
        }
        debug!("release: graph '{}' destroyed", self.cfg.graph_name);
        Some(session.backend)
    }

    /// Advance the state machine by `dt` seconds.
    pub fn proc(&mut self, dt: f32) -> crate::Result<()> {
        check_duration(dt)?;
        self.session_mut()?.advance(dt);
        Ok(())
    }

    /// Start `clip`, crossfading over `blend` seconds when positive, and seed
    /// its playhead with `start_offset` on the next `proc`.
    pub fn play(&mut self, clip: ClipId, blend: f32, start_offset: f32) -> crate::Result<()> {
        let session = self.session_mut()?;
        session.check_clip(clip)?;
        check_duration(blend)?;
        check_duration(start_offset)?;
        session.play(clip, blend, start_offset);
        Ok(())
    }

    /// Defer a transition to `clip` until the active clip nears its end.
    pub fn play_queued(&mut self, clip: ClipId, blend: f32) -> crate::Result<()> {
        let session = self.session_mut()?;
        session.check_clip(clip)?;
        check_duration(blend)?;
        session.play_queued(clip, blend)
    }

    pub fn stop(&mut self) -> crate::Result<()> {
        let session = self.session_mut()?;
        debug!("stop: {} -> idle", session.state.name());
        session.state = PlaybackState::Idle;
        session.active_channel = Channel::First;
        session.events.push(PlaybackEvent::Stopped);
        Ok(())
    }

    /// Let a looping clip finish at its next boundary.
    pub fn end_loop(&mut self) -> crate::Result<()> {
        self.session_mut()?.active_wrap = WrapMode::Clamp;
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map_or(PlaybackState::Idle, |s| s.state)
    }

    pub fn active_clip(&self) -> Option<ClipId> {
        self.session.as_ref().and_then(|s| s.active_clip)
    }

    pub fn active_channel(&self) -> Channel {
        self.session
            .as_ref()
            .map_or(Channel::First, |s| s.active_channel)
    }

    /// Effective boundary of the active clip, shortened while a queued entry is armed.
    pub fn active_duration(&self) -> Option<f32> {
        self.session
            .as_ref()
            .filter(|s| s.active_clip.is_some())
            .map(|s| s.active_duration)
    }

    pub fn active_wrap_mode(&self) -> Option<WrapMode> {
        self.session
            .as_ref()
            .filter(|s| s.active_clip.is_some())
            .map(|s| s.active_wrap)
    }

    pub fn queue_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.queue.len())
    }

    pub fn queued(&self) -> Vec<QueueEntry> {
        self.session
            .as_ref()
            .map(|s| s.queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Fraction of the current crossfade still to run, in `[0, 1]`.
    pub fn blend_progress(&self) -> Option<f32> {
        let s = self.session.as_ref()?;
        if s.state != PlaybackState::Blending || s.target <= 0.0 {
            return None;
        }
        Some((s.remaining / s.target).clamp(0.0, 1.0))
    }

    pub fn clip_metadata(&self, clip: ClipId) -> Option<&ClipMetadata> {
        self.session
            .as_ref()
            .and_then(|s| s.clips.get(clip.index()))
            .map(|slot| &slot.meta)
    }

    pub fn clip_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.clips.len())
    }

    pub fn backend(&self) -> Option<&B> {
        self.session.as_ref().map(|s| &s.backend)
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.session.as_mut().map(|s| &mut s.backend)
    }

    pub fn events(&self) -> &[PlaybackEvent] {
        match &self.session {
            Some(s) => s.events.as_slice(),
            None => &[],
        }
    }

    /// Events discarded since initialize because the log hit `max_events`.
    pub fn events_dropped(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.events.dropped())
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.session
            .as_mut()
            .map(|s| s.events.drain())
            .unwrap_or_default()
    }

    fn session_mut(&mut self) -> crate::Result<&mut Session<B>> {
        self.session.as_mut().ok_or(CrossfadeError::NotInitialized)
    }
}

fn load_clips<B: PoseBackend>(
    backend: &mut B,
    clips: &[B::Clip],
) -> crate::Result<Vec<ClipSlot<B::Node>>> {
    clips
        .iter()
        .map(|clip| {
            let node = backend.create_clip(clip)?;
            let meta = backend.clip_metadata(node);
            check_duration(meta.duration)?;
            Ok(ClipSlot { node, meta })
        })
        .collect()
}

impl<B: PoseBackend> Session<B> {
    fn check_clip(&self, clip: ClipId) -> crate::Result<()> {
        if clip.index() < self.clips.len() {
            Ok(())
        } else {
            Err(CrossfadeError::UnknownClip {
                id: clip,
                clip_count: self.clips.len(),
            })
        }
    }

    #[inline]
    fn node(&self, clip: ClipId) -> B::Node {
        self.clips[clip.index()].node
    }

    fn active_elapsed(&self) -> f32 {
        self.active_clip
            .map_or(0.0, |clip| self.backend.time(self.node(clip)))
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!("state: {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }

    fn advance(&mut self, dt: f32) {
        let dt = dt + std::mem::take(&mut self.add_time);

        match self.state {
            PlaybackState::Idle => return,
            // boundary is checked after this frame's step
            PlaybackState::Playing => {}
            PlaybackState::Blending => self.advance_blend(dt),
            PlaybackState::Queued => {
                if !self.active_wrap.is_loop() {
                    let passed = self.active_elapsed() - self.active_duration;
                    if passed >= 0.0 && self.next_queue() {
                        // Blending cannot re-enter this branch, so this recurses once.
                        self.advance(passed);
                        return;
                    }
                }
            }
        }

        self.backend.evaluate(dt);

        if self.state == PlaybackState::Playing
            && !self.active_wrap.is_loop()
            && self.active_elapsed() >= self.active_duration
        {
            self.set_state(PlaybackState::Idle);
            if let Some(clip) = self.active_clip {
                self.events.push(PlaybackEvent::Ended { clip });
            }
        }
    }

    fn advance_blend(&mut self, dt: f32) {
        self.remaining -= dt;
        let active = self.active_channel;
        let next = active.other();

        if self.remaining > self.epsilon {
            let now = self.remaining / self.target;
            let incoming = 1.0 - now;
            self.backend.set_weight(active, now);
            self.backend.set_weight(next, incoming);
            trace!(
                "blend: {:?}={:.4} {:?}={:.4} remaining={:.4}",
                active,
                now,
                next,
                incoming,
                self.remaining
            );
            return;
        }

        if let Some(outgoing) = self.connected[active.index()].take() {
            let node = self.node(outgoing);
            self.backend.set_speed(node, 1.0);
        }
        self.backend.disconnect(active);
        self.active_channel = next;
        self.backend.set_weight(next, 1.0);
        if let Some(clip) = self.active_clip {
            self.events.push(PlaybackEvent::BlendCompleted { clip });
        }

        if self.queue.is_empty() {
            self.set_state(PlaybackState::Playing);
        } else {
            self.arm();
            self.set_state(PlaybackState::Queued);
        }
    }

    /// Pull the active clip's boundary in by the front entry's blend so the
    /// crossfade finishes by the authored end.
    fn arm(&mut self) {
        let (Some(clip), Some(front)) = (self.active_clip, self.queue.front()) else {
            return;
        };
        self.active_duration = self.clips[clip.index()].meta.duration - front.blend;
    }

    fn activate(&mut self, clip: ClipId) {
        let meta = &self.clips[clip.index()].meta;
        self.active_duration = meta.duration;
        self.active_wrap = meta.wrap_mode;
        self.active_clip = Some(clip);
    }

    fn play(&mut self, clip: ClipId, blend: f32, start_offset: f32) {
        let node = self.node(clip);

        if blend > 0.0 {
            if self.active_clip == Some(clip) {
                warn!(
                    "same clip is blended, skipping: {}",
                    self.clips[clip.index()].meta.name
                );
                self.events.push(PlaybackEvent::BlendSkipped { clip });
                return;
            }

            let active = self.active_channel;
            let next = active.other();
            // hold the outgoing pose while the crossfade runs
            if let Some(outgoing) = self.connected[active.index()] {
                let out_node = self.node(outgoing);
                self.backend.set_speed(out_node, 0.0);
            }
            self.backend.disconnect(next);
            self.backend.connect(next, node);
            self.connected[next.index()] = Some(clip);
            self.backend.set_weight(next, 0.0);
            self.set_state(PlaybackState::Blending);
        } else {
            self.active_channel = Channel::First;
            for ch in Channel::ALL {
                self.backend.disconnect(ch);
            }
            self.connected = [None, None];
            self.backend.connect(Channel::First, node);
            self.connected[Channel::First.index()] = Some(clip);
            self.backend.set_weight(Channel::First, 1.0);
            self.set_state(PlaybackState::Playing);
        }

        self.backend.set_speed(node, 1.0);
        self.queue.clear();
        self.activate(clip);
        self.backend.set_time(node, 0.0);
        self.remaining = blend;
        self.target = blend;
        self.add_time = start_offset;
        self.events.push(PlaybackEvent::Started { clip, blend });
    }

    fn play_queued(&mut self, clip: ClipId, blend: f32) -> crate::Result<()> {
        if self.state == PlaybackState::Idle || self.active_wrap.is_loop() {
            self.play(clip, blend, 0.0);
            return Ok(());
        }

        match self.queue.push(QueueEntry { clip, blend })? {
            PushOutcome::Accepted => {
                self.events.push(PlaybackEvent::Queued { clip, blend });
            }
            PushOutcome::Rejected(entry) => {
                warn!(
                    "transition queue full ({}), dropping {:?}",
                    self.queue.capacity(),
                    entry.clip
                );
                self.events
                    .push(PlaybackEvent::QueueOverflow { clip: entry.clip });
                return Ok(());
            }
            PushOutcome::Evicted(entry) => {
                warn!(
                    "transition queue full ({}), evicting {:?}",
                    self.queue.capacity(),
                    entry.clip
                );
                self.events
                    .push(PlaybackEvent::QueueOverflow { clip: entry.clip });
                self.events.push(PlaybackEvent::Queued { clip, blend });
            }
        }

        match self.state {
            PlaybackState::Playing => {
                self.arm();
                self.set_state(PlaybackState::Queued);
            }
            PlaybackState::Queued => self.arm(),
            _ => {}
        }
        Ok(())
    }

    /// Pop the front entry and start crossfading into it on the alternate channel.
    fn next_queue(&mut self) -> bool {
        let Some(entry) = self.queue.pop() else {
            return false;
        };
        let next = self.active_channel.other();
        let node = self.node(entry.clip);

        self.activate(entry.clip);
        self.backend.disconnect(next);
        self.backend.connect(next, node);
        self.connected[next.index()] = Some(entry.clip);
        self.backend.set_weight(next, 0.0);
        self.backend.set_speed(node, 1.0);
        self.set_state(PlaybackState::Blending);

        self.remaining = entry.blend;
        self.target = entry.blend;
        self.backend.set_time(node, 0.0);
        self.events
            .push(PlaybackEvent::QueueAdvanced { clip: entry.clip });
        true
    }
}

impl<B: PoseBackend> fmt::Debug for CrossfadePlayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossfadePlayer")
            .field("initialized", &self.is_initialized())
            .field("state", &self.state())
            .field("active_clip", &self.active_clip())
            .field("active_channel", &self.active_channel())
            .field("queue_len", &self.queue_len())
            .finish()
    }
}
