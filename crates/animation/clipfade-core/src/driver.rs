//! Frame-lifecycle driver.
//!
//! Hosts usually own a component with enable/start/update/disable/destroy
//! hooks. `ClipDriver` maps those hooks onto a [`CrossfadePlayer`]; the player
//! never calls back into the driver.

use serde::{Deserialize, Serialize};

use crate::backend::PoseBackend;
use crate::config::Config;
use crate::events::PlaybackEvent;
use crate::ids::ClipId;
use crate::player::CrossfadePlayer;

pub const MAX_QUEUE_LIMIT: usize = 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Initialize and start `default_clip` as soon as the driver is enabled.
    pub play_automatically: bool,
    pub default_clip: ClipId,
    /// Transition queue capacity, kept within `1..=16`.
    pub max_queue: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            play_automatically: true,
            default_clip: ClipId(0),
            max_queue: 8,
        }
    }
}

impl DriverSettings {
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.max_queue.clamp(1, MAX_QUEUE_LIMIT)
    }
}

/// Owns a player plus everything needed to (re)initialize it.
pub struct ClipDriver<B, F>
where
    B: PoseBackend,
    F: FnMut() -> B,
{
    settings: DriverSettings,
    consumer: B::Consumer,
    clips: Vec<B::Clip>,
    make_backend: F,
    player: CrossfadePlayer<B>,
}

impl<B, F> ClipDriver<B, F>
where
    B: PoseBackend,
    F: FnMut() -> B,
{
    pub fn new(
        cfg: Config,
        settings: DriverSettings,
        consumer: B::Consumer,
        clips: Vec<B::Clip>,
        make_backend: F,
    ) -> Self {
        Self {
            settings,
            consumer,
            clips,
            make_backend,
            player: CrossfadePlayer::new(cfg),
        }
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn player(&self) -> &CrossfadePlayer<B> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut CrossfadePlayer<B> {
        &mut self.player
    }

    pub fn on_enable(&mut self) -> crate::Result<()> {
        if self.settings.play_automatically {
            self.ensure_initialized()?;
            self.player.play(self.settings.default_clip, 0.0, 0.0)?;
        }
        Ok(())
    }

    pub fn on_start(&mut self) -> crate::Result<()> {
        self.ensure_initialized()
    }

    /// Step the player by `dt` and hand back the events raised this frame.
    pub fn update(&mut self, dt: f32) -> crate::Result<Vec<PlaybackEvent>> {
        self.player.proc(dt)?;
        Ok(self.player.drain_events())
    }

    pub fn on_disable(&mut self) -> crate::Result<()> {
        if self.player.is_playing() {
            self.player.stop()?;
        }
        Ok(())
    }

    /// Release the player; returns the backend it owned, if any.
    pub fn on_destroy(&mut self) -> Option<B> {
        self.player.release()
    }

    fn ensure_initialized(&mut self) -> crate::Result<()> {
        if self.player.is_initialized() {
            return Ok(());
        }
        let backend = (self.make_backend)();
        self.player.initialize(
            backend,
            &self.consumer,
            &self.clips,
            self.settings.queue_capacity(),
        )
    }
}
