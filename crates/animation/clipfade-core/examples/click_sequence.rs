//! Replays the classic "click" sequence against the in-memory backend:
//! crossfade into clip 1, queue clip 2 as a hard cut, then queue clip 0 with a
//! longer crossfade. Run with `RUST_LOG=debug` to see state transitions.

use clipfade_core::{
    ClipDriver, ClipId, ClipSet, Config, DriverSettings, PlaybackEvent, SimConsumer, SimGraph,
};
use serde_json::to_string_pretty;

const CLIPS: &str = r#"{
  "name": "demo",
  "clips": [
    { "name": "idle", "duration": 2.0, "wrap_mode": "loop" },
    { "name": "wave", "duration": 1.2 },
    { "name": "bow",  "duration": 0.8 }
  ]
}"#;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let set = ClipSet::from_json_str(CLIPS)?;
    let mut driver = ClipDriver::new(
        Config::default(),
        DriverSettings::default(),
        SimConsumer::new("demo-rig"),
        set.clips().to_vec(),
        SimGraph::new,
    );
    driver.on_start()?;
    driver.on_enable()?;

    let dt = 1.0 / 30.0;
    for frame in 0..120 {
        if frame == 15 {
            let player = driver.player_mut();
            player.play(ClipId(1), 0.2, 0.0)?;
            player.play_queued(ClipId(2), 0.0)?;
            player.play_queued(ClipId(0), 0.4)?;
        }
        let events = driver.update(dt)?;
        for ev in &events {
            if !matches!(ev, PlaybackEvent::Started { .. }) {
                println!("frame {frame:>3}: {ev:?}");
            }
        }
        if frame % 15 == 0 {
            if let Some(graph) = driver.player().backend() {
                println!("frame {frame:>3}: {}", to_string_pretty(&graph.sample())?);
            }
        }
    }

    driver.on_disable()?;
    if let Some(graph) = driver.on_destroy() {
        println!("graph steps: {}", graph.evaluate_count());
    }
    Ok(())
}
