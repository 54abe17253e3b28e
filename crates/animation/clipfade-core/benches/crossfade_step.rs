use std::hint::black_box;

use clipfade_core::{ClipId, Config, CrossfadePlayer, SimClip, SimConsumer, SimGraph, WrapMode};
use criterion::{criterion_group, criterion_main, Criterion};

fn setup() -> CrossfadePlayer<SimGraph> {
    let clips: Vec<SimClip> = (0..8)
        .map(|i| SimClip::new(format!("clip{i}"), 0.5 + i as f32 * 0.1, WrapMode::Clamp))
        .collect();
    let mut player = CrossfadePlayer::new(Config::default());
    player
        .initialize(SimGraph::new(), &SimConsumer::new("bench"), &clips, 16)
        .expect("initialize");
    player
}

fn bench_queued_sequence(c: &mut Criterion) {
    c.bench_function("proc_queued_sequence_600_frames", |b| {
        b.iter(|| {
            let mut player = setup();
            player.play(ClipId(0), 0.0, 0.0).expect("play");
            for i in 1..8 {
                player.play_queued(ClipId(i), 0.1).expect("queue");
            }
            for _ in 0..600 {
                player.proc(black_box(1.0 / 60.0)).expect("proc");
            }
            black_box(player.state())
        })
    });
}

criterion_group!(benches, bench_queued_sequence);
criterion_main!(benches);
