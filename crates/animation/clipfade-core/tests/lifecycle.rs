use clipfade_core::{
    ClipId, ClipSet, Config, CrossfadeError, CrossfadePlayer, GraphCall, PlaybackEvent,
    PlaybackState, PoseBackend, SimClip, SimConsumer, SimGraph, WrapMode,
};
use clipfade_test_fixtures::clipsets;

fn pair() -> ClipSet {
    clipsets::load("crossfade-pair").expect("clip set fixture")
}

fn initialized(set: &ClipSet) -> CrossfadePlayer<SimGraph> {
    let mut p = CrossfadePlayer::new(Config::default());
    p.initialize(
        SimGraph::recording(),
        &SimConsumer::new("rig"),
        set.clips(),
        4,
    )
    .expect("initialize");
    p
}

#[test]
fn empty_clip_set_is_rejected() {
    let mut p: CrossfadePlayer<SimGraph> = CrossfadePlayer::new(Config::default());
    let err = p
        .initialize(SimGraph::new(), &SimConsumer::new("rig"), &[], 4)
        .unwrap_err();
    assert_eq!(err, CrossfadeError::EmptyClipSet);
    assert!(!p.is_initialized());
}

#[test]
fn consumer_with_controller_is_rejected() {
    let set = pair();
    let mut p = CrossfadePlayer::new(Config::default());
    let err = p
        .initialize(
            SimGraph::new(),
            &SimConsumer::new("rig").with_controller(),
            set.clips(),
            4,
        )
        .unwrap_err();
    assert_eq!(
        err,
        CrossfadeError::ConflictingController {
            consumer: "rig".into()
        }
    );
    assert!(!p.is_initialized());
}

#[test]
fn nan_epsilon_is_rejected_at_initialize() {
    let set = pair();
    let mut p = CrossfadePlayer::new(Config {
        epsilon: f32::NAN,
        ..Config::default()
    });
    let err = p
        .initialize(
            SimGraph::recording(),
            &SimConsumer::new("rig"),
            set.clips(),
            4,
        )
        .unwrap_err();
    assert!(matches!(err, CrossfadeError::Config { .. }));
    assert!(!p.is_initialized());
    assert_eq!(p.play(ClipId(0), 0.2, 0.0), Err(CrossfadeError::NotInitialized));
}

#[test]
fn initialize_builds_graph_and_clip_nodes() {
    let set = pair();
    let p = initialized(&set);
    let g = p.backend().unwrap();
    assert!(g.is_valid());
    assert_eq!(g.name(), "Animation Player");
    assert_eq!(g.output(), Some("rig"));
    assert_eq!(
        &g.calls()[..3],
        &[
            GraphCall::CreateGraph {
                name: "Animation Player".into(),
                consumer: "rig".into()
            },
            GraphCall::CreateClip {
                node: g.node_of(0),
                name: "A".into()
            },
            GraphCall::CreateClip {
                node: g.node_of(1),
                name: "B".into()
            },
        ]
    );
    assert_eq!(p.clip_count(), 2);
    let meta = p.clip_metadata(ClipId(0)).unwrap();
    assert_eq!(meta.duration, 2.0);
    assert_eq!(meta.wrap_mode, WrapMode::Clamp);
}

#[test]
fn initialize_twice_is_a_noop() {
    let set = pair();
    let mut p = initialized(&set);
    p.play(ClipId(0), 0.0, 0.0).unwrap();

    let other = ClipSet::new(vec![SimClip::new("X", 5.0, WrapMode::Loop)]);
    p.initialize(SimGraph::new(), &SimConsumer::new("other"), other.clips(), 4)
        .unwrap();
    assert_eq!(p.clip_count(), 2);
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.backend().unwrap().output(), Some("rig"));
}

#[test]
fn operations_require_initialize() {
    let mut p: CrossfadePlayer<SimGraph> = CrossfadePlayer::new(Config::default());
    assert_eq!(p.proc(0.1), Err(CrossfadeError::NotInitialized));
    assert_eq!(
        p.play(ClipId(0), 0.0, 0.0),
        Err(CrossfadeError::NotInitialized)
    );
    assert_eq!(
        p.play_queued(ClipId(0), 0.0),
        Err(CrossfadeError::NotInitialized)
    );
    assert_eq!(p.stop(), Err(CrossfadeError::NotInitialized));
    assert_eq!(p.end_loop(), Err(CrossfadeError::NotInitialized));
    assert!(!p.is_playing());
    assert!(p.release().is_none());
}

#[test]
fn release_destroys_graph_and_hands_it_back() {
    let set = pair();
    let mut p = initialized(&set);
    p.play(ClipId(0), 0.0, 0.0).unwrap();
    p.proc(0.1).unwrap();

    let g = p.release().expect("backend");
    assert!(!g.is_valid());
    assert_eq!(g.calls().last(), Some(&GraphCall::Destroy));
    assert!(!p.is_initialized());
    assert!(!p.is_playing());
    assert_eq!(p.proc(0.1), Err(CrossfadeError::NotInitialized));

    // a fresh cycle works after release
    p.initialize(g, &SimConsumer::new("rig"), set.clips(), 4)
        .unwrap();
    assert!(p.is_initialized());
    assert_eq!(p.state(), PlaybackState::Idle);
}

#[test]
fn unknown_clip_leaves_state_untouched() {
    let set = pair();
    let mut p = initialized(&set);
    p.play(ClipId(0), 0.0, 0.0).unwrap();
    let calls = p.backend().unwrap().calls().len();

    assert_eq!(
        p.play(ClipId(7), 0.2, 0.0),
        Err(CrossfadeError::UnknownClip {
            id: ClipId(7),
            clip_count: 2
        })
    );
    assert!(p.play_queued(ClipId(2), 0.0).is_err());
    assert_eq!(p.active_clip(), Some(ClipId(0)));
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.backend().unwrap().calls().len(), calls);
}

#[test]
fn invalid_durations_are_rejected() {
    let set = pair();
    let mut p = initialized(&set);
    assert!(matches!(
        p.play(ClipId(0), -0.5, 0.0),
        Err(CrossfadeError::InvalidDuration { .. })
    ));
    assert!(matches!(
        p.play(ClipId(0), 0.0, f32::NAN),
        Err(CrossfadeError::InvalidDuration { .. })
    ));
    assert!(matches!(
        p.proc(-1.0),
        Err(CrossfadeError::InvalidDuration { .. })
    ));
    assert!(!p.is_playing());
}

#[test]
fn events_serialize_for_transport() {
    let set = pair();
    let mut p = initialized(&set);
    p.play(ClipId(0), 0.0, 0.0).unwrap();
    p.play(ClipId(1), 0.2, 0.0).unwrap();
    p.stop().unwrap();

    let events = p.drain_events();
    assert_eq!(
        events,
        vec![
            PlaybackEvent::Started {
                clip: ClipId(0),
                blend: 0.0
            },
            PlaybackEvent::Started {
                clip: ClipId(1),
                blend: 0.2
            },
            PlaybackEvent::Stopped,
        ]
    );
    let json = serde_json::to_string(&events).unwrap();
    assert!(json.contains("Started"));
    assert!(p.drain_events().is_empty());
}
