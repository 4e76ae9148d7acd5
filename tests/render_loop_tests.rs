//! Render Loop Tests
//!
//! Tests for:
//! - Readiness gating: no animation time passes before the model is ready
//! - Wall-clock deltas, with the first ready tick advancing by zero
//! - Trigger bindings enabled only once ready
//! - Load failure leaves the viewer permanently not ready
//! - Stopping the headless loop through a LoopHandle

use std::time::Duration;

use fawn::time::ManualTimeSource;
use fawn::{
    AnimationError, AssetLoader, Error, FixedCamera, FrameView, LoopHandle, MemoryAssetReader,
    RenderLoop, RenderSurface, TriggerBinding, ViewerContext, ViewerSettings,
};

const DEER_RIG: &str = r#"{
    "root": { "name": "Armature", "children": [{ "name": "Body", "mesh": true }] },
    "animations": [
        { "name": "idle", "tracks": [
            { "node": "Body", "target": "translation",
              "times": [0.0, 2.0], "values": [[0, 0, 0], [0, 1, 0]] }
        ]},
        { "name": "die", "tracks": [
            { "node": "Body", "target": "scale",
              "times": [0.0, 1.0], "values": [[1, 1, 1], [1, 0.2, 1]] }
        ]}
    ]
}"#;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    ready: bool,
    delta: f32,
    clip: Option<String>,
    time: f32,
    pose_len: usize,
}

#[derive(Default)]
struct RecordingSurface {
    frames: Vec<Snapshot>,
    stop_after: Option<(LoopHandle, usize)>,
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, frame: &FrameView<'_>) {
        self.frames.push(Snapshot {
            ready: frame.is_ready(),
            delta: frame.delta_seconds,
            clip: frame.active.map(|a| a.name().to_string()),
            time: frame.active.map_or(0.0, |a| a.time()),
            pose_len: frame.pose.len(),
        });
        if let Some((handle, limit)) = &self.stop_after
            && self.frames.len() >= *limit
        {
            handle.stop();
        }
    }
}

type TestLoop = RenderLoop<RecordingSurface, FixedCamera, ManualTimeSource>;

fn deer_loader() -> AssetLoader<MemoryAssetReader> {
    let reader = MemoryAssetReader::new().with_entry("model/deer.rig.json", DEER_RIG.as_bytes());
    AssetLoader::new(reader).with_chunk_size(64)
}

fn manual_loop() -> (TestLoop, ManualTimeSource) {
    let time = ManualTimeSource::new();
    let render_loop =
        RenderLoop::with_time_source(RecordingSurface::default(), FixedCamera, time.clone());
    (render_loop, time)
}

/// Ticks until the load reaches a terminal state.
fn tick_until_settled(render_loop: &mut TestLoop, context: &mut ViewerContext, time: &ManualTimeSource) {
    for _ in 0..5000 {
        render_loop.tick(context).unwrap();
        if context.is_ready() || context.status().is_failed() {
            return;
        }
        // Time spent loading must never reach the animation.
        time.advance_secs(1.0);
        std::thread::sleep(Duration::from_millis(1));
    }
    panic!("load did not settle");
}

// ============================================================================
// Readiness Gating
// ============================================================================

#[test]
fn ticks_before_ready_do_not_animate() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/deer.rig.json").unwrap();

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);
    assert!(context.is_ready());

    let frames = &render_loop.surface().frames;
    let (last, before) = frames.split_last().unwrap();
    for frame in before {
        assert!(!frame.ready);
        assert!(approx(frame.delta, 0.0));
        assert_eq!(frame.clip, None);
    }
    assert!(last.ready);
    assert!(approx(last.delta, 0.0), "first ready tick must advance by zero");
}

#[test]
fn ready_ticks_use_wall_clock_deltas() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/deer.rig.json").unwrap();

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);

    context.playback_mut().play(0).unwrap();
    time.advance_secs(0.25);
    render_loop.tick(&mut context).unwrap();
    time.advance_secs(0.5);
    render_loop.tick(&mut context).unwrap();

    let frames = &render_loop.surface().frames;
    let last = frames.last().unwrap();
    assert!(approx(last.delta, 0.5));
    assert_eq!(last.clip.as_deref(), Some("idle"));
    assert!(approx(last.time, 0.75), "got {}", last.time);
    assert_eq!(last.pose_len, 1);
}

#[test]
fn frame_index_counts_every_tick() {
    let mut context = ViewerContext::default();
    let (mut render_loop, _time) = manual_loop();
    for _ in 0..3 {
        render_loop.tick(&mut context).unwrap();
    }
    assert_eq!(render_loop.frame_index(), 3);
    assert_eq!(render_loop.surface().frames.len(), 3);
}

// ============================================================================
// Triggers
// ============================================================================

#[test]
fn triggers_enable_once_ready_and_switch_clips() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/deer.rig.json").unwrap();
    let triggers = TriggerBinding::by_index(["idle", "die"]);

    assert!(!triggers.is_enabled(&context));
    assert!(matches!(
        triggers.press(1, &mut context),
        Err(Error::Animation(AnimationError::NotReady))
    ));

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);
    assert!(triggers.is_enabled(&context));

    triggers.press_named("idle", &mut context).unwrap();
    time.advance_secs(0.5);
    render_loop.tick(&mut context).unwrap();

    triggers.press_named("die", &mut context).unwrap();
    time.advance_secs(0.25);
    render_loop.tick(&mut context).unwrap();

    let last = render_loop.surface().frames.last().unwrap();
    assert_eq!(last.clip.as_deref(), Some("die"));
    assert!(approx(last.time, 0.25));
    assert_eq!(context.playback().playing_count(), 1);
}

#[test]
fn settings_drive_autoplay_and_bindings() {
    let settings = ViewerSettings::default()
        .with_model(".", "model/deer.rig.json")
        .with_autoplay("die");
    let loader = deer_loader();
    let mut context = ViewerContext::from_settings(&settings);
    context.begin_load(&loader, &settings.model_path).unwrap();

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);

    assert_eq!(context.playback().active_index(), Some(1));
    let triggers = settings.trigger_binding();
    triggers.press(0, &mut context).unwrap();
    assert_eq!(context.playback().active_index(), Some(0));
}

// ============================================================================
// Load Failure
// ============================================================================

#[test]
fn failed_load_never_becomes_ready() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/missing.rig.json").unwrap();

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);
    assert!(context.status().is_failed());

    for _ in 0..5 {
        time.advance_secs(1.0);
        render_loop.tick(&mut context).unwrap();
    }
    assert!(!context.is_ready());
    assert!(render_loop.surface().frames.iter().all(|f| !f.ready));
    assert!(TriggerBinding::by_index(["idle"]).press(0, &mut context).is_err());
}

#[test]
fn begin_load_after_ready_is_rejected() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/deer.rig.json").unwrap();

    let (mut render_loop, time) = manual_loop();
    tick_until_settled(&mut render_loop, &mut context, &time);

    assert!(matches!(
        context.begin_load(&loader, "model/deer.rig.json"),
        Err(Error::Animation(AnimationError::AlreadyBuilt))
    ));
}

#[test]
fn cancel_load_marks_context_failed() {
    let loader = deer_loader();
    let mut context = ViewerContext::default();
    context.begin_load(&loader, "model/deer.rig.json").unwrap();
    context.cancel_load();

    assert!(context.status().is_failed());
    assert!(!context.poll_load());
    assert!(!context.is_ready());
}

// ============================================================================
// Headless Loop
// ============================================================================

#[test]
fn loop_handle_stops_headless_run() {
    let mut context = ViewerContext::default();
    let (mut render_loop, _time) = manual_loop();
    let handle = render_loop.handle();
    render_loop.surface_mut().stop_after = Some((handle, 4));

    let ticks = render_loop.run_headless(&mut context, Duration::ZERO).unwrap();
    assert_eq!(ticks, 4);
    assert!(render_loop.handle().is_stopped());
}

#[test]
fn stopped_handle_prevents_any_tick() {
    let mut context = ViewerContext::default();
    let (mut render_loop, _time) = manual_loop();
    render_loop.handle().stop();

    let ticks = render_loop.run_headless(&mut context, Duration::ZERO).unwrap();
    assert_eq!(ticks, 0);
    assert!(render_loop.surface().frames.is_empty());
}
