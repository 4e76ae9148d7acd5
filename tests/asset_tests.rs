//! Asset Loading Tests
//!
//! Tests for:
//! - Progress ordering: monotone, bounded, terminal outcome last
//! - Failure outcomes (missing file, unknown format, malformed data)
//! - Cancellation
//! - The three consumption styles (stream + finish, polling, callbacks)
//! - FileAssetReader against a real file

use std::sync::mpsc;
use std::time::Duration;

use futures::StreamExt;

use fawn::assets::io::ProgressSink;
use fawn::assets::{
    AssetLoader, AssetReader, DecoderRegistry, FileAssetReader, LoadEvent, LoadProgress,
    MemoryAssetReader,
};
use fawn::AssetError;

const DEER_RIG: &str = r#"{
    "root": { "name": "Armature", "children": [
        { "name": "Body", "mesh": true, "children": [{ "name": "Head", "mesh": true }] }
    ]},
    "animations": [
        { "name": "idle", "tracks": [
            { "node": "Body", "target": "translation",
              "times": [0.0, 2.0], "values": [[0, 0, 0], [0, 0.1, 0]] }
        ]},
        { "name": "die", "tracks": [
            { "node": "Body", "target": "rotation",
              "times": [0.0, 1.0], "values": [[0, 0, 0, 1], [0.7071, 0, 0, 0.7071]] }
        ]}
    ]
}"#;

fn deer_loader(chunk_size: usize) -> AssetLoader<MemoryAssetReader> {
    let reader = MemoryAssetReader::new().with_entry("model/deer.rig.json", DEER_RIG.as_bytes());
    AssetLoader::new(reader).with_chunk_size(chunk_size)
}

fn assert_progress_well_formed(events: &[LoadProgress]) {
    for pair in events.windows(2) {
        assert!(
            pair[0].loaded_bytes <= pair[1].loaded_bytes,
            "progress went backwards: {pair:?}"
        );
    }
    for event in events {
        assert!(event.loaded_bytes <= event.total_bytes, "{event:?}");
    }
}

/// Reports one chunk, then waits until the load is cancelled.
struct StallingReader;

impl AssetReader for StallingReader {
    async fn read_bytes(
        &self,
        uri: &str,
        progress: &mut ProgressSink,
    ) -> Result<Vec<u8>, AssetError> {
        progress.report(1, 100);
        loop {
            progress.check_cancelled(uri)?;
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

// ============================================================================
// Stream + Finish
// ============================================================================

#[test]
fn progress_stream_then_outcome() {
    let loader = deer_loader(64);
    let task = loader.load("model/deer.rig.json");

    let (progress, outcome) = pollster::block_on(async move {
        let progress: Vec<LoadProgress> = task.progress_stream().collect().await;
        (progress, task.finish().await)
    });

    let asset = outcome.expect("deer should load");
    assert_eq!(asset.name, "deer");
    assert_eq!(asset.clip_names(), vec!["idle", "die"]);
    assert_eq!(asset.root.mesh_count(), 2);
    assert!(asset.root.find("Head").is_some());

    assert!(!progress.is_empty());
    assert_progress_well_formed(&progress);
    let last = progress.last().unwrap();
    assert_eq!(last.loaded_bytes, DEER_RIG.len() as u64);
    assert_eq!(last.total_bytes, DEER_RIG.len() as u64);
    assert!((last.fraction() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn one_progress_event_per_chunk() {
    let loader = deer_loader(DEER_RIG.len().div_ceil(4));
    let task = loader.load("model/deer.rig.json");

    let progress: Vec<LoadProgress> =
        pollster::block_on(task.progress_stream().collect::<Vec<_>>());
    assert_eq!(progress.len(), 4);
    assert!(pollster::block_on(task.finish()).is_ok());
}

// ============================================================================
// Polling
// ============================================================================

#[test]
fn polling_sees_terminal_event_last_and_once() {
    let loader = deer_loader(128);
    let mut task = loader.load("model/deer.rig.json");

    let mut events = Vec::new();
    while !task.is_finished() {
        match task.try_next_event() {
            Some(event) => events.push(event),
            None => std::thread::sleep(Duration::from_millis(1)),
        }
    }
    assert!(task.try_next_event().is_none());

    let (terminal, progress) = events.split_last().unwrap();
    assert!(matches!(terminal, LoadEvent::Loaded(_)));
    assert!(progress.iter().all(|e| !e.is_terminal()));
}

#[test]
fn next_event_ends_after_terminal() {
    let loader = deer_loader(256);
    let mut task = loader.load("model/deer.rig.json");

    let events = pollster::block_on(async {
        let mut events = Vec::new();
        while let Some(event) = task.next_event().await {
            events.push(event);
        }
        events
    });

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(events.last().is_some_and(LoadEvent::is_terminal));
}

// ============================================================================
// Callbacks
// ============================================================================

#[derive(Debug)]
enum Seen {
    Progress(LoadProgress),
    Success(Vec<String>),
    Failure(String),
}

fn run_with_callbacks(loader: &AssetLoader<MemoryAssetReader>, path: &str) -> Vec<Seen> {
    let (tx, rx) = mpsc::channel();
    let (on_success, on_failure) = (tx.clone(), tx.clone());

    loader.load_with_callbacks(
        path,
        move |p| {
            let _ = tx.send(Seen::Progress(p));
        },
        move |asset| {
            let names = asset.clip_names().iter().map(ToString::to_string).collect();
            let _ = on_success.send(Seen::Success(names));
        },
        move |err| {
            let _ = on_failure.send(Seen::Failure(err.to_string()));
        },
    );

    // Ends once every callback has been dropped.
    rx.iter().collect()
}

#[test]
fn callbacks_fire_success_exactly_once_after_progress() {
    let seen = run_with_callbacks(&deer_loader(100), "model/deer.rig.json");

    let (terminal, progress) = seen.split_last().unwrap();
    assert!(matches!(terminal, Seen::Success(names) if names == &["idle", "die"]));
    assert!(progress.iter().all(|s| matches!(s, Seen::Progress(_))));
}

#[test]
fn callbacks_fire_failure_for_missing_model() {
    let seen = run_with_callbacks(&deer_loader(100), "model/elk.rig.json");

    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], Seen::Failure(msg) if msg.contains("model/elk.rig.json")));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_model_is_not_found() {
    let loader = deer_loader(64);
    let outcome = pollster::block_on(loader.load("model/elk.rig.json").finish());
    assert!(matches!(outcome, Err(AssetError::NotFound(path)) if path == "model/elk.rig.json"));
}

#[test]
fn unknown_extension_fails_without_progress() {
    let reader = MemoryAssetReader::new().with_entry("model/deer.fbx", b"FBX".as_slice());
    let loader = AssetLoader::new(reader);
    let mut task = loader.load("model/deer.fbx");

    let first = pollster::block_on(task.next_event());
    assert!(matches!(
        first,
        Some(LoadEvent::Failed(AssetError::UnsupportedFormat(_)))
    ));
}

#[test]
fn malformed_model_is_a_format_error() {
    let reader = MemoryAssetReader::new().with_entry("broken.rig.json", b"{ \"root\": 3 }".as_slice());
    let loader = AssetLoader::new(reader);
    let outcome = pollster::block_on(loader.load("broken.rig.json").finish());
    assert!(matches!(outcome, Err(AssetError::Format(_))));
}

#[test]
fn empty_registry_rejects_everything() {
    let loader = deer_loader(64).with_decoders(DecoderRegistry::empty());
    let outcome = pollster::block_on(loader.load("model/deer.rig.json").finish());
    assert!(matches!(outcome, Err(AssetError::UnsupportedFormat(_))));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn cancelled_load_reports_cancelled() {
    let loader = AssetLoader::new(StallingReader);
    let mut task = loader.load("model/deer.rig.json");

    let first = pollster::block_on(task.next_event());
    assert!(matches!(first, Some(LoadEvent::Progress(_))));

    task.cancel();
    let outcome = pollster::block_on(task.finish());
    assert!(matches!(outcome, Err(AssetError::Cancelled(path)) if path == "model/deer.rig.json"));
}

#[test]
fn dropping_task_cancels_load() {
    let loader = AssetLoader::new(StallingReader);
    let task = loader.load("model/deer.rig.json");
    let token = task.cancel_token();

    drop(task);
    assert!(token.is_cancelled());
}

// ============================================================================
// FileAssetReader
// ============================================================================

#[test]
fn file_reader_loads_from_disk() {
    let dir = std::env::temp_dir();
    let file_name = format!("fawn-{}.rig.json", uuid::Uuid::new_v4());
    let path = dir.join(&file_name);
    std::fs::write(&path, DEER_RIG).unwrap();

    let loader = AssetLoader::new(FileAssetReader::new(&dir)).with_chunk_size(32);
    let task = loader.load(file_name);
    let (progress, outcome) = pollster::block_on(async move {
        let progress: Vec<LoadProgress> = task.progress_stream().collect().await;
        (progress, task.finish().await)
    });
    std::fs::remove_file(&path).unwrap();

    let asset = outcome.unwrap();
    assert_eq!(asset.clips.len(), 2);
    assert_eq!(progress.len(), DEER_RIG.len().div_ceil(32));
    assert_progress_well_formed(&progress);
}

#[test]
fn file_reader_reports_missing_file() {
    let loader = AssetLoader::new(FileAssetReader::new(std::env::temp_dir()));
    let missing = format!("fawn-{}.rig.json", uuid::Uuid::new_v4());
    let outcome = pollster::block_on(loader.load(missing).finish());
    assert!(matches!(outcome, Err(AssetError::NotFound(_))));
}
