//! Asynchronous Model Loading
//!
//! [`AssetLoader::load`] starts a background fetch-and-decode and returns a
//! [`LoadTask`]. A task reports zero or more [`LoadProgress`] events followed
//! by exactly one terminal outcome: the decoded [`Asset`] or an
//! [`AssetError`].
//!
//! The progress channel is closed before the outcome is published, so every
//! consumer observes the terminal outcome strictly after the last progress
//! event.
//!
//! # Consumption styles
//!
//! ```rust,ignore
//! // 1. Async: stream progress, then await the outcome.
//! let task = loader.load("model/deer.glb");
//! let mut progress = task.progress_stream();
//! while let Some(p) = progress.next().await { log::info!("{:.0}%", p.fraction() * 100.0); }
//! let asset = task.finish().await?;
//!
//! // 2. Frame-loop polling, never blocks.
//! while let Some(event) = task.try_next_event() { /* ... */ }
//!
//! // 3. Callbacks.
//! loader.load_with_callbacks("model/deer.glb", on_progress, on_success, on_failure);
//! ```

use std::sync::{Arc, OnceLock};

use fawn_core::errors::AssetError;
use tokio::runtime::{Handle, Runtime};

use crate::asset::Asset;
use crate::formats::DecoderRegistry;
use crate::io::{AssetReader, CancelToken, FileAssetReader, LoadProgress, ProgressSink, source_stem};

/// Default read granularity (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

fn get_asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

/// An event observed while polling a [`LoadTask`].
#[derive(Debug)]
pub enum LoadEvent {
    Progress(LoadProgress),
    Loaded(Asset),
    Failed(AssetError),
}

impl LoadEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoadEvent::Progress(_))
    }
}

/// Handle to one in-flight load.
///
/// Dropping an unfinished task cancels it.
pub struct LoadTask {
    path: String,
    progress: flume::Receiver<LoadProgress>,
    outcome: flume::Receiver<Result<Asset, AssetError>>,
    cancel: CancelToken,
    finished: bool,
}

impl LoadTask {
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Requests cancellation. The task ends with [`AssetError::Cancelled`]
    /// unless it already finished reading.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Finite stream of progress events. It ends when reading completes and
    /// cannot be restarted: events consumed here are gone for other readers.
    #[must_use]
    pub fn progress_stream(&self) -> flume::r#async::RecvStream<'static, LoadProgress> {
        self.progress.clone().into_stream()
    }

    /// Waits for the terminal outcome. Pending progress events are discarded.
    pub async fn finish(mut self) -> Result<Asset, AssetError> {
        let outcome = self.outcome.recv_async().await;
        self.finished = true;
        outcome.unwrap_or_else(|_| Err(Self::lost_outcome()))
    }

    /// Waits for the next event; `None` once the terminal event was returned.
    pub async fn next_event(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        if let Ok(progress) = self.progress.recv_async().await {
            return Some(LoadEvent::Progress(progress));
        }
        let outcome = self.outcome.recv_async().await;
        Some(self.terminal(outcome.unwrap_or_else(|_| Err(Self::lost_outcome()))))
    }

    /// Returns the next event if one is ready, without blocking.
    pub fn try_next_event(&mut self) -> Option<LoadEvent> {
        if self.finished {
            return None;
        }
        match self.progress.try_recv() {
            Ok(progress) => return Some(LoadEvent::Progress(progress)),
            Err(flume::TryRecvError::Empty) => return None,
            Err(flume::TryRecvError::Disconnected) => {}
        }
        match self.outcome.try_recv() {
            Ok(outcome) => Some(self.terminal(outcome)),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(self.terminal(Err(Self::lost_outcome()))),
        }
    }

    fn terminal(&mut self, outcome: Result<Asset, AssetError>) -> LoadEvent {
        self.finished = true;
        match outcome {
            Ok(asset) => LoadEvent::Loaded(asset),
            Err(err) => LoadEvent::Failed(err),
        }
    }

    fn lost_outcome() -> AssetError {
        AssetError::TaskJoin("load task ended without an outcome".to_string())
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel.cancel();
        }
    }
}

/// Starts model loads on a tokio runtime.
pub struct AssetLoader<R: AssetReader = FileAssetReader> {
    reader: Arc<R>,
    decoders: DecoderRegistry,
    chunk_size: usize,
    runtime: Handle,
}

impl Default for AssetLoader<FileAssetReader> {
    fn default() -> Self {
        Self::new(FileAssetReader::default())
    }
}

impl<R: AssetReader> AssetLoader<R> {
    /// Creates a loader on the shared asset runtime.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Arc::new(reader),
            decoders: DecoderRegistry::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            runtime: get_asset_runtime().handle().clone(),
        }
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = runtime;
        self
    }

    #[must_use]
    pub fn with_decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Starts loading `path`. Never blocks.
    pub fn load(&self, path: impl Into<String>) -> LoadTask {
        let path = path.into();
        let (progress_tx, progress_rx) = flume::unbounded();
        let (outcome_tx, outcome_rx) = flume::bounded(1);
        let cancel = CancelToken::new();

        log::info!("Loading model '{path}'");

        let reader = Arc::clone(&self.reader);
        let decoders = self.decoders.clone();
        let sink = ProgressSink::new(progress_tx, cancel.clone(), self.chunk_size);
        let uri = path.clone();

        self.runtime.spawn(async move {
            let outcome = fetch_and_decode(reader.as_ref(), &decoders, &uri, sink).await;
            match &outcome {
                Ok(asset) => log::info!(
                    "Loaded model '{uri}' ({} clip(s): {:?})",
                    asset.clips.len(),
                    asset.clip_names()
                ),
                Err(err) => log::error!("Failed to load model '{uri}': {err}"),
            }
            // The receiver may be gone if the task handle was dropped.
            let _ = outcome_tx.send(outcome);
        });

        LoadTask {
            path,
            progress: progress_rx,
            outcome: outcome_rx,
            cancel,
            finished: false,
        }
    }

    /// Callback form of [`load`](Self::load).
    ///
    /// `on_progress` fires zero or more times, then exactly one of
    /// `on_success` / `on_failure`. Callbacks run on the loader runtime.
    pub fn load_with_callbacks<P, S, F>(
        &self,
        path: impl Into<String>,
        mut on_progress: P,
        on_success: S,
        on_failure: F,
    ) -> CancelToken
    where
        P: FnMut(LoadProgress) + Send + 'static,
        S: FnOnce(Asset) + Send + 'static,
        F: FnOnce(AssetError) + Send + 'static,
    {
        let mut task = self.load(path);
        let token = task.cancel_token();

        self.runtime.spawn(async move {
            while let Some(event) = task.next_event().await {
                match event {
                    LoadEvent::Progress(progress) => on_progress(progress),
                    LoadEvent::Loaded(asset) => {
                        on_success(asset);
                        break;
                    }
                    LoadEvent::Failed(err) => {
                        on_failure(err);
                        break;
                    }
                }
            }
        });

        token
    }
}

async fn fetch_and_decode<R: AssetReader>(
    reader: &R,
    decoders: &DecoderRegistry,
    uri: &str,
    mut sink: ProgressSink,
) -> Result<Asset, AssetError> {
    let decoder = decoders.find(uri)?;
    let bytes = reader.read_bytes(uri, &mut sink).await?;
    sink.check_cancelled(uri)?;
    // Closes the progress stream before the outcome exists.
    drop(sink);

    log::debug!("Read {} byte(s) from '{uri}', decoding", bytes.len());

    let name = source_stem(uri).to_string();
    tokio::task::spawn_blocking(move || decoder.decode(&name, &bytes))
        .await
        .map_err(|e| AssetError::TaskJoin(e.to_string()))?
}
