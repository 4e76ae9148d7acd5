use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fawn_core::errors::AssetError;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::io::AsyncReadExt;

/// Bytes read so far versus the expected total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded_bytes: u64,
    pub total_bytes: u64,
}

impl LoadProgress {
    /// Completion in `[0, 1]`. An empty asset counts as complete.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.total_bytes == 0 {
            1.0
        } else {
            self.loaded_bytes as f32 / self.total_bytes as f32
        }
    }
}

/// Shared cancellation flag for an in-flight load.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Per-load progress reporter handed to an [`AssetReader`].
///
/// Owns the sending half of the progress channel: dropping it closes the
/// progress stream.
pub struct ProgressSink {
    sender: flume::Sender<LoadProgress>,
    cancel: CancelToken,
    chunk_size: usize,
    last_loaded: u64,
}

impl ProgressSink {
    #[must_use]
    pub fn new(sender: flume::Sender<LoadProgress>, cancel: CancelToken, chunk_size: usize) -> Self {
        Self {
            sender,
            cancel,
            chunk_size: chunk_size.max(1),
            last_loaded: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Publishes a progress event, keeping `loaded` non-decreasing and never
    /// above `total`.
    pub fn report(&mut self, loaded: u64, total: u64) {
        let loaded = loaded.max(self.last_loaded);
        let total = total.max(loaded);
        self.last_loaded = loaded;
        // A consumer that stopped listening does not abort the load.
        let _ = self.sender.send(LoadProgress {
            loaded_bytes: loaded,
            total_bytes: total,
        });
    }

    /// Fails with [`AssetError::Cancelled`] once the load has been cancelled.
    pub fn check_cancelled(&self, uri: &str) -> Result<(), AssetError> {
        if self.cancel.is_cancelled() {
            return Err(AssetError::Cancelled(uri.to_string()));
        }
        Ok(())
    }
}

/// Asset reader trait. Implementations read in chunks of
/// [`ProgressSink::chunk_size`] and report after every chunk.
pub trait AssetReader: Send + Sync + 'static {
    fn read_bytes(
        &self,
        uri: &str,
        progress: &mut ProgressSink,
    ) -> impl Future<Output = Result<Vec<u8>, AssetError>> + Send;
}

/// Local file reader rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl Default for FileAssetReader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(
        &self,
        uri: &str,
        progress: &mut ProgressSink,
    ) -> Result<Vec<u8>, AssetError> {
        let path = self.root_path.join(uri);
        let io_err = |source: std::io::Error| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(path.display().to_string())
            } else {
                AssetError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        };

        let mut file = tokio::fs::File::open(&path).await.map_err(io_err)?;
        let total = file.metadata().await.map_err(io_err)?.len();

        let mut data = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; progress.chunk_size()];
        loop {
            progress.check_cancelled(uri)?;
            let read = file.read(&mut chunk).await.map_err(io_err)?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            progress.report(data.len() as u64, total);
        }
        Ok(data)
    }
}

/// In-memory reader for embedded models and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    entries: Arc<RwLock<FxHashMap<String, Arc<[u8]>>>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.entries.write().insert(uri.into(), bytes.into());
    }

    #[must_use]
    pub fn with_entry(self, uri: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(uri, bytes);
        self
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(
        &self,
        uri: &str,
        progress: &mut ProgressSink,
    ) -> Result<Vec<u8>, AssetError> {
        let bytes = self
            .entries
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(uri.to_string()))?;

        let total = bytes.len() as u64;
        let mut data = Vec::with_capacity(bytes.len());
        for chunk in bytes.chunks(progress.chunk_size()) {
            progress.check_cancelled(uri)?;
            data.extend_from_slice(chunk);
            progress.report(data.len() as u64, total);
            tokio::task::yield_now().await;
        }
        Ok(data)
    }
}

/// Returns the file name portion of a source path.
#[must_use]
pub fn source_filename(source: &str) -> &str {
    Path::new(source)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
}

/// Returns the file name up to its first dot (`deer.rig.json` -> `deer`).
#[must_use]
pub fn source_stem(source: &str) -> &str {
    let filename = source_filename(source);
    filename.split('.').next().filter(|s| !s.is_empty()).unwrap_or(filename)
}
