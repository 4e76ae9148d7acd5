//! Model assets and their asynchronous loading pipeline.
//!
//! - [`asset`]: the loaded [`Asset`] (part hierarchy + animation clips)
//! - [`io`]: chunked byte readers with progress and cancellation
//! - [`formats`]: decoders (JSON rig, glTF behind the `gltf` feature)
//! - [`loader`]: [`AssetLoader`] and the [`LoadTask`] it returns

pub mod asset;
pub mod formats;
pub mod io;
pub mod loader;

pub use asset::{Asset, ModelNode};
pub use formats::{AssetDecoder, DecoderRegistry};
pub use io::{AssetReader, CancelToken, FileAssetReader, LoadProgress, MemoryAssetReader};
pub use loader::{AssetLoader, DEFAULT_CHUNK_SIZE, LoadEvent, LoadTask};
