//! Model decoders, selected by file extension.

#[cfg(feature = "gltf")]
pub mod gltf;
pub mod rig;

use std::sync::Arc;

use fawn_core::errors::AssetError;

use crate::asset::Asset;
use crate::io::source_filename;

/// Turns raw bytes into an [`Asset`]. Runs on a blocking thread.
pub trait AssetDecoder: Send + Sync + 'static {
    /// Lower-case extensions without the leading dot (`"glb"`, `"rig.json"`).
    fn extensions(&self) -> &[&'static str];

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<Asset, AssetError>;
}

#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn AssetDecoder>>,
}

impl Default for DecoderRegistry {
    /// Every decoder compiled into this build.
    fn default() -> Self {
        let registry = Self::empty().with_decoder(rig::RigDecoder);
        #[cfg(feature = "gltf")]
        let registry = registry.with_decoder(gltf::GltfDecoder);
        registry
    }
}

impl DecoderRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: impl AssetDecoder) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    /// Finds the decoder with the longest extension matching `path`.
    pub fn find(&self, path: &str) -> Result<Arc<dyn AssetDecoder>, AssetError> {
        let filename = source_filename(path).to_ascii_lowercase();
        self.decoders
            .iter()
            .filter_map(|decoder| {
                decoder
                    .extensions()
                    .iter()
                    .filter(|ext| filename.ends_with(&format!(".{ext}")))
                    .map(|ext| ext.len())
                    .max()
                    .map(|len| (len, decoder))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, decoder)| Arc::clone(decoder))
            .ok_or_else(|| AssetError::UnsupportedFormat(path.to_string()))
    }
}
