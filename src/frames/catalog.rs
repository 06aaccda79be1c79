use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::{
    config::FramesConfig,
    error::{AssetError, CompositorError, DecodeError, Result},
    raster::{ImageDecoder, RasterImage},
};

/// Where a frame's encoded bytes come from
#[derive(Debug, Clone)]
pub enum FrameSource {
    /// Read from disk each time the frame is loaded
    File(PathBuf),

    /// Already in memory
    Memory(Arc<[u8]>),
}

/// A selectable frame overlay
#[derive(Debug, Clone)]
pub struct FrameAsset {
    /// Stable identifier
    pub id: String,

    /// Human-readable label
    pub label: String,

    pub source: FrameSource,
}

impl FrameAsset {
    pub fn from_file<I: Into<String>, L: Into<String>, P: Into<PathBuf>>(id: I, label: L, path: P) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: FrameSource::File(path.into()),
        }
    }

    pub fn from_bytes<I: Into<String>, L: Into<String>>(id: I, label: L, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: FrameSource::Memory(Arc::from(bytes)),
        }
    }

    /// Decode the frame image
    ///
    /// An unreadable file is an [`AssetError::LoadFailed`]; bytes that are
    /// not an image are a [`DecodeError`].
    pub async fn load(&self) -> Result<RasterImage> {
        debug!("Loading frame '{}'", self.id);
        match &self.source {
            FrameSource::File(path) => ImageDecoder::load(path).await.map_err(|e| match e {
                CompositorError::Decode(DecodeError::ReadFailed { path }) => AssetError::LoadFailed {
                    id: self.id.clone(),
                    reason: format!("cannot read {}", path),
                }
                .into(),
                other => other,
            }),
            FrameSource::Memory(bytes) => {
                ImageDecoder::decode_async(Arc::clone(bytes), format!("frame '{}'", self.id)).await
            }
        }
    }
}

/// Ordered catalog of frame overlays
///
/// Order matters: frames are selected by position, the way the thumbnails
/// are laid out.
#[derive(Debug, Clone, Default)]
pub struct FrameCatalog {
    assets: Vec<FrameAsset>,
}

impl FrameCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog described by the configuration
    pub fn from_config(config: &FramesConfig) -> Result<Self> {
        let mut catalog = Self::new();
        for entry in &config.entries {
            catalog.register(FrameAsset::from_file(
                entry.id.clone(),
                entry.label.clone(),
                config.resolve(entry),
            ))?;
        }
        Ok(catalog)
    }

    /// Built-in frames resolved against the default assets directory
    pub fn builtin() -> Result<Self> {
        Self::from_config(&FramesConfig::default())
    }

    /// Append a frame; ids must be unique
    pub fn register(&mut self, asset: FrameAsset) -> Result<usize> {
        if self.assets.iter().any(|a| a.id == asset.id) {
            return Err(AssetError::Duplicate { id: asset.id }.into());
        }
        self.assets.push(asset);
        Ok(self.assets.len() - 1)
    }

    /// Get a frame by position
    pub fn get(&self, index: usize) -> Result<&FrameAsset> {
        self.assets.get(index).ok_or_else(|| {
            AssetError::IndexOutOfRange {
                index,
                len: self.assets.len(),
            }
            .into()
        })
    }

    /// Position of the frame with the given id
    pub fn position(&self, id: &str) -> Result<usize> {
        self.assets
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AssetError::NotFound { id: id.to_string() }.into())
    }

    /// Resolve a user-supplied selector: an id, or a zero-based index
    pub fn resolve(&self, selector: &str) -> Result<usize> {
        if let Ok(index) = self.position(selector) {
            return Ok(index);
        }

        match selector.parse::<usize>() {
            Ok(index) => self.get(index).map(|_| index),
            Err(_) => Err(AssetError::NotFound { id: selector.to_string() }.into()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameAsset> {
        self.assets.iter()
    }

    /// Get all frame ids in display order
    pub fn ids(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
