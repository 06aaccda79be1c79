use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;
use tokio::task;
use tracing::debug;

use crate::error::{CompositorError, DecodeError, Result};
use crate::raster::types::RasterImage;

/// Decodes raw image bytes into [`RasterImage`]s
///
/// Every failure is reported as a [`DecodeError`]; nothing here falls back to
/// a blank image.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Guess the container format from the leading bytes
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// Whether the bytes look like an image we can decode
    pub fn is_image(bytes: &[u8]) -> bool {
        Self::sniff(bytes).map(|format| format.can_read()).unwrap_or(false)
    }

    /// Whether a path has an image file extension
    pub fn is_image_path<P: AsRef<Path>>(path: P) -> bool {
        ImageFormat::from_path(path)
            .map(|format| format.can_read())
            .unwrap_or(false)
    }

    /// Decode bytes synchronously
    pub fn decode(bytes: &[u8], source_name: &str) -> Result<RasterImage> {
        let format = Self::sniff(bytes).ok_or_else(|| DecodeError::UnrecognizedFormat {
            source_name: source_name.to_string(),
        })?;

        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            DecodeError::InvalidImage {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            }
        })?;

        let image = RasterImage::from_rgba(decoded.to_rgba8(), source_name)?;
        debug!(
            "Decoded {} as {:?}: {}x{}",
            source_name,
            format,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Decode bytes on the blocking pool
    pub async fn decode_async(bytes: Arc<[u8]>, source_name: String) -> Result<RasterImage> {
        task::spawn_blocking(move || Self::decode(&bytes, &source_name))
            .await
            .map_err(|e| CompositorError::generic(format!("Decode task failed: {}", e)))?
    }

    /// Read an image file's raw bytes without decoding them
    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        tokio::fs::read(path).await.map_err(|e| {
            debug!("Failed to read {:?}: {}", path, e);
            DecodeError::ReadFailed {
                path: path.display().to_string(),
            }
            .into()
        })
    }

    /// Read and decode an image file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<RasterImage> {
        let path = path.as_ref();
        let bytes = Self::read(path).await?;
        Self::decode_async(Arc::from(bytes), path.display().to_string()).await
    }
}
