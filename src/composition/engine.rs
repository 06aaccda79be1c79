use std::path::Path;
use std::sync::Arc;

use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    composition::compositor::{CompositeRequest, CompositeResult, Compositor},
    config::Config,
    error::{CompositorError, Result},
    frames::{FrameCatalog, Selection},
    raster::{ImageDecoder, RasterImage},
};

/// Orchestrates one frame generation
///
/// The pipeline is strictly sequential, since the frame is painted over the
/// subject:
/// 1. Subject Decoding - Turn the uploaded bytes into pixels
/// 2. Frame Loading - Decode the selected overlay
/// 3. Compositing - Flatten both layers onto the canvas and encode PNG
///
/// Any decode failure aborts the pipeline with an error; nothing blank or
/// half-drawn is ever returned.
pub struct FrameGenerator {
    config: Config,
    catalog: FrameCatalog,
}

impl FrameGenerator {
    /// Create a generator over an explicit catalog
    pub fn new(config: Config, catalog: FrameCatalog) -> Self {
        Self { config, catalog }
    }

    /// Validate the configuration and build the catalog it describes
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let catalog = FrameCatalog::from_config(&config.frames)?;
        Ok(Self::new(config, catalog))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &FrameCatalog {
        &self.catalog
    }

    /// The selection a fresh session starts with
    pub fn default_selection(&self) -> Selection {
        let index = self
            .catalog
            .position(&self.config.frames.default_frame)
            .unwrap_or(0);
        Selection::new(index, Default::default())
    }

    /// Run the whole pipeline for raw subject bytes
    pub async fn generate(&self, subject: Arc<[u8]>, selection: &Selection) -> Result<CompositeResult> {
        let asset = self.catalog.get(selection.frame_index())?;
        info!(
            "🖼️  Generating frame '{}' at {} ({} subject bytes)",
            asset.id,
            selection.rotation(),
            subject.len()
        );

        // Pipeline Step 1: Subject Decoding
        let subject = self.decode_subject(subject).await?;

        // Pipeline Step 2: Frame Loading
        debug!("Step 2: loading frame '{}'", asset.id);
        let frame = asset.load().await.map_err(|e| {
            warn!("Failed to load frame '{}': {}", asset.id, e);
            e
        })?;

        // Pipeline Step 3: Compositing
        self.composite(subject, frame, selection).await
    }

    /// Read an image file and run the pipeline on it
    pub async fn generate_from_file<P: AsRef<Path>>(
        &self,
        path: P,
        selection: &Selection,
    ) -> Result<CompositeResult> {
        let path = path.as_ref();
        debug!("Reading subject from {:?}", path);
        let bytes = ImageDecoder::read(path).await?;
        self.generate(Arc::from(bytes), selection).await
    }

    async fn decode_subject(&self, bytes: Arc<[u8]>) -> Result<RasterImage> {
        debug!("Step 1: decoding subject image");
        let subject = ImageDecoder::decode_async(bytes, "subject image".to_string())
            .await
            .map_err(|e| {
                warn!("Subject image rejected: {}", e);
                e
            })?;
        debug!("   Subject: {}x{}", subject.width(), subject.height());
        Ok(subject)
    }

    async fn composite(
        &self,
        subject: RasterImage,
        frame: RasterImage,
        selection: &Selection,
    ) -> Result<CompositeResult> {
        debug!("Step 3: compositing");
        let request = CompositeRequest::new(
            subject,
            frame,
            selection.rotation(),
            (self.config.canvas.width, self.config.canvas.height),
        );

        let result = task::spawn_blocking(move || Compositor::composite(&request))
            .await
            .map_err(|e| CompositorError::generic(format!("Composite task failed: {}", e)))??;

        info!(
            "   ✅ Composited {}x{} PNG ({} bytes)",
            result.width(),
            result.height(),
            result.as_bytes().len()
        );
        Ok(result)
    }
}
