use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    composition::{compositor::CompositeResult, engine::FrameGenerator},
    error::{DecodeError, EncodeError, Result},
    frames::Selection,
    raster::ImageDecoder,
};

/// The state behind the upload / pick / rotate / download workflow
///
/// Every change to the subject, the frame choice or the rotation regenerates
/// the preview from scratch. A change that fails to render is rolled back, so
/// the session never holds a preview that disagrees with its inputs.
pub struct PreviewSession {
    generator: FrameGenerator,
    subject: Option<Arc<[u8]>>,
    selection: Selection,
    processed: Option<CompositeResult>,
}

impl PreviewSession {
    pub fn new(generator: FrameGenerator) -> Self {
        let selection = generator.default_selection();
        Self {
            generator,
            subject: None,
            selection,
            processed: None,
        }
    }

    pub fn generator(&self) -> &FrameGenerator {
        &self.generator
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The uploaded bytes, as given
    pub fn subject(&self) -> Option<&[u8]> {
        self.subject.as_deref()
    }

    /// The most recent successful composite
    pub fn processed(&self) -> Option<&CompositeResult> {
        self.processed.as_ref()
    }

    /// Accept an uploaded or dropped file's bytes
    ///
    /// Bytes that do not sniff as an image are refused up front.
    pub async fn set_subject(&mut self, bytes: Vec<u8>) -> Result<&CompositeResult> {
        if !ImageDecoder::is_image(&bytes) {
            return Err(DecodeError::UnrecognizedFormat {
                source_name: "uploaded file".to_string(),
            }.into());
        }

        info!("📥 New subject image ({} bytes)", bytes.len());
        let previous = self.subject.replace(Arc::from(bytes));
        if let Err(e) = self.regenerate().await {
            self.subject = previous;
            return Err(e);
        }
        self.current()
    }

    /// Read the subject from a file
    pub async fn load_subject<P: AsRef<Path>>(&mut self, path: P) -> Result<&CompositeResult> {
        let bytes = ImageDecoder::read(path).await?;
        self.set_subject(bytes).await
    }

    /// Pick a different frame by position
    pub async fn select_frame(&mut self, index: usize) -> Result<Option<&CompositeResult>> {
        let previous = self.selection;
        self.selection.select(index, self.generator.catalog())?;
        debug!("Selected frame {}", index);
        self.refresh_or_revert(previous).await
    }

    /// Pick a different frame by id or index string
    pub async fn select_frame_by(&mut self, selector: &str) -> Result<Option<&CompositeResult>> {
        let index = self.generator.catalog().resolve(selector)?;
        self.select_frame(index).await
    }

    /// Turn the frame a further 90° clockwise
    pub async fn rotate_quarter(&mut self) -> Result<Option<&CompositeResult>> {
        let previous = self.selection;
        self.selection.rotate_quarter();
        debug!("Rotation now {}", self.selection.rotation());
        self.refresh_or_revert(previous).await
    }

    /// Re-run the pipeline with the current inputs; `None` until a subject is set
    pub async fn refresh(&mut self) -> Result<Option<&CompositeResult>> {
        if self.subject.is_none() {
            return Ok(None);
        }
        self.regenerate().await?;
        Ok(self.processed.as_ref())
    }

    /// Write the preview under the configured file name inside `dir`
    pub async fn download<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let processed = self.current()?;
        let path = dir.as_ref().join(&self.generator.config().output.file_name);

        tokio::fs::write(&path, processed.as_bytes()).await?;
        info!("💾 Saved {:?}", path);
        Ok(path)
    }

    async fn refresh_or_revert(&mut self, previous: Selection) -> Result<Option<&CompositeResult>> {
        if self.subject.is_none() {
            return Ok(None);
        }
        if let Err(e) = self.regenerate().await {
            self.selection = previous;
            return Err(e);
        }
        Ok(self.processed.as_ref())
    }

    async fn regenerate(&mut self) -> Result<()> {
        let Some(subject) = self.subject.clone() else {
            return Ok(());
        };
        let result = self.generator.generate(subject, &self.selection).await?;
        self.processed = Some(result);
        Ok(())
    }

    fn current(&self) -> Result<&CompositeResult> {
        self.processed
            .as_ref()
            .ok_or_else(|| EncodeError::NothingProcessed.into())
    }
}
