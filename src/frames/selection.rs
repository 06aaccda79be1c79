use crate::{
    error::Result,
    frames::FrameCatalog,
    raster::Rotation,
};

/// Which frame is selected and how far it has been turned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    frame_index: usize,
    rotation: Rotation,
}

impl Selection {
    pub fn new(frame_index: usize, rotation: Rotation) -> Self {
        Self {
            frame_index,
            rotation,
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Select another frame; rotation is kept
    pub fn select(&mut self, index: usize, catalog: &FrameCatalog) -> Result<()> {
        catalog.get(index)?;
        self.frame_index = index;
        Ok(())
    }

    /// Turn the frame a further 90° clockwise
    pub fn rotate_quarter(&mut self) {
        self.rotation = self.rotation.rotated_quarter();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }
}
