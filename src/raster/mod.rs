//! # Raster Module
//!
//! Decoded images, decoding from bytes and files, and the transformable
//! drawing surface the compositor paints into. The surface rasterizes
//! through a `vello_cpu` render context.

pub mod decode;
pub mod premul;
pub mod rotation;
pub mod surface;
pub mod types;

pub use decode::ImageDecoder;
pub use rotation::Rotation;
pub use surface::Surface;
pub use types::{RasterImage, MAX_IMAGE_SIDE};
