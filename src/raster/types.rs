use std::fmt;
use std::sync::Arc;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::{DecodeError, Result};
use crate::raster::premul::premultiply_in_place;

/// Largest image side a render pixmap can hold
pub const MAX_IMAGE_SIDE: u32 = u16::MAX as u32;

/// A decoded, immutable RGBA8 image
///
/// Cloning is cheap: the straight-alpha buffer and the premultiplied paint
/// built from it are both shared, which lets decoded images move into
/// blocking tasks without copying.
#[derive(Clone)]
pub struct RasterImage {
    buffer: Arc<RgbaImage>,
    paint: vello_cpu::Image,
}

impl RasterImage {
    /// Wrap a decoded buffer, rejecting images without pixels or too large to paint
    pub fn from_rgba(buffer: RgbaImage, source_name: &str) -> Result<Self> {
        let (width, height) = buffer.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage {
                source_name: source_name.to_string(),
                width,
                height,
            }.into());
        }
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(DecodeError::TooLarge {
                source_name: source_name.to_string(),
                width,
                height,
                max: MAX_IMAGE_SIDE,
            }.into());
        };

        let paint = image_paint(&buffer, w, h);
        Ok(Self {
            buffer: Arc::new(buffer),
            paint,
        })
    }

    /// Create an image of the given size filled with a single straight-alpha color
    ///
    /// Dimensions are clamped to `1..=MAX_IMAGE_SIDE`.
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let width = width.clamp(1, MAX_IMAGE_SIDE);
        let height = height.clamp(1, MAX_IMAGE_SIDE);
        let buffer = ImageBuffer::from_pixel(width, height, Rgba(color));
        let paint = image_paint(&buffer, width as u16, height as u16);
        Self {
            buffer: Arc::new(buffer),
            paint,
        }
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (straight RGBA)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Premultiplied paint for the render context, in image pixel space
    pub(crate) fn paint(&self) -> &vello_cpu::Image {
        &self.paint
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn image_paint(buffer: &RgbaImage, width: u16, height: u16) -> vello_cpu::Image {
    let mut bytes = buffer.as_raw().clone();
    premultiply_in_place(&mut bytes);

    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, width, height, true);

    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}
