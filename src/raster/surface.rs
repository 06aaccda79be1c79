use std::fmt;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, RgbaImage};
use kurbo::{Affine, Rect};
use tracing::{debug, warn};

use crate::config::MAX_CANVAS_SIDE;
use crate::error::{EncodeError, Result};
use crate::raster::premul::unpremultiply_in_place;
use crate::raster::rotation::Rotation;
use crate::raster::types::RasterImage;

/// An RGBA drawing surface with a canvas-style transform stack
///
/// Drawing calls are interpreted in user space, which the current transform
/// maps to device pixels. `save`/`restore` push and pop that transform; the
/// render context only ever sees the composed result.
pub struct Surface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    transform: Affine,
    saved: Vec<Affine>,
}

impl Surface {
    /// Allocate a fully transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let in_range = |side: u32| (1..=MAX_CANVAS_SIDE).contains(&side);
        if !in_range(width) || !in_range(height) {
            return Err(EncodeError::InvalidCanvas { width, height }.into());
        }

        // Both sides fit in u16 after the range check.
        let (width, height) = (width as u16, height as u16);
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.reset();

        Ok(Self {
            ctx,
            width,
            height,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Current user-to-device transform
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Push the current transform
    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    /// Pop the most recently saved transform; unbalanced calls are ignored
    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(transform) => self.transform = transform,
            None => warn!("Surface::restore called without a matching save"),
        }
    }

    /// Run `draw` between `save` and `restore`
    pub fn with_saved<R>(&mut self, draw: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let result = draw(self);
        self.restore();
        result
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform = self.transform * Affine::translate((dx, dy));
    }

    pub fn rotate(&mut self, rotation: Rotation) {
        self.transform = self.transform * rotation.to_affine();
    }

    /// Draw `image` stretched over `dest` (user space), source-over
    pub fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        let dest = dest.abs();
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            debug!("draw_image: skipping degenerate destination {:?}", dest);
            return;
        }

        let (w, h) = image.dimensions();
        let (w, h) = (f64::from(w), f64::from(h));
        let image_to_device = self.transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);

        self.ctx.set_transform(affine_to_cpu(image_to_device));
        self.ctx.set_paint(image.paint().clone());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }

    /// Rasterize everything drawn so far into a straight-alpha buffer
    pub fn finish(mut self) -> Result<RgbaImage> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let mut bytes = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_in_place(&mut bytes);

        RgbaImage::from_raw(self.width(), self.height(), bytes).ok_or_else(|| {
            EncodeError::Failed {
                reason: "rendered pixmap does not match the canvas size".to_string(),
            }
            .into()
        })
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("transform", &self.transform)
            .field("saved", &self.saved.len())
            .finish()
    }
}

/// Encode a straight-alpha buffer as an RGBA8 PNG
pub fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(pixels.as_raw(), pixels.width(), pixels.height(), ColorType::Rgba8)
        .map_err(|e| EncodeError::Failed { reason: e.to_string() })?;
    Ok(bytes)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn assert_near(actual: [u8; 4], expected: [u8; 4]) {
        let close = actual.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 2);
        assert!(close, "pixel {:?} is not close to {:?}", actual, expected);
    }

    fn assert_clear(actual: [u8; 4]) {
        assert!(actual[3] <= 2, "pixel {:?} is not transparent", actual);
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let pixels = Surface::new(4, 4).unwrap().finish().unwrap();
        assert_eq!(pixels.dimensions(), (4, 4));
        assert!(pixels.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_canvas_size_bounds() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, MAX_CANVAS_SIDE + 1).is_err());
        assert!(Surface::new(1, MAX_CANVAS_SIDE).is_ok());
    }

    #[test]
    fn test_restore_returns_prior_transform() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.translate(1.0, 2.0);
        let before = surface.transform();

        surface.with_saved(|s| {
            s.translate(5.0, 5.0);
            s.rotate(Rotation::from_degrees(90));
            assert_ne!(s.transform(), before);
        });

        assert_eq!(surface.transform(), before);
        // Unbalanced restore leaves the transform alone.
        surface.restore();
        assert_eq!(surface.transform(), before);
    }

    #[test]
    fn test_draw_scaled_covers_exact_rect() {
        let mut surface = Surface::new(8, 8).unwrap();
        let image = RasterImage::new_filled(2, 1, RED);

        surface.draw_image(&image, Rect::new(0.0, 2.0, 8.0, 6.0));
        let pixels = surface.finish().unwrap();

        assert_near(pixels.get_pixel(0, 2).0, RED);
        assert_near(pixels.get_pixel(7, 5).0, RED);
        assert_clear(pixels.get_pixel(0, 1).0);
        assert_clear(pixels.get_pixel(7, 6).0);
    }

    #[test]
    fn test_draw_rotated_about_center() {
        // Left half red, right half clear; a quarter turn moves red to the top.
        let mut img = RgbaImage::new(8, 8);
        for y in 0..8 {
            for x in 0..4 {
                img.put_pixel(x, y, image::Rgba(RED));
            }
        }
        let image = RasterImage::from_rgba(img, "halves").unwrap();

        let mut surface = Surface::new(8, 8).unwrap();
        surface.with_saved(|s| {
            s.translate(4.0, 4.0);
            s.rotate(Rotation::from_degrees(90));
            s.draw_image(&image, Rect::new(-4.0, -4.0, 4.0, 4.0));
        });
        let pixels = surface.finish().unwrap();

        assert_near(pixels.get_pixel(0, 0).0, RED);
        assert_near(pixels.get_pixel(7, 1).0, RED);
        assert_clear(pixels.get_pixel(0, 6).0);
        assert_clear(pixels.get_pixel(7, 7).0);
    }

    #[test]
    fn test_draw_outside_surface_is_noop() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.draw_image(&RasterImage::new_filled(1, 1, RED), Rect::new(10.0, 10.0, 20.0, 20.0));
        let pixels = surface.finish().unwrap();
        assert!(pixels.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_later_draws_land_on_top() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.draw_image(&RasterImage::new_filled(1, 1, RED), Rect::new(0.0, 0.0, 4.0, 4.0));
        surface.draw_image(
            &RasterImage::new_filled(1, 1, [0, 0, 255, 255]),
            Rect::new(0.0, 0.0, 2.0, 4.0),
        );
        let pixels = surface.finish().unwrap();

        assert_near(pixels.get_pixel(0, 1).0, [0, 0, 255, 255]);
        assert_near(pixels.get_pixel(3, 1).0, RED);
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let pixels = Surface::new(5, 3).unwrap().finish().unwrap();
        let bytes = encode_png(&pixels).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
    }
}
