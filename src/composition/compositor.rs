use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;
use kurbo::{Rect, Size};
use tracing::debug;

use crate::{
    composition::geometry::Placement,
    error::Result,
    raster::{surface::encode_png, ImageDecoder, RasterImage, Rotation, Surface},
};

/// Everything one composite depends on
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    /// The user's picture
    pub subject: RasterImage,

    /// The decorative overlay
    pub frame: RasterImage,

    /// Frame rotation about the canvas center
    pub rotation: Rotation,

    /// Output (width, height) in pixels
    pub canvas_size: (u32, u32),
}

impl CompositeRequest {
    pub fn new(subject: RasterImage, frame: RasterImage, rotation: Rotation, canvas_size: (u32, u32)) -> Self {
        Self {
            subject,
            frame,
            rotation,
            canvas_size,
        }
    }

    /// Decode both images from raw bytes
    pub fn from_bytes(
        subject: &[u8],
        frame: &[u8],
        rotation: Rotation,
        canvas_size: (u32, u32),
    ) -> Result<Self> {
        let subject = ImageDecoder::decode(subject, "subject image")?;
        let frame = ImageDecoder::decode(frame, "frame image")?;
        Ok(Self::new(subject, frame, rotation, canvas_size))
    }

    /// Wrap already decoded buffers, rejecting empty ones
    pub fn from_buffers(
        subject: RgbaImage,
        frame: RgbaImage,
        rotation: Rotation,
        canvas_size: (u32, u32),
    ) -> Result<Self> {
        let subject = RasterImage::from_rgba(subject, "subject image")?;
        let frame = RasterImage::from_rgba(frame, "frame image")?;
        Ok(Self::new(subject, frame, rotation, canvas_size))
    }
}

/// An encoded PNG of exactly the requested canvas size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeResult {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl CompositeResult {
    pub const MIME_TYPE: &'static str = "image/png";

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encoded PNG bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.png
    }

    /// `data:` URL for inline display
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            Self::MIME_TYPE,
            general_purpose::STANDARD.encode(&self.png)
        )
    }

    /// Write the PNG to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }
}

/// Flattens a subject image and a frame overlay into one PNG
///
/// Stateless: every call allocates its own surface, so the output depends
/// only on the request.
pub struct Compositor;

impl Compositor {
    /// Paint the request onto a fresh surface and return its pixels unencoded
    pub fn render(request: &CompositeRequest) -> Result<RgbaImage> {
        let (width, height) = request.canvas_size;
        let mut surface = Surface::new(width, height)?;
        let canvas = Size::new(f64::from(width), f64::from(height));

        // Subject layer: fit inside, centered.
        let (subject_w, subject_h) = request.subject.dimensions();
        let placement = Placement::fit_inside(canvas, Size::new(f64::from(subject_w), f64::from(subject_h)));
        debug!(
            "Subject {}x{} scaled by {:.4} into {:?}",
            subject_w, subject_h, placement.scale, placement.rect
        );
        surface.draw_image(&request.subject, placement.rect);

        // Frame layer: full canvas, turned about the center.
        surface.with_saved(|s| {
            s.translate(canvas.width / 2.0, canvas.height / 2.0);
            s.rotate(request.rotation);
            s.draw_image(
                &request.frame,
                Rect::new(-canvas.width / 2.0, -canvas.height / 2.0, canvas.width / 2.0, canvas.height / 2.0),
            );
        });
        debug!("Frame drawn at {}", request.rotation);

        surface.finish()
    }

    /// Composite and encode as PNG
    pub fn composite(request: &CompositeRequest) -> Result<CompositeResult> {
        let pixels = Self::render(request)?;
        let png = encode_png(&pixels)?;

        Ok(CompositeResult {
            png,
            width: pixels.width(),
            height: pixels.height(),
        })
    }

    /// Decode both inputs and composite them
    pub fn composite_bytes(
        subject: &[u8],
        frame: &[u8],
        rotation: Rotation,
        canvas_size: (u32, u32),
    ) -> Result<CompositeResult> {
        let request = CompositeRequest::from_bytes(subject, frame, rotation, canvas_size)?;
        Self::composite(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    use crate::error::{CompositorError, DecodeError};

    const CLEAR: [u8; 4] = [0, 0, 0, 0];
    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn px(pixels: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
        pixels.get_pixel(x, y).0
    }

    fn assert_near(actual: [u8; 4], expected: [u8; 4]) {
        let close = actual.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 2);
        assert!(close, "pixel {:?} is not close to {:?}", actual, expected);
    }

    fn assert_clear(actual: [u8; 4]) {
        assert!(actual[3] <= 2, "pixel {:?} is not transparent", actual);
    }

    fn clear_frame() -> RasterImage {
        RasterImage::new_filled(600, 600, CLEAR)
    }

    /// Transparent 600x600 frame with an opaque blue block in the top-left quadrant
    fn marked_frame() -> RasterImage {
        let mut img = RgbaImage::new(600, 600);
        for y in 20..120 {
            for x in 20..120 {
                img.put_pixel(x, y, Rgba(BLUE));
            }
        }
        RasterImage::from_rgba(img, "marked frame").unwrap()
    }

    fn encode(image: &RasterImage) -> Vec<u8> {
        encode_png(image.as_image()).unwrap()
    }

    #[test]
    fn test_wide_subject_letterboxed() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(300, 150, RED),
            clear_frame(),
            Rotation::default(),
            (600, 600),
        );
        let pixels = Compositor::render(&request).unwrap();

        // Drawn at (0, 150) with size 600x300.
        assert_near(px(&pixels, 0, 150), RED);
        assert_near(px(&pixels, 599, 449), RED);
        assert_clear(px(&pixels, 300, 149));
        assert_clear(px(&pixels, 300, 450));
    }

    #[test]
    fn test_subject_touches_long_edge_only() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(90, 200, RED),
            clear_frame(),
            Rotation::default(),
            (600, 600),
        );
        let pixels = Compositor::render(&request).unwrap();

        // Long (vertical) edge reaches the canvas border.
        assert_near(px(&pixels, 300, 0), RED);
        assert_near(px(&pixels, 300, 599), RED);
        // Short edge is inset on both sides.
        assert_clear(px(&pixels, 0, 300));
        assert_clear(px(&pixels, 599, 300));
    }

    #[test]
    fn test_output_has_canvas_dimensions() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(17, 31, RED),
            RasterImage::new_filled(5, 5, CLEAR),
            Rotation::from_degrees(90),
            (320, 240),
        );
        let result = Compositor::composite(&request).unwrap();

        assert_eq!(result.dimensions(), (320, 240));
        let decoded = image::load_from_memory(result.as_bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }

    #[test]
    fn test_frame_drawn_over_subject() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(600, 600, RED),
            marked_frame(),
            Rotation::default(),
            (600, 600),
        );
        let pixels = Compositor::render(&request).unwrap();

        assert_near(px(&pixels, 50, 50), BLUE);
        assert_near(px(&pixels, 300, 300), RED);
    }

    #[test]
    fn test_frame_rotation_moves_overlay_clockwise() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(10, 10, CLEAR),
            marked_frame(),
            Rotation::from_degrees(90),
            (600, 600),
        );
        let pixels = Compositor::render(&request).unwrap();

        // Top-left quadrant turns into the top-right quadrant.
        assert_clear(px(&pixels, 50, 50));
        assert_near(px(&pixels, 549, 50), BLUE);
    }

    #[test]
    fn test_full_turn_matches_no_turn() {
        let subject = RasterImage::new_filled(300, 150, RED);
        let frame = marked_frame();

        let at_zero = Compositor::composite(&CompositeRequest::new(
            subject.clone(),
            frame.clone(),
            Rotation::default(),
            (600, 600),
        ))
        .unwrap();

        let mut rotation = Rotation::default();
        for _ in 0..4 {
            rotation = rotation.rotated_quarter();
        }
        let at_full_turn = Compositor::composite(&CompositeRequest::new(subject, frame, rotation, (600, 600))).unwrap();

        assert_eq!(rotation.degrees(), 360);
        assert_eq!(at_zero, at_full_turn);
    }

    #[test]
    fn test_composite_is_deterministic() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(123, 77, [10, 200, 30, 180]),
            marked_frame(),
            Rotation::from_degrees(270),
            (600, 600),
        );

        let first = Compositor::composite(&request).unwrap();
        let second = Compositor::composite(&request).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_rotation_leaves_subject_layer_untouched() {
        // A gradient subject, so any resampling or shift would change bytes.
        let gradient = RgbaImage::from_fn(300, 150, |x, y| Rgba([(x % 256) as u8, (y * 255 / 149) as u8, 90, 255]));
        let subject = RasterImage::from_rgba(gradient, "gradient").unwrap();

        let renders = [0, 90, 180, 270].map(|degrees| {
            Compositor::render(&CompositeRequest::new(
                subject.clone(),
                clear_frame(),
                Rotation::from_degrees(degrees),
                (600, 600),
            ))
            .unwrap()
        });

        assert_eq!(px(&renders[0], 300, 300)[3], 255);
        assert_clear(px(&renders[0], 300, 10));
        for (turn, pixels) in renders.iter().enumerate().skip(1) {
            assert!(
                pixels.as_raw() == renders[0].as_raw(),
                "subject layer differs after {} quarter turns",
                turn
            );
        }
    }

    #[test]
    fn test_undecodable_subject_is_decode_error() {
        let frame = encode(&marked_frame());
        let err = Compositor::composite_bytes(b"\x89PNG garbage", &frame, Rotation::default(), (600, 600))
            .unwrap_err();

        assert!(err.is_decode());
    }

    #[test]
    fn test_undecodable_frame_is_decode_error() {
        let subject = encode(&RasterImage::new_filled(8, 8, RED));
        let err = Compositor::composite_bytes(&subject, &[], Rotation::default(), (600, 600)).unwrap_err();

        assert!(matches!(
            err,
            CompositorError::Decode(DecodeError::UnrecognizedFormat { .. })
        ));
    }

    #[test]
    fn test_empty_subject_buffer_is_decode_error() {
        let err = CompositeRequest::from_buffers(
            RgbaImage::new(0, 0),
            RgbaImage::from_pixel(4, 4, Rgba(CLEAR)),
            Rotation::default(),
            (600, 600),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CompositorError::Decode(DecodeError::EmptyImage { ref source_name, .. }) if source_name == "subject image"
        ));
    }

    #[test]
    fn test_empty_frame_buffer_is_decode_error() {
        let err = CompositeRequest::from_buffers(
            RgbaImage::from_pixel(4, 4, Rgba(RED)),
            RgbaImage::new(600, 0),
            Rotation::from_degrees(90),
            (600, 600),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CompositorError::Decode(DecodeError::EmptyImage { ref source_name, .. }) if source_name == "frame image"
        ));
    }

    #[test]
    fn test_from_buffers_renders() {
        let request = CompositeRequest::from_buffers(
            RgbaImage::from_pixel(4, 4, Rgba(RED)),
            RgbaImage::from_pixel(4, 4, Rgba(CLEAR)),
            Rotation::default(),
            (8, 8),
        )
        .unwrap();

        assert_near(px(&Compositor::render(&request).unwrap(), 4, 4), RED);
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(1, 1, RED),
            RasterImage::new_filled(1, 1, RED),
            Rotation::default(),
            (0, 600),
        );
        assert!(Compositor::composite(&request).is_err());
    }

    #[test]
    fn test_data_url_prefix() {
        let request = CompositeRequest::new(
            RasterImage::new_filled(2, 2, RED),
            RasterImage::new_filled(2, 2, CLEAR),
            Rotation::default(),
            (4, 4),
        );
        let result = Compositor::composite(&request).unwrap();

        let url = result.to_data_url();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
