use kurbo::{Rect, Size};

/// Where a subject lands on the canvas after fit-inside scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Uniform scale applied to the subject
    pub scale: f64,

    /// Destination rectangle in canvas coordinates
    pub rect: Rect,
}

impl Placement {
    /// Largest uniform scale that shows the whole subject, centered
    ///
    /// Letterboxes rather than crops: the longer side (relative to the
    /// canvas) touches the canvas edge and the other side is inset.
    pub fn fit_inside(canvas: Size, subject: Size) -> Self {
        let scale = (canvas.width / subject.width).min(canvas.height / subject.height);
        let x = canvas.width / 2.0 - (subject.width / 2.0) * scale;
        let y = canvas.height / 2.0 - (subject.height / 2.0) * scale;

        Self {
            scale,
            rect: Rect::from_origin_size((x, y), (subject.width * scale, subject.height * scale)),
        }
    }
}
