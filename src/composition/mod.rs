//! # Composition
//!
//! The frame compositor and the pipeline around it: fit-inside placement of
//! the subject, the pure compositing routine, the asynchronous
//! decode-then-draw generator and the preview session that drives it.

pub mod compositor;
pub mod engine;
pub mod geometry;
pub mod session;

// Re-exports for convenience
pub use compositor::{CompositeRequest, CompositeResult, Compositor};
pub use engine::FrameGenerator;
pub use geometry::Placement;
pub use session::PreviewSession;
