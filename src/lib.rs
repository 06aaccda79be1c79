//! # Frame-Compositor
//!
//! Put a decorative frame around a personal image: the picture is scaled to
//! fit inside a fixed canvas, the chosen frame overlay is drawn on top
//! (optionally turned in quarter steps about the canvas center), and the
//! result is returned as a PNG ready for preview or download.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_compositor::{
//!     composition::{FrameGenerator, PreviewSession},
//!     config::Config,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let generator = FrameGenerator::from_config(Config::default())?;
//! let mut session = PreviewSession::new(generator);
//!
//! session.load_subject("me.jpg").await?;
//! session.select_frame_by("shadow_white").await?;
//! session.rotate_quarter().await?;
//! session.download(".").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`raster`] - Decoding, the drawing surface and its transform stack
//! - [`frames`] - Frame catalog and the current frame/rotation choice
//! - [`composition`] - The compositor, the async pipeline and the session
//! - [`config`] - Configuration management
//!
//! ## Compositing Directly
//!
//! The compositor itself is a pure function of its inputs:
//!
//! ```rust,no_run
//! use frame_compositor::{Compositor, Rotation};
//!
//! # fn main() -> frame_compositor::Result<()> {
//! let subject = std::fs::read("me.png")?;
//! let frame = std::fs::read("images/frame_no_shadow.png")?;
//!
//! let result = Compositor::composite_bytes(&subject, &frame, Rotation::from_degrees(90), (600, 600))?;
//! result.save("framed.png")?;
//! # Ok(())
//! # }
//! ```

pub mod composition;
pub mod config;
pub mod error;
pub mod frames;
pub mod raster;

// Re-export commonly used types for convenience
pub use crate::{
    composition::{CompositeRequest, CompositeResult, Compositor, FrameGenerator, PreviewSession},
    config::Config,
    error::{CompositorError, Result},
    frames::{FrameCatalog, Selection},
    raster::{RasterImage, Rotation},
};
