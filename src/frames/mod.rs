//! # Frame Overlays
//!
//! The catalog of decorative frames a user can pick from, and the current
//! pick (frame plus accumulated rotation).
//!
//! ## Built-in Frames
//!
//! - **no_shadow**: the plain frame motif
//! - **shadow_white**: the motif with a white drop shadow
//! - **shadow_black**: the motif with a black drop shadow
//!
//! Built-in frame files are looked up under the configured assets directory
//! (`images/` by default).

pub mod catalog;
pub mod selection;

pub use catalog::{FrameAsset, FrameCatalog, FrameSource};
pub use selection::Selection;
