//! NoteSketch Render Library
//!
//! CPU raster surface, PNG snapshot codec, and the sketch pad that ties the
//! drawing core together for a host note editor.

pub mod codec;
mod sketch;
mod surface;

pub use codec::{SnapshotError, SnapshotResult};
pub use sketch::{SketchPad, SnapshotListener};
pub use surface::RasterSurface;
