//! NoteSketch Core Library
//!
//! Stroke model, undo/redo history and pointer input handling for the
//! sketch canvas attached to a note, plus snapshot persistence.

pub mod config;
pub mod controller;
pub mod history;
pub mod snapshot;
pub mod storage;
pub mod stroke;

pub use config::{ConfigError, MAX_PIXEL_SIDE, MAX_PIXELS, SketchConfig, SurfaceConfig};
pub use controller::{ControllerOutcome, PointerEvent, StrokeController};
pub use history::{HistoryStack, HistoryState};
pub use snapshot::Snapshot;
pub use storage::{FileStorage, MemoryStorage, NoteSketch, Storage, StorageError, StorageResult};
pub use stroke::{Brush, SamplePoint, Stroke, StrokeColor, ToolKind};
