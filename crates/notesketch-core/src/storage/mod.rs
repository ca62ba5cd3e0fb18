//! Snapshot persistence for the host note editor.
//!
//! Each note owns at most one sketch. Backends store a [`NoteSketch`] record
//! under the note's id and hand it back unchanged; a record whose snapshot is
//! `None` marks a note whose sketch was detached.

mod file;
mod key;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::config::SurfaceConfig;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Sketch not found: {0}")]
    NotFound(String),
    #[error("Invalid note id: {0:?}")]
    InvalidId(String),
    #[error("Stored sketch belongs to {stored:?}, not {requested:?}")]
    IdMismatch { requested: String, stored: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The sketch attached to one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSketch {
    /// Identifier of the owning note.
    pub note_id: String,
    /// Encoded sketch; `None` means no sketch is attached.
    pub snapshot: Option<Snapshot>,
    /// Logical width the sketch was drawn at.
    pub width: f64,
    /// Logical height the sketch was drawn at.
    pub height: f64,
}

impl NoteSketch {
    pub fn new(note_id: impl Into<String>, snapshot: Option<Snapshot>, width: f64, height: f64) -> Self {
        Self {
            note_id: note_id.into(),
            snapshot,
            width,
            height,
        }
    }

    /// Record the sketch drawn on a surface of the given logical size.
    pub fn for_surface(
        note_id: impl Into<String>,
        snapshot: Option<Snapshot>,
        surface: &SurfaceConfig,
    ) -> Self {
        Self::new(note_id, snapshot, surface.width, surface.height)
    }

    /// Whether a sketch is attached.
    pub fn has_sketch(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Trait for sketch storage backends, keyed by note id.
pub trait Storage: Send + Sync {
    /// Save a note's sketch.
    fn save(&self, note_id: &str, sketch: &NoteSketch) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a note's sketch.
    fn load(&self, note_id: &str) -> BoxFuture<'_, StorageResult<NoteSketch>>;

    /// Delete a note's sketch.
    fn delete(&self, note_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List stored note ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a note has a stored sketch.
    fn exists(&self, note_id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Load a note's sketch, mapping a missing record to `None`.
    fn find(&self, note_id: &str) -> BoxFuture<'_, StorageResult<Option<NoteSketch>>> {
        let load = self.load(note_id);
        Box::pin(async move {
            match load.await {
                Ok(sketch) => Ok(Some(sketch)),
                Err(StorageError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }
}

/// Reject ids no backend can key a record by.
fn check_note_id(note_id: &str) -> StorageResult<()> {
    if note_id.is_empty() {
        return Err(StorageError::InvalidId(note_id.to_string()));
    }
    Ok(())
}

/// A record must be filed under its own note id.
fn check_owner(requested: &str, sketch: &NoteSketch) -> StorageResult<()> {
    if sketch.note_id != requested {
        return Err(StorageError::IdMismatch {
            requested: requested.to_string(),
            stored: sketch.note_id.clone(),
        });
    }
    Ok(())
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
