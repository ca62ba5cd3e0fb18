//! In-memory storage implementation.

use super::{BoxFuture, NoteSketch, Storage, StorageError, StorageResult, check_note_id, check_owner};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Keeps sketches in process memory, ordered by note id.
///
/// Used for notes that have not been written to disk yet, and in tests.
#[derive(Default)]
pub struct MemoryStorage {
    sketches: RwLock<BTreeMap<String, NoteSketch>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, attached or detached.
    pub fn len(&self) -> usize {
        self.sketches.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Sketch map poisoned: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, note_id: &str, sketch: &NoteSketch) -> BoxFuture<'_, StorageResult<()>> {
        let checked = check_note_id(note_id).and_then(|_| check_owner(note_id, sketch));
        let sketch = sketch.clone();
        Box::pin(async move {
            checked?;
            let mut sketches = self.sketches.write().map_err(poisoned)?;
            log::debug!("Keeping sketch for {} in memory", sketch.note_id);
            sketches.insert(sketch.note_id.clone(), sketch);
            Ok(())
        })
    }

    fn load(&self, note_id: &str) -> BoxFuture<'_, StorageResult<NoteSketch>> {
        let note_id = note_id.to_string();
        Box::pin(async move {
            check_note_id(&note_id)?;
            let sketches = self.sketches.read().map_err(poisoned)?;
            match sketches.get(&note_id) {
                Some(sketch) => Ok(sketch.clone()),
                None => Err(StorageError::NotFound(note_id)),
            }
        })
    }

    fn delete(&self, note_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let note_id = note_id.to_string();
        Box::pin(async move {
            self.sketches.write().map_err(poisoned)?.remove(&note_id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let sketches = self.sketches.read().map_err(poisoned)?;
            Ok(sketches.keys().cloned().collect())
        })
    }

    fn exists(&self, note_id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let note_id = note_id.to_string();
        Box::pin(async move {
            let sketches = self.sketches.read().map_err(poisoned)?;
            Ok(sketches.contains_key(&note_id))
        })
    }
}
