//! File-based storage: one JSON record per note.

use super::{
    BoxFuture, NoteSketch, Storage, StorageError, StorageResult, check_note_id, check_owner, key,
};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// Stores note sketches as JSON files in a directory.
///
/// File names are the percent-encoded note id (see `key`), so every id gets
/// its own file and [`Storage::list`] reports the original ids.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(Self { base_path })
    }

    /// Create file storage under the user's local data directory.
    ///
    /// On Unix: `~/.local/share/notesketch/sketches/`
    /// On Windows: `%LOCALAPPDATA%\notesketch\sketches\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("notesketch").join("sketches"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn record_path(&self, note_id: &str) -> StorageResult<PathBuf> {
        check_note_id(note_id)?;
        let file_name = format!("{}.{}", key::encode(note_id), RECORD_EXTENSION);
        Ok(self.base_path.join(file_name))
    }
}

fn read_record(path: &Path) -> StorageResult<NoteSketch> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    NoteSketch::from_json(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl Storage for FileStorage {
    fn save(&self, note_id: &str, sketch: &NoteSketch) -> BoxFuture<'_, StorageResult<()>> {
        let target = self
            .record_path(note_id)
            .and_then(|path| check_owner(note_id, sketch).map(|_| path));
        let json = sketch.to_json();

        Box::pin(async move {
            let path = target?;
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Saved sketch to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, note_id: &str) -> BoxFuture<'_, StorageResult<NoteSketch>> {
        let path = self.record_path(note_id);
        let note_id = note_id.to_string();

        Box::pin(async move {
            let path = path?;
            if !path.is_file() {
                return Err(StorageError::NotFound(note_id));
            }
            let sketch = read_record(&path)?;
            check_owner(&note_id, &sketch)?;
            Ok(sketch)
        })
    }

    fn delete(&self, note_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.record_path(note_id);

        Box::pin(async move {
            let path = path?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Io(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                ))),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            let entries = match fs::read_dir(&base) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
                Err(e) => {
                    return Err(StorageError::Io(format!(
                        "Failed to read {}: {}",
                        base.display(),
                        e
                    )));
                }
            };

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == RECORD_EXTENSION))
                .filter_map(|path| {
                    let stem = path.file_stem()?.to_str()?;
                    let id = key::decode(stem);
                    if id.is_none() {
                        log::warn!("Skipping foreign file {}", path.display());
                    }
                    id
                })
                .filter(|id| !id.is_empty())
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, note_id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.record_path(note_id);
        Box::pin(async move { Ok(path?.is_file()) })
    }
}
