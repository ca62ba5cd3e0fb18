//! Pointer script replay.
//!
//! A script is a JSON array of actions, for example:
//!
//! ```json
//! [
//!   { "action": "brush", "tool": "pen", "color": "#1e40af", "width": 4.0 },
//!   { "action": "down", "x": 10.0, "y": 10.0, "pressure": 0.8 },
//!   { "action": "move", "x": 40.0, "y": 12.0 },
//!   { "action": "up" },
//!   { "action": "undo" }
//! ]
//! ```
//!
//! When bound to a stored note, the replay starts from the note's sketch and
//! writes the result back to the same note.

use kurbo::Point;
use notesketch_core::{
    Brush, ConfigError, NoteSketch, SketchConfig, Snapshot, Storage, StorageError, SurfaceConfig,
};
use notesketch_render::{SketchPad, SnapshotError, codec};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Encoding failed: {0}")]
    Encode(#[from] SnapshotError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Stored sketch for {0:?} cannot be decoded")]
    UnreadableSketch(String),
}

/// A stored note the replay starts from and saves back to.
#[derive(Clone, Copy)]
pub struct NoteBinding<'a> {
    pub note_id: &'a str,
    pub storage: &'a dyn Storage,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScriptAction {
    Brush(Brush),
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
    },
    Up,
    Cancel,
    Undo,
    Redo,
    Clear,
    Resize(SurfaceConfig),
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Final snapshot, `None` for an empty sketch.
    pub snapshot: Option<Snapshot>,
    /// Committed strokes at the end of the script.
    pub strokes: usize,
    /// How many times the pad notified its host.
    pub notifications: usize,
}

/// Parse a JSON script.
pub fn parse_script(json: &str) -> Result<Vec<ScriptAction>, ReplayError> {
    Ok(serde_json::from_str(json)?)
}

/// Apply every action to the pad, in order.
pub fn replay(pad: &mut SketchPad, actions: &[ScriptAction]) -> Result<(), ReplayError> {
    for (step, action) in actions.iter().enumerate() {
        log::debug!("step {}: {:?}", step, action);
        match action {
            ScriptAction::Brush(brush) => pad.set_brush(*brush),
            ScriptAction::Down { x, y, pressure } => {
                pad.pointer_down(Point::new(*x, *y), *pressure);
            }
            ScriptAction::Move { x, y, pressure } => {
                pad.pointer_move(Point::new(*x, *y), *pressure);
            }
            ScriptAction::Up => {
                pad.pointer_up();
            }
            ScriptAction::Cancel => {
                pad.pointer_cancel();
            }
            ScriptAction::Undo => {
                pad.undo();
            }
            ScriptAction::Redo => {
                pad.redo();
            }
            ScriptAction::Clear => pad.clear(),
            ScriptAction::Resize(config) => {
                config.validate()?;
                pad.resize(*config);
            }
        }
    }
    Ok(())
}

/// Draw the note's stored sketch, if any, as the pad's backdrop.
///
/// Returns the snapshot that was loaded.
fn attach_stored(pad: &mut SketchPad, note: NoteBinding<'_>) -> Result<Option<Snapshot>, ReplayError> {
    let Some(stored) = pollster::block_on(note.storage.find(note.note_id))? else {
        log::info!("No stored sketch for {}, starting blank", note.note_id);
        return Ok(None);
    };
    let Some(snapshot) = stored.snapshot else {
        log::info!("Sketch for {} is detached, starting blank", note.note_id);
        return Ok(None);
    };

    pad.load_snapshot(Some(&snapshot));
    if !pad.surface().has_backdrop() {
        return Err(ReplayError::UnreadableSketch(note.note_id.to_string()));
    }
    Ok(Some(snapshot))
}

/// The sketch a host should keep after editing.
///
/// New strokes are re-encoded together with the backdrop. When nothing new is
/// committed but the loaded backdrop is still shown, the loaded snapshot
/// stands; the pad itself reports `None` in that state.
fn settled_snapshot(pad: &SketchPad, loaded: Option<Snapshot>) -> Option<Snapshot> {
    pad.get_snapshot()
        .or_else(|| loaded.filter(|_| pad.surface().has_backdrop()))
}

/// Replay a script file and write the final surface as PNG.
///
/// With a `note`, the stored sketch is loaded before the script runs and the
/// final sketch is saved back, detaching it when the script cleared it.
/// Nothing is written to `output_path` when the sketch ends up empty.
pub fn run(
    script_path: &Path,
    output_path: &Path,
    config_path: Option<&Path>,
    note: Option<NoteBinding<'_>>,
) -> Result<ReplayReport, ReplayError> {
    let config = match config_path {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::default(),
    };
    let json = fs::read_to_string(script_path).map_err(|e| {
        ReplayError::Io(format!("Failed to read {}: {}", script_path.display(), e))
    })?;
    let actions = parse_script(&json)?;

    let mut pad = SketchPad::from_config(&config);
    let loaded = match note {
        Some(note) => attach_stored(&mut pad, note)?,
        None => None,
    };

    let notifications = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&notifications);
    pad.set_listener(move |snapshot| {
        *counter.borrow_mut() += 1;
        log::info!("sketch changed: {}", if snapshot.is_some() { "drawn" } else { "empty" });
    });

    replay(&mut pad, &actions)?;

    let snapshot = settled_snapshot(&pad, loaded);
    if let Some(note) = note {
        let record =
            NoteSketch::for_surface(note.note_id, snapshot.clone(), &pad.surface().config());
        pollster::block_on(note.storage.save(note.note_id, &record))?;
    }

    if snapshot.is_some() {
        let png = codec::encode_png(pad.surface())?;
        fs::write(output_path, png).map_err(|e| {
            ReplayError::Io(format!("Failed to write {}: {}", output_path.display(), e))
        })?;
        log::info!("Wrote {}", output_path.display());
    }

    let notifications = *notifications.borrow();
    Ok(ReplayReport {
        snapshot,
        strokes: pad.committed().len(),
        notifications,
    })
}
