//! NoteSketch Application
//!
//! Replays recorded pointer scripts through a sketch pad, for debugging
//! sketches outside the note editor. A replay can be bound to a stored
//! note so its sketch is loaded first and saved back afterwards.

pub mod cli;
pub mod replay;

pub use cli::{CliArgs, USAGE};
pub use replay::{
    NoteBinding, ReplayError, ReplayReport, ScriptAction, parse_script, replay, run,
};
