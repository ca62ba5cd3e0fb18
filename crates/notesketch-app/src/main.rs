//! NoteSketch replay CLI.

use notesketch_app::{CliArgs, NoteBinding, USAGE};
use notesketch_core::FileStorage;

fn main() {
    env_logger::init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let storage = match (&args.note, &args.store) {
        (None, _) => None,
        (Some(_), Some(dir)) => Some(FileStorage::new(dir.clone())),
        (Some(_), None) => Some(FileStorage::default_location()),
    };
    let storage = match storage.transpose() {
        Ok(storage) => storage,
        Err(e) => {
            log::error!("Cannot open sketch storage: {}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let note = args.note.as_deref().zip(storage.as_ref()).map(|(note_id, storage)| {
        log::info!("Using note {} in {}", note_id, storage.base_path().display());
        NoteBinding { note_id, storage }
    });

    log::info!("Replaying {}", args.script.display());
    match notesketch_app::run(&args.script, &args.output, args.config.as_deref(), note) {
        Ok(report) if report.snapshot.is_some() => {
            println!("{} strokes written to {}", report.strokes, args.output.display())
        }
        Ok(_) => println!("empty sketch, nothing written"),
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
