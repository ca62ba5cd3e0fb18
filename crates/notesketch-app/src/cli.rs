//! Command-line arguments.

use std::path::PathBuf;

pub const USAGE: &str =
    "usage: notesketch <script.json> <out.png> [config.json] [--note <id>] [--store <dir>]";

/// Parsed `notesketch` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub script: PathBuf,
    pub output: PathBuf,
    pub config: Option<PathBuf>,
    /// Note whose stored sketch the replay starts from and saves to.
    pub note: Option<String>,
    /// Sketch directory; the default data directory when absent.
    pub store: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, program name excluded.
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut note = None;
        let mut store = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--note" => {
                    let id = args.next().ok_or("--note needs a note id")?;
                    if id.is_empty() {
                        return Err("--note needs a note id".to_string());
                    }
                    note = Some(id);
                }
                "--store" => {
                    store = Some(PathBuf::from(args.next().ok_or("--store needs a directory")?));
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        if store.is_some() && note.is_none() {
            return Err("--store only applies with --note".to_string());
        }

        let mut positional = positional.into_iter();
        let (Some(script), Some(output)) = (positional.next(), positional.next()) else {
            return Err("missing script or output path".to_string());
        };
        let config = positional.next();
        if positional.next().is_some() {
            return Err("too many arguments".to_string());
        }

        Ok(Self {
            script,
            output,
            config,
            note,
            store,
        })
    }
}
