//! Command-line front end for the QuickNote core.
//!
//! # Responsibility
//! - Drive one note session per invocation against an on-disk store.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! # Invariants
//! - The session is always closed (final flush) before the process exits.

use clap::{Parser, Subcommand};
use log::warn;
use quicknote_core::{
    default_log_level, init_logging, Event, EventOutcome, KeyValueStorage, NoteSession,
    NoteStoreConfig, NoteStoreManager, SqliteStorage,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DB_FILE_NAME: &str = "quicknote.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "quicknote")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quick notes with a debounced local store")]
struct Cli {
    /// Directory holding the note database and logs
    #[arg(long, env = "QUICKNOTE_DATA_DIR", default_value = ".quicknote")]
    data_dir: PathBuf,

    /// JSON file overriding store settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print core health and version
    Ping,
    /// List notes, newest first (* marks the active note)
    List,
    /// Print the active note
    Show,
    /// Create a note and make it active
    New,
    /// Make a note active
    Select { id: String },
    /// Replace the active note's content
    Edit {
        #[arg(num_args = 1.., required = true)]
        text: Vec<String>,
    },
    /// Delete a note
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if cli.command == Command::Ping {
        println!("quicknote_core ping={}", quicknote_core::ping());
        println!("quicknote_core version={}", quicknote_core::core_version());
        return Ok(());
    }

    let data_dir = absolute(&cli.data_dir)?;
    std::fs::create_dir_all(&data_dir)
        .map_err(|err| format!("cannot create `{}`: {err}", data_dir.display()))?;
    let log_dir = data_dir.join("logs");
    init_logging(default_log_level(), &log_dir.to_string_lossy())?;

    let config = match &cli.config {
        Some(path) => NoteStoreConfig::load(path).map_err(|err| err.to_string())?,
        None => NoteStoreConfig::default(),
    };
    let preview_chars = config.preview_chars;
    let storage =
        SqliteStorage::open(data_dir.join(DB_FILE_NAME)).map_err(|err| err.to_string())?;
    let manager = NoteStoreManager::hydrate(storage, config);
    if manager.hydration().is_fallback() {
        warn!("event=cli_start module=cli status=fallback");
        eprintln!("warning: saved notes could not be read; starting empty");
    }
    let mut session = NoteSession::new(manager);

    let outcome = match cli.command {
        Command::Ping => EventOutcome::Ignored,
        Command::List => {
            print_list(&session, preview_chars);
            EventOutcome::Applied
        }
        Command::Show => {
            match session.manager().active_note() {
                Some(note) => println!("{}", note.content),
                None => eprintln!("no active note"),
            }
            EventOutcome::Applied
        }
        Command::New => {
            let outcome = session.handle(Event::CreateNote);
            if let Some(id) = session.manager().active_note_id() {
                println!("{id}");
            }
            outcome
        }
        Command::Select { id } => select(&mut session, id),
        Command::Edit { text } => session.handle(Event::EditContent(text.join(" "))),
        Command::Delete { id } => session.handle(Event::DeleteNote(id)),
    };

    session
        .close()
        .map_err(|err| format!("changes were not saved: {err}"))?;

    if outcome == EventOutcome::Ignored {
        return Err("nothing changed (unknown id or no active note)".to_string());
    }
    Ok(())
}

/// Selecting the note that is already active counts as success.
fn select<S: KeyValueStorage>(session: &mut NoteSession<S>, id: String) -> EventOutcome {
    let already_active = session
        .manager()
        .active_note_id()
        .is_some_and(|active| active == id.as_str());
    if already_active {
        return EventOutcome::Applied;
    }
    session.handle(Event::SelectNote(id))
}

fn print_list(session: &NoteSession<SqliteStorage>, preview_chars: usize) {
    let view = session.view();
    for note in &view.store.notes {
        let marker = if view.store.active_note_id.as_ref() == Some(&note.id) {
            '*'
        } else {
            ' '
        };
        let title = note
            .preview(preview_chars)
            .unwrap_or_else(|| "(untitled)".to_string());
        println!(
            "{marker} {}  {}  {}",
            note.id,
            note.updated_at.format("%Y-%m-%d %H:%M"),
            title
        );
    }
}

fn absolute(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve working directory: {err}"))
}
