//! Command-line driver for the notes core.
//!
//! # Responsibility
//! - Exercise insert/update/delete/get and the live collection against a
//!   file-backed database.
//! - Keep output deterministic for quick local sanity checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roomnotes_core::{CoreConfig, Note, NoteEditor, NoteId, SqliteNoteStore};
use std::path::PathBuf;

/// RoomNotes - local note storage with a live note list
#[derive(Parser, Debug)]
#[command(name = "roomnotes")]
#[command(about = "Manage notes stored in a local SQLite table", long_about = None)]
#[command(version)]
struct Cli {
    /// Database file (default: $ROOMNOTES_DB_PATH or a temp-dir file)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files (default: $ROOMNOTES_LOG_DIR, off when unset)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print notes as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a note; skipped when title and description are both blank
    Add {
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Replace title and description of a saved note
    Edit {
        id: NoteId,
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Delete a note
    Rm { id: NoteId },
    /// Show one note
    Show { id: NoteId },
    /// List all notes, newest first
    List,
    /// Print the note list on every change until Ctrl-C
    Watch,
    /// Print core linkage information
    Ping,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    config.init_logging()?;

    if let Commands::Ping = cli.command {
        println!("roomnotes_core ping={}", roomnotes_core::ping());
        println!("roomnotes_core version={}", roomnotes_core::core_version());
        return Ok(());
    }

    let store = SqliteNoteStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let editor = NoteEditor::with_store(store);

    match cli.command {
        Commands::Add { title, description } => match editor.insert(title, description).await? {
            Some(id) => println!("created {id}"),
            None => println!("skipped: empty note"),
        },
        Commands::Edit {
            id,
            title,
            description,
        } => {
            if editor.update(id, title, description).await? {
                println!("updated {id}");
            } else {
                println!("no note {id}");
            }
        }
        Commands::Rm { id } => {
            if editor.delete(Note::with_id(id, "", "")).await? {
                println!("deleted {id}");
            } else {
                println!("no note {id}");
            }
        }
        Commands::Show { id } => match editor.get_by_id(id).await? {
            Some(note) => print_notes(std::slice::from_ref(&note), cli.json)?,
            None => println!("no note {id}"),
        },
        Commands::List => {
            let mut notes = editor.notes();
            if let Some(snapshot) = notes.recv().await {
                print_notes(&snapshot, cli.json)?;
            }
        }
        Commands::Watch => {
            let mut notes = editor.notes();
            loop {
                tokio::select! {
                    snapshot = notes.recv() => match snapshot {
                        Some(snapshot) => {
                            print_notes(&snapshot, cli.json)?;
                            println!("--");
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Commands::Ping => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig> {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level.as_deref() {
        config = config.with_log_level(level)?;
    }
    if let Some(dir) = cli.log_dir.as_deref() {
        config = config.with_log_dir(dir)?;
    }
    Ok(config)
}

fn print_notes(notes: &[Note], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
        return Ok(());
    }
    if notes.is_empty() {
        println!("(no notes)");
    }
    for note in notes {
        println!("{:>5}  {}  |  {}", note.id, note.title, note.description);
    }
    Ok(())
}
