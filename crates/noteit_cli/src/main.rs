//! NoteIt command line entry point.
//!
//! # Responsibility
//! - One-shot note commands over the editor service.
//! - `browse`: interactive terminal front end for the list controller.

mod browse;

use clap::{Parser, Subcommand};
use noteit_core::{init_logging, JsonFileNoteStore, Note, NoteId, NoteService, NoteitConfig};
use std::path::PathBuf;

const PREVIEW_MAX_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "noteit")]
#[command(about = "Personal notes kept in a single JSON document", version)]
struct Cli {
    /// Directory holding notes.json (overrides NOTEIT_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log level (overrides NOTEIT_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, optionally filtered by a case-insensitive substring
    List {
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Add a note
    Add { heading: String, content: String },
    /// Replace a note's heading and/or content
    Edit {
        id: NoteId,
        #[arg(long)]
        heading: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete { id: NoteId },
    /// Interactive list with live search
    Browse,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    start_logging(&config);

    let notes_path = config.notes_path();
    let service = NoteService::new(JsonFileNoteStore::new(&notes_path));

    match cli.command {
        Commands::List { query } => {
            let notes = service.list_notes(query.as_deref().unwrap_or(""))?;
            if notes.is_empty() {
                println!("No notes found.");
            }
            for note in &notes {
                println!("{}", summary_line(note));
            }
        }
        Commands::Add { heading, content } => {
            let note = service.create_note(heading, content)?;
            println!("Created {}", note.id);
        }
        Commands::Edit {
            id,
            heading,
            content,
        } => {
            let Some(current) = service.get_note(id)? else {
                return Err(format!("note not found: {id}").into());
            };
            let note = service.update_note(
                id,
                heading.unwrap_or(current.heading),
                content.unwrap_or(current.content),
            )?;
            println!("Updated {}", note.id);
        }
        Commands::Delete { id } => {
            if service.delete_note(id)? {
                println!("Deleted {id}");
            } else {
                println!("No note with id {id}");
            }
        }
        Commands::Browse => browse::run(&notes_path)?,
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> std::io::Result<NoteitConfig> {
    let mut config = NoteitConfig::from_env();
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if config.data_dir.is_relative() {
        config.data_dir = std::env::current_dir()?.join(&config.data_dir);
    }
    Ok(config)
}

fn start_logging(config: &NoteitConfig) {
    let log_dir = config.log_dir();
    let Some(log_dir) = log_dir.to_str() else {
        eprintln!("warning: log directory is not valid UTF-8; logging disabled");
        return;
    };
    if let Err(err) = init_logging(&config.log_level, log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

pub(crate) fn summary_line(note: &Note) -> String {
    let heading = if note.heading.is_empty() {
        "(untitled)"
    } else {
        note.heading.as_str()
    };
    format!("{}  {}  {}", note.id, heading, note.preview(PREVIEW_MAX_CHARS))
}
