//! Interactive terminal presentation layer for `NoteListController`.
//!
//! Reads one command per line, turns it into a list intent and prints the
//! visible list whenever the controller renders.

use crate::summary_line;
use log::info;
use noteit_core::{
    JsonFileNoteStore, ListIntent, ListWarning, Note, NoteListController, NoteListView,
    NoteService, NoteServiceResult, NoteStore,
};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

const STORAGE_WAIT: Duration = Duration::from_secs(2);
const HELP: &str = "commands: /<text> search | / clear | open <n> | delete <n> | add | help | quit";

#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    Search(String),
    Open(usize),
    Delete(usize),
    Add,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Parses one input line. Positions are 1-based as printed.
    fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if let Some(query) = line.strip_prefix('/') {
            return Ok(Self::Search(query.to_string()));
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));
        match word {
            "open" => parse_position(rest).map(Self::Open),
            "delete" | "rm" => parse_position(rest).map(Self::Delete),
            "add" => Ok(Self::Add),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "" => Err(HELP.to_string()),
            other => Err(format!("unknown command `{other}`; {HELP}")),
        }
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(format!("expected a note number, got `{raw}`")),
    }
}

/// Prints renders and remembers the last visible list for positional commands.
#[derive(Default)]
struct TerminalView {
    visible: Vec<Note>,
    editor_request: Option<Option<Note>>,
}

impl NoteListView for TerminalView {
    fn render(&mut self, visible: &[Note], is_empty: bool) {
        self.visible = visible.to_vec();
        println!();
        if is_empty {
            println!("No notes found.");
            return;
        }
        for (position, note) in visible.iter().enumerate() {
            println!("{:>3}. {}", position + 1, summary_line(note));
        }
    }

    fn warn(&mut self, warning: &ListWarning) {
        eprintln!("warning: {warning}");
    }

    fn open_editor(&mut self, note: Option<&Note>) {
        self.editor_request = Some(note.cloned());
    }
}

pub(crate) fn run(notes_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller =
        NoteListController::new(JsonFileNoteStore::new(notes_path), TerminalView::default());
    let editor = NoteService::new(JsonFileNoteStore::new(notes_path));
    info!("event=browse_start module=cli status=ok");

    println!("{HELP}");
    controller.initialize();
    controller.wait_until_idle(STORAGE_WAIT);

    let outcome = command_loop(&mut controller, &editor);
    controller.close();
    info!("event=browse_stop module=cli status=ok");
    outcome
}

fn command_loop(
    controller: &mut NoteListController<TerminalView>,
    editor: &NoteService<JsonFileNoteStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let command = match BrowseCommand::parse(&line?) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            BrowseCommand::Search(text) => controller.dispatch(ListIntent::QueryChanged(text)),
            BrowseCommand::Open(position) => {
                if let Some(note) = visible_at(controller, position) {
                    controller.dispatch(ListIntent::NoteTapped(note));
                }
            }
            BrowseCommand::Delete(position) => {
                if let Some(note) = visible_at(controller, position) {
                    controller.dispatch(ListIntent::DeleteTapped(note));
                }
            }
            BrowseCommand::Add => controller.dispatch(ListIntent::AddTapped),
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Quit => break,
        }

        if let Some(target) = controller.view_mut().editor_request.take() {
            edit_in_terminal(editor, target.as_ref(), &mut lines)?;
            controller.dispatch(ListIntent::Resumed);
        }
        controller.wait_until_idle(STORAGE_WAIT);
    }
    Ok(())
}

fn visible_at(controller: &NoteListController<TerminalView>, position: usize) -> Option<Note> {
    let note = controller.visible_list().get(position - 1).cloned();
    if note.is_none() {
        println!("no note number {position}");
    }
    note
}

/// Minimal line editor standing in for the editing screen. Blank input keeps
/// the current value when editing.
///
/// Only terminal I/O errors are returned; a failed save is printed as a
/// warning and the session goes on.
fn edit_in_terminal<S: NoteStore>(
    editor: &NoteService<S>,
    note: Option<&Note>,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> io::Result<()> {
    let mut prompt = |label: &str, current: Option<&str>| -> io::Result<Option<String>> {
        match current {
            Some(value) => print!("{label} [{value}]: "),
            None => print!("{label}: "),
        }
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(None);
        };
        let line = line.trim_end().to_string();
        Ok(match (line.is_empty(), current) {
            (true, Some(value)) => Some(value.to_string()),
            _ => Some(line),
        })
    };

    let Some(heading) = prompt("heading", note.map(|n| n.heading.as_str()))? else {
        return Ok(());
    };
    let Some(content) = prompt("content", note.map(|n| n.content.as_str()))? else {
        return Ok(());
    };

    if let Err(err) = save_edit(editor, note, heading, content) {
        eprintln!("warning: {err}");
    }
    Ok(())
}

fn save_edit<S: NoteStore>(
    editor: &NoteService<S>,
    note: Option<&Note>,
    heading: String,
    content: String,
) -> NoteServiceResult<Note> {
    match note {
        Some(existing) => editor.update_note(existing.id, heading, content),
        None => editor.create_note(heading, content),
    }
}
