use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::sort::SortKey;

/// What a keystroke asks the dashboard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Sort(SortKey),
}

/// Maps a terminal event to a dashboard command.
///
/// `q` and `Ctrl-C` quit, `r` and `m` rank by resident memory, `c` ranks by
/// CPU time. Everything else is ignored.
pub fn command_for(event: &Event) -> Option<Command> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => command_for_key(key),
        _ => None,
    }
}

fn command_for_key(key: &KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('r') | KeyCode::Char('m') => Some(Command::Sort(SortKey::ResidentMemory)),
        KeyCode::Char('c') => Some(Command::Sort(SortKey::CpuTime)),
        _ => None,
    }
}
