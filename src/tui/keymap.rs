use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Columns reachable through the digit keys
pub const DIGIT_COLUMNS: usize = 4;

/// What a key press asks the board to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    Undo,
    /// Open the title prompt for a new feature in the Nth (0-based) visible column
    NewFeatureIn(usize),
    /// Write pending changes now
    Flush,
    Quit,
    Back,
    Left,
    Right,
    Up,
    Down,
    /// Move the selected card one visible column left or right
    MoveCardLeft,
    MoveCardRight,
    OpenDetail,
    EditTitle,
    DeleteFeature,
    AssignMe,
    EditNote,
    AddSubtask,
    AdvanceSubtask,
    AddColumn,
    DeleteColumn,
    HideColumn,
    ShowAllColumns,
    ToggleViewMode,
    CycleUserFilter,
    NextProject,
    NewProject,
    Help,
}

/// Ctrl on Linux/Windows, Cmd (reported as SUPER) on macOS terminals that pass it through
fn is_command(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER)
}

/// Map a key press in the board view to a command.
///
/// Digits only count without modifiers, so Ctrl+1 and friends stay free for
/// the terminal.
pub fn map_key(key: KeyEvent) -> Option<BoardCommand> {
    use BoardCommand::*;

    if is_command(key.modifiers) {
        return match key.code {
            KeyCode::Char('z') | KeyCode::Char('Z') => Some(Undo),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Flush),
            KeyCode::Char('c') => Some(Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c @ '1'..='9') if key.modifiers.is_empty() => {
            let n = c as usize - '1' as usize;
            (n < DIGIT_COLUMNS).then_some(NewFeatureIn(n))
        }
        KeyCode::F(5) => Some(Flush),
        KeyCode::Char('q') => Some(Quit),
        KeyCode::Esc => Some(Back),
        KeyCode::Left | KeyCode::Char('h') => Some(Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Right),
        KeyCode::Up | KeyCode::Char('k') => Some(Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Down),
        KeyCode::Char('H') => Some(MoveCardLeft),
        KeyCode::Char('L') => Some(MoveCardRight),
        KeyCode::Enter => Some(OpenDetail),
        KeyCode::Char('e') => Some(EditTitle),
        KeyCode::Char('x') | KeyCode::Delete => Some(DeleteFeature),
        KeyCode::Char('m') => Some(AssignMe),
        KeyCode::Char('n') => Some(EditNote),
        KeyCode::Char('a') => Some(AddSubtask),
        KeyCode::Char(' ') => Some(AdvanceSubtask),
        KeyCode::Char('C') => Some(AddColumn),
        KeyCode::Char('X') => Some(DeleteColumn),
        KeyCode::Char('-') => Some(HideColumn),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(ShowAllColumns),
        KeyCode::Char('v') => Some(ToggleViewMode),
        KeyCode::Char('f') => Some(CycleUserFilter),
        KeyCode::Char('p') => Some(NextProject),
        KeyCode::Char('P') => Some(NewProject),
        KeyCode::Char('?') => Some(Help),
        _ => None,
    }
}

/// One-line key reference for the status row
pub const KEY_HINTS: &str = "1-4 new  H/L move  enter open  ^z undo  ^r save  ? help  q quit";

/// Rows for the help overlay
pub const HELP_ROWS: &[(&str, &str)] = &[
    ("1-4", "new feature in visible column"),
    ("h j k l", "select card"),
    ("H / L", "move card left / right"),
    ("mouse drag", "move card onto a column or card"),
    ("enter", "open card details"),
    ("e", "edit title"),
    ("x", "delete card"),
    ("m", "assign / unassign me"),
    ("n", "edit note"),
    ("a / space", "add subtask / advance subtask"),
    ("C / X", "add / delete column"),
    ("- / =", "hide column / show all"),
    ("v", "toggle view mode"),
    ("f", "cycle user filter"),
    ("p / P", "next project / new project"),
    ("ctrl+z", "undo"),
    ("ctrl+r, F5", "save now"),
    ("q", "quit"),
];
