use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::engine::drag::{Bounds, DropZone};
use crate::engine::{Board, BoardOptions};
use crate::io::config_io;
use crate::io::persist::Persister;
use crate::io::storage::FileStorage;
use crate::model::column::Column;
use crate::model::feature::Feature;
use crate::ops::ItemRef;

use super::input;
use super::mouse;
use super::render;
use super::theme::Theme;

/// Longest the loop sleeps waiting for input
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// How long a status message stays up
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Current interaction mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Single-line text prompt
    Prompt(Prompt),
    /// Waiting for y/n before deleting a column that still holds features
    Confirm { column_id: String, features: usize },
    /// Editing a note; every keystroke feeds the auto-save debouncer
    Note { item: ItemRef, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    NewFeature { column_id: String },
    RenameFeature { feature_id: String },
    NewSubtask { feature_id: String },
    NewColumn,
    NewProject,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::NewFeature { .. } => "New feature",
            PromptKind::RenameFeature { .. } => "Title",
            PromptKind::NewSubtask { .. } => "New subtask",
            PromptKind::NewColumn => "New column",
            PromptKind::NewProject => "New project",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Byte offset of the cursor in `input`
    pub cursor: usize,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Prompt {
            kind,
            input: String::new(),
            cursor: 0,
        }
    }

    pub fn with_text(kind: PromptKind, text: &str) -> Self {
        Prompt {
            kind,
            input: text.to_string(),
            cursor: text.len(),
        }
    }
}

/// Open card details; `subtask` is the highlighted subtask row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub feature_id: String,
    pub subtask: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub error: bool,
    pub shown_at: Instant,
}

/// A card being dragged with the mouse
#[derive(Debug, Clone, PartialEq)]
pub struct MouseDrag {
    pub feature_id: String,
    /// Pointer offset from the card's top-left corner at grab time
    pub grab_dx: f64,
    pub grab_dy: f64,
    pub card: Bounds,
}

/// Main application state
pub struct App {
    pub board: Board,
    pub theme: Theme,
    pub mode: Mode,
    /// Selected column, as an index into the visible columns
    pub column: usize,
    /// Selected card within that column
    pub row: usize,
    pub detail: Option<DetailState>,
    pub toast: Option<Toast>,
    pub show_help: bool,
    pub show_key_hints: bool,
    pub should_quit: bool,
    /// Drop zones laid out by the last render, used for mouse hit tests
    pub zones: Vec<DropZone>,
    pub mouse_drag: Option<MouseDrag>,
}

impl App {
    pub fn new(board: Board, theme: Theme) -> Self {
        App {
            board,
            theme,
            mode: Mode::Navigate,
            column: 0,
            row: 0,
            detail: None,
            toast: None,
            show_help: false,
            show_key_hints: true,
            should_quit: false,
            zones: Vec::new(),
            mouse_drag: None,
        }
    }

    pub fn selected_column(&self) -> Option<&Column> {
        self.board.visible_columns().get(self.column).copied()
    }

    pub fn selected_feature(&self) -> Option<&Feature> {
        let column = self.selected_column()?;
        self.board.features_in(&column.id).get(self.row).copied()
    }

    pub fn selected_feature_id(&self) -> Option<String> {
        self.selected_feature().map(|f| f.id.clone())
    }

    /// Keep the cursor on an existing card after the board changed
    pub fn clamp_cursor(&mut self) {
        let columns = self.board.visible_columns().len();
        self.column = self.column.min(columns.saturating_sub(1));
        let rows = self
            .selected_column()
            .map(|c| self.board.features_in(&c.id).len())
            .unwrap_or(0);
        self.row = self.row.min(rows.saturating_sub(1));
        if let Some(detail) = &self.detail {
            let still_there = self
                .board
                .active_project()
                .is_some_and(|p| p.feature(&detail.feature_id).is_some());
            if !still_there {
                self.detail = None;
            }
        }
    }

    /// Put the cursor on a card, wherever it now sits
    pub fn select_feature(&mut self, feature_id: &str) {
        let position = self
            .board
            .visible_columns()
            .iter()
            .enumerate()
            .find_map(|(ci, c)| {
                self.board
                    .features_in(&c.id)
                    .iter()
                    .position(|f| f.id == feature_id)
                    .map(|ri| (ci, ri))
            });
        if let Some((column, row)) = position {
            self.column = column;
            self.row = row;
        }
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn fail(&mut self, err: impl std::fmt::Display) {
        self.toast = Some(Toast {
            text: err.to_string(),
            error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if let Some(toast) = &self.toast
            && now.duration_since(toast.shown_at) >= TOAST_TTL
        {
            self.toast = None;
        }
    }

    /// Run debounced work and surface it in the status row
    pub fn tick(&mut self, now: Instant) {
        let report = self.board.tick(now);
        if report.notes_saved > 0 {
            tracing::debug!(notes = report.notes_saved, "auto-saved notes");
        }
        self.expire_toast(now);
    }
}

/// Run the TUI application
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    let persister = Persister::new(Box::new(FileStorage::new(data_dir)))
        .with_stale_after_days(config.storage.stale_after_days);
    let board = Board::open(persister, BoardOptions::from_config(&config), Utc::now());

    let mut app = App::new(board, Theme::from_config(&config.ui));
    app.show_key_hints = config.ui.show_key_hints;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Pending edits are written on the way out, even after an error
    if app.board.has_unsaved_changes() && !app.board.flush() {
        tracing::warn!("final save failed");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        let timeout = app
            .board
            .next_deadline(Instant::now())
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key, Instant::now());
                }
                Event::Mouse(ev) => mouse::handle_mouse(app, ev),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
