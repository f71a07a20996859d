use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::engine::{Board, BoardOptions};
use crate::model::feature::{Feature, Priority, Subtask, SubtaskStatus};
use crate::model::icon::IconKey;
use crate::model::project::Project;
use crate::model::user::{Role, Roster, User};
use crate::tui::app::App;
use crate::tui::theme::Theme;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole screen through the top-level renderer
pub fn render_app(app: &mut App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| super::render(frame, app))
}

fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        color: "blue".into(),
        role: Role::Member,
    }
}

/// A "Website" board: two cards in Ideas, one in Working, none elsewhere
pub fn sample_app() -> App {
    let mut project = Project::new("p1", "Website", "me");

    let mut login = Feature::new("f1", "Login", "ideas");
    login.assignees.push("u1".into());
    let mut form = Subtask::new("s1", "Form");
    form.status = SubtaskStatus::Done;
    login.subtasks.push(form);
    login.subtasks.push(Subtask::new("s2", "Validation"));
    project.features.push(login);

    let mut crash = Feature::new("f2", "Crash on save", "ideas");
    crash.icon = IconKey::Bug;
    crash.priority = Priority::Critical;
    project.features.push(crash);

    project.features.push(Feature::new("f3", "Deploy pipeline", "working"));

    let options = BoardOptions {
        roster: Roster::new(vec![user("me", "Me"), user("u1", "Ada Lovelace")]),
        ..BoardOptions::default()
    };
    App::new(Board::new(vec![project], "p1", options), Theme::default())
}
