use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::unicode;

/// Project name on the left; view mode, filter and save state on the right
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let board = &app.board;

    let title = board
        .active_project()
        .map(|p| p.name().to_string())
        .unwrap_or_default();
    let projects = board.store().projects().len();
    let mut left = vec![Span::styled(
        format!(" {}", title),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if projects > 1 {
        left.push(Span::styled(
            format!("  ({} projects, p next)", projects),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let mut right = vec![board.prefs().view_mode.label().to_string()];
    if let Some(user) = &board.prefs().filter_by_user {
        right.push(format!("@{}", board.roster().display_name(user)));
    }
    let hidden = board
        .active_project()
        .map(|p| p.columns.len().saturating_sub(board.visible_columns().len()))
        .unwrap_or(0);
    if hidden > 0 {
        right.push(format!("{} hidden", hidden));
    }
    if board.has_unsaved_changes() {
        right.push("●".to_string());
    }
    let right = format!("{} ", right.join("  "));

    let left_width: usize = left.iter().map(|s| unicode::display_width(&s.content)).sum();
    let right_width = unicode::display_width(&right);
    if left_width + right_width < width {
        left.push(Span::styled(
            " ".repeat(width - left_width - right_width),
            Style::default().bg(bg),
        ));
        left.push(Span::styled(right, Style::default().fg(app.theme.dim).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(left)), area);
}
