use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::feature::{Subtask, SubtaskStatus};
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::{assignee_chips, icon_glyph};

fn status_symbol(status: SubtaskStatus) -> &'static str {
    match status {
        SubtaskStatus::Todo => "[ ]",
        SubtaskStatus::InProgress => "[~]",
        SubtaskStatus::Done => "[x]",
    }
}

/// Side panel for the open card: fields, subtasks, attachments and note
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let Some(detail) = &app.detail else {
        return;
    };
    let Some(project) = app.board.active_project() else {
        return;
    };
    let Some(feature) = project.feature(&detail.feature_id) else {
        return;
    };
    let roster = app.board.roster();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg))
        .title(Span::styled(
            format!(" {} {} ", icon_glyph(feature.icon), feature.id),
            Style::default().fg(theme.dim),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let width = inner.width as usize;

    let label = Style::default().fg(theme.dim).bg(bg);
    let value = Style::default().fg(theme.text).bg(bg);
    let field = |name: &str, text: String| {
        Line::from(vec![
            Span::styled(format!("{:<9}", name), label),
            Span::styled(text, value),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(
            unicode::truncate_to_width(&feature.title, width),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    let column = project
        .column(&feature.status)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| feature.status.clone());
    lines.push(field("column", column));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<9}", "priority"), label),
        Span::styled(
            feature.priority.label(),
            Style::default().fg(theme.priority_color(feature.priority)).bg(bg),
        ),
    ]));
    if !feature.category.is_empty() {
        lines.push(field("category", feature.category.clone()));
    }
    if !feature.assignees.is_empty() {
        let names: Vec<&str> = feature.assignees.iter().map(|id| roster.display_name(id)).collect();
        lines.push(field("assigned", names.join(", ")));
    }
    if let Some(due) = feature.due_date {
        lines.push(field("due", due.format("%Y-%m-%d").to_string()));
    }
    match (feature.estimate_hours, feature.actual_hours) {
        (Some(e), Some(a)) => lines.push(field("hours", format!("{} / {} est", a, e))),
        (Some(e), None) => lines.push(field("estimate", format!("{}h", e))),
        (None, Some(a)) => lines.push(field("hours", format!("{}h", a))),
        (None, None) => {}
    }
    if !feature.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(feature.description.clone(), value)));
    }

    lines.push(Line::from(""));
    let (done, total) = feature.progress();
    lines.push(Line::from(Span::styled(
        format!("subtasks {}/{}  (a add, space advance)", done, total),
        label,
    )));
    for (i, sub) in feature.subtasks.iter().enumerate() {
        lines.push(subtask_line(app, sub, i == detail.subtask, width));
    }

    if !feature.attachments.is_empty() {
        lines.push(Line::from(""));
        for a in &feature.attachments {
            lines.push(field("file", format!("{} ({} B)", a.file_name, a.size)));
        }
    }
    if let Some(note) = feature.note.as_ref().filter(|n| n.visible) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("note by {}", roster.display_name(&note.last_edited_by)),
            label,
        )));
        for text in note.content.lines() {
            lines.push(Line::from(Span::styled(text.to_string(), value)));
        }
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn subtask_line<'a>(app: &App, sub: &Subtask, selected: bool, width: usize) -> Line<'a> {
    let theme = &app.theme;
    let bg = if selected { theme.selection_bg } else { theme.background };
    let fg = match sub.status {
        SubtaskStatus::Todo => theme.text,
        SubtaskStatus::InProgress => theme.highlight,
        SubtaskStatus::Done => theme.dim,
    };
    let chips = assignee_chips(&sub.assignees, app.board.roster());
    let marker = status_symbol(sub.status);
    let room = width.saturating_sub(unicode::display_width(marker) + 1 + chips.len() + 1);
    let mut spans = vec![
        Span::styled(format!("{} ", marker), Style::default().fg(fg).bg(bg)),
        Span::styled(
            unicode::truncate_to_width(&sub.title, room),
            Style::default().fg(fg).bg(bg),
        ),
    ];
    if !chips.is_empty() {
        spans.push(Span::styled(
            format!(" {}", chips),
            Style::default().fg(theme.cyan).bg(bg),
        ));
    }
    Line::from(spans)
}
