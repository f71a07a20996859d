use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::tui::keymap::KEY_HINTS;
use crate::util::unicode;

/// Push a right-aligned hint if it fits
fn push_hint(spans: &mut Vec<Span<'static>>, hint: &str, width: usize, style: Style, bg: Style) {
    let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let hint_width = unicode::display_width(hint);
    if content_width + hint_width < width {
        spans.push(Span::styled(" ".repeat(width - content_width - hint_width), bg));
        spans.push(Span::styled(hint.to_string(), style));
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);
    let cursor = Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg));
    let width = area.width as usize;

    let mut spans: Vec<Span<'static>> = Vec::new();
    match &app.mode {
        Mode::Prompt(prompt) => {
            let (before, after) = prompt.input.split_at(prompt.cursor);
            spans.push(Span::styled(format!("{}: ", prompt.kind.label()), dim));
            spans.push(Span::styled(before.to_string(), bright));
            spans.push(cursor);
            spans.push(Span::styled(after.to_string(), bright));
            push_hint(&mut spans, "Enter save  Esc cancel", width, dim, bg_style);
        }
        Mode::Confirm {
            column_id,
            features,
        } => {
            spans.push(Span::styled(
                format!(
                    "Delete column {}? Its {} card(s) move to the first column. y/n",
                    column_id, features
                ),
                Style::default().fg(app.theme.yellow).bg(bg),
            ));
        }
        Mode::Note { item, text } => {
            let last = text.lines().last().unwrap_or("");
            spans.push(Span::styled(format!("note {}: ", item), dim));
            spans.push(Span::styled(last.to_string(), bright));
            spans.push(cursor);
            push_hint(&mut spans, "Enter save  Alt+Enter newline  Esc discard", width, dim, bg_style);
        }
        Mode::Navigate => {
            if let Some(toast) = &app.toast {
                let fg = if toast.error { app.theme.red } else { app.theme.green };
                spans.push(Span::styled(toast.text.clone(), Style::default().fg(fg).bg(bg)));
            }
            if app.show_key_hints {
                push_hint(&mut spans, KEY_HINTS, width, dim, bg_style);
            }
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(bg_style);
    frame.render_widget(paragraph, area);
}
