use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::keymap::HELP_ROWS;

/// Centered key reference; any key closes it
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = 48.min(area.width);
    let height = (HELP_ROWS.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let lines: Vec<Line> = HELP_ROWS
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<12}", keys),
                    Style::default()
                        .fg(app.theme.highlight)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*what, Style::default().fg(app.theme.text).bg(bg)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg))
        .title(" keys ");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_app, sample_app};

    #[test]
    fn overlay_lists_undo_and_digits() {
        let mut app = sample_app();
        app.show_help = true;
        let out = render_app(&mut app, TERM_W, TERM_H);
        assert!(out.contains("keys"));
        assert!(out.contains("ctrl+z"));
        assert!(out.contains("new feature in visible column"));
    }
}
