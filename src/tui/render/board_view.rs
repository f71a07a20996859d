use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::engine::drag::{Bounds, DropZone};
use crate::model::column::Column;
use crate::model::feature::Feature;
use crate::model::view::ViewMode;
use crate::tui::app::App;
use crate::tui::keymap::DIGIT_COLUMNS;
use crate::util::unicode;

use super::helpers::{assignee_chips, icon_glyph};

/// Rows per card
const CARD_HEIGHT: u16 = 2;
/// Card width in horizontal (lane) mode
const TILE_WIDTH: u16 = 24;

fn bounds(r: Rect) -> Bounds {
    Bounds::new(
        f64::from(r.x),
        f64::from(r.y),
        f64::from(r.width),
        f64::from(r.height),
    )
}

/// Render the visible columns of the active project and record their drop
/// zones for mouse hit testing.
pub fn render_board(frame: &mut Frame, app: &mut App, area: Rect) {
    let mut zones = Vec::new();
    let columns: Vec<Column> = app.board.visible_columns().into_iter().cloned().collect();
    if columns.is_empty() {
        app.zones = zones;
        return;
    }

    let direction = match app.board.prefs().view_mode {
        ViewMode::Vertical => Direction::Horizontal,
        ViewMode::Horizontal => Direction::Vertical,
    };
    let n = columns.len() as u32;
    let slots = Layout::default()
        .direction(direction)
        .constraints(columns.iter().map(|_| Constraint::Ratio(1, n)))
        .split(area);

    for (i, (column, slot)) in columns.iter().zip(slots.iter()).enumerate() {
        zones.push(DropZone::column(column.id.clone(), bounds(*slot)));
        render_column(frame, app, column, i, *slot, &mut zones);
    }
    app.zones = zones;
}

fn render_column(
    frame: &mut Frame,
    app: &App,
    column: &Column,
    index: usize,
    area: Rect,
    zones: &mut Vec<DropZone>,
) {
    let theme = &app.theme;
    let cards = app.board.features_in(&column.id);
    let selected_column = index == app.column;
    let drop_target = app.board.drag().is_dragging()
        && app
            .board
            .active_project()
            .and_then(|p| app.board.drag().highlighted_column(p, app.board.visibility()))
            .is_some_and(|id| id == column.id);

    let bg = if drop_target {
        theme.drop_target_bg
    } else {
        theme.background
    };
    let border = if selected_column {
        theme.highlight
    } else {
        theme.named_color(&column.color)
    };
    let digit = if index < DIGIT_COLUMNS {
        format!("{} ", index + 1)
    } else {
        String::new()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border).bg(bg))
        .style(Style::default().bg(bg))
        .title(Span::styled(
            format!(" {}{} {} ", digit, column.name, cards.len()),
            Style::default()
                .fg(theme.named_color(&column.color))
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if cards.is_empty() {
        let hint = Paragraph::new(Span::styled("empty", Style::default().fg(theme.dim).bg(bg)));
        frame.render_widget(hint, inner);
        return;
    }

    let tiles = match app.board.prefs().view_mode {
        ViewMode::Vertical => stacked_tiles(inner, cards.len(), selected_column.then_some(app.row)),
        ViewMode::Horizontal => lane_tiles(inner, cards.len(), selected_column.then_some(app.row)),
    };
    let shown = tiles.len();
    for (row, rect) in tiles {
        let feature = cards[row];
        let selected = selected_column && row == app.row;
        zones.push(DropZone::feature(feature.id.clone(), bounds(rect)));
        render_card(frame, app, feature, selected, rect);
    }
    if shown < cards.len() && inner.height > 0 {
        let more = format!("+{} more", cards.len() - shown);
        let r = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(more, Style::default().fg(theme.dim).bg(bg))),
            r,
        );
    }
}

/// Cards stacked top to bottom, scrolled so the selected one is on screen.
/// Returns (card index, rect) pairs.
fn stacked_tiles(inner: Rect, count: usize, selected: Option<usize>) -> Vec<(usize, Rect)> {
    let capacity = (inner.height / CARD_HEIGHT) as usize;
    if capacity == 0 {
        return Vec::new();
    }
    // Keep a row free for "+n more" when the column overflows
    let capacity = if count > capacity { capacity.saturating_sub(1).max(1) } else { capacity };
    let first = match selected {
        Some(row) if row >= capacity => row + 1 - capacity,
        _ => 0,
    };
    (first..count.min(first + capacity))
        .enumerate()
        .map(|(slot, row)| {
            let y = inner.y + slot as u16 * CARD_HEIGHT;
            (row, Rect::new(inner.x, y, inner.width, CARD_HEIGHT))
        })
        .collect()
}

/// Cards side by side in a lane
fn lane_tiles(inner: Rect, count: usize, selected: Option<usize>) -> Vec<(usize, Rect)> {
    if inner.height < CARD_HEIGHT || inner.width == 0 {
        return Vec::new();
    }
    let width = TILE_WIDTH.min(inner.width);
    let capacity = ((inner.width / width) as usize).max(1);
    let first = match selected {
        Some(row) if row >= capacity => row + 1 - capacity,
        _ => 0,
    };
    (first..count.min(first + capacity))
        .enumerate()
        .map(|(slot, row)| {
            let x = inner.x + slot as u16 * width;
            (row, Rect::new(x, inner.y, width.saturating_sub(1).max(1), CARD_HEIGHT))
        })
        .collect()
}

fn render_card(frame: &mut Frame, app: &App, feature: &Feature, selected: bool, area: Rect) {
    let theme = &app.theme;
    let width = area.width as usize;
    let dragging = app.board.drag().active_id() == Some(feature.id.as_str());
    let bg = if selected { theme.selection_bg } else { theme.background };
    let fg = if dragging { theme.dim } else { theme.text_bright };

    let title = unicode::fit_to_width(
        &format!("{} {}", icon_glyph(feature.icon), feature.title),
        width,
    );

    let mut meta = vec![feature.priority.label().to_string()];
    let (done, total) = feature.progress();
    if total > 0 {
        meta.push(format!("{}/{}", done, total));
    }
    if feature.note.as_ref().is_some_and(|n| n.visible) {
        meta.push("✉".to_string());
    }
    if !feature.attachments.is_empty() {
        meta.push(format!("⎘{}", feature.attachments.len()));
    }
    let chips = assignee_chips(&feature.assignees, app.board.roster());
    if !chips.is_empty() {
        meta.push(chips);
    }
    let meta = unicode::fit_to_width(&format!("  {}", meta.join(" ")), width);

    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(fg)
                .bg(bg)
                .add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() }),
        )),
        Line::from(Span::styled(
            meta,
            Style::default().fg(theme.priority_color(feature.priority)).bg(bg),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, render_to_string, sample_app};
    use crate::engine::drag::ZoneKind;
    use pretty_assertions::assert_eq;

    fn render(app: &mut App, w: u16, h: u16) -> String {
        render_to_string(w, h, |frame, area| render_board(frame, app, area))
    }

    #[test]
    fn columns_and_cards_render() {
        let mut app = sample_app();
        let out = render(&mut app, TERM_W, TERM_H);
        assert!(out.contains("1 Ideas 2"));
        assert!(out.contains("3 Working 1"));
        assert!(out.contains("◆ Login"));
        assert!(out.contains("1/2 AL"));
        assert!(out.contains("✖ Crash"));
        assert!(out.contains("empty"));
    }

    #[test]
    fn hidden_columns_are_not_drawn() {
        let mut app = sample_app();
        app.board.hide_column("planned").unwrap();
        let out = render(&mut app, TERM_W, TERM_H);
        assert!(!out.contains("Planned"));
        // digits follow visible position
        assert!(out.contains("2 Working 1"));
    }

    #[test]
    fn zones_cover_columns_and_cards() {
        let mut app = sample_app();
        render(&mut app, TERM_W, TERM_H);
        let columns: Vec<&str> = app
            .zones
            .iter()
            .filter(|z| z.kind == ZoneKind::Column)
            .map(|z| z.id.as_str())
            .collect();
        assert_eq!(columns, vec!["ideas", "planned", "working", "done"]);
        let login = app.zones.iter().find(|z| z.id == "f1").unwrap();
        assert_eq!(login.kind, ZoneKind::Feature);
        let ideas = app.zones.iter().find(|z| z.id == "ideas").unwrap();
        assert!(login.bounds.x >= ideas.bounds.x);
        assert!(login.bounds.x + login.bounds.width <= ideas.bounds.x + ideas.bounds.width);
    }

    #[test]
    fn user_filter_hides_other_cards() {
        let mut app = sample_app();
        app.board.set_filter_by_user(Some("u1".into())).unwrap();
        let out = render(&mut app, TERM_W, TERM_H);
        assert!(out.contains("Login"));
        assert!(!out.contains("Crash"));
    }

    #[test]
    fn horizontal_mode_stacks_lanes() {
        let mut app = sample_app();
        app.board.set_view_mode(ViewMode::Horizontal);
        let out = render(&mut app, TERM_W, TERM_H);
        let lines: Vec<&str> = out.lines().collect();
        let ideas = lines.iter().position(|l| l.contains("Ideas")).unwrap();
        let working = lines.iter().position(|l| l.contains("Working")).unwrap();
        assert!(working > ideas);
        // both ideas cards share one row of tiles
        assert!(lines[ideas + 1].contains("Login") && lines[ideas + 1].contains("Crash"));
    }

    #[test]
    fn long_columns_scroll_to_selection() {
        let mut app = sample_app();
        for i in 0..12 {
            app.board
                .create_feature("ideas", crate::ops::feature_ops::FeatureDraft::titled(format!("Card {}", i)))
                .unwrap();
        }
        app.row = 13;
        let out = render(&mut app, TERM_W, 12);
        assert!(out.contains("Card 11"));
        assert!(!out.contains("Login"));
        assert!(out.contains("more"));
    }

    #[test]
    fn stacked_tiles_reserve_overflow_row() {
        let inner = Rect::new(0, 0, 10, 6);
        assert_eq!(stacked_tiles(inner, 3, None).len(), 3);
        let tiles = stacked_tiles(inner, 5, None);
        assert_eq!(tiles.len(), 2);
        let tiles = stacked_tiles(inner, 5, Some(4));
        assert_eq!(tiles.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![3, 4]);
    }
}
