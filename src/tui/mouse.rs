use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::engine::DropOutcome;
use crate::engine::drag::{DragEvent, Point, ZoneKind, detect_collision, pointer_within};

use super::app::{App, Mode, MouseDrag};

/// Translate mouse gestures into drag events. Zones come from the last
/// render, in terminal cell coordinates.
pub fn handle_mouse(app: &mut App, ev: MouseEvent) {
    if app.mode != Mode::Navigate {
        return;
    }
    let pointer = Point::new(f64::from(ev.column), f64::from(ev.row));
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => grab(app, pointer),
        MouseEventKind::Drag(MouseButton::Left) => hover(app, pointer),
        MouseEventKind::Up(MouseButton::Left) => release(app, pointer),
        _ => {}
    }
}

fn grab(app: &mut App, pointer: Point) {
    let Some(zone) = pointer_within(pointer, &app.zones, "") else {
        return;
    };
    if zone.kind != ZoneKind::Feature {
        return;
    }
    let drag = MouseDrag {
        feature_id: zone.id.clone(),
        grab_dx: pointer.x - zone.bounds.x,
        grab_dy: pointer.y - zone.bounds.y,
        card: zone.bounds,
    };
    app.select_feature(&drag.feature_id);
    app.board.handle_drag(DragEvent::Start {
        active_id: drag.feature_id.clone(),
    });
    app.mouse_drag = Some(drag);
}

/// The id under the dragged card, if any
fn over_id(app: &App, drag: &MouseDrag, pointer: Point) -> Option<String> {
    let card = drag.card.at(Point::new(pointer.x - drag.grab_dx, pointer.y - drag.grab_dy));
    detect_collision(pointer, Some(card), &app.zones, &drag.feature_id)
}

fn hover(app: &mut App, pointer: Point) {
    let Some(drag) = app.mouse_drag.clone() else {
        return;
    };
    let over = over_id(app, &drag, pointer);
    app.board.handle_drag(DragEvent::Over {
        active_id: drag.feature_id,
        over_id: over,
    });
}

fn release(app: &mut App, pointer: Point) {
    let Some(drag) = app.mouse_drag.take() else {
        return;
    };
    let over = over_id(app, &drag, pointer);
    let outcome = app.board.handle_drag(DragEvent::End {
        active_id: drag.feature_id.clone(),
        over_id: over,
    });
    match outcome {
        Some(DropOutcome::Moved { feature_id, to, .. }) => {
            app.select_feature(&feature_id);
            let name = app
                .board
                .active_project()
                .and_then(|p| p.column(&to))
                .map(|c| c.name.clone())
                .unwrap_or(to);
            app.notify(format!("Moved to {}", name));
        }
        Some(DropOutcome::Rejected(reason)) => app.fail(reason),
        Some(DropOutcome::AlreadyThere { .. }) | None => {}
    }
    app.clamp_cursor();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::drag::{Bounds, DropZone};
    use crate::engine::{Board, BoardOptions};
    use crate::model::feature::Feature;
    use crate::model::project::Project;
    use crate::tui::theme::Theme;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Two columns 20 cells wide, one card in the first
    fn app() -> App {
        let mut p = Project::new("p1", "Website", "me");
        p.features.push(Feature::new("f1", "Login", "ideas"));
        p.features.push(Feature::new("f2", "Deploy", "planned"));
        let mut app = App::new(
            Board::new(vec![p], "p1", BoardOptions::default()),
            Theme::default(),
        );
        app.zones = vec![
            DropZone::column("ideas", Bounds::new(0.0, 0.0, 20.0, 20.0)),
            DropZone::column("planned", Bounds::new(20.0, 0.0, 20.0, 20.0)),
            DropZone::feature("f1", Bounds::new(1.0, 2.0, 18.0, 2.0)),
            DropZone::feature("f2", Bounds::new(21.0, 2.0, 18.0, 2.0)),
        ];
        app
    }

    fn status(app: &App, id: &str) -> String {
        app.board.active_project().unwrap().feature(id).unwrap().status.clone()
    }

    #[test]
    fn drag_onto_column_moves_card() {
        let mut app = app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2));
        assert!(app.board.drag().is_dragging());
        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 30, 10));
        assert_eq!(app.board.drag().over_id(), Some("planned"));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 30, 10));
        assert_eq!(status(&app, "f1"), "planned");
        assert!(!app.board.drag().is_dragging());
        assert_eq!(app.board.undo_stack().len(), 1);
    }

    #[test]
    fn drop_onto_card_joins_its_column() {
        let mut app = app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 25, 3));
        assert_eq!(status(&app, "f1"), "planned");
    }

    #[test]
    fn click_without_moving_changes_nothing() {
        let mut app = app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 2));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 5, 2));
        assert_eq!(status(&app, "f1"), "ideas");
        assert!(app.board.undo_stack().is_empty());
    }

    #[test]
    fn press_on_empty_space_starts_nothing() {
        let mut app = app();
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 15));
        assert!(app.mouse_drag.is_none());
        assert!(!app.board.drag().is_dragging());
    }
}
