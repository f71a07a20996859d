use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::feature::Feature;
use crate::ops::ItemRef;
use crate::ops::feature_ops::{FeatureDraft, FeaturePatch};
use crate::ops::BoardError;
use crate::util::unicode;

use super::app::{App, DetailState, Mode, Prompt, PromptKind};
use super::keymap::{self, BoardCommand};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if app.show_help {
        app.show_help = false;
        return;
    }
    match app.mode.clone() {
        Mode::Navigate => {
            if let Some(cmd) = keymap::map_key(key) {
                run_command(app, cmd);
            }
        }
        Mode::Prompt(prompt) => handle_prompt(app, prompt, key),
        Mode::Confirm {
            column_id,
            features,
        } => handle_confirm(app, &column_id, features, key),
        Mode::Note { item, text } => handle_note(app, item, text, key, now),
    }
}

// ---------------------------------------------------------------------------
// Board commands
// ---------------------------------------------------------------------------

pub fn run_command(app: &mut App, cmd: BoardCommand) {
    use BoardCommand::*;

    match cmd {
        Undo => match app.board.undo() {
            Some(report) if report.applied => app.notify(format!("Undid: {}", report.description)),
            Some(report) => app.notify(format!("Nothing left to restore for: {}", report.description)),
            None => app.notify("Nothing to undo"),
        },
        NewFeatureIn(n) => match app.board.nth_visible_column(n) {
            Some(column) => {
                let column_id = column.id.clone();
                app.column = n;
                app.mode = Mode::Prompt(Prompt::new(PromptKind::NewFeature { column_id }));
            }
            None => app.fail(format!("No visible column {}", n + 1)),
        },
        Flush => {
            if !app.board.has_unsaved_changes() {
                app.notify("Already saved");
            } else if app.board.flush() {
                app.notify("Saved");
            } else {
                app.fail("Save failed (see plank.log)");
            }
        }
        Quit => app.should_quit = true,
        Back => {
            if app.detail.take().is_none() {
                app.should_quit = true;
            }
        }
        Left => {
            app.column = app.column.saturating_sub(1);
            app.detail = None;
        }
        Right => {
            app.column += 1;
            app.detail = None;
        }
        Up => match &mut app.detail {
            Some(detail) => detail.subtask = detail.subtask.saturating_sub(1),
            None => app.row = app.row.saturating_sub(1),
        },
        Down => match &mut app.detail {
            Some(detail) => detail.subtask += 1,
            None => app.row += 1,
        },
        MoveCardLeft => move_card(app, -1),
        MoveCardRight => move_card(app, 1),
        OpenDetail => {
            app.detail = app.selected_feature_id().map(|feature_id| DetailState {
                feature_id,
                subtask: 0,
            });
        }
        EditTitle => {
            if let Some(f) = app.selected_feature() {
                let kind = PromptKind::RenameFeature {
                    feature_id: f.id.clone(),
                };
                let title = f.title.clone();
                app.mode = Mode::Prompt(Prompt::with_text(kind, &title));
            }
        }
        DeleteFeature => {
            if let Some(id) = app.selected_feature_id() {
                let result = app.board.delete_feature(&id);
                report(app, result.map(|_| "Deleted card (ctrl+z to undo)".to_string()));
            }
        }
        AssignMe => assign_me(app),
        EditNote => {
            if let Some(item) = focused_item(app) {
                let text = note_text(app, &item);
                app.mode = Mode::Note { item, text };
            }
        }
        AddSubtask => {
            if let Some(feature_id) = app.selected_feature_id() {
                app.mode = Mode::Prompt(Prompt::new(PromptKind::NewSubtask { feature_id }));
            }
        }
        AdvanceSubtask => advance_subtask(app),
        AddColumn => app.mode = Mode::Prompt(Prompt::new(PromptKind::NewColumn)),
        DeleteColumn => {
            if let Some(column_id) = app.selected_column().map(|c| c.id.clone()) {
                delete_column(app, &column_id, false);
            }
        }
        HideColumn => {
            if let Some(column_id) = app.selected_column().map(|c| c.id.clone()) {
                let result = app.board.hide_column(&column_id);
                report(app, result.map(|_| format!("Hid {} (= shows all)", column_id)));
            }
        }
        ShowAllColumns => {
            app.board.show_all_columns();
            app.notify("Showing all columns");
        }
        ToggleViewMode => {
            let mode = app.board.prefs().view_mode.toggled();
            app.board.set_view_mode(mode);
            app.notify(format!("{} view", mode.label()));
        }
        CycleUserFilter => cycle_user_filter(app),
        NextProject => next_project(app),
        NewProject => app.mode = Mode::Prompt(Prompt::new(PromptKind::NewProject)),
        Help => app.show_help = true,
    }
    app.clamp_cursor();
}

/// Show an operation's outcome in the status row
fn report(app: &mut App, result: Result<String, BoardError>) {
    match result {
        Ok(message) => app.notify(message),
        Err(e) => app.fail(e),
    }
}

fn move_card(app: &mut App, step: isize) {
    let Some(feature_id) = app.selected_feature_id() else {
        return;
    };
    let target = app
        .column
        .checked_add_signed(step)
        .and_then(|i| app.board.visible_columns().get(i).map(|c| c.id.clone()));
    let Some(column_id) = target else {
        return;
    };
    match app.board.move_feature(&feature_id, &column_id) {
        Ok(_) => app.select_feature(&feature_id),
        Err(e) => app.fail(e),
    }
}

/// The card, or the highlighted subtask when details are open
fn focused_item(app: &App) -> Option<ItemRef> {
    let feature = app.selected_feature()?;
    match &app.detail {
        Some(detail) if detail.feature_id == feature.id => match feature.subtasks.get(detail.subtask) {
            Some(sub) => Some(ItemRef::subtask(&feature.id, &sub.id)),
            None => Some(ItemRef::feature(&feature.id)),
        },
        _ => Some(ItemRef::feature(&feature.id)),
    }
}

fn detail_feature<'a>(app: &'a App) -> Option<&'a Feature> {
    let detail = app.detail.as_ref()?;
    app.board.active_project()?.feature(&detail.feature_id)
}

fn note_text(app: &App, item: &ItemRef) -> String {
    let Some(feature) = app.board.active_project().and_then(|p| p.feature(item.feature_id())) else {
        return String::new();
    };
    let note = match item {
        ItemRef::Feature { .. } => feature.note.as_ref(),
        ItemRef::Subtask { subtask_id, .. } => feature.subtask(subtask_id).and_then(|s| s.note.as_ref()),
    };
    note.map(|n| n.content.clone()).unwrap_or_default()
}

fn assign_me(app: &mut App) {
    let me = app.board.current_user().to_string();
    let result = match focused_item(app) {
        Some(ItemRef::Subtask {
            feature_id,
            subtask_id,
        }) => app.board.toggle_subtask_assignee(&feature_id, &subtask_id, &me),
        Some(ItemRef::Feature { feature_id }) => app.board.toggle_feature_assignee(&feature_id, &me),
        None => return,
    };
    report(
        app,
        result.map(|on| if on { "Assigned you" } else { "Unassigned you" }.to_string()),
    );
}

fn advance_subtask(app: &mut App) {
    let Some((feature_id, subtask_id)) = detail_feature(app).and_then(|f| {
        let index = app.detail.as_ref()?.subtask;
        f.subtasks.get(index).map(|s| (f.id.clone(), s.id.clone()))
    }) else {
        return;
    };
    let result = app.board.advance_subtask(&feature_id, &subtask_id);
    report(app, result.map(|status| format!("Subtask {}", status.label())));
}

fn delete_column(app: &mut App, column_id: &str, confirmed: bool) {
    match app.board.delete_column(column_id, confirmed) {
        Ok(deletion) if deletion.reassigned.is_empty() => {
            app.notify(format!("Deleted column {}", deletion.removed.name));
        }
        Ok(deletion) => app.notify(format!(
            "Deleted column {}; moved {} card(s) to {}",
            deletion.removed.name,
            deletion.reassigned.len(),
            deletion.target
        )),
        Err(BoardError::ConfirmationRequired { column_id, features }) => {
            app.mode = Mode::Confirm {
                column_id,
                features,
            };
        }
        Err(e) => app.fail(e),
    }
}

/// None, then each roster user in turn
fn cycle_user_filter(app: &mut App) {
    let users: Vec<String> = app.board.roster().users().iter().map(|u| u.id.clone()).collect();
    if users.is_empty() {
        app.notify("No users configured");
        return;
    }
    let next = match &app.board.prefs().filter_by_user {
        None => users.first().cloned(),
        Some(current) => users
            .iter()
            .position(|u| u == current)
            .and_then(|i| users.get(i + 1).cloned()),
    };
    match app.board.set_filter_by_user(next.clone()) {
        Ok(()) => match next {
            Some(user) => {
                let name = app.board.roster().display_name(&user).to_string();
                app.notify(format!("Showing {}'s cards", name));
            }
            None => app.notify("Showing all cards"),
        },
        Err(e) => app.fail(e),
    }
    app.row = 0;
}

fn next_project(app: &mut App) {
    let projects = app.board.store().projects();
    let active = app.board.store().active_project_id();
    let index = projects.iter().position(|p| p.id == active).unwrap_or(0);
    let Some(next) = projects.get((index + 1) % projects.len().max(1)) else {
        return;
    };
    let (id, name) = (next.id.clone(), next.name().to_string());
    match app.board.switch_project(&id) {
        Ok(()) => {
            app.column = 0;
            app.row = 0;
            app.detail = None;
            app.notify(format!("Project: {}", name));
        }
        Err(e) => app.fail(e),
    }
}

// ---------------------------------------------------------------------------
// Prompt, confirm and note modes
// ---------------------------------------------------------------------------

/// Shared single-line editing. Returns true if the key was consumed.
fn edit_line(input: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER) => {
            input.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            if let Some(prev) = unicode::prev_grapheme_boundary(input, *cursor) {
                input.replace_range(prev..*cursor, "");
                *cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = unicode::next_grapheme_boundary(input, *cursor) {
                input.replace_range(*cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = unicode::prev_grapheme_boundary(input, *cursor) {
                *cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = unicode::next_grapheme_boundary(input, *cursor) {
                *cursor = next;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = input.len(),
        _ => return false,
    }
    true
}

fn handle_prompt(app: &mut App, mut prompt: Prompt, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.mode = Mode::Navigate,
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            submit_prompt(app, prompt);
        }
        _ => {
            if edit_line(&mut prompt.input, &mut prompt.cursor, key) {
                app.mode = Mode::Prompt(prompt);
            }
        }
    }
}

fn submit_prompt(app: &mut App, prompt: Prompt) {
    let text = prompt.input;
    match prompt.kind {
        PromptKind::NewFeature { column_id } => {
            match app.board.create_feature(&column_id, FeatureDraft::titled(text)) {
                Ok(id) => {
                    app.select_feature(&id);
                    app.notify("Created card");
                }
                Err(e) => app.fail(e),
            }
        }
        PromptKind::RenameFeature { feature_id } => {
            let patch = FeaturePatch {
                title: Some(text),
                ..Default::default()
            };
            let result = app.board.edit_feature(&feature_id, &patch);
            report(app, result.map(|_| "Renamed card".to_string()));
        }
        PromptKind::NewSubtask { feature_id } => {
            let result = app.board.add_subtask(&feature_id, &text);
            report(app, result.map(|_| "Added subtask".to_string()));
            if app.detail.is_none() {
                app.detail = Some(DetailState {
                    feature_id,
                    subtask: 0,
                });
            }
        }
        PromptKind::NewColumn => {
            let result = app.board.add_column(&text, "gray");
            report(app, result.map(|_| format!("Added column {}", text.trim())));
        }
        PromptKind::NewProject => match app.board.create_project(&text) {
            Ok(_) => {
                app.column = 0;
                app.row = 0;
                app.detail = None;
                app.notify(format!("Created project {}", text.trim()));
            }
            Err(e) => app.fail(e),
        },
    }
    app.clamp_cursor();
}

fn handle_confirm(app: &mut App, column_id: &str, _features: usize, key: KeyEvent) {
    app.mode = Mode::Navigate;
    if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        delete_column(app, column_id, true);
        app.clamp_cursor();
    } else {
        app.notify("Kept column");
    }
}

/// Enter saves at once, Esc discards the unsaved edit. Anything typed in
/// between is auto-saved after a pause.
fn handle_note(app: &mut App, item: ItemRef, mut text: String, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => {
            app.board.discard_note_edit(&item);
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            text.push('\n');
            feed_note(app, item, text, now);
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            let result = app.board.save_note(&item, &text);
            report(app, result.map(|_| "Saved note".to_string()));
        }
        _ => {
            let mut cursor = text.len();
            if edit_line(&mut text, &mut cursor, key) {
                feed_note(app, item, text, now);
            }
        }
    }
}

fn feed_note(app: &mut App, item: ItemRef, text: String, now: Instant) {
    if let Err(e) = app.board.edit_note(&item, &text, now) {
        app.fail(e);
        app.mode = Mode::Navigate;
        return;
    }
    app.mode = Mode::Note { item, text };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Board, BoardOptions};
    use crate::model::feature::{Subtask, SubtaskStatus};
    use crate::model::project::Project;
    use crate::tui::theme::Theme;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn app() -> App {
        let mut p = Project::new("p1", "Website", "me");
        let mut f = Feature::new("f1", "Login", "ideas");
        f.subtasks.push(Subtask::new("s1", "Form"));
        p.features.push(f);
        p.features.push(Feature::new("f2", "Deploy", "working"));
        App::new(
            Board::new(vec![p], "p1", BoardOptions::default()),
            Theme::default(),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn feature<'a>(app: &'a App, id: &str) -> Option<&'a Feature> {
        app.board.active_project().unwrap().feature(id)
    }

    #[test]
    fn digit_prompt_creates_card_in_that_column() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert!(matches!(app.mode, Mode::Prompt(_)));
        type_text(&mut app, "Billing");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        let f = app.selected_feature().unwrap();
        assert_eq!(f.title, "Billing");
        assert_eq!(f.status, "planned");
    }

    #[test]
    fn blank_title_is_refused_with_a_toast() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.toast.as_ref().unwrap().error);
        assert_eq!(app.board.features_in("ideas").len(), 1);
    }

    #[test]
    fn escape_cancels_prompt() {
        let mut app = app();
        press(&mut app, KeyCode::Char('1'));
        type_text(&mut app, "Nope");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.board.features_in("ideas").len(), 1);
    }

    #[test]
    fn move_card_then_undo() {
        let mut app = app();
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(feature(&app, "f1").unwrap().status, "planned");
        assert_eq!(app.selected_feature_id().as_deref(), Some("f1"));

        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert_eq!(feature(&app, "f1").unwrap().status, "ideas");
        assert!(app.toast.as_ref().unwrap().text.starts_with("Undid:"));
    }

    #[test]
    fn undo_on_empty_history_says_so() {
        let mut app = app();
        run_command(&mut app, BoardCommand::Undo);
        assert_eq!(app.toast.as_ref().unwrap().text, "Nothing to undo");
    }

    #[test]
    fn rename_prefills_title() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "out");
        press(&mut app, KeyCode::Enter);
        assert_eq!(feature(&app, "f1").unwrap().title, "Logout");
    }

    #[test]
    fn detail_view_advances_subtasks() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char(' '));
        let f = feature(&app, "f1").unwrap();
        assert_eq!(f.subtasks[0].status, SubtaskStatus::Done);
        assert!(f.subtasks[0].completed());
    }

    #[test]
    fn delete_column_asks_first() {
        let mut app = app();
        press(&mut app, KeyCode::Char('X'));
        assert!(matches!(app.mode, Mode::Confirm { features: 1, .. }));
        press(&mut app, KeyCode::Char('y'));
        let project = app.board.active_project().unwrap();
        assert!(!project.has_column("ideas"));
        assert_eq!(project.feature("f1").unwrap().status, "planned");
    }

    #[test]
    fn delete_column_declined() {
        let mut app = app();
        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.board.active_project().unwrap().has_column("ideas"));
    }

    #[test]
    fn note_typing_autosaves_after_pause() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        let start = Instant::now();
        for c in "hi".chars() {
            handle_key(&mut app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), start);
        }
        assert!(feature(&app, "f1").unwrap().note.is_none());
        app.tick(start + Duration::from_secs(5));
        assert_eq!(feature(&app, "f1").unwrap().note.as_ref().unwrap().content, "hi");
    }

    #[test]
    fn note_escape_discards_draft() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Esc);
        app.tick(Instant::now() + Duration::from_secs(5));
        assert!(feature(&app, "f1").unwrap().note.is_none());
    }

    #[test]
    fn hide_last_visible_column_is_refused() {
        let mut app = app();
        for _ in 0..3 {
            run_command(&mut app, BoardCommand::HideColumn);
        }
        assert_eq!(app.board.visible_columns().len(), 1);
        run_command(&mut app, BoardCommand::HideColumn);
        assert_eq!(app.board.visible_columns().len(), 1);
        assert!(app.toast.as_ref().unwrap().error);
    }

    #[test]
    fn new_project_switches_board() {
        let mut app = app();
        press(&mut app, KeyCode::Char('P'));
        type_text(&mut app, "Mobile");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board.active_project().unwrap().name(), "Mobile");
        run_command(&mut app, BoardCommand::NextProject);
        assert_eq!(app.board.active_project().unwrap().id, "p1");
    }
}
