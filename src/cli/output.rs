use serde::Serialize;

use crate::engine::Board;
use crate::model::column::Column;
use crate::model::feature::{Feature, Priority, Subtask, SubtaskStatus};
use crate::model::icon::IconKey;
use crate::model::user::Roster;
use crate::model::view::ViewMode;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson {
    pub project_id: String,
    pub project: String,
    pub view_mode: ViewMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_user: Option<String>,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i64,
    pub visible: bool,
    pub features: Vec<CardJson>,
}

/// A feature as it appears on the board (no notes or attachments)
#[derive(Serialize)]
pub struct CardJson {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    pub icon: IconKey,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
}

#[derive(Serialize)]
pub struct ColumnInfoJson {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i64,
    pub visible: bool,
    pub features: usize,
}

#[derive(Serialize)]
pub struct ProjectInfoJson {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub owner: String,
    pub collaborators: Vec<String>,
    pub columns: usize,
    pub features: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn card_to_json(feature: &Feature) -> CardJson {
    let (done, total) = feature.progress();
    CardJson {
        id: feature.id.clone(),
        title: feature.title.clone(),
        priority: feature.priority,
        icon: feature.icon,
        assignees: feature.assignees.clone(),
        subtasks_done: done,
        subtasks_total: total,
    }
}

/// The columns to list: visible ones in order, or all with `include_hidden`
pub fn listed_columns(board: &Board, include_hidden: bool) -> Vec<&Column> {
    match board.active_project() {
        Some(p) if include_hidden => p.ordered_columns(),
        Some(_) => board.visible_columns(),
        None => Vec::new(),
    }
}

pub fn board_to_json(board: &Board, columns: &[&Column]) -> BoardJson {
    let (project_id, project) = board
        .active_project()
        .map(|p| (p.id.clone(), p.name().to_string()))
        .unwrap_or_default();
    BoardJson {
        project_id,
        project,
        view_mode: board.prefs().view_mode,
        filter_by_user: board.prefs().filter_by_user.clone(),
        columns: columns
            .iter()
            .map(|c| ColumnJson {
                id: c.id.clone(),
                name: c.name.clone(),
                color: c.color.clone(),
                order: c.order,
                visible: board.visibility().is_visible(&c.id),
                features: board.features_in(&c.id).into_iter().map(card_to_json).collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn status_marker(status: SubtaskStatus) -> &'static str {
    match status {
        SubtaskStatus::Todo => "[ ]",
        SubtaskStatus::InProgress => "[~]",
        SubtaskStatus::Done => "[x]",
    }
}

fn assignee_suffix(ids: &[String], roster: &Roster) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = ids.iter().map(|id| roster.display_name(id)).collect();
    format!("  @{}", names.join(" @"))
}

/// One line per card under a header per column
pub fn format_board(board: &Board, columns: &[&Column]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(project) = board.active_project() {
        lines.push(format!("{} ({})", project.name(), project.id));
    }
    for column in columns {
        let cards = board.features_in(&column.id);
        let hidden = if board.visibility().is_visible(&column.id) {
            ""
        } else {
            " (hidden)"
        };
        lines.push(String::new());
        lines.push(format!("{} [{}]{} {}", column.name, column.id, hidden, cards.len()));
        for feature in cards {
            lines.push(format_card(feature, board.roster()));
        }
    }
    lines
}

pub fn format_card(feature: &Feature, roster: &Roster) -> String {
    let (done, total) = feature.progress();
    let progress = if total > 0 {
        format!(" {}/{}", done, total)
    } else {
        String::new()
    };
    format!(
        "  {} {} ({}){}{}",
        feature.id,
        feature.title,
        feature.priority.label(),
        progress,
        assignee_suffix(&feature.assignees, roster)
    )
}

pub fn format_subtask(subtask: &Subtask, roster: &Roster) -> String {
    format!(
        "  {} {} {}{}",
        status_marker(subtask.status),
        subtask.id,
        subtask.title,
        assignee_suffix(&subtask.assignees, roster)
    )
}

/// Detail listing for `plank show`
pub fn format_feature(feature: &Feature, column: Option<&Column>, roster: &Roster) -> Vec<String> {
    let mut lines = vec![format!("{} {}", feature.id, feature.title)];
    lines.push(format!(
        "column: {}",
        column.map(|c| c.name.as_str()).unwrap_or(&feature.status)
    ));
    lines.push(format!(
        "priority: {}  icon: {}",
        feature.priority.label(),
        feature.icon.key()
    ));
    if !feature.category.is_empty() {
        lines.push(format!("category: {}", feature.category));
    }
    if !feature.assignees.is_empty() {
        let names: Vec<&str> = feature
            .assignees
            .iter()
            .map(|id| roster.display_name(id))
            .collect();
        lines.push(format!("assignees: {}", names.join(", ")));
    }
    if let Some(due) = feature.due_date {
        lines.push(format!("due: {}", due));
    }
    if let Some(h) = feature.estimate_hours {
        lines.push(format!("estimate: {}h", h));
    }
    if let Some(h) = feature.actual_hours {
        lines.push(format!("actual: {}h", h));
    }
    if !feature.description.is_empty() {
        lines.push(String::new());
        lines.push(feature.description.clone());
    }
    if !feature.subtasks.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        lines.extend(feature.subtasks.iter().map(|s| format_subtask(s, roster)));
    }
    for attachment in &feature.attachments {
        lines.push(format!(
            "attachment: {} {} ({} bytes)",
            attachment.id, attachment.file_name, attachment.size
        ));
    }
    if let Some(note) = &feature.note
        && note.visible
    {
        lines.push(String::new());
        lines.push(format!("note ({}):", roster.display_name(&note.last_edited_by)));
        lines.push(note.content.clone());
    }
    lines
}
