use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::icon::IconKey;

/// Subtask lifecycle: todo → inprogress → done → todo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl SubtaskStatus {
    /// The state reached by one "advance" click
    pub fn advance(self) -> SubtaskStatus {
        match self {
            SubtaskStatus::Todo => SubtaskStatus::InProgress,
            SubtaskStatus::InProgress => SubtaskStatus::Done,
            SubtaskStatus::Done => SubtaskStatus::Todo,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubtaskStatus::Todo => "todo",
            SubtaskStatus::InProgress => "inprogress",
            SubtaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<SubtaskStatus> {
        match s {
            "todo" => Some(SubtaskStatus::Todo),
            "inprogress" | "in-progress" | "active" => Some(SubtaskStatus::InProgress),
            "done" => Some(SubtaskStatus::Done),
            _ => None,
        }
    }
}

/// Feature priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

/// File metadata attached to a feature or subtask. The bytes live elsewhere,
/// behind `storage_ref`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub storage_ref: String,
    #[serde(default)]
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Free-text note. Saving replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub last_edited_by: String,
    pub last_edited_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

/// A checklist item owned by a feature.
///
/// `completed` is derived from `status` and is not stored separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubtaskRecord", into = "SubtaskRecord")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub status: SubtaskStatus,
    pub assignees: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub estimate_hours: Option<f64>,
    pub attachments: Vec<Attachment>,
    pub note: Option<Note>,
}

impl Subtask {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Subtask {
            id: id.into(),
            title: title.into(),
            status: SubtaskStatus::Todo,
            assignees: Vec::new(),
            due_date: None,
            estimate_hours: None,
            attachments: Vec::new(),
            note: None,
        }
    }

    pub fn completed(&self) -> bool {
        self.status == SubtaskStatus::Done
    }
}

/// Wire shape of a subtask. Older blobs carry only `completed`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubtaskRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: Option<SubtaskStatus>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    estimate_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<Note>,
}

impl From<SubtaskRecord> for Subtask {
    fn from(r: SubtaskRecord) -> Self {
        let status = r.status.unwrap_or(if r.completed {
            SubtaskStatus::Done
        } else {
            SubtaskStatus::Todo
        });
        Subtask {
            id: r.id,
            title: r.title,
            status,
            assignees: dedup(r.assignees),
            due_date: r.due_date,
            estimate_hours: r.estimate_hours,
            attachments: r.attachments,
            note: r.note,
        }
    }
}

impl From<Subtask> for SubtaskRecord {
    fn from(s: Subtask) -> Self {
        SubtaskRecord {
            completed: s.completed(),
            id: s.id,
            title: s.title,
            status: Some(s.status),
            assignees: s.assignees,
            due_date: s.due_date,
            estimate_hours: s.estimate_hours,
            attachments: s.attachments,
            note: s.note,
        }
    }
}

/// A top-level work item on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Id of the column this feature sits in
    pub status: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icon: IconKey,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Feature {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Feature {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: status.into(),
            priority: Priority::default(),
            category: String::new(),
            icon: IconKey::default(),
            assignees: Vec::new(),
            due_date: None,
            estimate_hours: None,
            actual_hours: None,
            attachments: Vec::new(),
            note: None,
            subtasks: Vec::new(),
        }
    }

    pub fn subtask(&self, subtask_id: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == subtask_id)
    }

    pub fn subtask_mut(&mut self, subtask_id: &str) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == subtask_id)
    }

    /// (done, total) subtask counts
    pub fn progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed()).count();
        (done, self.subtasks.len())
    }

    /// True when the user is assigned to the feature or any of its subtasks
    pub fn involves(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|a| a == user_id)
            || self
                .subtasks
                .iter()
                .any(|s| s.assignees.iter().any(|a| a == user_id))
    }
}

/// Toggle set membership: add when absent, remove when present.
/// Returns true when the user ends up assigned.
pub fn toggle_member(set: &mut Vec<String>, user_id: &str) -> bool {
    if let Some(pos) = set.iter().position(|u| u == user_id) {
        set.remove(pos);
        false
    } else {
        set.push(user_id.to_string());
        true
    }
}

/// Drop duplicate ids, keeping the first occurrence
pub fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
