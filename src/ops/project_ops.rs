use chrono::NaiveDate;

use crate::model::project::{Project, ProjectMeta};
use crate::model::user::Roster;

use super::{BoardError, new_id, require_text};

/// Create a project with the default columns.
pub fn new_project(name: &str, owner: &str) -> Result<Project, BoardError> {
    let name = require_text("project name", name)?;
    Ok(Project::new(new_id("proj"), name, owner))
}

/// Project settings form
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub deadline: Option<Option<NaiveDate>>,
    pub release_date: Option<Option<NaiveDate>>,
}

impl ProjectPatch {
    /// Apply to project metadata. Returns true if anything changed.
    pub fn apply(&self, meta: &mut ProjectMeta) -> Result<bool, BoardError> {
        let name = match &self.name {
            Some(n) => Some(require_text("project name", n)?),
            None => None,
        };
        let before = meta.clone();
        if let Some(name) = name {
            meta.name = name;
        }
        if let Some(description) = &self.description {
            meta.description = description.trim().to_string();
        }
        if let Some(color) = &self.color {
            meta.color = color.trim().to_string();
        }
        if let Some(deadline) = self.deadline {
            meta.deadline = deadline;
        }
        if let Some(release) = self.release_date {
            meta.release_date = release;
        }
        Ok(*meta != before)
    }
}

/// Add a roster user to the collaborators. Returns true if added.
/// An empty roster accepts any user.
pub fn add_collaborator(meta: &mut ProjectMeta, roster: &Roster, user_id: &str) -> Result<bool, BoardError> {
    if !roster.is_empty() && !roster.contains(user_id) {
        return Err(BoardError::UnknownUser(user_id.to_string()));
    }
    if meta.collaborators.iter().any(|c| c == user_id) {
        return Ok(false);
    }
    meta.collaborators.push(user_id.to_string());
    Ok(true)
}

/// Remove a collaborator. The owner stays. Returns true if removed.
pub fn remove_collaborator(meta: &mut ProjectMeta, user_id: &str) -> Result<bool, BoardError> {
    if meta.owner == user_id {
        return Err(BoardError::Validation(
            "the project owner cannot be removed from collaborators".into(),
        ));
    }
    let before = meta.collaborators.len();
    meta.collaborators.retain(|c| c != user_id);
    Ok(meta.collaborators.len() != before)
}
