use chrono::{DateTime, NaiveDate, Utc};

use crate::model::feature::{Attachment, Feature, Note, Priority, toggle_member};
use crate::model::icon::IconKey;

use super::{BoardError, ItemRef, new_id, require_text};

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Fields collected by the "create feature" form
#[derive(Debug, Clone, Default)]
pub struct FeatureDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    pub icon: IconKey,
    pub assignees: Vec<String>,
    pub due_date: Option<NaiveDate>,
    pub estimate_hours: Option<f64>,
}

impl FeatureDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        FeatureDraft {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Build a feature from a draft, placed in `column_id`.
pub fn build_feature(draft: FeatureDraft, column_id: &str) -> Result<Feature, BoardError> {
    let title = require_text("title", &draft.title)?;
    validate_hours("estimate", draft.estimate_hours)?;
    let mut feature = Feature::new(new_id("feat"), title, column_id);
    feature.description = draft.description.trim().to_string();
    feature.priority = draft.priority;
    feature.category = draft.category.trim().to_string();
    feature.icon = draft.icon;
    feature.assignees = crate::model::feature::dedup(draft.assignees);
    feature.due_date = draft.due_date;
    feature.estimate_hours = draft.estimate_hours;
    Ok(feature)
}

// ---------------------------------------------------------------------------
// Inline multi-field edit
// ---------------------------------------------------------------------------

/// A set of field edits applied together. `None` leaves a field alone;
/// for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct FeaturePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub icon: Option<IconKey>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimate_hours: Option<Option<f64>>,
    pub actual_hours: Option<Option<f64>>,
}

impl FeaturePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.icon.is_none()
            && self.due_date.is_none()
            && self.estimate_hours.is_none()
            && self.actual_hours.is_none()
    }

    /// Validate the whole patch up front so a bad field never leaves a
    /// half-applied edit behind.
    pub fn validate(&self) -> Result<(), BoardError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(hours) = self.estimate_hours {
            validate_hours("estimate", hours)?;
        }
        if let Some(hours) = self.actual_hours {
            validate_hours("actual hours", hours)?;
        }
        Ok(())
    }

    /// Apply to a feature. Returns true if anything changed.
    pub fn apply(&self, feature: &mut Feature) -> Result<bool, BoardError> {
        self.validate()?;
        let before = feature.clone();
        if let Some(title) = &self.title {
            feature.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            feature.description = description.trim().to_string();
        }
        if let Some(priority) = self.priority {
            feature.priority = priority;
        }
        if let Some(category) = &self.category {
            feature.category = category.trim().to_string();
        }
        if let Some(icon) = self.icon {
            feature.icon = icon;
        }
        if let Some(due) = self.due_date {
            feature.due_date = due;
        }
        if let Some(hours) = self.estimate_hours {
            feature.estimate_hours = hours;
        }
        if let Some(hours) = self.actual_hours {
            feature.actual_hours = hours;
        }
        Ok(*feature != before)
    }

    /// Names of the fields this patch touches, for undo descriptions
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.description.is_some() {
            names.push("description");
        }
        if self.priority.is_some() {
            names.push("priority");
        }
        if self.category.is_some() {
            names.push("category");
        }
        if self.icon.is_some() {
            names.push("icon");
        }
        if self.due_date.is_some() {
            names.push("due date");
        }
        if self.estimate_hours.is_some() {
            names.push("estimate");
        }
        if self.actual_hours.is_some() {
            names.push("actual hours");
        }
        names
    }
}

fn validate_hours(field: &str, hours: Option<f64>) -> Result<(), BoardError> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(BoardError::Validation(format!(
            "{} must be a non-negative number of hours",
            field
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_feature<'a>(features: &'a [Feature], feature_id: &str) -> Result<&'a Feature, BoardError> {
    features
        .iter()
        .find(|f| f.id == feature_id)
        .ok_or_else(|| BoardError::feature(feature_id))
}

pub fn find_feature_mut<'a>(
    features: &'a mut [Feature],
    feature_id: &str,
) -> Result<&'a mut Feature, BoardError> {
    features
        .iter_mut()
        .find(|f| f.id == feature_id)
        .ok_or_else(|| BoardError::feature(feature_id))
}

pub fn feature_index(features: &[Feature], feature_id: &str) -> Result<usize, BoardError> {
    features
        .iter()
        .position(|f| f.id == feature_id)
        .ok_or_else(|| BoardError::feature(feature_id))
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Toggle a user on a feature. Returns true if the user is now assigned.
pub fn toggle_assignee(feature: &mut Feature, user_id: &str) -> bool {
    toggle_member(&mut feature.assignees, user_id)
}

// ---------------------------------------------------------------------------
// Attachments and notes
// ---------------------------------------------------------------------------

/// What the upload form hands over once the bytes are stored
#[derive(Debug, Clone, Default)]
pub struct AttachmentDraft {
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
    pub storage_ref: String,
}

pub fn build_attachment(
    draft: AttachmentDraft,
    uploaded_by: &str,
    now: DateTime<Utc>,
) -> Result<Attachment, BoardError> {
    let file_name = require_text("file name", &draft.file_name)?;
    Ok(Attachment {
        id: new_id("att"),
        file_name,
        size: draft.size,
        mime_type: draft.mime_type,
        storage_ref: draft.storage_ref,
        uploaded_by: uploaded_by.to_string(),
        uploaded_at: now,
    })
}

/// The attachment list of a feature or one of its subtasks
pub fn attachments_mut<'a>(
    feature: &'a mut Feature,
    item: &ItemRef,
) -> Result<&'a mut Vec<Attachment>, BoardError> {
    match item {
        ItemRef::Feature { .. } => Ok(&mut feature.attachments),
        ItemRef::Subtask { subtask_id, .. } => feature
            .subtask_mut(subtask_id)
            .map(|s| &mut s.attachments)
            .ok_or_else(|| BoardError::subtask(subtask_id)),
    }
}

/// The note slot of a feature or one of its subtasks
pub fn note_slot_mut<'a>(
    feature: &'a mut Feature,
    item: &ItemRef,
) -> Result<&'a mut Option<Note>, BoardError> {
    match item {
        ItemRef::Feature { .. } => Ok(&mut feature.note),
        ItemRef::Subtask { subtask_id, .. } => feature
            .subtask_mut(subtask_id)
            .map(|s| &mut s.note)
            .ok_or_else(|| BoardError::subtask(subtask_id)),
    }
}

pub fn remove_attachment(list: &mut Vec<Attachment>, attachment_id: &str) -> Result<Attachment, BoardError> {
    let idx = list
        .iter()
        .position(|a| a.id == attachment_id)
        .ok_or_else(|| BoardError::attachment(attachment_id))?;
    Ok(list.remove(idx))
}

/// Overwrite a note wholesale. Blank content removes the note.
/// Returns true if the slot changed.
pub fn write_note(slot: &mut Option<Note>, content: &str, editor: &str, now: DateTime<Utc>) -> bool {
    if content.trim().is_empty() {
        return slot.take().is_some();
    }
    if let Some(existing) = slot.as_ref()
        && existing.content == content
    {
        return false;
    }
    let id = slot
        .as_ref()
        .map(|n| n.id.clone())
        .unwrap_or_else(|| new_id("note"));
    let visible = slot.as_ref().map(|n| n.visible).unwrap_or(true);
    *slot = Some(Note {
        id,
        content: content.to_string(),
        last_edited_by: editor.to_string(),
        last_edited_at: now,
        visible,
    });
    true
}
