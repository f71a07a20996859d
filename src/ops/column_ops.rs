use crate::model::column::{self, Column};
use crate::model::project::Project;

use super::{BoardError, require_text};

/// Add a column at the end of the board. Returns the new column id.
pub fn add_column(columns: &mut Vec<Column>, name: &str, color: &str) -> Result<String, BoardError> {
    let name = require_text("column name", name)?;
    let id = unique_column_id(columns, &name);
    let order = columns.iter().map(|c| c.order).max().map_or(0, |m| m + 1);
    columns.push(Column::new(id.clone(), name, color.trim(), order));
    Ok(id)
}

/// Derive a readable id from a column name, e.g. "In Review" → `in-review`.
/// Falls back to a random id if the slug is taken or empty.
fn unique_column_id(columns: &[Column], name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if !slug.is_empty() && !columns.iter().any(|c| c.id == slug) {
        return slug;
    }
    loop {
        let id = super::new_id("col");
        if !columns.iter().any(|c| c.id == id) {
            return id;
        }
    }
}

/// Rename and/or recolor a column
#[derive(Debug, Clone, Default)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Apply a patch. Returns true if the column changed.
pub fn edit_column(columns: &mut [Column], column_id: &str, patch: &ColumnPatch) -> Result<bool, BoardError> {
    let name = match &patch.name {
        Some(n) => Some(require_text("column name", n)?),
        None => None,
    };
    let col = columns
        .iter_mut()
        .find(|c| c.id == column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    let before = col.clone();
    if let Some(name) = name {
        col.name = name;
    }
    if let Some(color) = &patch.color {
        col.color = color.trim().to_string();
    }
    Ok(*col != before)
}

/// Move a column to `to_index` in display order and renumber `order`.
/// Returns true if the order changed.
pub fn move_column(columns: &mut Vec<Column>, column_id: &str, to_index: usize) -> Result<bool, BoardError> {
    if !columns.iter().any(|c| c.id == column_id) {
        return Err(BoardError::column(column_id));
    }
    let before = columns.clone();
    columns.sort_by_key(|c| c.order);
    let cur = columns
        .iter()
        .position(|c| c.id == column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    let col = columns.remove(cur);
    let idx = to_index.min(columns.len());
    columns.insert(idx, col);
    column::renumber(columns);
    Ok(*columns != before)
}

/// Result of a column deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDeletion {
    pub removed: Column,
    /// Column that received the orphaned features
    pub target: String,
    /// Ids of features that were moved to `target`
    pub reassigned: Vec<String>,
}

/// Check whether `column_id` may be deleted, without changing anything.
/// Returns the number of features that would be reassigned.
pub fn check_delete(project: &Project, column_id: &str, confirmed: bool) -> Result<usize, BoardError> {
    if !project.has_column(column_id) {
        return Err(BoardError::column(column_id));
    }
    if project.columns.len() <= 1 {
        return Err(BoardError::LastColumn);
    }
    let holding = project.features_in(column_id).len();
    if holding > 0 && !confirmed {
        return Err(BoardError::ConfirmationRequired {
            column_id: column_id.to_string(),
            features: holding,
        });
    }
    Ok(holding)
}

/// Delete a column, moving its features to the first remaining column by
/// `order`. Refuses to delete the last column, and refuses a non-empty
/// column unless `confirmed`.
pub fn delete_column(project: &mut Project, column_id: &str, confirmed: bool) -> Result<ColumnDeletion, BoardError> {
    check_delete(project, column_id, confirmed)?;

    let idx = project
        .columns
        .iter()
        .position(|c| c.id == column_id)
        .ok_or_else(|| BoardError::column(column_id))?;
    let removed = project.columns.remove(idx);
    let target = column::first_by_order(&project.columns)
        .map(|c| c.id.clone())
        .ok_or(BoardError::LastColumn)?;

    let mut reassigned = Vec::new();
    for feature in &mut project.features {
        if feature.status == column_id {
            feature.status = target.clone();
            reassigned.push(feature.id.clone());
        }
    }
    Ok(ColumnDeletion {
        removed,
        target,
        reassigned,
    })
}
