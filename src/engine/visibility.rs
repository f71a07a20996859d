use indexmap::IndexSet;

use crate::model::column::Column;
use crate::model::project::Project;
use crate::ops::BoardError;

/// Which columns of the active project are on screen.
///
/// Stored as the set of hidden ids so that every column is visible unless
/// the user hid it (new and restored columns show up by default). At least
/// one column stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    hidden: IndexSet<String>,
}

impl ColumnVisibility {
    pub fn all_visible() -> Self {
        ColumnVisibility::default()
    }

    /// Rebuild from a persisted visible-id list. An empty list, or one that
    /// names none of the project's columns, means "all visible".
    pub fn from_visible_ids(project: &Project, visible: &[String]) -> Self {
        if !project.columns.iter().any(|c| visible.contains(&c.id)) {
            return ColumnVisibility::all_visible();
        }
        ColumnVisibility {
            hidden: project
                .columns
                .iter()
                .filter(|c| !visible.contains(&c.id))
                .map(|c| c.id.clone())
                .collect(),
        }
    }

    pub fn is_visible(&self, column_id: &str) -> bool {
        !self.hidden.contains(column_id)
    }

    pub fn hidden_ids(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(|s| s.as_str())
    }

    /// Visible columns in display order
    pub fn visible_columns<'a>(&self, project: &'a Project) -> Vec<&'a Column> {
        project
            .ordered_columns()
            .into_iter()
            .filter(|c| self.is_visible(&c.id))
            .collect()
    }

    /// Visible column ids in display order (the persisted form)
    pub fn visible_ids(&self, project: &Project) -> Vec<String> {
        self.visible_columns(project)
            .into_iter()
            .map(|c| c.id.clone())
            .collect()
    }

    /// The Nth (0-based) visible column
    pub fn nth_visible<'a>(&self, project: &'a Project, n: usize) -> Option<&'a Column> {
        self.visible_columns(project).into_iter().nth(n)
    }

    /// Hide a column. Refused if it is the last visible one.
    /// Returns true if the column was visible before.
    pub fn hide(&mut self, project: &Project, column_id: &str) -> Result<bool, BoardError> {
        if !project.has_column(column_id) {
            return Err(BoardError::column(column_id));
        }
        if !self.is_visible(column_id) {
            return Ok(false);
        }
        if self.visible_columns(project).len() <= 1 {
            return Err(BoardError::LastVisibleColumn);
        }
        self.hidden.insert(column_id.to_string());
        Ok(true)
    }

    /// Show a column. Returns true if it was hidden.
    pub fn show(&mut self, column_id: &str) -> bool {
        self.hidden.shift_remove(column_id)
    }

    /// Flip a column's visibility. Returns whether it is visible afterwards.
    pub fn toggle(&mut self, project: &Project, column_id: &str) -> Result<bool, BoardError> {
        if self.is_visible(column_id) {
            self.hide(project, column_id)?;
            Ok(false)
        } else {
            self.show(column_id);
            Ok(true)
        }
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    /// Forget ids that are no longer columns of `project`, and make sure at
    /// least one column is visible.
    pub fn reconcile(&mut self, project: &Project) {
        self.hidden.retain(|id| project.has_column(id));
        if !project.columns.is_empty() && self.visible_columns(project).is_empty() {
            self.hidden.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        Project::new("p1", "Board", "u1")
    }

    #[test]
    fn defaults_to_all_columns_in_order() {
        let p = project();
        let v = ColumnVisibility::all_visible();
        assert_eq!(v.visible_ids(&p), vec!["ideas", "planned", "working", "done"]);
        assert_eq!(v.nth_visible(&p, 2).unwrap().id, "working");
    }

    #[test]
    fn hide_and_nth_visible_skip_hidden() {
        let p = project();
        let mut v = ColumnVisibility::all_visible();
        assert!(v.hide(&p, "planned").unwrap());
        assert!(!v.hide(&p, "planned").unwrap());
        assert_eq!(v.nth_visible(&p, 1).unwrap().id, "working");
        assert!(v.nth_visible(&p, 3).is_none());
    }

    #[test]
    fn last_visible_column_cannot_be_hidden() {
        let p = project();
        let mut v = ColumnVisibility::all_visible();
        v.hide(&p, "ideas").unwrap();
        v.hide(&p, "planned").unwrap();
        v.hide(&p, "working").unwrap();
        let before = v.clone();
        assert_eq!(v.hide(&p, "done").unwrap_err(), BoardError::LastVisibleColumn);
        assert_eq!(v, before);
        assert_eq!(v.toggle(&p, "done").unwrap_err(), BoardError::LastVisibleColumn);
    }

    #[test]
    fn toggle_round_trip() {
        let p = project();
        let mut v = ColumnVisibility::all_visible();
        assert!(!v.toggle(&p, "done").unwrap());
        assert!(v.toggle(&p, "done").unwrap());
        assert_eq!(v, ColumnVisibility::all_visible());
    }

    #[test]
    fn from_visible_ids_tolerates_unknown_and_empty() {
        let p = project();
        let v = ColumnVisibility::from_visible_ids(&p, &["ideas".into(), "done".into()]);
        assert_eq!(v.visible_ids(&p), vec!["ideas", "done"]);
        let v = ColumnVisibility::from_visible_ids(&p, &["ghost".into()]);
        assert_eq!(v.visible_ids(&p).len(), 4);
        let v = ColumnVisibility::from_visible_ids(&p, &[]);
        assert_eq!(v.visible_ids(&p).len(), 4);
    }

    #[test]
    fn reconcile_drops_deleted_columns() {
        let mut p = project();
        let mut v = ColumnVisibility::all_visible();
        v.hide(&p, "ideas").unwrap();
        v.hide(&p, "planned").unwrap();
        v.hide(&p, "working").unwrap();
        p.columns.retain(|c| c.id != "done");
        v.reconcile(&p);
        // Only hidden columns remain, so everything becomes visible again
        assert_eq!(v.visible_ids(&p).len(), 3);
    }
}
