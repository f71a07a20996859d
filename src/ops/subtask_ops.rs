use chrono::NaiveDate;

use crate::model::feature::{Feature, Subtask, SubtaskStatus, dedup, toggle_member};

use super::{BoardError, new_id, require_text};

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Advance: todo → inprogress → done → todo. Returns the new status.
pub fn advance(subtask: &mut Subtask) -> SubtaskStatus {
    subtask.status = subtask.status.advance();
    subtask.status
}

/// Direct status set. Returns true if the status changed.
pub fn set_status(subtask: &mut Subtask, status: SubtaskStatus) -> bool {
    if subtask.status == status {
        return false;
    }
    subtask.status = status;
    true
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// Toggle a user on a subtask. Returns true if the user is now assigned.
pub fn toggle_assignee(subtask: &mut Subtask, user_id: &str) -> bool {
    toggle_member(&mut subtask.assignees, user_id)
}

/// A subtask picked in a multi-select
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskSelection {
    pub feature_id: String,
    pub subtask_id: String,
}

impl SubtaskSelection {
    pub fn new(feature_id: impl Into<String>, subtask_id: impl Into<String>) -> Self {
        SubtaskSelection {
            feature_id: feature_id.into(),
            subtask_id: subtask_id.into(),
        }
    }
}

/// Replace the assignee set of every selected subtask with `assignees`.
///
/// All selected subtasks are checked before anything is written, so a stale
/// id leaves every subtask untouched. Returns how many subtasks changed.
pub fn bulk_assign(
    features: &mut [Feature],
    selection: &[SubtaskSelection],
    assignees: &[String],
) -> Result<usize, BoardError> {
    for sel in selection {
        let feature = features
            .iter()
            .find(|f| f.id == sel.feature_id)
            .ok_or_else(|| BoardError::feature(&sel.feature_id))?;
        if feature.subtask(&sel.subtask_id).is_none() {
            return Err(BoardError::subtask(&sel.subtask_id));
        }
    }

    let assignees = dedup(assignees.to_vec());
    let mut changed = 0;
    for sel in selection {
        if let Some(feature) = features.iter_mut().find(|f| f.id == sel.feature_id)
            && let Some(subtask) = feature.subtask_mut(&sel.subtask_id)
            && subtask.assignees != assignees
        {
            subtask.assignees = assignees.clone();
            changed += 1;
        }
    }
    Ok(changed)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a subtask to a feature. Returns the new subtask id.
pub fn add_subtask(feature: &mut Feature, title: &str) -> Result<String, BoardError> {
    let title = require_text("subtask title", title)?;
    let id = new_id("sub");
    feature.subtasks.push(Subtask::new(id.clone(), title));
    Ok(id)
}

/// Inline edit of a subtask's own fields
#[derive(Debug, Clone, Default)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub estimate_hours: Option<Option<f64>>,
}

impl SubtaskPatch {
    /// Apply to a subtask. Returns true if anything changed.
    pub fn apply(&self, subtask: &mut Subtask) -> Result<bool, BoardError> {
        let title = match &self.title {
            Some(t) => Some(require_text("subtask title", t)?),
            None => None,
        };
        if let Some(Some(h)) = self.estimate_hours
            && (!h.is_finite() || h < 0.0)
        {
            return Err(BoardError::Validation(
                "estimate must be a non-negative number of hours".into(),
            ));
        }
        let before = subtask.clone();
        if let Some(title) = title {
            subtask.title = title;
        }
        if let Some(due) = self.due_date {
            subtask.due_date = due;
        }
        if let Some(hours) = self.estimate_hours {
            subtask.estimate_hours = hours;
        }
        Ok(*subtask != before)
    }
}

/// Remove a subtask (its attachments and note go with it).
pub fn remove_subtask(feature: &mut Feature, subtask_id: &str) -> Result<Subtask, BoardError> {
    let idx = feature
        .subtasks
        .iter()
        .position(|s| s.id == subtask_id)
        .ok_or_else(|| BoardError::subtask(subtask_id))?;
    Ok(feature.subtasks.remove(idx))
}

pub fn find_subtask_mut<'a>(
    feature: &'a mut Feature,
    subtask_id: &str,
) -> Result<&'a mut Subtask, BoardError> {
    feature
        .subtask_mut(subtask_id)
        .ok_or_else(|| BoardError::subtask(subtask_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features() -> Vec<Feature> {
        let mut a = Feature::new("f1", "Login", "ideas");
        a.subtasks.push(Subtask::new("s1", "Form"));
        a.subtasks.push(Subtask::new("s2", "Validation"));
        let mut b = Feature::new("f2", "Search", "working");
        b.subtasks.push(Subtask::new("s3", "Index"));
        vec![a, b]
    }

    #[test]
    fn advance_three_times_returns_to_todo() {
        let mut s = Subtask::new("s1", "x");
        let seen: Vec<(SubtaskStatus, bool)> = (0..3)
            .map(|_| {
                advance(&mut s);
                (s.status, s.completed())
            })
            .collect();
        assert_eq!(
            seen,
            vec![
                (SubtaskStatus::InProgress, false),
                (SubtaskStatus::Done, true),
                (SubtaskStatus::Todo, false),
            ]
        );
    }

    #[test]
    fn set_status_reports_change() {
        let mut s = Subtask::new("s1", "x");
        assert!(!set_status(&mut s, SubtaskStatus::Todo));
        assert!(set_status(&mut s, SubtaskStatus::Done));
        assert!(s.completed());
    }

    #[test]
    fn toggle_assignee_twice_is_identity() {
        let mut s = Subtask::new("s1", "x");
        s.assignees.push("u1".into());
        let before = s.assignees.clone();
        assert!(toggle_assignee(&mut s, "u2"));
        assert!(!toggle_assignee(&mut s, "u2"));
        assert_eq!(s.assignees, before);
    }

    #[test]
    fn bulk_assign_across_features() {
        let mut fs = features();
        let sel = vec![SubtaskSelection::new("f1", "s1"), SubtaskSelection::new("f2", "s3")];
        let n = bulk_assign(&mut fs, &sel, &["u1".into(), "u2".into()]).unwrap();
        assert_eq!(n, 2);
        assert_eq!(fs[0].subtasks[0].assignees, vec!["u1", "u2"]);
        assert!(fs[0].subtasks[1].assignees.is_empty());
        assert_eq!(fs[1].subtasks[0].assignees, vec!["u1", "u2"]);
    }

    #[test]
    fn bulk_assign_with_stale_id_changes_nothing() {
        let mut fs = features();
        let before = fs.clone();
        let sel = vec![SubtaskSelection::new("f1", "s1"), SubtaskSelection::new("f2", "gone")];
        let err = bulk_assign(&mut fs, &sel, &["u1".into()]).unwrap_err();
        assert!(err.is_referential());
        assert_eq!(fs, before);
    }

    #[test]
    fn add_and_remove_subtask() {
        let mut f = Feature::new("f1", "Login", "ideas");
        assert!(add_subtask(&mut f, "  ").is_err());
        let id = add_subtask(&mut f, "Wire up API").unwrap();
        assert_eq!(f.subtasks.len(), 1);
        assert_eq!(f.subtasks[0].status, SubtaskStatus::Todo);
        let removed = remove_subtask(&mut f, &id).unwrap();
        assert_eq!(removed.title, "Wire up API");
        assert!(remove_subtask(&mut f, &id).is_err());
    }

    #[test]
    fn subtask_patch_validates_before_writing() {
        let mut s = Subtask::new("s1", "x");
        let patch = SubtaskPatch {
            title: Some("y".into()),
            estimate_hours: Some(Some(f64::NAN)),
            ..Default::default()
        };
        assert!(patch.apply(&mut s).is_err());
        assert_eq!(s.title, "x");
    }
}
