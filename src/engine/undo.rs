use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::column::{self, Column};
use crate::model::feature::Feature;
use crate::model::project::{Project, ProjectMeta};

use super::store::BoardStore;

/// Undo history is a fixed-capacity ring; the oldest action is evicted first.
pub const UNDO_STACK_LIMIT: usize = 10;

/// What kind of user action an undo entry reverts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoKind {
    FeatureMove,
    FeatureCreate,
    FeatureEdit,
    FeatureDelete,
    FeatureAssign,
    SubtaskCreate,
    SubtaskEdit,
    SubtaskDelete,
    SubtaskStatus,
    SubtaskAssign,
    SubtaskBulkAssign,
    NoteSave,
    AttachmentAdd,
    AttachmentRemove,
    ColumnCreate,
    ColumnEdit,
    ColumnMove,
    ColumnDelete,
    ProjectCreate,
    ProjectEdit,
    ProjectDelete,
    CollaboratorChange,
}

/// The state captured before a mutation. Each variant holds a full snapshot
/// of the slice the mutation touched, never a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UndoPayload {
    /// A feature's column before a move
    FeatureStatus { feature_id: String, status: String },
    /// A whole feature before an edit (fields, assignees, subtasks, notes, attachments)
    Feature { feature: Feature },
    /// A feature that was created; undo removes it
    FeatureAdded { feature_id: String },
    /// A feature that was deleted, with its list position
    FeatureRemoved { index: usize, feature: Feature },
    /// Several whole features before a batch edit
    Features { features: Vec<Feature> },
    /// The column list before a column change
    Columns { columns: Vec<Column> },
    /// Columns and features together (column deletion with reassignment)
    Board {
        columns: Vec<Column>,
        features: Vec<Feature>,
    },
    ProjectMeta { meta: ProjectMeta },
    /// A project that was created; undo removes it
    ProjectAdded {
        project_id: String,
        previous_active: String,
    },
    /// A project that was deleted
    ProjectRemoved {
        index: usize,
        project: Box<Project>,
        was_active: bool,
    },
}

/// A single undoable action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoAction {
    pub id: u64,
    pub kind: UndoKind,
    /// Shown to the user after undoing, e.g. "Moved “Login” to Working"
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub before: UndoPayload,
}

impl UndoAction {
    pub fn new(kind: UndoKind, project_id: &str, description: impl Into<String>, before: UndoPayload) -> Self {
        UndoAction {
            id: 0,
            kind,
            description: description.into(),
            timestamp: Utc::now(),
            project_id: project_id.to_string(),
            before,
        }
    }
}

/// What `undo` reverted, for the confirmation toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoReport {
    pub kind: UndoKind,
    pub description: String,
    pub project_id: String,
    /// False when the target had vanished and nothing was restored
    pub applied: bool,
}

/// Bounded history of undoable actions. Undo pops and reverts; there is no redo.
#[derive(Debug, Default)]
pub struct UndoStack {
    actions: VecDeque<UndoAction>,
    next_id: u64,
}

impl UndoStack {
    pub fn new() -> Self {
        UndoStack {
            actions: VecDeque::with_capacity(UNDO_STACK_LIMIT + 1),
            next_id: 1,
        }
    }

    /// Push an action, evicting the oldest beyond the limit. Returns its id.
    pub fn push(&mut self, mut action: UndoAction) -> u64 {
        action.id = self.next_id.max(1);
        self.next_id = action.id + 1;
        let id = action.id;
        self.actions.push_back(action);
        while self.actions.len() > UNDO_STACK_LIMIT {
            if let Some(evicted) = self.actions.pop_front() {
                tracing::debug!(id = evicted.id, "undo history full, dropping oldest entry");
            }
        }
        id
    }

    /// Convenience for building and pushing in one call
    pub fn record(
        &mut self,
        kind: UndoKind,
        project_id: &str,
        description: impl Into<String>,
        before: UndoPayload,
    ) -> u64 {
        self.push(UndoAction::new(kind, project_id, description, before))
    }

    /// Pop the newest action and revert it through the store.
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self, store: &mut BoardStore) -> Option<UndoReport> {
        let action = self.actions.pop_back()?;
        let applied = apply_inverse(store, &action.project_id, &action.before);
        if !applied {
            tracing::warn!(
                id = action.id,
                kind = ?action.kind,
                "undo target no longer exists; nothing restored"
            );
        }
        Some(UndoReport {
            kind: action.kind,
            description: action.description,
            project_id: action.project_id,
            applied,
        })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Oldest to newest
    pub fn actions(&self) -> impl Iterator<Item = &UndoAction> {
        self.actions.iter()
    }

    pub fn peek_last(&self) -> Option<&UndoAction> {
        self.actions.back()
    }
}

/// Restore the captured state. Returns false if the target project or entity
/// is gone, in which case nothing is written.
pub fn apply_inverse(store: &mut BoardStore, project_id: &str, payload: &UndoPayload) -> bool {
    match payload {
        UndoPayload::ProjectAdded {
            project_id: added,
            previous_active,
        } => {
            if store.project(added).is_none() || store.projects().len() <= 1 {
                return false;
            }
            store.mutate_projects(|ps| ps.retain(|p| &p.id != added));
            if store.project(previous_active).is_some() {
                let _ = store.set_active_project(previous_active);
            }
            return true;
        }
        UndoPayload::ProjectRemoved {
            index,
            project,
            was_active,
        } => {
            if store.project(&project.id).is_some() {
                return false;
            }
            store.mutate_projects(|ps| {
                let idx = (*index).min(ps.len());
                ps.insert(idx, (**project).clone());
            });
            if *was_active {
                let _ = store.set_active_project(&project.id);
            }
            return true;
        }
        _ => {}
    }

    let Some(project) = store.project(project_id) else {
        return false;
    };

    match payload {
        UndoPayload::FeatureStatus { feature_id, status } => {
            if project.feature(feature_id).is_none() || !project.has_column(status) {
                return false;
            }
            store.mutate_features(project_id, |fs| {
                if let Some(f) = fs.iter_mut().find(|f| &f.id == feature_id) {
                    f.status = status.clone();
                }
            })
        }
        UndoPayload::Feature { feature } => {
            if project.feature(&feature.id).is_none() {
                return false;
            }
            let home = home_column(project, &feature.status);
            store.mutate_features(project_id, |fs| {
                if let Some(slot) = fs.iter_mut().find(|f| f.id == feature.id) {
                    *slot = feature.clone();
                    slot.status = home;
                }
            })
        }
        UndoPayload::FeatureAdded { feature_id } => {
            if project.feature(feature_id).is_none() {
                return false;
            }
            store.mutate_features(project_id, |fs| fs.retain(|f| &f.id != feature_id))
        }
        UndoPayload::FeatureRemoved { index, feature } => {
            if project.feature(&feature.id).is_some() {
                return false;
            }
            let home = home_column(project, &feature.status);
            store.mutate_features(project_id, |fs| {
                let mut restored = feature.clone();
                restored.status = home;
                let idx = (*index).min(fs.len());
                fs.insert(idx, restored);
            })
        }
        UndoPayload::Features { features } => {
            if features.iter().all(|f| project.feature(&f.id).is_none()) {
                return false;
            }
            let homes: Vec<String> = features
                .iter()
                .map(|f| home_column(project, &f.status))
                .collect();
            store.mutate_features(project_id, |fs| {
                for (snapshot, home) in features.iter().zip(homes) {
                    if let Some(slot) = fs.iter_mut().find(|f| f.id == snapshot.id) {
                        *slot = snapshot.clone();
                        slot.status = home;
                    }
                }
            })
        }
        UndoPayload::Columns { columns } => {
            if columns.is_empty() {
                return false;
            }
            store.mutate_board(project_id, |cols, fs| {
                *cols = columns.clone();
                rehome_orphans(cols, fs);
            })
        }
        UndoPayload::Board { columns, features } => {
            if columns.is_empty() {
                return false;
            }
            store.mutate_board(project_id, |cols, fs| {
                *cols = columns.clone();
                *fs = features.clone();
                rehome_orphans(cols, fs);
            })
        }
        UndoPayload::ProjectMeta { meta } => {
            store.mutate_project_meta(project_id, |m| *m = meta.clone())
        }
        // Project-level payloads returned above
        UndoPayload::ProjectAdded { .. } | UndoPayload::ProjectRemoved { .. } => false,
    }
}

/// Keep a restored feature on the board even if its old column was removed
/// since the snapshot was taken.
fn home_column(project: &Project, status: &str) -> String {
    if project.has_column(status) {
        return status.to_string();
    }
    column::first_by_order(&project.columns)
        .map(|c| c.id.clone())
        .unwrap_or_else(|| status.to_string())
}

fn rehome_orphans(columns: &[Column], features: &mut [Feature]) {
    let Some(first) = column::first_by_order(columns) else {
        return;
    };
    for f in features.iter_mut() {
        if !columns.iter().any(|c| c.id == f.status) {
            f.status = first.id.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::feature::Subtask;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn sample_store() -> BoardStore {
        let mut p = Project::new("p1", "Website", "u1");
        let mut f = Feature::new("f1", "Login", "ideas");
        f.subtasks.push(Subtask::new("s1", "Form"));
        p.features.push(f);
        p.features.push(Feature::new("f2", "Search", "working"));
        BoardStore::new(vec![p], "p1", Duration::from_millis(1000))
    }

    fn feature<'a>(store: &'a BoardStore, id: &str) -> &'a Feature {
        store.project("p1").unwrap().feature(id).unwrap()
    }

    fn title_edit(n: usize) -> UndoAction {
        UndoAction::new(
            UndoKind::FeatureEdit,
            "p1",
            format!("edit {}", n),
            UndoPayload::FeatureStatus {
                feature_id: "f1".into(),
                status: "ideas".into(),
            },
        )
    }

    // -----------------------------------------------------------------------
    // Stack core
    // -----------------------------------------------------------------------

    #[test]
    fn new_stack_is_empty() {
        let stack = UndoStack::new();
        assert!(stack.is_empty());
        assert!(stack.peek_last().is_none());
    }

    #[test]
    fn undo_on_empty_stack_returns_none() {
        let mut stack = UndoStack::new();
        let mut store = sample_store();
        assert!(stack.undo(&mut store).is_none());
        assert!(!store.save_timer().is_pending());
    }

    #[test]
    fn stack_limit_keeps_newest_in_order() {
        let mut stack = UndoStack::new();
        for i in 1..=11 {
            stack.push(title_edit(i));
        }
        assert_eq!(stack.len(), UNDO_STACK_LIMIT);
        let descs: Vec<&str> = stack.actions().map(|a| a.description.as_str()).collect();
        let expected: Vec<String> = (2..=11).map(|i| format!("edit {}", i)).collect();
        assert_eq!(descs, expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());
    }

    #[test]
    fn ids_increase() {
        let mut stack = UndoStack::new();
        let a = stack.push(title_edit(1));
        let b = stack.push(title_edit(2));
        assert!(b > a);
        assert_eq!(stack.peek_last().unwrap().id, b);
    }

    // -----------------------------------------------------------------------
    // Inverses
    // -----------------------------------------------------------------------

    #[test]
    fn feature_status_undo_restores_column() {
        let mut store = sample_store();
        let mut stack = UndoStack::new();
        stack.record(
            UndoKind::FeatureMove,
            "p1",
            "Moved Login",
            UndoPayload::FeatureStatus {
                feature_id: "f1".into(),
                status: "ideas".into(),
            },
        );
        store.mutate_features("p1", |fs| fs[0].status = "working".into());
        let report = stack.undo(&mut store).unwrap();
        assert!(report.applied);
        assert_eq!(report.description, "Moved Login");
        assert_eq!(feature(&store, "f1").status, "ideas");
        assert!(stack.is_empty());
    }

    #[test]
    fn feature_snapshot_undo_is_exact() {
        let mut store = sample_store();
        let before = feature(&store, "f1").clone();
        let mut stack = UndoStack::new();
        stack.record(
            UndoKind::FeatureEdit,
            "p1",
            "Edited Login",
            UndoPayload::Feature {
                feature: before.clone(),
            },
        );
        store.mutate_features("p1", |fs| {
            fs[0].title = "Sign in".into();
            fs[0].assignees.push("u9".into());
            fs[0].subtasks.clear();
        });
        stack.undo(&mut store);
        assert_eq!(
            serde_json::to_string(feature(&store, "f1")).unwrap(),
            serde_json::to_string(&before).unwrap()
        );
    }

    #[test]
    fn feature_added_and_removed_inverses() {
        let mut store = sample_store();
        let mut stack = UndoStack::new();
        let removed = feature(&store, "f1").clone();
        stack.record(
            UndoKind::FeatureDelete,
            "p1",
            "Deleted Login",
            UndoPayload::FeatureRemoved {
                index: 0,
                feature: removed,
            },
        );
        store.mutate_features("p1", |fs| fs.retain(|f| f.id != "f1"));
        stack.undo(&mut store);
        assert_eq!(store.project("p1").unwrap().features[0].id, "f1");

        stack.record(
            UndoKind::FeatureCreate,
            "p1",
            "Created Deploy",
            UndoPayload::FeatureAdded {
                feature_id: "f3".into(),
            },
        );
        store.mutate_features("p1", |fs| fs.push(Feature::new("f3", "Deploy", "done")));
        stack.undo(&mut store);
        assert!(store.project("p1").unwrap().feature("f3").is_none());
    }

    #[test]
    fn board_payload_restores_deleted_column_and_features() {
        let mut store = sample_store();
        let p = store.project("p1").unwrap().clone();
        let mut stack = UndoStack::new();
        stack.record(
            UndoKind::ColumnDelete,
            "p1",
            "Deleted Working",
            UndoPayload::Board {
                columns: p.columns.clone(),
                features: p.features.clone(),
            },
        );
        store.mutate_board("p1", |cols, fs| {
            cols.retain(|c| c.id != "working");
            for f in fs.iter_mut().filter(|f| f.status == "working") {
                f.status = "ideas".into();
            }
        });
        stack.undo(&mut store);
        assert_eq!(store.project("p1").unwrap(), &p);
    }

    #[test]
    fn restoring_feature_into_missing_column_rehomes_it() {
        let mut store = sample_store();
        let snapshot = feature(&store, "f2").clone();
        store.mutate_columns("p1", |cols| cols.retain(|c| c.id != "working"));
        let ok = apply_inverse(&mut store, "p1", &UndoPayload::Feature { feature: snapshot });
        assert!(ok);
        assert_eq!(feature(&store, "f2").status, "ideas");
    }

    #[test]
    fn vanished_target_is_consumed_without_change() {
        let mut store = sample_store();
        let mut stack = UndoStack::new();
        stack.record(
            UndoKind::FeatureMove,
            "p1",
            "Moved ghost",
            UndoPayload::FeatureStatus {
                feature_id: "ghost".into(),
                status: "ideas".into(),
            },
        );
        let before = store.project("p1").unwrap().clone();
        let report = stack.undo(&mut store).unwrap();
        assert!(!report.applied);
        assert!(stack.is_empty());
        assert_eq!(store.project("p1").unwrap(), &before);
    }

    #[test]
    fn project_added_undo_restores_previous_active() {
        let mut store = sample_store();
        store.mutate_projects(|ps| ps.push(Project::new("p2", "Mobile", "u1")));
        store.set_active_project("p2").unwrap();
        let ok = apply_inverse(
            &mut store,
            "p2",
            &UndoPayload::ProjectAdded {
                project_id: "p2".into(),
                previous_active: "p1".into(),
            },
        );
        assert!(ok);
        assert_eq!(store.projects().len(), 1);
        assert_eq!(store.active_project_id(), "p1");
    }

    #[test]
    fn actions_serialize_for_inspection() {
        let action = title_edit(1);
        let v = serde_json::to_value(&action).unwrap();
        assert_eq!(v["kind"], "feature_edit");
        assert_eq!(v["before"]["type"], "feature_status");
    }
}
