use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::io::persist::{LoadOutcome, PersistedState, Persister};
use crate::model::column::Column;
use crate::model::config::BoardConfig;
use crate::model::feature::{Feature, SubtaskStatus};
use crate::model::project::{Project, ProjectMeta};
use crate::model::user::Roster;
use crate::model::view::{ViewMode, ViewPrefs};
use crate::ops::column_ops::{self, ColumnDeletion, ColumnPatch};
use crate::ops::feature_ops::{self, AttachmentDraft, FeatureDraft, FeaturePatch};
use crate::ops::project_ops::{self, ProjectPatch};
use crate::ops::subtask_ops::{self, SubtaskPatch, SubtaskSelection};
use crate::ops::{BoardError, ItemRef};

use super::drag::{DragEvent, DragSession, DropRejection, resolve_drop_target};
use super::notes::{NoteAutosave, NoteOwner};
use super::store::BoardStore;
use super::undo::{UndoKind, UndoPayload, UndoReport, UndoStack};
use super::visibility::ColumnVisibility;

/// User id the board acts as when configuration names nobody
pub const DEFAULT_USER: &str = "me";

/// Engine settings that come from configuration
#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub save_quiet: Duration,
    pub note_quiet: Duration,
    pub roster: Roster,
    pub current_user: String,
}

impl Default for BoardOptions {
    fn default() -> Self {
        BoardOptions {
            save_quiet: Duration::from_millis(1000),
            note_quiet: Duration::from_millis(800),
            roster: Roster::default(),
            current_user: DEFAULT_USER.to_string(),
        }
    }
}

impl BoardOptions {
    pub fn from_config(config: &BoardConfig) -> Self {
        let current_user = config
            .ui
            .current_user
            .clone()
            .or_else(|| config.users.first().map(|u| u.id.clone()))
            .unwrap_or_else(|| DEFAULT_USER.to_string());
        BoardOptions {
            save_quiet: Duration::from_millis(config.storage.debounce_ms),
            note_quiet: Duration::from_millis(config.storage.note_debounce_ms),
            roster: Roster::new(config.users.clone()),
            current_user,
        }
    }
}

/// What a finished drag gesture did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        feature_id: String,
        from: String,
        to: String,
    },
    /// Dropped onto its own column; nothing changed
    AlreadyThere { column_id: String },
    Rejected(DropRejection),
}

/// What a tick of the event loop flushed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub notes_saved: usize,
    pub board_saved: bool,
}

/// The single entry point for changing a board.
///
/// Every mutating method validates first, records its undo action, and only
/// then commits through the store. An `Err` always means nothing changed.
#[derive(Debug)]
pub struct Board {
    store: BoardStore,
    undo: UndoStack,
    visibility: ColumnVisibility,
    /// Project the visibility set was built for
    visibility_project: String,
    prefs: ViewPrefs,
    roster: Roster,
    current_user: String,
    drag: DragSession,
    notes: NoteAutosave,
    persister: Option<Persister>,
}

impl Board {
    pub fn new(mut projects: Vec<Project>, active_project_id: &str, options: BoardOptions) -> Self {
        if projects.is_empty() {
            projects.push(Project::new("default", "My Project", options.current_user.clone()));
        }
        let store = BoardStore::new(projects, active_project_id, options.save_quiet);
        let visibility_project = store.active_project_id().to_string();
        Board {
            store,
            undo: UndoStack::new(),
            visibility: ColumnVisibility::all_visible(),
            visibility_project,
            prefs: ViewPrefs::default(),
            roster: options.roster,
            current_user: options.current_user,
            drag: DragSession::new(),
            notes: NoteAutosave::new(options.note_quiet),
            persister: None,
        }
    }

    /// Rebuild a board from a persisted blob
    pub fn from_state(state: PersistedState, options: BoardOptions) -> Self {
        let mut board = Board::new(state.projects, &state.active_project_id, options);
        if let Some(project) = board.store.active_project() {
            board.visibility = ColumnVisibility::from_visible_ids(project, &state.visible_columns);
        }
        board.prefs = ViewPrefs {
            view_mode: state.view_mode,
            filter_by_user: state.filter_by_user,
        };
        board
    }

    /// Load from storage, falling back to a fresh board when the blob is
    /// missing, stale or unreadable. The persister stays attached for saves.
    pub fn open(persister: Persister, options: BoardOptions, now: DateTime<Utc>) -> Self {
        let mut board = match persister.load(now) {
            LoadOutcome::Hydrated(state) => {
                tracing::info!(projects = state.projects.len(), "board restored");
                Board::from_state(state, options)
            }
            outcome => {
                tracing::info!(?outcome, "starting from a fresh board");
                let seed = PersistedState::seed(&options.current_user, now);
                Board::from_state(seed, options)
            }
        };
        board.persister = Some(persister);
        board
    }

    pub fn with_persister(mut self, persister: Persister) -> Self {
        self.persister = Some(persister);
        self
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.store.active_project()
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub fn prefs(&self) -> &ViewPrefs {
        &self.prefs
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn notes(&self) -> &NoteAutosave {
        &self.notes
    }

    /// Visible columns of the active project, in display order
    pub fn visible_columns(&self) -> Vec<&Column> {
        match self.store.active_project() {
            Some(p) => self.visibility.visible_columns(p),
            None => Vec::new(),
        }
    }

    /// The Nth (0-based) visible column, as targeted by the digit keys
    pub fn nth_visible_column(&self, n: usize) -> Option<&Column> {
        self.visibility.nth_visible(self.store.active_project()?, n)
    }

    /// Cards for one column, honoring the user filter
    pub fn features_in(&self, column_id: &str) -> Vec<&Feature> {
        self.store
            .features_by_status(column_id, self.prefs.filter_by_user.as_deref())
    }

    /// The blob that a save would write right now
    pub fn snapshot(&self, now: DateTime<Utc>) -> PersistedState {
        PersistedState {
            projects: self.store.projects().to_vec(),
            active_project_id: self.store.active_project_id().to_string(),
            view_mode: self.prefs.view_mode,
            visible_columns: self
                .store
                .active_project()
                .map(|p| self.visibility.visible_ids(p))
                .unwrap_or_default(),
            filter_by_user: self.prefs.filter_by_user.clone(),
            timestamp: now.timestamp_millis(),
        }
    }

    // -----------------------------------------------------------------------
    // Features
    // -----------------------------------------------------------------------

    /// Move a feature to another column. Returns false when it is already there.
    pub fn move_feature(&mut self, feature_id: &str, column_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_features(&pid, UndoKind::FeatureMove, |project, features| {
            let column = project
                .column(column_id)
                .ok_or_else(|| BoardError::column(column_id))?;
            let feature = feature_ops::find_feature_mut(features, feature_id)?;
            if feature.status == column_id {
                return Ok((false, None));
            }
            let before = UndoPayload::FeatureStatus {
                feature_id: feature.id.clone(),
                status: feature.status.clone(),
            };
            let description = format!("Moved \"{}\" to {}", feature.title, column.name);
            feature.status = column_id.to_string();
            Ok((true, Some((description, before))))
        })
    }

    /// Create a feature in `column_id`. Returns the new id.
    pub fn create_feature(&mut self, column_id: &str, draft: FeatureDraft) -> Result<String, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_features(&pid, UndoKind::FeatureCreate, |project, features| {
            if !project.has_column(column_id) {
                return Err(BoardError::column(column_id));
            }
            for user in &draft.assignees {
                check_user(&roster, user)?;
            }
            let feature = feature_ops::build_feature(draft, column_id)?;
            let id = feature.id.clone();
            let description = format!("Created \"{}\"", feature.title);
            features.push(feature);
            Ok((id.clone(), Some((description, UndoPayload::FeatureAdded { feature_id: id }))))
        })
    }

    /// Inline multi-field edit; all fields land in one undo entry
    pub fn edit_feature(&mut self, feature_id: &str, patch: &FeaturePatch) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::FeatureEdit, |_, feature| {
            let title = feature.title.clone();
            if !patch.apply(feature)? {
                return Ok((false, None));
            }
            let description = format!("Edited {} of \"{}\"", patch.field_names().join(", "), title);
            Ok((true, Some(description)))
        })
    }

    /// Delete a feature with its subtasks, attachments and notes
    pub fn delete_feature(&mut self, feature_id: &str) -> Result<(), BoardError> {
        let pid = self.active_id()?;
        self.change_features(&pid, UndoKind::FeatureDelete, |_, features| {
            let index = feature_ops::feature_index(features, feature_id)?;
            let feature = features.remove(index);
            let description = format!("Deleted \"{}\"", feature.title);
            Ok(((), Some((description, UndoPayload::FeatureRemoved { index, feature }))))
        })?;
        self.drop_note_drafts(&pid, feature_id);
        Ok(())
    }

    /// Toggle a user on a feature. Returns true if the user is now assigned.
    pub fn toggle_feature_assignee(&mut self, feature_id: &str, user_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_feature(&pid, feature_id, UndoKind::FeatureAssign, |_, feature| {
            // Removal is always allowed, even for users who left the roster
            if !feature.assignees.iter().any(|a| a == user_id) {
                check_user(&roster, user_id)?;
            }
            let assigned = feature_ops::toggle_assignee(feature, user_id);
            let verb = if assigned { "Assigned" } else { "Unassigned" };
            let description = format!("{} {} on \"{}\"", verb, roster.display_name(user_id), feature.title);
            Ok((assigned, Some(description)))
        })
    }

    // -----------------------------------------------------------------------
    // Subtasks
    // -----------------------------------------------------------------------

    pub fn add_subtask(&mut self, feature_id: &str, title: &str) -> Result<String, BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::SubtaskCreate, |_, feature| {
            let id = subtask_ops::add_subtask(feature, title)?;
            let description = format!("Added subtask to \"{}\"", feature.title);
            Ok((id, Some(description)))
        })
    }

    pub fn edit_subtask(
        &mut self,
        feature_id: &str,
        subtask_id: &str,
        patch: &SubtaskPatch,
    ) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::SubtaskEdit, |_, feature| {
            let subtask = subtask_ops::find_subtask_mut(feature, subtask_id)?;
            if !patch.apply(subtask)? {
                return Ok((false, None));
            }
            let description = format!("Edited subtask \"{}\"", subtask.title);
            Ok((true, Some(description)))
        })
    }

    pub fn delete_subtask(&mut self, feature_id: &str, subtask_id: &str) -> Result<(), BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::SubtaskDelete, |_, feature| {
            let removed = subtask_ops::remove_subtask(feature, subtask_id)?;
            Ok(((), Some(format!("Deleted subtask \"{}\"", removed.title))))
        })?;
        self.notes
            .cancel(&NoteOwner::new(pid, ItemRef::subtask(feature_id, subtask_id)));
        Ok(())
    }

    /// Advance a subtask one step: todo → inprogress → done → todo
    pub fn advance_subtask(&mut self, feature_id: &str, subtask_id: &str) -> Result<SubtaskStatus, BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::SubtaskStatus, |_, feature| {
            let subtask = subtask_ops::find_subtask_mut(feature, subtask_id)?;
            let status = subtask_ops::advance(subtask);
            let description = format!("Marked \"{}\" {}", subtask.title, status.label());
            Ok((status, Some(description)))
        })
    }

    pub fn set_subtask_status(
        &mut self,
        feature_id: &str,
        subtask_id: &str,
        status: SubtaskStatus,
    ) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, feature_id, UndoKind::SubtaskStatus, |_, feature| {
            let subtask = subtask_ops::find_subtask_mut(feature, subtask_id)?;
            if !subtask_ops::set_status(subtask, status) {
                return Ok((false, None));
            }
            let description = format!("Marked \"{}\" {}", subtask.title, status.label());
            Ok((true, Some(description)))
        })
    }

    /// Toggle a user on a subtask. Returns true if the user is now assigned.
    pub fn toggle_subtask_assignee(
        &mut self,
        feature_id: &str,
        subtask_id: &str,
        user_id: &str,
    ) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_feature(&pid, feature_id, UndoKind::SubtaskAssign, |_, feature| {
            let subtask = subtask_ops::find_subtask_mut(feature, subtask_id)?;
            if !subtask.assignees.iter().any(|a| a == user_id) {
                check_user(&roster, user_id)?;
            }
            let assigned = subtask_ops::toggle_assignee(subtask, user_id);
            let verb = if assigned { "Assigned" } else { "Unassigned" };
            let description = format!("{} {} on \"{}\"", verb, roster.display_name(user_id), subtask.title);
            Ok((assigned, Some(description)))
        })
    }

    /// Give every selected subtask the same assignee set, as one undo entry.
    /// Returns how many subtasks changed.
    pub fn bulk_assign_subtasks(
        &mut self,
        selection: &[SubtaskSelection],
        assignees: &[String],
    ) -> Result<usize, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_features(&pid, UndoKind::SubtaskBulkAssign, |_, features| {
            for user in assignees {
                check_user(&roster, user)?;
            }
            let mut touched: Vec<Feature> = Vec::new();
            for sel in selection {
                if !touched.iter().any(|f| f.id == sel.feature_id)
                    && let Some(f) = features.iter().find(|f| f.id == sel.feature_id)
                {
                    touched.push(f.clone());
                }
            }
            let changed = subtask_ops::bulk_assign(features, selection, assignees)?;
            if changed == 0 {
                return Ok((0, None));
            }
            let description = format!("Reassigned {} subtask(s)", changed);
            Ok((changed, Some((description, UndoPayload::Features { features: touched }))))
        })
    }

    // -----------------------------------------------------------------------
    // Attachments and notes
    // -----------------------------------------------------------------------

    /// Attach file metadata to a feature or subtask. Returns the attachment id.
    pub fn add_attachment(&mut self, item: &ItemRef, draft: AttachmentDraft) -> Result<String, BoardError> {
        let pid = self.active_id()?;
        let uploader = self.current_user.clone();
        self.change_feature(&pid, item.feature_id(), UndoKind::AttachmentAdd, |_, feature| {
            let attachment = feature_ops::build_attachment(draft, &uploader, Utc::now())?;
            let id = attachment.id.clone();
            let description = format!("Attached {}", attachment.file_name);
            feature_ops::attachments_mut(feature, item)?.push(attachment);
            Ok((id, Some(description)))
        })
    }

    pub fn remove_attachment(&mut self, item: &ItemRef, attachment_id: &str) -> Result<(), BoardError> {
        let pid = self.active_id()?;
        self.change_feature(&pid, item.feature_id(), UndoKind::AttachmentRemove, |_, feature| {
            let list = feature_ops::attachments_mut(feature, item)?;
            let removed = feature_ops::remove_attachment(list, attachment_id)?;
            Ok(((), Some(format!("Removed {}", removed.file_name))))
        })
    }

    /// Save a note right away, as the current user. Blank content removes it.
    pub fn save_note(&mut self, item: &ItemRef, content: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let editor = self.current_user.clone();
        self.notes.cancel(&NoteOwner::new(pid.clone(), item.clone()));
        self.write_note(&pid, item, content, &editor)
    }

    /// Record a keystroke-level note edit; it is saved once typing pauses
    pub fn edit_note(&mut self, item: &ItemRef, content: &str, now: Instant) -> Result<(), BoardError> {
        let pid = self.active_id()?;
        self.notes
            .edit(NoteOwner::new(pid, item.clone()), content, self.current_user.clone(), now);
        Ok(())
    }

    /// Throw away an unsaved note edit
    pub fn discard_note_edit(&mut self, item: &ItemRef) -> bool {
        let pid = self.store.active_project_id().to_string();
        self.notes.cancel(&NoteOwner::new(pid, item.clone()))
    }

    fn write_note(&mut self, pid: &str, item: &ItemRef, content: &str, editor: &str) -> Result<bool, BoardError> {
        self.change_feature(pid, item.feature_id(), UndoKind::NoteSave, |_, feature| {
            let title = feature.title.clone();
            let slot = feature_ops::note_slot_mut(feature, item)?;
            if !feature_ops::write_note(slot, content, editor, Utc::now()) {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Saved note on \"{}\"", title))))
        })
    }

    fn drop_note_drafts(&mut self, pid: &str, feature_id: &str) {
        let dropped = self.notes.cancel_feature(pid, feature_id);
        if dropped > 0 {
            tracing::debug!(feature_id, dropped, "discarded unsaved notes of deleted feature");
        }
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    /// Append a column. It starts out visible. Returns its id.
    pub fn add_column(&mut self, name: &str, color: &str) -> Result<String, BoardError> {
        let pid = self.active_id()?;
        let id = self.change_columns(&pid, UndoKind::ColumnCreate, |_, columns| {
            let id = column_ops::add_column(columns, name, color)?;
            Ok((id, Some(format!("Added column {}", name.trim()))))
        })?;
        self.visibility.show(&id);
        Ok(id)
    }

    pub fn edit_column(&mut self, column_id: &str, patch: &ColumnPatch) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_columns(&pid, UndoKind::ColumnEdit, |project, columns| {
            let name = project.column(column_id).map(|c| c.name.clone()).unwrap_or_default();
            if !column_ops::edit_column(columns, column_id, patch)? {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Edited column {}", name))))
        })
    }

    /// Move a column to `to_index` in display order
    pub fn move_column(&mut self, column_id: &str, to_index: usize) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_columns(&pid, UndoKind::ColumnMove, |project, columns| {
            let name = project.column(column_id).map(|c| c.name.clone()).unwrap_or_default();
            if !column_ops::move_column(columns, column_id, to_index)? {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Moved column {}", name))))
        })
    }

    /// Delete a column. Its features move to the first remaining column,
    /// and the whole change undoes as one step.
    pub fn delete_column(&mut self, column_id: &str, confirmed: bool) -> Result<ColumnDeletion, BoardError> {
        let pid = self.active_id()?;
        let project = self.project(&pid)?;
        let mut next = project.clone();
        let deletion = match column_ops::delete_column(&mut next, column_id, confirmed) {
            Ok(d) => d,
            Err(e) => {
                refused(UndoKind::ColumnDelete, &e);
                return Err(e);
            }
        };
        let before = UndoPayload::Board {
            columns: project.columns.clone(),
            features: project.features.clone(),
        };
        let description = if deletion.reassigned.is_empty() {
            format!("Deleted column {}", deletion.removed.name)
        } else {
            format!(
                "Deleted column {} and moved {} feature(s)",
                deletion.removed.name,
                deletion.reassigned.len()
            )
        };
        self.undo.record(UndoKind::ColumnDelete, &pid, description, before);
        self.store.mutate_board(&pid, move |columns, features| {
            *columns = next.columns;
            *features = next.features;
        });
        self.visibility.show(column_id);
        self.sync_visibility();
        tracing::info!(column = column_id, moved = deletion.reassigned.len(), "column deleted");
        Ok(deletion)
    }

    /// Hide a column from view. Refused for the last visible column.
    pub fn hide_column(&mut self, column_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let project = self
            .store
            .project(&pid)
            .ok_or_else(|| BoardError::project(&pid))?;
        let changed = self
            .visibility
            .hide(project, column_id)
            .inspect_err(|e| refused(UndoKind::ColumnEdit, e))?;
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    pub fn show_column(&mut self, column_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        if !self.project(&pid)?.has_column(column_id) {
            let e = BoardError::column(column_id);
            refused(UndoKind::ColumnEdit, &e);
            return Err(e);
        }
        let changed = self.visibility.show(column_id);
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// Returns whether the column is visible afterwards
    pub fn toggle_column(&mut self, column_id: &str) -> Result<bool, BoardError> {
        if self.visibility.is_visible(column_id) {
            self.hide_column(column_id).map(|_| false)
        } else {
            self.show_column(column_id).map(|_| true)
        }
    }

    pub fn show_all_columns(&mut self) {
        self.visibility.show_all();
        self.touch();
    }

    // -----------------------------------------------------------------------
    // View preferences
    // -----------------------------------------------------------------------

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.prefs.view_mode != mode {
            self.prefs.view_mode = mode;
            self.touch();
        }
    }

    /// Only show features `user_id` works on; `None` shows everything
    pub fn set_filter_by_user(&mut self, user_id: Option<String>) -> Result<(), BoardError> {
        if let Some(user) = &user_id {
            check_user(&self.roster, user)?;
        }
        if self.prefs.filter_by_user != user_id {
            self.prefs.filter_by_user = user_id;
            self.touch();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Create a project with the default columns and switch to it
    pub fn create_project(&mut self, name: &str) -> Result<String, BoardError> {
        let project = project_ops::new_project(name, &self.current_user)
            .inspect_err(|e| refused(UndoKind::ProjectCreate, e))?;
        let id = project.id.clone();
        let previous_active = self.store.active_project_id().to_string();
        self.undo.record(
            UndoKind::ProjectCreate,
            &id,
            format!("Created project {}", project.name()),
            UndoPayload::ProjectAdded {
                project_id: id.clone(),
                previous_active,
            },
        );
        self.store.mutate_projects(move |ps| ps.push(project));
        self.store.set_active_project(&id)?;
        self.sync_visibility();
        Ok(id)
    }

    /// Make another project active. Not an undoable change.
    pub fn switch_project(&mut self, project_id: &str) -> Result<(), BoardError> {
        self.store
            .set_active_project(project_id)
            .inspect_err(|e| refused(UndoKind::ProjectEdit, e))?;
        self.sync_visibility();
        Ok(())
    }

    pub fn edit_project(&mut self, patch: &ProjectPatch) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        self.change_meta(&pid, UndoKind::ProjectEdit, |meta| {
            if !patch.apply(meta)? {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Edited project {}", meta.name))))
        })
    }

    /// Delete a project. The last project cannot be deleted.
    pub fn delete_project(&mut self, project_id: &str) -> Result<(), BoardError> {
        let index = match self.store.projects().iter().position(|p| p.id == project_id) {
            Some(i) => i,
            None => {
                let e = BoardError::project(project_id);
                refused(UndoKind::ProjectDelete, &e);
                return Err(e);
            }
        };
        if self.store.projects().len() <= 1 {
            refused(UndoKind::ProjectDelete, &BoardError::LastProject);
            return Err(BoardError::LastProject);
        }
        let project = self.store.projects()[index].clone();
        let was_active = self.store.active_project_id() == project_id;
        self.undo.record(
            UndoKind::ProjectDelete,
            project_id,
            format!("Deleted project {}", project.name()),
            UndoPayload::ProjectRemoved {
                index,
                project: Box::new(project),
                was_active,
            },
        );
        self.store.mutate_projects(|ps| ps.retain(|p| p.id != project_id));
        self.sync_visibility();
        Ok(())
    }

    pub fn add_collaborator(&mut self, user_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_meta(&pid, UndoKind::CollaboratorChange, |meta| {
            if !project_ops::add_collaborator(meta, &roster, user_id)? {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Added {} to {}", roster.display_name(user_id), meta.name))))
        })
    }

    pub fn remove_collaborator(&mut self, user_id: &str) -> Result<bool, BoardError> {
        let pid = self.active_id()?;
        let roster = self.roster.clone();
        self.change_meta(&pid, UndoKind::CollaboratorChange, |meta| {
            if !project_ops::remove_collaborator(meta, user_id)? {
                return Ok((false, None));
            }
            Ok((true, Some(format!("Removed {} from {}", roster.display_name(user_id), meta.name))))
        })
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Revert the newest action. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<UndoReport> {
        let report = self.undo.undo(&mut self.store)?;
        self.sync_visibility();
        tracing::info!(kind = ?report.kind, applied = report.applied, "undo: {}", report.description);
        Some(report)
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Feed a drag event. Only a drag end produces an outcome.
    pub fn handle_drag(&mut self, event: DragEvent) -> Option<DropOutcome> {
        let drop = self.drag.handle(event)?;
        Some(self.drop_feature(&drop.active_id, drop.over_id.as_deref()))
    }

    /// Resolve a finished drag and apply the move it implies
    pub fn drop_feature(&mut self, active_id: &str, over_id: Option<&str>) -> DropOutcome {
        let Some(project) = self.store.active_project() else {
            return DropOutcome::Rejected(DropRejection::NoTarget);
        };
        let target = match resolve_drop_target(project, &self.visibility, over_id) {
            Ok(t) => t,
            Err(rejection) => {
                tracing::warn!(active_id, ?over_id, reason = %rejection, "invalid drop");
                return DropOutcome::Rejected(rejection);
            }
        };
        let Some(feature) = project.feature(active_id) else {
            let rejection = DropRejection::UnknownFeature(active_id.to_string());
            tracing::warn!(active_id, ?over_id, reason = %rejection, "invalid drop");
            return DropOutcome::Rejected(rejection);
        };
        if feature.status == target {
            return DropOutcome::AlreadyThere { column_id: target };
        }
        let from = feature.status.clone();
        match self.move_feature(active_id, &target) {
            Ok(_) => DropOutcome::Moved {
                feature_id: active_id.to_string(),
                from,
                to: target,
            },
            Err(_) => DropOutcome::Rejected(DropRejection::UnknownTarget(target)),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Run whatever debounced work is due: note auto-saves first, then the
    /// board write they may have scheduled.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();
        for note in self.notes.due(now) {
            if self.save_pending_note(&note.owner, &note.content, &note.editor) {
                report.notes_saved += 1;
            }
        }
        if self.store.save_timer_mut().take_due(now) {
            report.board_saved = self.persist();
        }
        report
    }

    /// Save pending notes and write the board now if a write is pending.
    /// Returns true if the board was written.
    pub fn flush(&mut self) -> bool {
        for note in self.notes.flush_all() {
            self.save_pending_note(&note.owner, &note.content, &note.editor);
        }
        if self.store.save_timer_mut().take_pending() {
            return self.persist();
        }
        false
    }

    /// How long the event loop may sleep before the next debounced deadline
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let save = self.store.save_timer().remaining(now);
        let note = self.notes.next_deadline(now);
        match (save, note) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.save_timer().is_pending() || !self.notes.is_empty()
    }

    fn save_pending_note(&mut self, owner: &NoteOwner, content: &str, editor: &str) -> bool {
        match self.write_note(&owner.project_id, &owner.item, content, editor) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(item = %owner.item, error = %e, "dropping note auto-save");
                false
            }
        }
    }

    fn persist(&mut self) -> bool {
        let state = self.snapshot(Utc::now());
        match self.persister.as_mut() {
            Some(p) => p.save(&state),
            None => false,
        }
    }

    /// Schedule a save for view-state changes that bypass the store
    fn touch(&mut self) {
        self.store.save_timer_mut().schedule(Instant::now());
    }

    // -----------------------------------------------------------------------
    // Commit helpers
    // -----------------------------------------------------------------------

    fn active_id(&self) -> Result<String, BoardError> {
        match self.store.active_project() {
            Some(p) => Ok(p.id.clone()),
            None => {
                tracing::warn!("no active project");
                Err(BoardError::NoActiveProject)
            }
        }
    }

    fn project(&self, project_id: &str) -> Result<&Project, BoardError> {
        self.store
            .project(project_id)
            .ok_or_else(|| BoardError::project(project_id))
    }

    /// Rebuild the visible set after anything that can change the active
    /// project or its columns.
    fn sync_visibility(&mut self) {
        let active = self.store.active_project_id();
        if active != self.visibility_project {
            self.visibility = ColumnVisibility::all_visible();
            self.visibility_project = active.to_string();
        }
        if let Some(project) = self.store.active_project() {
            self.visibility.reconcile(project);
        }
    }

    /// Run `op` on a copy of the feature list. When it reports a change
    /// (description plus before-state), the undo entry is recorded and then
    /// the copy is committed.
    fn change_features<T, F>(&mut self, pid: &str, kind: UndoKind, op: F) -> Result<T, BoardError>
    where
        F: FnOnce(&Project, &mut Vec<Feature>) -> Result<(T, Option<(String, UndoPayload)>), BoardError>,
    {
        let project = self.project(pid)?;
        let mut features = project.features.clone();
        let (value, change) = op(project, &mut features).inspect_err(|e| refused(kind, e))?;
        if let Some((description, before)) = change {
            self.undo.record(kind, pid, description, before);
            self.store.mutate_features(pid, move |fs| *fs = features);
        }
        Ok(value)
    }

    /// Like `change_features` for a single feature; the undo entry holds
    /// the whole feature as it was.
    fn change_feature<T, F>(&mut self, pid: &str, feature_id: &str, kind: UndoKind, op: F) -> Result<T, BoardError>
    where
        F: FnOnce(&Project, &mut Feature) -> Result<(T, Option<String>), BoardError>,
    {
        let project = self.project(pid)?;
        let before = feature_ops::find_feature(&project.features, feature_id)
            .inspect_err(|e| refused(kind, e))?
            .clone();
        let mut after = before.clone();
        let (value, description) = op(project, &mut after).inspect_err(|e| refused(kind, e))?;
        if let Some(description) = description {
            self.undo
                .record(kind, pid, description, UndoPayload::Feature { feature: before });
            self.store.mutate_features(pid, move |fs| {
                if let Some(slot) = fs.iter_mut().find(|f| f.id == after.id) {
                    *slot = after;
                }
            });
        }
        Ok(value)
    }

    fn change_columns<T, F>(&mut self, pid: &str, kind: UndoKind, op: F) -> Result<T, BoardError>
    where
        F: FnOnce(&Project, &mut Vec<Column>) -> Result<(T, Option<String>), BoardError>,
    {
        let project = self.project(pid)?;
        let before = project.columns.clone();
        let mut columns = before.clone();
        let (value, description) = op(project, &mut columns).inspect_err(|e| refused(kind, e))?;
        if let Some(description) = description {
            self.undo
                .record(kind, pid, description, UndoPayload::Columns { columns: before });
            self.store.mutate_columns(pid, move |cs| *cs = columns);
        }
        Ok(value)
    }

    fn change_meta<T, F>(&mut self, pid: &str, kind: UndoKind, op: F) -> Result<T, BoardError>
    where
        F: FnOnce(&mut ProjectMeta) -> Result<(T, Option<String>), BoardError>,
    {
        let before = self.project(pid)?.meta.clone();
        let mut meta = before.clone();
        let (value, description) = op(&mut meta).inspect_err(|e| refused(kind, e))?;
        if let Some(description) = description {
            self.undo
                .record(kind, pid, description, UndoPayload::ProjectMeta { meta: before });
            self.store.mutate_project_meta(pid, move |m| *m = meta);
        }
        Ok(value)
    }
}

/// Assignment targets must be on the roster, unless no roster was configured
fn check_user(roster: &Roster, user_id: &str) -> Result<(), BoardError> {
    if roster.is_empty() || roster.contains(user_id) {
        Ok(())
    } else {
        Err(BoardError::UnknownUser(user_id.to_string()))
    }
}

fn refused(kind: UndoKind, err: &BoardError) {
    if err.is_referential() {
        tracing::warn!(op = ?kind, error = %err, "stale reference, nothing changed");
    } else {
        tracing::info!(op = ?kind, error = %err, "refused");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::persist::STORAGE_KEY;
    use crate::io::storage::MemoryStorage;
    use crate::model::feature::Subtask;
    use crate::model::user::{Role, User};
    use pretty_assertions::assert_eq;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
            color: String::new(),
            role: Role::Member,
        }
    }

    fn options() -> BoardOptions {
        BoardOptions {
            roster: Roster::new(vec![user("u1"), user("u2")]),
            current_user: "u1".into(),
            ..Default::default()
        }
    }

    fn board() -> Board {
        let mut p = Project::new("p1", "Website", "u1");
        let mut f = Feature::new("f1", "Login", "ideas");
        f.subtasks.push(Subtask::new("s1", "Form"));
        f.subtasks.push(Subtask::new("s2", "Validation"));
        p.features.push(f);
        p.features.push(Feature::new("f2", "Search", "working"));
        Board::new(vec![p], "p1", options())
    }

    fn feature<'a>(board: &'a Board, id: &str) -> &'a Feature {
        board.active_project().unwrap().feature(id).unwrap()
    }

    fn json(board: &Board) -> serde_json::Value {
        serde_json::to_value(board.active_project().unwrap()).unwrap()
    }

    #[test]
    fn move_records_undo_and_undo_restores() {
        let mut b = board();
        assert!(b.move_feature("f1", "done").unwrap());
        assert_eq!(feature(&b, "f1").status, "done");
        let report = b.undo().unwrap();
        assert_eq!(report.kind, UndoKind::FeatureMove);
        assert!(report.description.contains("Login"));
        assert_eq!(feature(&b, "f1").status, "ideas");
    }

    #[test]
    fn move_to_same_column_is_silent() {
        let mut b = board();
        assert!(!b.move_feature("f1", "ideas").unwrap());
        assert!(b.undo_stack().is_empty());
        assert!(!b.store().save_timer().is_pending());
    }

    #[test]
    fn stale_ids_change_nothing() {
        let mut b = board();
        let before = json(&b);
        assert_eq!(b.move_feature("ghost", "done"), Err(BoardError::feature("ghost")));
        assert_eq!(b.move_feature("f1", "nowhere"), Err(BoardError::column("nowhere")));
        assert_eq!(
            b.advance_subtask("f1", "ghost"),
            Err(BoardError::subtask("ghost"))
        );
        assert_eq!(json(&b), before);
        assert!(b.undo_stack().is_empty());
    }

    #[test]
    fn create_edit_delete_feature_undo() {
        let mut b = board();
        let before = json(&b);
        let id = b.create_feature("planned", FeatureDraft::titled("Billing")).unwrap();
        assert_eq!(feature(&b, &id).status, "planned");

        let patch = FeaturePatch {
            title: Some("Billing v2".into()),
            estimate_hours: Some(Some(3.0)),
            ..Default::default()
        };
        assert!(b.edit_feature(&id, &patch).unwrap());
        assert_eq!(b.undo_stack().len(), 2);

        b.delete_feature(&id).unwrap();
        assert!(b.active_project().unwrap().feature(&id).is_none());

        b.undo();
        assert_eq!(feature(&b, &id).title, "Billing v2");
        b.undo();
        assert_eq!(feature(&b, &id).title, "Billing");
        b.undo();
        assert_eq!(json(&b), before);
    }

    #[test]
    fn blank_title_is_refused_before_mutation() {
        let mut b = board();
        assert!(matches!(
            b.create_feature("ideas", FeatureDraft::titled("  ")),
            Err(BoardError::Validation(_))
        ));
        assert!(b.undo_stack().is_empty());
    }

    #[test]
    fn assignment_requires_roster_member() {
        let mut b = board();
        assert_eq!(
            b.toggle_feature_assignee("f1", "stranger"),
            Err(BoardError::UnknownUser("stranger".into()))
        );
        assert!(b.toggle_feature_assignee("f1", "u2").unwrap());
        assert!(!b.toggle_feature_assignee("f1", "u2").unwrap());
        assert!(feature(&b, "f1").assignees.is_empty());
        assert_eq!(b.undo_stack().len(), 2);
    }

    #[test]
    fn departed_user_can_still_be_unassigned() {
        let mut p = Project::new("p1", "Website", "u1");
        let mut f = Feature::new("f1", "Login", "ideas");
        f.assignees.push("former".into());
        let mut s = Subtask::new("s1", "Form");
        s.assignees.push("former".into());
        f.subtasks.push(s);
        p.features.push(f);
        let mut b = Board::new(vec![p], "p1", options());

        assert!(!b.toggle_feature_assignee("f1", "former").unwrap());
        assert!(feature(&b, "f1").assignees.is_empty());
        assert!(!b.toggle_subtask_assignee("f1", "s1", "former").unwrap());
        assert!(feature(&b, "f1").subtask("s1").unwrap().assignees.is_empty());

        // putting them back is refused
        assert_eq!(
            b.toggle_feature_assignee("f1", "former"),
            Err(BoardError::UnknownUser("former".into()))
        );
        assert_eq!(
            b.toggle_subtask_assignee("f1", "s1", "former"),
            Err(BoardError::UnknownUser("former".into()))
        );
        assert_eq!(b.undo_stack().len(), 2);
    }

    #[test]
    fn subtask_advance_cycles_and_each_step_undoes() {
        let mut b = board();
        assert_eq!(b.advance_subtask("f1", "s1").unwrap(), SubtaskStatus::InProgress);
        assert_eq!(b.advance_subtask("f1", "s1").unwrap(), SubtaskStatus::Done);
        assert!(feature(&b, "f1").subtask("s1").unwrap().completed());
        b.undo();
        assert_eq!(feature(&b, "f1").subtask("s1").unwrap().status, SubtaskStatus::InProgress);
    }

    #[test]
    fn bulk_assign_is_one_undo_entry() {
        let mut b = board();
        let sel = vec![SubtaskSelection::new("f1", "s1"), SubtaskSelection::new("f1", "s2")];
        let changed = b.bulk_assign_subtasks(&sel, &["u1".into(), "u2".into()]).unwrap();
        assert_eq!(changed, 2);
        assert_eq!(b.undo_stack().len(), 1);
        b.undo();
        assert!(feature(&b, "f1").subtasks.iter().all(|s| s.assignees.is_empty()));
    }

    #[test]
    fn bulk_assign_with_stale_selection_changes_nothing() {
        let mut b = board();
        let sel = vec![SubtaskSelection::new("f1", "s1"), SubtaskSelection::new("f1", "gone")];
        assert!(b.bulk_assign_subtasks(&sel, &["u1".into()]).is_err());
        assert!(feature(&b, "f1").subtask("s1").unwrap().assignees.is_empty());
        assert!(b.undo_stack().is_empty());
    }

    #[test]
    fn attachments_and_notes_on_subtasks() {
        let mut b = board();
        let item = ItemRef::subtask("f1", "s1");
        let draft = AttachmentDraft {
            file_name: "mock.png".into(),
            size: 1024,
            mime_type: "image/png".into(),
            storage_ref: "blob:1".into(),
        };
        let att = b.add_attachment(&item, draft).unwrap();
        assert!(b.save_note(&item, "check contrast").unwrap());

        let s = feature(&b, "f1").subtask("s1").unwrap();
        assert_eq!(s.attachments[0].uploaded_by, "u1");
        assert_eq!(s.note.as_ref().unwrap().content, "check contrast");

        b.remove_attachment(&item, &att).unwrap();
        assert!(feature(&b, "f1").subtask("s1").unwrap().attachments.is_empty());
        b.undo();
        assert_eq!(feature(&b, "f1").subtask("s1").unwrap().attachments.len(), 1);
    }

    #[test]
    fn note_edits_save_after_quiet_period() {
        let mut b = board();
        let t0 = Instant::now();
        let item = ItemRef::feature("f2");
        b.edit_note(&item, "draft", t0).unwrap();
        b.edit_note(&item, "draft two", t0 + Duration::from_millis(300)).unwrap();
        assert_eq!(b.tick(t0 + Duration::from_millis(500)).notes_saved, 0);
        let report = b.tick(t0 + Duration::from_millis(1200));
        assert_eq!(report.notes_saved, 1);
        assert_eq!(feature(&b, "f2").note.as_ref().unwrap().content, "draft two");
        assert_eq!(b.undo_stack().len(), 1);
    }

    #[test]
    fn column_lifecycle() {
        let mut b = board();
        let id = b.add_column("In Review", "teal").unwrap();
        assert_eq!(id, "in-review");
        assert_eq!(b.visible_columns().last().unwrap().id, "in-review");

        assert!(b.move_column("in-review", 0).unwrap());
        assert_eq!(b.visible_columns()[0].id, "in-review");
        b.undo();
        assert_eq!(b.visible_columns().last().unwrap().id, "in-review");
        b.undo();
        assert!(!b.active_project().unwrap().has_column("in-review"));
    }

    #[test]
    fn delete_column_needs_confirmation_then_batches() {
        let mut b = board();
        let before = json(&b);
        assert_eq!(
            b.delete_column("ideas", false),
            Err(BoardError::ConfirmationRequired {
                column_id: "ideas".into(),
                features: 1
            })
        );
        let deletion = b.delete_column("ideas", true).unwrap();
        assert_eq!(deletion.target, "planned");
        assert_eq!(feature(&b, "f1").status, "planned");
        assert_eq!(b.undo_stack().len(), 1);
        b.undo();
        assert_eq!(json(&b), before);
    }

    #[test]
    fn hidden_columns_reject_drops_and_last_visible_stays() {
        let mut b = board();
        for id in ["ideas", "planned", "working"] {
            b.hide_column(id).unwrap();
        }
        assert_eq!(b.hide_column("done"), Err(BoardError::LastVisibleColumn));
        assert_eq!(b.visible_columns().len(), 1);

        let outcome = b.drop_feature("f1", Some("working"));
        assert_eq!(
            outcome,
            DropOutcome::Rejected(DropRejection::HiddenColumn("working".into()))
        );
        assert_eq!(feature(&b, "f1").status, "ideas");
        assert!(b.undo_stack().is_empty());
    }

    #[test]
    fn drag_session_end_moves_once() {
        let mut b = board();
        assert!(b.handle_drag(DragEvent::Start { active_id: "f1".into() }).is_none());
        assert!(
            b.handle_drag(DragEvent::Over {
                active_id: "f1".into(),
                over_id: Some("f2".into()),
            })
            .is_none()
        );
        assert_eq!(feature(&b, "f1").status, "ideas");
        let outcome = b.handle_drag(DragEvent::End {
            active_id: "f1".into(),
            over_id: Some("f2".into()),
        });
        assert_eq!(
            outcome,
            Some(DropOutcome::Moved {
                feature_id: "f1".into(),
                from: "ideas".into(),
                to: "working".into(),
            })
        );
        assert_eq!(b.undo_stack().len(), 1);
    }

    #[test]
    fn projects_create_switch_delete() {
        let mut b = board();
        let id = b.create_project("Mobile").unwrap();
        assert_eq!(b.active_project().unwrap().id, id);
        assert_eq!(b.active_project().unwrap().columns.len(), 4);

        b.switch_project("p1").unwrap();
        b.delete_project(&id).unwrap();
        assert_eq!(b.store().projects().len(), 1);
        assert_eq!(b.delete_project("p1"), Err(BoardError::LastProject));

        b.undo();
        assert!(b.store().project(&id).is_some());
        assert_eq!(b.active_project().unwrap().id, "p1");
    }

    #[test]
    fn collaborators_follow_roster() {
        let mut b = board();
        assert!(b.add_collaborator("u2").unwrap());
        assert_eq!(
            b.add_collaborator("nobody"),
            Err(BoardError::UnknownUser("nobody".into()))
        );
        assert!(b.remove_collaborator("u2").unwrap());
        assert!(b.remove_collaborator("u1").is_err());
        assert_eq!(b.undo_stack().len(), 2);
    }

    #[test]
    fn filter_by_user_limits_cards() {
        let mut b = board();
        b.toggle_subtask_assignee("f1", "s1", "u2").unwrap();
        b.set_filter_by_user(Some("u2".into())).unwrap();
        assert_eq!(b.features_in("ideas").len(), 1);
        assert!(b.features_in("working").is_empty());
    }

    #[test]
    fn flush_writes_pending_state_once() {
        let mut b = board().with_persister(Persister::new(Box::new(MemoryStorage::new())));
        assert!(!b.flush());
        b.move_feature("f1", "done").unwrap();
        assert!(b.has_unsaved_changes());
        assert!(b.flush());
        assert!(!b.flush());

        let stored = b.persister.as_ref().unwrap().storage().get(STORAGE_KEY).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(v["activeProjectId"], "p1");
        assert_eq!(v["projects"][0]["features"][0]["status"], "done");
    }

    #[test]
    fn tick_writes_once_after_the_quiet_period() {
        let mut b = board().with_persister(Persister::new(Box::new(MemoryStorage::new())));
        let t0 = Instant::now();
        b.move_feature("f1", "done").unwrap();
        b.move_feature("f2", "planned").unwrap();

        assert!(!b.tick(t0).board_saved);
        assert!(b.persister.as_ref().unwrap().storage().get(STORAGE_KEY).unwrap().is_none());
        assert!(b.tick(t0 + Duration::from_millis(1500)).board_saved);
        assert!(!b.tick(t0 + Duration::from_secs(3)).board_saved);
        assert!(!b.has_unsaved_changes());

        let stored = b.persister.as_ref().unwrap().storage().get(STORAGE_KEY).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(v["projects"][0]["features"][0]["status"], "done");
        assert_eq!(v["projects"][0]["features"][1]["status"], "planned");
    }

    #[test]
    fn next_deadline_includes_note_drafts() {
        let mut b = board();
        let now = Instant::now();
        assert_eq!(b.next_deadline(now), None);
        b.edit_note(&ItemRef::feature("f2"), "draft", now).unwrap();
        let wait = b.next_deadline(now).unwrap();
        assert!(wait <= Duration::from_millis(800));
        assert_eq!(b.next_deadline(now + Duration::from_millis(900)), Some(Duration::ZERO));
    }

    #[test]
    fn snapshot_restores_view_state() {
        let mut b = board();
        b.hide_column("planned").unwrap();
        b.set_view_mode(ViewMode::Horizontal);
        let state = b.snapshot(Utc::now());
        assert_eq!(state.visible_columns, vec!["ideas", "working", "done"]);

        let restored = Board::from_state(state, options());
        assert!(!restored.visibility().is_visible("planned"));
        assert_eq!(restored.prefs().view_mode, ViewMode::Horizontal);
    }
}
