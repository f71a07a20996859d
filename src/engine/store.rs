use std::time::{Duration, Instant};

use crate::model::column::Column;
use crate::model::feature::Feature;
use crate::model::project::{Project, ProjectMeta};
use crate::ops::BoardError;

use super::debounce::Debouncer;

/// Owns every project and the active-project pointer.
///
/// All writes go through the `mutate_*` methods. Each one builds the new
/// slice on a copy, swaps it in, and schedules the debounced persistence
/// write. Recording undo information is the caller's job and happens before
/// the mutate call.
#[derive(Debug)]
pub struct BoardStore {
    projects: Vec<Project>,
    active_project_id: String,
    save_timer: Debouncer,
}

impl BoardStore {
    /// Build a store. An unknown `active_project_id` falls back to the first project.
    pub fn new(projects: Vec<Project>, active_project_id: &str, save_quiet: Duration) -> Self {
        let active = if projects.iter().any(|p| p.id == active_project_id) {
            active_project_id.to_string()
        } else {
            projects.first().map(|p| p.id.clone()).unwrap_or_default()
        };
        BoardStore {
            projects,
            active_project_id: active,
            save_timer: Debouncer::new(save_quiet),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn active_project_id(&self) -> &str {
        &self.active_project_id
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.project(&self.active_project_id)
    }

    /// Features of the active project sitting in `column_id`, in list order.
    /// With `filter_by_user`, only features the user works on (directly or
    /// through a subtask) are returned.
    pub fn features_by_status(&self, column_id: &str, filter_by_user: Option<&str>) -> Vec<&Feature> {
        let Some(project) = self.active_project() else {
            return Vec::new();
        };
        project
            .features
            .iter()
            .filter(|f| f.status == column_id)
            .filter(|f| filter_by_user.is_none_or(|u| f.involves(u)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub fn set_active_project(&mut self, project_id: &str) -> Result<(), BoardError> {
        if self.project(project_id).is_none() {
            return Err(BoardError::project(project_id));
        }
        if self.active_project_id != project_id {
            self.active_project_id = project_id.to_string();
            self.schedule_save();
        }
        Ok(())
    }

    /// Replace a project's feature list with `f` applied to a copy of it.
    /// Returns false (and changes nothing) for an unknown project.
    pub fn mutate_features<F>(&mut self, project_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Feature>),
    {
        let Some(project) = self.project_mut(project_id) else {
            tracing::warn!(project_id, "mutate_features: unknown project");
            return false;
        };
        let mut next = project.features.clone();
        f(&mut next);
        project.features = next;
        self.schedule_save();
        true
    }

    /// Replace a project's column list with `f` applied to a copy of it.
    pub fn mutate_columns<F>(&mut self, project_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Column>),
    {
        let Some(project) = self.project_mut(project_id) else {
            tracing::warn!(project_id, "mutate_columns: unknown project");
            return false;
        };
        let mut next = project.columns.clone();
        f(&mut next);
        project.columns = next;
        self.schedule_save();
        true
    }

    /// Replace a project's columns and features together (column deletion
    /// touches both and must land as one change).
    pub fn mutate_board<F>(&mut self, project_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Column>, &mut Vec<Feature>),
    {
        let Some(project) = self.project_mut(project_id) else {
            tracing::warn!(project_id, "mutate_board: unknown project");
            return false;
        };
        let mut columns = project.columns.clone();
        let mut features = project.features.clone();
        f(&mut columns, &mut features);
        project.columns = columns;
        project.features = features;
        self.schedule_save();
        true
    }

    pub fn mutate_project_meta<F>(&mut self, project_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut ProjectMeta),
    {
        let Some(project) = self.project_mut(project_id) else {
            tracing::warn!(project_id, "mutate_project_meta: unknown project");
            return false;
        };
        let mut next = project.meta.clone();
        f(&mut next);
        project.meta = next;
        self.schedule_save();
        true
    }

    /// Add or remove whole projects. If the active project disappears, the
    /// first remaining project becomes active.
    pub fn mutate_projects<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Vec<Project>),
    {
        let mut next = self.projects.clone();
        f(&mut next);
        self.projects = next;
        if self.active_project().is_none() {
            self.active_project_id = self
                .projects
                .first()
                .map(|p| p.id.clone())
                .unwrap_or_default();
        }
        self.schedule_save();
    }

    fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    // -----------------------------------------------------------------------
    // Persistence scheduling
    // -----------------------------------------------------------------------

    fn schedule_save(&mut self) {
        self.save_timer.schedule(Instant::now());
    }

    pub fn save_timer(&self) -> &Debouncer {
        &self.save_timer
    }

    pub fn save_timer_mut(&mut self) -> &mut Debouncer {
        &mut self.save_timer
    }
}
