//! Whole-board persistence under a single storage key.
//!
//! The blob is camelCase JSON:
//! `{projects, activeProjectId, viewMode, visibleColumns, filterByUser, timestamp}`
//! with `timestamp` in epoch milliseconds. Reading is tolerant: each field
//! that is missing or malformed falls back to its default on its own, so an
//! older or partly damaged blob still restores everything it can.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::project::Project;
use crate::model::view::ViewMode;

use super::storage::{Storage, StorageError};

pub const STORAGE_KEY: &str = "projectTracking";
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 30;

/// Everything that survives a restart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub projects: Vec<Project>,
    pub active_project_id: String,
    pub view_mode: ViewMode,
    pub visible_columns: Vec<String>,
    pub filter_by_user: Option<String>,
    pub timestamp: i64,
}

impl PersistedState {
    /// The state a first run starts from: one project with the default columns
    pub fn seed(owner: &str, now: DateTime<Utc>) -> Self {
        let project = Project::new("default", "My Project", owner);
        PersistedState {
            active_project_id: project.id.clone(),
            projects: vec![project],
            view_mode: ViewMode::default(),
            visible_columns: Vec::new(),
            filter_by_user: None,
            timestamp: now.timestamp_millis(),
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Decode a blob field by field. Only a non-object top level is an error.
    pub fn decode(value: &Value) -> Result<PersistedState, String> {
        let Some(obj) = value.as_object() else {
            return Err("blob is not a JSON object".into());
        };
        let mut projects = decode_projects(obj);
        for project in &mut projects {
            let fixed = project.repair();
            if fixed > 0 {
                tracing::debug!(project = %project.id, fixed, "re-homed features with unknown columns");
            }
        }
        Ok(PersistedState {
            projects,
            active_project_id: field(obj, "activeProjectId").unwrap_or_default(),
            view_mode: field(obj, "viewMode").unwrap_or_default(),
            visible_columns: field(obj, "visibleColumns").unwrap_or_default(),
            filter_by_user: field::<Option<String>>(obj, "filterByUser").flatten(),
            timestamp: field(obj, "timestamp").unwrap_or(0),
        })
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, name: &str) -> Option<T> {
    let value = obj.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(field = name, error = %e, "ignoring malformed field");
            None
        }
    }
}

/// Projects are decoded one by one so a single bad project does not take
/// the others down with it.
fn decode_projects(obj: &Map<String, Value>) -> Vec<Project> {
    let Some(items) = obj.get("projects").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Project>(item.clone()) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::debug!(index = i, error = %e, "dropping malformed project");
                None
            }
        })
        .collect()
}

/// Result of reading the stored blob
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Hydrated(PersistedState),
    /// Older than the staleness window (or undated); discarded
    Stale { saved_at: Option<DateTime<Utc>> },
    Missing,
    /// Unreadable or not JSON; discarded
    Corrupt(String),
}

impl LoadOutcome {
    pub fn into_state(self) -> Option<PersistedState> {
        match self {
            LoadOutcome::Hydrated(state) => Some(state),
            _ => None,
        }
    }
}

/// Reads and writes the board blob through a [`Storage`] backend.
///
/// Saving never fails from the caller's point of view: errors are logged and
/// the in-memory board stays authoritative.
pub struct Persister {
    storage: Box<dyn Storage>,
    stale_after: Duration,
}

impl Persister {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Persister {
            storage,
            stale_after: Duration::days(DEFAULT_STALE_AFTER_DAYS),
        }
    }

    pub fn with_stale_after_days(mut self, days: i64) -> Self {
        self.stale_after = Duration::days(days);
        self
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn load(&self, now: DateTime<Utc>) -> LoadOutcome {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                tracing::debug!(error = %e, "could not read stored board");
                return LoadOutcome::Corrupt(e.to_string());
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "stored board is not valid JSON, discarding");
                return LoadOutcome::Corrupt(e.to_string());
            }
        };
        let state = match PersistedState::decode(&value) {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "stored board has the wrong shape, discarding");
                return LoadOutcome::Corrupt(e);
            }
        };
        let saved_at = state.saved_at().filter(|_| state.timestamp > 0);
        match saved_at {
            Some(at) if now - at <= self.stale_after => {
                if state.projects.is_empty() {
                    tracing::debug!("stored board has no usable projects, discarding");
                    return LoadOutcome::Corrupt("no projects".into());
                }
                LoadOutcome::Hydrated(state)
            }
            _ => {
                tracing::debug!(?saved_at, "stored board is stale, discarding");
                LoadOutcome::Stale { saved_at }
            }
        }
    }

    /// Write the whole state. Returns false (after logging) on failure.
    pub fn save(&mut self, state: &PersistedState) -> bool {
        match self.try_save(state) {
            Ok(bytes) => {
                tracing::debug!(bytes, projects = state.projects.len(), "board saved");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save board");
                false
            }
        }
    }

    fn try_save(&mut self, state: &PersistedState) -> Result<usize, SaveError> {
        let json = serde_json::to_string(state)?;
        self.storage.set(STORAGE_KEY, &json)?;
        Ok(json.len())
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            tracing::warn!(error = %e, "could not remove stored board");
        }
    }
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("stale_after_days", &self.stale_after.num_days())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
enum SaveError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::{FileStorage, MemoryStorage};
    use crate::model::feature::{Feature, Subtask, SubtaskStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn state_at(at: DateTime<Utc>) -> PersistedState {
        let mut state = PersistedState::seed("u1", at);
        let mut f = Feature::new("f1", "Login", "working");
        let mut s = Subtask::new("s1", "Form");
        s.status = SubtaskStatus::Done;
        f.subtasks.push(s);
        state.projects[0].features.push(f);
        state.visible_columns = vec!["ideas".into(), "working".into()];
        state.filter_by_user = Some("u1".into());
        state.view_mode = ViewMode::Horizontal;
        state
    }

    fn persister_with(raw: &str) -> Persister {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, raw).unwrap();
        Persister::new(Box::new(storage))
    }

    #[test]
    fn blob_uses_camel_case_keys() {
        let v = serde_json::to_value(state_at(now())).unwrap();
        for key in [
            "projects",
            "activeProjectId",
            "viewMode",
            "visibleColumns",
            "filterByUser",
            "timestamp",
        ] {
            assert!(v.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(v["viewMode"], "horizontal");
        assert_eq!(v["projects"][0]["features"][0]["subtasks"][0]["completed"], true);
    }

    #[test]
    fn save_then_load_hydrates() {
        let state = state_at(now());
        let mut p = Persister::new(Box::new(MemoryStorage::new()));
        assert!(p.save(&state));
        assert_eq!(p.load(now() + Duration::days(1)), LoadOutcome::Hydrated(state));
    }

    #[test]
    fn file_backed_round_trip() {
        let tmp = TempDir::new().unwrap();
        let state = state_at(now());
        let mut p = Persister::new(Box::new(FileStorage::new(tmp.path())));
        assert!(p.save(&state));
        assert!(tmp.path().join("projectTracking.json").exists());
        assert_eq!(p.load(now()).into_state(), Some(state));
    }

    #[test]
    fn missing_blob() {
        let p = Persister::new(Box::new(MemoryStorage::new()));
        assert_eq!(p.load(now()), LoadOutcome::Missing);
    }

    #[test]
    fn blobs_older_than_window_are_stale() {
        let mut p = Persister::new(Box::new(MemoryStorage::new()));
        p.save(&state_at(now() - Duration::days(31)));
        assert!(matches!(p.load(now()), LoadOutcome::Stale { saved_at: Some(_) }));

        let p = p.with_stale_after_days(60);
        assert!(matches!(p.load(now()), LoadOutcome::Hydrated(_)));
    }

    #[test]
    fn undated_blob_is_stale() {
        let p = persister_with(r#"{"projects":[{"id":"p1","name":"Old"}]}"#);
        assert_eq!(p.load(now()), LoadOutcome::Stale { saved_at: None });
    }

    #[test]
    fn garbage_is_corrupt() {
        let p = persister_with("{not json");
        assert!(matches!(p.load(now()), LoadOutcome::Corrupt(_)));
        let p = persister_with("[1,2,3]");
        assert!(matches!(p.load(now()), LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn malformed_fields_fall_back_independently() {
        let raw = json!({
            "projects": [
                {"id": "p1", "name": "Kept", "features": [
                    {"id": "f1", "title": "Orphan", "status": "gone",
                     "subtasks": [{"id": "s1", "title": "Old shape", "completed": true}]}
                ]},
                {"name": "no id"}
            ],
            "activeProjectId": 42,
            "viewMode": "diagonal",
            "visibleColumns": ["ideas"],
            "filterByUser": null,
            "timestamp": now().timestamp_millis()
        });
        let p = persister_with(&raw.to_string());
        let state = p.load(now()).into_state().unwrap();

        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.active_project_id, "");
        assert_eq!(state.view_mode, ViewMode::Vertical);
        assert_eq!(state.visible_columns, vec!["ideas".to_string()]);
        assert_eq!(state.filter_by_user, None);

        let f = &state.projects[0].features[0];
        assert_eq!(f.status, "ideas");
        assert_eq!(f.subtasks[0].status, SubtaskStatus::Done);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let mut p = Persister::new(Box::new(MemoryStorage::with_quota(16)));
        assert!(!p.save(&state_at(now())));
        assert_eq!(p.load(now()), LoadOutcome::Missing);
    }
}
