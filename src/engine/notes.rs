use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::ops::ItemRef;

use super::debounce::Debouncer;

/// Identifies one note: its project plus the feature or subtask that owns it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteOwner {
    pub project_id: String,
    pub item: ItemRef,
}

impl NoteOwner {
    pub fn new(project_id: impl Into<String>, item: ItemRef) -> Self {
        NoteOwner {
            project_id: project_id.into(),
            item,
        }
    }
}

/// A note edit whose quiet period has elapsed, ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNote {
    pub owner: NoteOwner,
    pub content: String,
    pub editor: String,
}

#[derive(Debug)]
struct Draft {
    content: String,
    editor: String,
    timer: Debouncer,
}

/// Debounced note auto-save, one timer per note owner.
///
/// Typing into two notes at once keeps two independent timers; cancelling
/// one leaves the other alone.
#[derive(Debug)]
pub struct NoteAutosave {
    quiet: Duration,
    drafts: IndexMap<NoteOwner, Draft>,
}

impl NoteAutosave {
    pub fn new(quiet: Duration) -> Self {
        NoteAutosave {
            quiet,
            drafts: IndexMap::new(),
        }
    }

    /// Record the latest text for `owner` and restart its timer
    pub fn edit(&mut self, owner: NoteOwner, content: impl Into<String>, editor: impl Into<String>, now: Instant) {
        let quiet = self.quiet;
        let draft = self.drafts.entry(owner).or_insert_with(|| Draft {
            content: String::new(),
            editor: String::new(),
            timer: Debouncer::new(quiet),
        });
        draft.content = content.into();
        draft.editor = editor.into();
        draft.timer.schedule(now);
    }

    /// Drop a pending edit without saving it. Returns true if one was pending.
    pub fn cancel(&mut self, owner: &NoteOwner) -> bool {
        self.drafts.shift_remove(owner).is_some()
    }

    /// Drop every pending edit on a feature and its subtasks (the feature
    /// was deleted). Returns how many were dropped.
    pub fn cancel_feature(&mut self, project_id: &str, feature_id: &str) -> usize {
        let before = self.drafts.len();
        self.drafts
            .retain(|o, _| !(o.project_id == project_id && o.item.feature_id() == feature_id));
        before - self.drafts.len()
    }

    /// Take every draft whose quiet period has elapsed, oldest edit first
    pub fn due(&mut self, now: Instant) -> Vec<PendingNote> {
        let due: Vec<NoteOwner> = self
            .drafts
            .iter()
            .filter(|(_, d)| d.timer.is_due(now))
            .map(|(o, _)| o.clone())
            .collect();
        due.into_iter()
            .filter_map(|owner| self.take(&owner))
            .collect()
    }

    /// Take every draft regardless of its timer (quit, explicit flush)
    pub fn flush_all(&mut self) -> Vec<PendingNote> {
        self.drafts
            .drain(..)
            .map(|(owner, d)| PendingNote {
                owner,
                content: d.content,
                editor: d.editor,
            })
            .collect()
    }

    /// Unsaved text for `owner`, if any
    pub fn pending(&self, owner: &NoteOwner) -> Option<&str> {
        self.drafts.get(owner).map(|d| d.content.as_str())
    }

    /// Time until the soonest draft is due
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.drafts.values().filter_map(|d| d.timer.remaining(now)).min()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    fn take(&mut self, owner: &NoteOwner) -> Option<PendingNote> {
        let (owner, d) = self.drafts.shift_remove_entry(owner)?;
        Some(PendingNote {
            owner,
            content: d.content,
            editor: d.editor,
        })
    }
}
