pub mod column_ops;
pub mod error;
pub mod feature_ops;
pub mod project_ops;
pub mod subtask_ops;

pub use error::BoardError;

use serde::{Deserialize, Serialize};

/// Something that can own attachments and a note: a feature or one of its subtasks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemRef {
    Feature {
        feature_id: String,
    },
    Subtask {
        feature_id: String,
        subtask_id: String,
    },
}

impl ItemRef {
    pub fn feature(feature_id: impl Into<String>) -> Self {
        ItemRef::Feature {
            feature_id: feature_id.into(),
        }
    }

    pub fn subtask(feature_id: impl Into<String>, subtask_id: impl Into<String>) -> Self {
        ItemRef::Subtask {
            feature_id: feature_id.into(),
            subtask_id: subtask_id.into(),
        }
    }

    /// The feature that owns (or is) this item
    pub fn feature_id(&self) -> &str {
        match self {
            ItemRef::Feature { feature_id } | ItemRef::Subtask { feature_id, .. } => feature_id,
        }
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Feature { feature_id } => write!(f, "{}", feature_id),
            ItemRef::Subtask {
                feature_id,
                subtask_id,
            } => write!(f, "{}/{}", feature_id, subtask_id),
        }
    }
}

/// Generate a fresh id with a readable prefix, e.g. `feat-V1StGXR8`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!(8))
}

/// Reject blank required text fields before any mutation happens
pub fn require_text(field: &str, value: &str) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
