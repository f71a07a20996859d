/// Error type for board operations.
///
/// Every operation that returns `Err` has left the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("cannot delete the last column of a project")]
    LastColumn,
    #[error("cannot hide the last visible column")]
    LastVisibleColumn,
    #[error("cannot delete the last project")]
    LastProject,
    #[error("column {column_id} still holds {features} feature(s); confirm to reassign them")]
    ConfirmationRequired { column_id: String, features: usize },
    #[error("user is not on the roster: {0}")]
    UnknownUser(String),
    #[error("no active project")]
    NoActiveProject,
}

impl BoardError {
    pub fn feature(id: &str) -> Self {
        BoardError::NotFound {
            kind: "feature",
            id: id.to_string(),
        }
    }

    pub fn subtask(id: &str) -> Self {
        BoardError::NotFound {
            kind: "subtask",
            id: id.to_string(),
        }
    }

    pub fn column(id: &str) -> Self {
        BoardError::NotFound {
            kind: "column",
            id: id.to_string(),
        }
    }

    pub fn project(id: &str) -> Self {
        BoardError::NotFound {
            kind: "project",
            id: id.to_string(),
        }
    }

    pub fn attachment(id: &str) -> Self {
        BoardError::NotFound {
            kind: "attachment",
            id: id.to_string(),
        }
    }

    /// Referential errors come from stale ids (old drag payloads, double
    /// clicks); the rest are refusals the user should see.
    pub fn is_referential(&self) -> bool {
        matches!(self, BoardError::NotFound { .. })
    }
}
