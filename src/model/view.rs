use serde::{Deserialize, Serialize};

/// Board orientation: columns side by side, or stacked lanes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Vertical,
    Horizontal,
}

impl ViewMode {
    pub fn toggled(self) -> ViewMode {
        match self {
            ViewMode::Vertical => ViewMode::Horizontal,
            ViewMode::Horizontal => ViewMode::Vertical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Vertical => "vertical",
            ViewMode::Horizontal => "horizontal",
        }
    }
}

/// Per-session view preferences, persisted alongside the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewPrefs {
    pub view_mode: ViewMode,
    /// Only show features this user works on
    pub filter_by_user: Option<String>,
}
