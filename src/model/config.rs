use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::user::User;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// The user roster
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Quiet period before a pending board write is flushed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Quiet period before a note edit is saved
    #[serde(default = "default_note_debounce_ms")]
    pub note_debounce_ms: u64,
    /// Stored boards older than this are discarded on load
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            debounce_ms: default_debounce_ms(),
            note_debounce_ms: default_note_debounce_ms(),
            stale_after_days: default_stale_after_days(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_note_debounce_ms() -> u64 {
    800
}

fn default_stale_after_days() -> i64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// User id the TUI and CLI act as (attachments, notes, new projects)
    #[serde(default)]
    pub current_user: Option<String>,
    /// Show the key hint line at the bottom of the TUI
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Theme overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: IndexMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            current_user: None,
            show_key_hints: true,
            colors: IndexMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
