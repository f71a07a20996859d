use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

pub const CONFIG_FILE: &str = "config.toml";
pub const DATA_DIR_ENV: &str = "PLANK_DIR";
pub const DEFAULT_DATA_DIR: &str = ".plank";

/// Written by `plank init`
pub const DEFAULT_CONFIG: &str = r##"[storage]
debounce_ms = 1000
note_debounce_ms = 800
stale_after_days = 30

[ui]
current_user = "me"
show_key_hints = true

[[users]]
id = "me"
name = "Me"
color = "#6366f1"
role = "owner"
"##;

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Pick the data directory: explicit flag, then `PLANK_DIR`, then `./.plank`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Read `config.toml` from the data directory. A missing file yields the
/// defaults; a malformed one is an error.
pub fn read_config(data_dir: &Path) -> Result<BoardConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(BoardConfig::default());
        }
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    parse_config(&text).map_err(|source| ConfigError::ParseError { path, source })
}

pub fn parse_config(text: &str) -> Result<BoardConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Create the data directory with a starter `config.toml`
pub fn init_data_dir(data_dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path));
    }
    fs::create_dir_all(data_dir)?;
    fs::write(&path, DEFAULT_CONFIG)?;
    Ok(path)
}
