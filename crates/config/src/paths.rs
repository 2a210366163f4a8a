//! Well-known paths

use std::path::PathBuf;

/// Data directory (~/.actionloop)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".actionloop")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default workspace for the built-in actions
pub fn workspace_path() -> PathBuf {
    data_dir().join("workspace")
}

/// Default root of the file cache
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}
