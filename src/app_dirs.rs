use directories::ProjectDirs;
use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "nback.log";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory for the log file: `$HOME/.local/state/nback` when HOME is
    /// set, else the platform local data dir.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("nback"))
        } else {
            ProjectDirs::from("", "", "nback").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
