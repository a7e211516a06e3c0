use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EngineError;
use crate::session::{
    SessionConfig, DEFAULT_LEVEL, DEFAULT_MAX_TICKS, DEFAULT_TICK_INTERVAL_MS,
};
use crate::stimulus::{Alphabet, DEFAULT_ALPHABET};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Launch settings, stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub level: usize,
    pub max_ticks: u32,
    pub tick_interval_ms: u64,
    pub alphabet: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_ticks: DEFAULT_MAX_TICKS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            alphabet: DEFAULT_ALPHABET.iter().collect(),
        }
    }
}

impl Config {
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        Ok(SessionConfig::new(
            self.level,
            self.max_ticks,
            Duration::from_millis(self.tick_interval_ms),
        )?)
    }

    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        Ok(Alphabet::parse(&self.alphabet)?)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "nback") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("nback_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unparsable files fall back to defaults
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
