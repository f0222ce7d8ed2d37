pub mod secrets;

pub use secrets::SecretsConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LogscrubError, Result};
use crate::logging::LogConfig;

/// File name looked up in the working directory when no `--config` is given.
pub const PROJECT_CONFIG: &str = ".logscrub.yml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where diagnostics go and how they are formatted.
    #[serde(default)]
    pub log: LogConfig,

    /// Secrets to scrub from every stream.
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Config {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| LogscrubError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `.logscrub.yml` from the given directory.
    pub fn load_project(dir: &Path) -> Result<Self> {
        Self::load_from(&dir.join(PROJECT_CONFIG))
    }

    /// Explicit path if given, otherwise the project file in the cwd.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(LogscrubError::ConfigParse {
                        path: path.to_path_buf(),
                        reason: "file not found".into(),
                    });
                }
                Self::load_from(path)
            }
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                Self::load_project(&cwd)
            }
        }
    }
}
