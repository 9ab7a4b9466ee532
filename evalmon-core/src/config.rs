//! Monitor configuration persisted as JSON

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::window::DEFAULT_HISTORY_LEN;
use crate::{EvalmonError, Result};

/// A process shown in the process info tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedProcess {
    pub name: String,
    pub title: String,
}

/// How the binary prints each snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable sparklines and tables
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_ms: u64,
    pub history_len: usize,
    /// File the configuration UI writes its settings payload to
    pub settings_path: Option<PathBuf>,
    pub watched_processes: Vec<WatchedProcess>,
    /// Stop after this many ticks; runs until shut down when unset
    pub max_ticks: Option<u64>,
    pub output: OutputFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            history_len: DEFAULT_HISTORY_LEN,
            settings_path: None,
            watched_processes: vec![
                WatchedProcess {
                    name: "index".to_string(),
                    title: "EvalNE-UI Process Info".to_string(),
                },
                WatchedProcess {
                    name: "evalne".to_string(),
                    title: "EvalNE Process Info".to_string(),
                },
            ],
            max_ticks: None,
            output: OutputFormat::Json,
        }
    }
}

impl MonitorConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(EvalmonError::ConfigIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| EvalmonError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| EvalmonError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            EvalmonError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(io_err)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}
