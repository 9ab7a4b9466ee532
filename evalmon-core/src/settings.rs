//! Settings payload produced by the configuration UI
//!
//! The payload is a JSON-encoded array. Index 1 holds the directory the
//! evaluation writes its output to; an empty string means the current
//! working directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

const OUTPUT_DIR_INDEX: usize = 1;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("no settings payload")]
    Missing,

    #[error("settings payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings payload is not an array")]
    NotAnArray,

    #[error("settings payload has no output directory at index 1")]
    NoOutputDir,

    #[error("cannot resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("cannot read settings payload {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the evaluation output directory from a raw payload.
pub fn eval_output_dir(raw: Option<&str>) -> Result<PathBuf, SettingsError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(SettingsError::Missing)?;

    let value: Value = serde_json::from_str(raw)?;
    let items = value.as_array().ok_or(SettingsError::NotAnArray)?;
    let dir = items
        .get(OUTPUT_DIR_INDEX)
        .and_then(Value::as_str)
        .ok_or(SettingsError::NoOutputDir)?;

    if dir.is_empty() {
        std::env::current_dir().map_err(SettingsError::CurrentDir)
    } else {
        Ok(PathBuf::from(dir))
    }
}

/// Read the payload the configuration UI persisted to `path`.
pub fn load_payload(path: &Path) -> Result<String, SettingsError> {
    fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })
}
