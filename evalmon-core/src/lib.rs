//! evalmon core library
//! Sampling windows, chart frames, system probes and log tailing for the
//! evaluation run monitor

use std::path::PathBuf;

use thiserror::Error;

pub mod channel;
pub mod config;
pub mod console;
pub mod frame;
pub mod poller;
pub mod settings;
pub mod source;
pub mod tables;
pub mod window;

pub use channel::MetricChannel;
pub use config::{MonitorConfig, OutputFormat, WatchedProcess};
pub use frame::RenderFrame;
pub use poller::Poller;
pub use source::{
    MetricSource, ProcessInfo, ProcessLookup, SharedProbe, SourceError, SystemProbe,
};
pub use window::{Sample, SampleWindow, DEFAULT_HISTORY_LEN};

/// evalmon error type
#[derive(Error, Debug)]
pub enum EvalmonError {
    #[error("failed to access config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("channel '{0}' is already registered")]
    DuplicateChannel(String),

    #[error("unknown channel '{0}'")]
    UnknownChannel(String),
}

pub type Result<T, E = EvalmonError> = std::result::Result<T, E>;

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
