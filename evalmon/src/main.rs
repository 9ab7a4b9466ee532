use std::path::PathBuf;

use anyhow::{Context, Result};
use evalmon_core::{MonitorConfig, OutputFormat, SystemProbe};

mod display;
mod monitor;

use crate::display::{JsonLinesDisplay, TextDisplay};
use crate::monitor::Monitor;

const CONFIG_ENV: &str = "EVALMON_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "evalmon.json";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = MonitorConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    log::info!(
        "evalmon {} sampling every {} ms, history {}",
        evalmon_core::version(),
        config.interval_ms,
        config.history_len
    );

    let output = config.output;
    let mut monitor = Monitor::with_system_channels(config, SystemProbe::shared())
        .context("failed to set up metric channels")?;

    // Runs until max_ticks is reached or the process is terminated.
    let shutdown = crossbeam_channel::never();
    let stdout = std::io::stdout().lock();
    let ticks = match output {
        OutputFormat::Json => monitor.run(&mut JsonLinesDisplay::new(stdout), &shutdown)?,
        OutputFormat::Text => monitor.run(&mut TextDisplay::new(stdout), &shutdown)?,
    };

    log::info!("monitor stopped after {} ticks", ticks);
    Ok(())
}
