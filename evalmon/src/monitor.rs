use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};
use crossbeam_channel::{select, tick, Receiver};
use serde::Serialize;

use evalmon_core::console::console_output;
use evalmon_core::settings::load_payload;
use evalmon_core::source::{cpu_source, memory_source};
use evalmon_core::tables::{load_table, memory_table, process_table, InfoTable};
use evalmon_core::{MetricChannel, MonitorConfig, Poller, RenderFrame, SharedProbe};

use crate::display::Display;

/// Everything the dashboard redraws on one tick
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub taken_at: DateTime<Local>,
    pub frames: Vec<RenderFrame>,
    pub tables: Vec<InfoTable>,
    pub console: String,
}

/// Single owner of the poller. Each tick runs to completion before the
/// next one is received.
pub struct Monitor {
    config: MonitorConfig,
    poller: Poller,
    probe: SharedProbe,
    ticks: u64,
}

impl Monitor {
    pub fn new(config: MonitorConfig, poller: Poller, probe: SharedProbe) -> Self {
        Self {
            config,
            poller,
            probe,
            ticks: 0,
        }
    }

    /// Monitor with the CPU and memory channels backed by `probe`
    pub fn with_system_channels(config: MonitorConfig, probe: SharedProbe) -> Result<Self> {
        let mut poller = Poller::new();
        poller.register(
            MetricChannel::cpu(),
            config.history_len,
            cpu_source(probe.clone()),
        )?;
        poller.register(
            MetricChannel::memory(),
            config.history_len,
            memory_source(probe.clone()),
        )?;
        Ok(Self::new(config, poller, probe))
    }

    pub fn tick(&mut self) -> Snapshot {
        let frames = self.poller.poll_all();
        let tables = self.tables();
        let payload = self.config.settings_path.as_deref().and_then(read_payload);
        let snapshot = Snapshot {
            tick: self.ticks,
            taken_at: Local::now(),
            frames,
            tables,
            console: console_output(payload.as_deref()),
        };
        self.ticks += 1;
        snapshot
    }

    /// Tick at the configured interval until `shutdown` fires or
    /// disconnects, or `max_ticks` is reached. Returns the ticks run.
    pub fn run<D: Display>(&mut self, display: &mut D, shutdown: &Receiver<()>) -> Result<u64> {
        let ticker = tick(self.config.interval());
        let start = self.ticks;
        loop {
            if let Some(max) = self.config.max_ticks {
                if self.ticks - start >= max {
                    break;
                }
            }
            select! {
                recv(ticker) -> _ => {
                    let snapshot = self.tick();
                    display.show(&snapshot)?;
                }
                recv(shutdown) -> _ => {
                    log::info!("shutdown requested");
                    break;
                }
            }
        }
        Ok(self.ticks - start)
    }

    fn tables(&self) -> Vec<InfoTable> {
        let mut probe = match self.probe.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut tables = vec![load_table(&probe.load_average(), probe.cpu_count())];
        match probe.virtual_memory() {
            Ok(mem) => tables.push(memory_table(&mem)),
            Err(e) => log::warn!("memory table skipped: {}", e),
        }
        if !self.config.watched_processes.is_empty() {
            probe.refresh_processes();
        }
        for (i, watched) in self.config.watched_processes.iter().enumerate() {
            let lookup = probe.lookup_process(&watched.name);
            let id = if i == 0 {
                "proc-info".to_string()
            } else {
                format!("proc{}-info", i + 1)
            };
            tables.push(process_table(&id, &watched.title, &lookup));
        }
        tables
    }
}

fn read_payload(path: &Path) -> Option<String> {
    match load_payload(path) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::debug!("{}", e);
            None
        }
    }
}
