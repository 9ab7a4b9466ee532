//! Metric sources: the fetch capability the poller consumes and the
//! sysinfo-backed system probe

use std::ffi::OsStr;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("metric source unavailable: {0}")]
    Unavailable(String),

    #[error("process '{0}' not found")]
    ProcessNotFound(String),

    #[error("system probe lock poisoned")]
    Poisoned,
}

/// Anything that can produce one numeric reading per poll.
pub trait MetricSource: Send {
    fn sample(&mut self) -> Result<f64, SourceError>;
}

impl<F> MetricSource for F
where
    F: FnMut() -> Result<f64, SourceError> + Send,
{
    fn sample(&mut self) -> Result<f64, SourceError> {
        self()
    }
}

/// Virtual memory usage in bytes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VirtualMemory {
    pub used: u64,
    pub available: u64,
    pub total: u64,
}

impl VirtualMemory {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.total - self.available.min(self.total)) as f64 / self.total as f64 * 100.0
    }
}

/// 1, 5 and 15 minute load averages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Key/value fields describing one process, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessInfo {
    fields: Vec<(String, String)>,
}

impl ProcessInfo {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of looking a process up by name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessLookup {
    Found(ProcessInfo),
    NotFound { name: String },
}

impl ProcessLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, ProcessLookup::Found(_))
    }
}

/// Reads OS-level metrics through sysinfo.
pub struct SystemProbe {
    sys: System,
    cpu_count: usize,
}

pub type SharedProbe = Arc<Mutex<SystemProbe>>;

impl SystemProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        // CPU usage is a delta; the first refresh only sets the baseline.
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            sys,
            cpu_count: num_cpus::get().max(1),
        }
    }

    pub fn shared() -> SharedProbe {
        Arc::new(Mutex::new(Self::new()))
    }

    /// System-wide CPU utilisation since the previous call, 0..100
    pub fn cpu_percent(&mut self) -> Result<f64, SourceError> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(SourceError::Unavailable(
                "no CPU statistics reported".to_string(),
            ));
        }
        Ok(self.sys.global_cpu_usage() as f64)
    }

    pub fn virtual_memory(&mut self) -> Result<VirtualMemory, SourceError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable(
                "no memory statistics reported".to_string(),
            ));
        }
        Ok(VirtualMemory {
            used: self.sys.used_memory(),
            available: self.sys.available_memory(),
            total,
        })
    }

    pub fn load_average(&self) -> LoadAverage {
        let load = System::load_average();
        LoadAverage {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }
    }

    pub fn cpu_count(&self) -> usize {
        self.cpu_count
    }

    /// Rescan the process table. Command line, working directory and
    /// executable are only read for processes first seen in this scan.
    pub fn refresh_processes(&mut self) {
        let kind = ProcessRefreshKind::nothing()
            .with_cpu()
            .with_memory()
            .with_cmd(UpdateKind::OnlyIfNotSet)
            .with_cwd(UpdateKind::OnlyIfNotSet)
            .with_exe(UpdateKind::OnlyIfNotSet);
        self.sys
            .refresh_processes_specifics(ProcessesToUpdate::All, true, kind);
    }

    /// Look up the first process (lowest pid) whose executable name or
    /// command line contains `name`, rescanning the process table first.
    pub fn process_info(&mut self, name: &str) -> ProcessLookup {
        self.refresh_processes();
        self.lookup_process(name)
    }

    /// Same as [`process_info`](Self::process_info) against the table from
    /// the last [`refresh_processes`](Self::refresh_processes).
    pub fn lookup_process(&self, name: &str) -> ProcessLookup {
        match self.find_process(name) {
            Some(process) => ProcessLookup::Found(describe_process(process, self.cpu_count)),
            None => ProcessLookup::NotFound {
                name: name.to_string(),
            },
        }
    }

    /// CPU utilisation of a named process, normalised to 0..100
    pub fn process_cpu_percent(&mut self, name: &str) -> Result<f64, SourceError> {
        self.refresh_processes();
        self.find_process(name)
            .map(|p| p.cpu_usage() as f64 / self.cpu_count as f64)
            .ok_or_else(|| SourceError::ProcessNotFound(name.to_string()))
    }

    fn find_process(&self, name: &str) -> Option<&Process> {
        if name.is_empty() {
            return None;
        }
        let mut matches: Vec<(&Pid, &Process)> = self
            .sys
            .processes()
            .iter()
            .filter(|(_, p)| process_matches(p.name(), p.cmd(), name))
            .collect();
        matches.sort_by_key(|(pid, _)| pid.as_u32());
        matches.into_iter().next().map(|(_, p)| p)
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn process_matches(exe_name: &OsStr, cmd: &[std::ffi::OsString], needle: &str) -> bool {
    exe_name.to_string_lossy().contains(needle)
        || cmd.iter().any(|arg| arg.to_string_lossy().contains(needle))
}

fn describe_process(process: &Process, cpu_count: usize) -> ProcessInfo {
    let mut info = ProcessInfo::default();
    info.push("Name", process.name().to_string_lossy());
    info.push("PID", process.pid().to_string());
    if let Some(parent) = process.parent() {
        info.push("Parent PID", parent.to_string());
    }
    info.push("Status", process.status().to_string());
    info.push(
        "CPU (%)",
        format!("{:.2}", process.cpu_usage() as f64 / cpu_count.max(1) as f64),
    );
    info.push(
        "Memory (MB)",
        format!("{:.2}", process.memory() as f64 / (1024.0 * 1024.0)),
    );
    info.push("Run time (s)", process.run_time().to_string());
    if let Some(cwd) = process.cwd() {
        info.push("Working dir", cwd.display().to_string());
    }
    let cmdline = process
        .cmd()
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    if !cmdline.is_empty() {
        info.push("Command line", cmdline);
    }
    info
}

fn lock(probe: &SharedProbe) -> Result<std::sync::MutexGuard<'_, SystemProbe>, SourceError> {
    probe.lock().map_err(|_| SourceError::Poisoned)
}

/// CPU channel source backed by a shared probe
pub fn cpu_source(probe: SharedProbe) -> impl MetricSource {
    move || -> Result<f64, SourceError> { lock(&probe)?.cpu_percent() }
}

/// Memory channel source backed by a shared probe
pub fn memory_source(probe: SharedProbe) -> impl MetricSource {
    move || -> Result<f64, SourceError> { Ok(lock(&probe)?.virtual_memory()?.percent()) }
}

/// Per-process CPU source; fails while the process is not running
pub fn process_cpu_source(probe: SharedProbe, name: impl Into<String>) -> impl MetricSource {
    let name = name.into();
    move || -> Result<f64, SourceError> { lock(&probe)?.process_cpu_percent(&name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn memory_percent_uses_available() {
        let mem = VirtualMemory {
            used: 6,
            available: 2,
            total: 8,
        };
        assert_eq!(mem.percent(), 75.0);
    }

    #[test]
    fn memory_percent_of_zero_total_is_zero() {
        let mem = VirtualMemory {
            used: 0,
            available: 0,
            total: 0,
        };
        assert_eq!(mem.percent(), 0.0);
    }

    #[test]
    fn closures_are_metric_sources() {
        let mut n = 0.0;
        let mut src = move || -> Result<f64, SourceError> {
            n += 1.0;
            Ok(n)
        };
        assert_eq!(MetricSource::sample(&mut src), Ok(1.0));
        assert_eq!(MetricSource::sample(&mut src), Ok(2.0));
    }

    #[test]
    fn process_matching_checks_name_and_cmdline() {
        let cmd = vec![OsString::from("python"), OsString::from("/srv/ui/index.py")];
        assert!(process_matches(OsStr::new("python3"), &cmd, "index"));
        assert!(process_matches(OsStr::new("evalne"), &[], "evalne"));
        assert!(!process_matches(OsStr::new("bash"), &cmd, "evalne"));
    }

    #[test]
    fn process_info_preserves_field_order() {
        let mut info = ProcessInfo::default();
        info.push("Name", "evalne");
        info.push("PID", "42");
        assert_eq!(info.get("PID"), Some("42"));
        let keys: Vec<&str> = info.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["Name", "PID"]);
    }

    #[test]
    fn unknown_process_is_explicitly_not_found() {
        let mut probe = SystemProbe::new();
        let lookup = probe.process_info("no-such-process-evalmon-7f3a9c");
        assert_eq!(
            lookup,
            ProcessLookup::NotFound {
                name: "no-such-process-evalmon-7f3a9c".to_string()
            }
        );
        assert_eq!(
            probe.process_cpu_percent("no-such-process-evalmon-7f3a9c"),
            Err(SourceError::ProcessNotFound(
                "no-such-process-evalmon-7f3a9c".to_string()
            ))
        );
    }

    /// Full path of the running test binary. The kernel's short process
    /// name never contains a path separator, so only the command line can
    /// match it.
    fn own_argv0() -> String {
        std::env::args().next().unwrap()
    }

    #[test]
    fn finds_own_process_by_command_line() {
        let needle = own_argv0();
        let mut probe = SystemProbe::new();
        match probe.process_info(&needle) {
            ProcessLookup::Found(info) => {
                assert!(info.get("Command line").unwrap().contains(&needle));
                assert!(info.get("PID").is_some());
            }
            ProcessLookup::NotFound { .. } => panic!("own process not found by argv"),
        }
        assert!(probe.process_cpu_percent(&needle).is_ok());
    }

    #[test]
    fn lookup_uses_last_scan_without_rescanning() {
        let needle = own_argv0();
        let mut probe = SystemProbe::new();
        assert!(!probe.lookup_process(&needle).is_found());

        probe.refresh_processes();
        assert!(probe.lookup_process(&needle).is_found());
        assert!(!probe.lookup_process("no-such-process-evalmon-0d41").is_found());
    }

    #[test]
    fn empty_name_never_matches() {
        let mut probe = SystemProbe::new();
        assert!(!probe.process_info("").is_found());
    }

    #[test]
    fn probe_reports_sane_memory() {
        let mut probe = SystemProbe::new();
        if let Ok(mem) = probe.virtual_memory() {
            assert!(mem.total > 0);
            assert!(mem.available <= mem.total);
        }
        assert!(probe.cpu_count() >= 1);
    }
}
