//! Label/value tables shown beside the charts

use serde::Serialize;

use crate::source::{LoadAverage, ProcessLookup, VirtualMemory};

const GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoTable {
    pub id: String,
    pub title: Option<String>,
    pub columns: Option<Vec<String>>,
    pub rows: Vec<(String, String)>,
}

impl InfoTable {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            columns: None,
            rows: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push((label.into(), value.into()));
        self
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Load averages as a percentage of the available CPUs
pub fn load_table(load: &LoadAverage, cpu_count: usize) -> InfoTable {
    let cpus = cpu_count.max(1) as f64;
    let pct = |x: f64| format!("{:.2} %", x / cpus * 100.0);
    InfoTable::new("cpu-info")
        .row("Load average (1 min): ", pct(load.one))
        .row("Load average (5 min): ", pct(load.five))
        .row("Load average (15 min): ", pct(load.fifteen))
}

pub fn memory_table(mem: &VirtualMemory) -> InfoTable {
    let gb = |bytes: u64| format!("{:.2} GB", bytes as f64 / GB);
    InfoTable::new("mem-info")
        .row("Used Memory: ", gb(mem.used))
        .row("Available Memory: ", gb(mem.available))
        .row("Total Memory: ", gb(mem.total))
}

pub fn process_table(id: &str, title: &str, lookup: &ProcessLookup) -> InfoTable {
    let table = InfoTable::new(id).with_title(title);
    match lookup {
        ProcessLookup::Found(info) => info
            .iter()
            .fold(table, |table, (key, value)| table.row(key, value)),
        ProcessLookup::NotFound { .. } => table.row("Status", "Process not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ProcessInfo;

    #[test]
    fn load_is_scaled_by_cpu_count() {
        let load = LoadAverage {
            one: 2.0,
            five: 1.0,
            fifteen: 0.5,
        };
        let table = load_table(&load, 4);
        assert_eq!(table.value("Load average (1 min): "), Some("50.00 %"));
        assert_eq!(table.value("Load average (15 min): "), Some("12.50 %"));
    }

    #[test]
    fn zero_cpus_does_not_divide_by_zero() {
        let load = LoadAverage {
            one: 1.0,
            five: 1.0,
            fifteen: 1.0,
        };
        assert_eq!(
            load_table(&load, 0).value("Load average (5 min): "),
            Some("100.00 %")
        );
    }

    #[test]
    fn memory_is_reported_in_gigabytes() {
        let mem = VirtualMemory {
            used: 3 * 1024 * 1024 * 1024,
            available: 1024 * 1024 * 1024 / 2,
            total: 4 * 1024 * 1024 * 1024,
        };
        let table = memory_table(&mem);
        assert_eq!(table.value("Used Memory: "), Some("3.00 GB"));
        assert_eq!(table.value("Available Memory: "), Some("0.50 GB"));
        assert_eq!(table.value("Total Memory: "), Some("4.00 GB"));
    }

    #[test]
    fn process_table_lists_fields_or_not_found() {
        let mut info = ProcessInfo::default();
        info.push("Name", "evalne");
        info.push("PID", "1234");
        let found = process_table("proc-info", "EvalNE Process Info", &ProcessLookup::Found(info));
        assert_eq!(found.title.as_deref(), Some("EvalNE Process Info"));
        assert_eq!(found.rows.len(), 2);
        assert_eq!(found.value("PID"), Some("1234"));

        let missing = process_table(
            "proc2-info",
            "EvalNE Process Info",
            &ProcessLookup::NotFound {
                name: "evalne".to_string(),
            },
        );
        assert_eq!(missing.rows, vec![("Status".to_string(), "Process not found".to_string())]);
    }

    #[test]
    fn columns_are_optional() {
        let table = InfoTable::new("t").with_columns(&["Key", "Value"]);
        assert_eq!(table.columns.unwrap(), vec!["Key", "Value"]);
        assert!(InfoTable::new("u").columns.is_none());
    }
}
