//! Metric channel identity

use serde::Serialize;

pub const CPU_CHANNEL_ID: &str = "cpu";
pub const MEMORY_CHANNEL_ID: &str = "memory";

/// One tracked quantity. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricChannel {
    id: String,
    name: String,
    unit: String,
    color: String,
}

impl MetricChannel {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            color: color.into(),
        }
    }

    /// System-wide CPU utilisation
    pub fn cpu() -> Self {
        Self::new(CPU_CHANNEL_ID, "CPU Usage", "%", "limegreen")
    }

    /// Virtual memory utilisation
    pub fn memory() -> Self {
        Self::new(MEMORY_CHANNEL_ID, "Memory Usage", "%", "gold")
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Chart title, e.g. "CPU Usage (%)"
    pub fn label(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.unit)
        }
    }
}
