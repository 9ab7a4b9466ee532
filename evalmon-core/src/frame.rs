//! Chart descriptions derived from a sample window

use serde::Serialize;

use crate::channel::MetricChannel;
use crate::window::SampleWindow;

/// Percentages are always plotted against a fixed 0..100 axis.
pub const Y_RANGE: (f64, f64) = (0.0, 100.0);

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Immutable redraw payload for one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub channel: String,
    pub label: String,
    pub color: String,
    pub x_range: (u64, u64),
    pub y_range: (f64, f64),
    pub ticks: Vec<u64>,
    pub values: Vec<f64>,
}

impl RenderFrame {
    /// Build a frame from the current window. Returns `None` for an empty
    /// window; the window itself is only read.
    pub fn from_window(channel: &MetricChannel, window: &SampleWindow) -> Option<Self> {
        let x_range = window.tick_range()?;
        Some(Self {
            channel: channel.id().to_string(),
            label: channel.label(),
            color: channel.color().to_string(),
            x_range,
            y_range: Y_RANGE,
            ticks: window.ticks(),
            values: window.values(),
        })
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Text sparkline over the last `width` values. Values are clamped into
    /// `y_range`; NaN renders as the lowest level.
    pub fn sparkline(&self, width: usize) -> String {
        let (y_min, y_max) = self.y_range;
        let y_span = (y_max - y_min).max(1e-6);
        let skip = self.values.len().saturating_sub(width);

        self.values
            .iter()
            .skip(skip)
            .map(|v| {
                let t = if v.is_nan() {
                    0.0
                } else {
                    (v.clamp(y_min, y_max) - y_min) / y_span
                };
                let idx = (t * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
            })
            .collect()
    }
}
