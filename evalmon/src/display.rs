use std::io::Write;

use anyhow::{Context, Result};

use crate::monitor::Snapshot;

const SPARKLINE_WIDTH: usize = 40;

/// Consumer of dashboard snapshots
pub trait Display {
    fn show(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Writes one JSON object per snapshot, one per line.
pub struct JsonLinesDisplay<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for JsonLinesDisplay<W> {
    fn show(&mut self, snapshot: &Snapshot) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot).context("failed to encode snapshot")?;
        self.out
            .write_all(b"\n")
            .and_then(|_| self.out.flush())
            .context("failed to write snapshot")
    }
}

/// Plain-text dashboard: one sparkline per channel, then the info tables
/// and the console tail.
pub struct TextDisplay<W: Write> {
    out: W,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        writeln!(
            self.out,
            "== tick {} @ {}",
            snapshot.tick,
            snapshot.taken_at.format("%H:%M:%S")
        )?;
        for frame in &snapshot.frames {
            let current = frame
                .latest()
                .map(|v| format!("{v:.1}"))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                self.out,
                "{:<20} {:<width$} {:>6}",
                frame.label,
                frame.sparkline(SPARKLINE_WIDTH),
                current,
                width = SPARKLINE_WIDTH
            )?;
        }
        for table in &snapshot.tables {
            if let Some(title) = &table.title {
                writeln!(self.out, "-- {title}")?;
            }
            for (label, value) in &table.rows {
                writeln!(self.out, "   {label} {value}")?;
            }
        }
        writeln!(self.out, "{}", snapshot.console)?;
        self.out.flush()
    }
}

impl<W: Write> Display for TextDisplay<W> {
    fn show(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.write_snapshot(snapshot)
            .context("failed to write snapshot")
    }
}
