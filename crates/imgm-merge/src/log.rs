use std::io::{self, Write};

use imgm_types::AnomalyEntry;

/// Line-oriented anomaly log sink.
///
/// One entry per line, `\n`-terminated, in the order recorded.
pub struct AnomalyLog<W> {
    sink: W,
    lines: u64,
}

impl<W: Write> AnomalyLog<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, lines: 0 }
    }

    /// Append one entry.
    pub fn record(&mut self, entry: &AnomalyEntry) -> io::Result<()> {
        writeln!(self.sink, "{entry}")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
