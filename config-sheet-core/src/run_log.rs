//! Per-operation log buffer.
//!
//! A [`RunLog`] is created for each export or import, passed by `&mut` into
//! every stage, and finished when the operation completes or fails. Each
//! entry goes to the `log` facade immediately and is also buffered; the buffer
//! is flushed to a [`LogSink`] whenever it reaches the flush threshold and
//! once more on [`RunLog::finish`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::Level;

const DEFAULT_FLUSH_THRESHOLD: usize = 50;

/// A single buffered log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub timestamp: String,
    pub message: String,
}

/// Destination for flushed entries.
pub trait LogSink {
    fn write_entries(&mut self, entries: &[LogEntry]) -> std::io::Result<()>;
}

/// Discards everything; the `log` facade still sees each entry.
#[derive(Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write_entries(&mut self, _entries: &[LogEntry]) -> std::io::Result<()> {
        Ok(())
    }
}

/// Appends entries to a text file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSink for FileSink {
    fn write_entries(&mut self, entries: &[LogEntry]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for entry in entries {
            writeln!(
                file,
                "{} [{:<5}] {}",
                entry.timestamp, entry.level, entry.message
            )?;
        }
        Ok(())
    }
}

/// Keeps flushed entries in shared memory; handy for tests and UIs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_entries(&mut self, entries: &[LogEntry]) -> std::io::Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| std::io::Error::other("memory sink poisoned"))?;
        guard.extend_from_slice(entries);
        Ok(())
    }
}

/// Counts of what was logged during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

/// Buffered logger owned by one operation.
pub struct RunLog {
    operation: String,
    buffer: Vec<LogEntry>,
    flush_threshold: usize,
    sink: Box<dyn LogSink>,
    summary: RunSummary,
}

impl RunLog {
    pub fn new(operation: impl Into<String>, sink: Box<dyn LogSink>) -> Self {
        Self {
            operation: operation.into(),
            buffer: Vec::new(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            sink,
            summary: RunSummary::default(),
        }
    }

    /// A run log that only forwards to the `log` facade.
    pub fn silent(operation: impl Into<String>) -> Self {
        Self::new(operation, Box::new(NullSink))
    }

    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold.max(1);
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn log(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(level, "[{}] {}", self.operation, message);

        match level {
            Level::Error => self.summary.errors += 1,
            Level::Warn => self.summary.warnings += 1,
            Level::Info => self.summary.infos += 1,
            _ => {}
        }

        self.buffer.push(LogEntry {
            level,
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            message,
        });
        if self.buffer.len() >= self.flush_threshold {
            self.flush();
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Entries not yet flushed.
    pub fn pending(&self) -> &[LogEntry] {
        &self.buffer
    }

    /// Push buffered entries to the sink. Sink failures are reported through
    /// the `log` facade and the buffer is dropped either way.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        if let Err(e) = self.sink.write_entries(&self.buffer) {
            log::warn!("Failed to flush run log for {}: {e}", self.operation);
        }
        self.buffer.clear();
    }

    /// Flush remaining entries and return the run summary.
    pub fn finish(mut self) -> RunSummary {
        self.flush();
        self.summary
    }
}

impl std::fmt::Debug for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLog")
            .field("operation", &self.operation)
            .field("pending", &self.buffer.len())
            .field("summary", &self.summary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_at_threshold_and_on_finish() {
        let sink = MemorySink::new();
        let mut run = RunLog::new("export", Box::new(sink.clone())).with_flush_threshold(2);

        run.info("one");
        assert_eq!(sink.entries().len(), 0);
        run.warn("two");
        assert_eq!(sink.entries().len(), 2);
        assert!(run.pending().is_empty());

        run.error("three");
        let summary = run.finish();
        assert_eq!(sink.entries().len(), 3);
        assert_eq!(
            summary,
            RunSummary {
                errors: 1,
                warnings: 1,
                infos: 1
            }
        );
    }

    #[test]
    fn debug_entries_are_buffered_but_not_counted() {
        let mut run = RunLog::silent("import");
        run.debug("detail");
        assert_eq!(run.pending().len(), 1);
        assert_eq!(run.summary(), RunSummary::default());
    }

    #[test]
    fn file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let mut run = RunLog::new("export", Box::new(FileSink::new(&path)));
        run.warn("icon missing for 'river'");
        run.finish();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("WARN"));
        assert!(contents.contains("icon missing for 'river'"));
    }
}
