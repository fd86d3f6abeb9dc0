use std::io::Write;
use std::sync::Mutex;
use tracing::info;

/// A human-readable log sink for queries and reported matches.
///
/// Created once by whoever hosts the filesystem and handed to it at
/// construction; there is no global instance.
pub trait OutputChannel: Send + Sync {
    fn append_line(&self, line: &str);
}

/// Forwards every line to `tracing` under the `samplefs::output` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingChannel;

impl OutputChannel for TracingChannel {
    fn append_line(&self, line: &str) {
        info!(target: "samplefs::output", "{}", line);
    }
}

/// Writes every line to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrChannel;

impl OutputChannel for StderrChannel {
    fn append_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr is not worth failing a search over
        let _ = writeln!(stderr, "{}", line);
    }
}

/// Keeps lines in memory, in the order they were appended
#[derive(Debug, Default)]
pub struct MemoryChannel {
    lines: Mutex<Vec<String>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl OutputChannel for MemoryChannel {
    fn append_line(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
