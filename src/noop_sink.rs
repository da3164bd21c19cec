use crate::sink::LineSink;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::error::Error;
use std::sync::Arc;

/// A sink that simply drops all lines.
///
/// Useful for measuring the overhead of formatting and queueing without
/// any I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LineSink for NoopSink {
    async fn write_line(&self, _line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn is_file(&self) -> bool {
        true
    }
}

/// A sink that keeps every line in memory, for tests.
///
/// Clones share the same buffer. By default it behaves like a file
/// destination (no colors); [`console`](Self::console) makes it behave like
/// a terminal.
#[derive(Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
    console: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn console() -> Self {
        Self {
            console: true,
            ..Self::default()
        }
    }

    /// All lines written so far, terminators included.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

#[async_trait]
impl LineSink for CaptureSink {
    async fn write_line(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn is_file(&self) -> bool {
        !self.console
    }
}
