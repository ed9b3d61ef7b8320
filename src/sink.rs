use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::LoggerError;

/// Line-oriented destination for rendered log lines.
///
/// Cloning a `Sink` shares the underlying writer; a line is written with a single
/// `write_all` while holding the writer's lock, so lines from different threads never
/// interleave mid-line.
#[derive(Clone)]
pub struct Sink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    prefix: String,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
            prefix: String::new(),
        }
    }

    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Text written in front of every line, before any color escape.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Writes one line, adding the trailing newline when it is missing.
    pub fn output(&self, line: &str) -> Result<(), LoggerError> {
        let mut buf = String::with_capacity(self.prefix.len() + line.len() + 1);
        buf.push_str(&self.prefix);
        buf.push_str(line);
        if !buf.ends_with('\n') {
            buf.push('\n');
        }

        let mut out = self.out.lock()?;
        out.write_all(buf.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), LoggerError> {
        self.out.lock()?.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::stderr()
    }
}
