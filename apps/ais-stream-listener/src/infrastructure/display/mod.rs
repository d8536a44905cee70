//! Display Surface Adapters
//!
//! - `StdoutDisplay`: one line per report on standard output
//! - `MemoryDisplay`: unbounded in-memory list of lines

use std::io::Write;

use parking_lot::Mutex;

use crate::application::ports::DisplaySurface;
use crate::domain::position::RenderedLine;

/// Writes each line to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDisplay;

impl StdoutDisplay {
    /// Create a stdout display.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DisplaySurface for StdoutDisplay {
    fn append_line(&self, line: &RenderedLine) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}") {
            tracing::warn!(error = %e, "Failed to write position line");
        }
    }
}

/// Keeps every appended line in memory, in arrival order.
///
/// Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    lines: Mutex<Vec<String>>,
}

impl MemoryDisplay {
    /// Create an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all lines appended so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of lines appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether no line has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl DisplaySurface for MemoryDisplay {
    fn append_line(&self, line: &RenderedLine) {
        self.lines.lock().push(line.as_str().to_string());
    }
}
