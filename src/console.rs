//! Where formatted output goes.

use std::io::{self, Write};

/// Text sink for user-facing output.
pub trait Console {
    fn write_str(&mut self, text: &str) -> io::Result<()>;
}

/// Writes to the process's standard output.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

/// Collects output in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    buffer: String,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }
}

impl Console for MemoryConsole {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}
