use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use crossterm::style::Stylize;

use crate::state::LogLevel;

pub const BEGIN_BANNER: &str = "--Begin testing---------------------";
pub const END_BANNER: &str = "--End testing-----------------------";

/// Console sink for harness output. Colors are only emitted when enabled,
/// so CI logs stay free of escape sequences.
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn log(&mut self, level: LogLevel, msg: impl Display) {
        let text = msg.to_string();
        let line = if self.color {
            match level {
                LogLevel::Info => text,
                LogLevel::Success => text.green().to_string(),
                LogLevel::Warn => text.yellow().to_string(),
                LogLevel::Error => text.red().to_string(),
            }
        } else {
            text
        };
        let _ = writeln!(self.out, "{}", line);
    }

    pub fn begin(&mut self) {
        self.log(LogLevel::Info, BEGIN_BANNER);
    }

    pub fn end(&mut self) {
        self.log(LogLevel::Info, END_BANNER);
    }

    /// `<name>: Passed` / `<name>: Failed`, with an optional indented detail.
    pub fn status(&mut self, name: &str, passed: bool, detail: Option<&str>) {
        let word = match (passed, self.color) {
            (true, true) => "Passed".green().to_string(),
            (false, true) => "Failed".red().to_string(),
            (true, false) => "Passed".to_string(),
            (false, false) => "Failed".to_string(),
        };
        let _ = writeln!(self.out, "{}: {}", name, word);
        if let Some(detail) = detail {
            let _ = writeln!(self.out, "  {}", detail);
        }
    }

    /// Workflow-command annotation surfaced by CI pipelines.
    pub fn annotate_failure(&mut self, file: &Path) {
        let f = file.display();
        let _ = writeln!(self.out, "::error file={}::{} Failed", f, f);
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
