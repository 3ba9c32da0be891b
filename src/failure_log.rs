use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::state::RunResult;

pub const SINGLE_THREAD_LOG: &str = "FailedValgrindTests.log";
pub const MULTI_THREAD_LOG: &str = "FailedTestsValgrindMultiThreaded.log";

pub fn default_path(multi_thread: bool) -> PathBuf {
    PathBuf::from(if multi_thread {
        MULTI_THREAD_LOG
    } else {
        SINGLE_THREAD_LOG
    })
}

/// Failure log for one run: truncated on open, one block per failing test,
/// flushed after every block.
pub struct FailureLog {
    path: PathBuf,
    out: BufWriter<File>,
}

impl FailureLog {
    pub fn create(path: &Path) -> Result<Self, String> {
        let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn record(
        &mut self,
        file: &Path,
        result: &RunResult,
        diagnostics: Option<&str>,
    ) -> Result<(), String> {
        write_entry(&mut self.out, file, result, diagnostics).map_err(|e| e.to_string())?;
        self.out.flush().map_err(|e| e.to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes one failure block. Passing results write nothing.
pub fn write_entry<W: Write>(
    out: &mut W,
    file: &Path,
    result: &RunResult,
    diagnostics: Option<&str>,
) -> std::io::Result<()> {
    let Some(reason) = result.reason() else {
        return Ok(());
    };
    let name = file.display();

    match result {
        RunResult::MemoryErrors(_) => {
            writeln!(out, "{}: Failed", name)?;
            writeln!(out, "{}", reason)?;
            writeln!(out)?;
            writeln!(out, "Valgrind output:")?;
            if let Some(text) = diagnostics {
                out.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    writeln!(out)?;
                }
            }
        }
        _ => writeln!(out, "{}: Failed. {}", name, reason)?,
    }
    writeln!(out)
}
