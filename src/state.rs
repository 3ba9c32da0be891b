use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/* ---------- logging ---------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warn,
    Error,
}

/* ---------- run mode ---------- */

/// How the harness reports: interactive prints colorized per-test status,
/// CI prints `::error` annotations and fails the process on any failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Interactive,
    Ci,
}

impl RunMode {
    pub fn from_flag(ci: bool) -> Self {
        if ci {
            RunMode::Ci
        } else {
            RunMode::Interactive
        }
    }

    pub fn is_ci(self) -> bool {
        matches!(self, RunMode::Ci)
    }
}

/* ---------- per-test outcome ---------- */

/// Outcome of running one test script under the memory checker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunResult {
    Passed,
    /// No interpreter output file exists after the run.
    CouldNotRun,
    /// The checker produced no diagnostic log.
    MissingLog,
    /// A diagnostic log exists but carries no `ERROR SUMMARY` line.
    NoSummary,
    MemoryErrors(usize),
}

impl RunResult {
    pub fn passed(&self) -> bool {
        matches!(self, RunResult::Passed)
    }

    /// Short failure reason, as written to the console and the failure log.
    pub fn reason(&self) -> Option<String> {
        match self {
            RunResult::Passed => None,
            RunResult::CouldNotRun => Some("Could not run the test".to_string()),
            RunResult::MissingLog | RunResult::NoSummary => {
                Some("Could not find valgrind log".to_string())
            }
            RunResult::MemoryErrors(n) => Some(format!("{}  Memory errors found.", n)),
        }
    }

    pub fn error_count(&self) -> Option<usize> {
        match self {
            RunResult::MemoryErrors(n) => Some(*n),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunResult::Passed => "passed",
            RunResult::CouldNotRun => "could_not_run",
            RunResult::MissingLog => "missing_log",
            RunResult::NoSummary => "no_summary",
            RunResult::MemoryErrors(_) => "memory_errors",
        }
    }
}

/* ---------- aggregate ---------- */

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Whether the process should exit non-zero for this summary.
    pub fn should_fail(&self, mode: RunMode) -> bool {
        mode.is_ci() && self.passed < self.total
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} out of {} tests passed.", self.passed, self.total)
    }
}

/// One processed test script.
#[derive(Clone, Debug)]
pub struct TestRecord {
    pub file: PathBuf,
    pub result: RunResult,
    pub expectations: Vec<String>,
    /// Normalized interpreter transcript, empty when the test did not run.
    pub output: Vec<String>,
}
