//! leaks.rs
//!
//! Memory-leak regression runner: every test script is run under the
//! memory checker, one at a time, and classified from the checker's
//! `ERROR SUMMARY` line.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use crossterm::tty::IsTty;

use crate::classify::{classify_run, Classified};
use crate::config::Settings;
use crate::discovery::discover;
use crate::expect::{expectations_for, output_for};
use crate::failure_log::{self, FailureLog};
use crate::logger::Console;
use crate::report::{LeakEntry, RunReport};
use crate::state::{LogLevel, RunMode, RunResult, RunSummary, TestRecord};
use crate::test_harness::{output_path, remove_if_exists, run_under_checker, LeakCommand};

pub const DEFAULT_DIAGNOSTIC_LOG: &str = "valgrind.log";

#[derive(Args, Debug, Clone)]
pub struct LeakArgs {
    #[arg(
        short = 'c',
        long = "ci",
        default_value_t = false,
        help = "CI mode: emit ::error annotations and exit non-zero on failure"
    )]
    pub ci: bool,

    #[arg(
        short = 'm',
        long = "multi-thread",
        default_value_t = false,
        help = "Run the interpreter with worker threads"
    )]
    pub multi_thread: bool,

    #[arg(long, default_value = ".", help = "Directory searched for test scripts")]
    pub root: PathBuf,

    #[arg(long, help = "Test script extension (default: morpho)")]
    pub ext: Option<String>,

    #[arg(long, help = "Interpreter command (or set MORPHOCHECK_INTERPRETER)")]
    pub interpreter: Option<String>,

    #[arg(long, help = "Memory checker command (or set MORPHOCHECK_CHECKER)")]
    pub checker: Option<String>,

    #[arg(long, help = "Worker threads passed with -m (default: 4)")]
    pub workers: Option<usize>,

    #[arg(
        long,
        default_value = DEFAULT_DIAGNOSTIC_LOG,
        help = "Scratch file the checker writes its report to"
    )]
    pub diagnostic_log: PathBuf,

    #[arg(long, help = "Failure log path (default depends on -m)")]
    pub failure_log: Option<PathBuf>,

    #[arg(long, help = "Write a JSON run report to this file")]
    pub report: Option<PathBuf>,
}

/// State for one serial pass over the corpus. The diagnostic log is a
/// single path shared by every test, so tests run strictly one after
/// another through `&mut self`.
pub struct LeakSession<W: Write> {
    cmd: LeakCommand,
    diagnostic_log: PathBuf,
    mode: RunMode,
    failures: FailureLog,
    console: Console<W>,
}

impl<W: Write> LeakSession<W> {
    pub fn new(
        cmd: LeakCommand,
        diagnostic_log: PathBuf,
        mode: RunMode,
        failures: FailureLog,
        console: Console<W>,
    ) -> Self {
        Self {
            cmd,
            diagnostic_log,
            mode,
            failures,
            console,
        }
    }

    pub fn console(&mut self) -> &mut Console<W> {
        &mut self.console
    }

    /// Runs and classifies one script. Never fails: every problem becomes
    /// a `RunResult`. The diagnostic log is gone when this returns.
    pub fn run_one(&mut self, file: &Path) -> TestRecord {
        let expectations = match expectations_for(file) {
            Ok(e) => e,
            Err(e) => {
                self.console
                    .log(LogLevel::Warn, format!("{}: {}", file.display(), e));
                Vec::new()
            }
        };

        let Classified {
            result,
            diagnostics,
        } = match run_under_checker(&self.cmd, file, &self.diagnostic_log) {
            Ok(out) => classify_run(&out, &self.diagnostic_log),
            Err(e) => {
                if !self.mode.is_ci() {
                    self.console.log(LogLevel::Warn, e);
                }
                classify_run(&output_path(file), &self.diagnostic_log)
            }
        };

        self.report(file, &result, diagnostics.as_deref());

        if let Err(e) = remove_if_exists(&self.diagnostic_log) {
            self.console.log(
                LogLevel::Error,
                format!("{}: {}", self.diagnostic_log.display(), e),
            );
        }

        let output = if result == RunResult::CouldNotRun {
            Vec::new()
        } else {
            output_for(&output_path(file)).unwrap_or_default()
        };

        TestRecord {
            file: file.to_path_buf(),
            result,
            expectations,
            output,
        }
    }

    fn report(&mut self, file: &Path, result: &RunResult, diagnostics: Option<&str>) {
        let name = file.display().to_string();

        if result.passed() {
            if !self.mode.is_ci() {
                self.console.status(&name, true, None);
            }
            return;
        }

        if self.mode.is_ci() {
            self.console.annotate_failure(file);
        } else {
            self.console
                .status(&name, false, result.reason().as_deref());
        }

        if let Err(e) = self.failures.record(file, result, diagnostics) {
            self.console.log(
                LogLevel::Error,
                format!("{}: {}", self.failures.path().display(), e),
            );
        }
    }

    /// Runs every file in order; exactly one record per file.
    pub fn run_all(&mut self, files: &[PathBuf]) -> (RunSummary, Vec<TestRecord>) {
        let mut summary = RunSummary::default();
        let mut records = Vec::with_capacity(files.len());

        for file in files {
            let record = self.run_one(file);
            summary.record(record.result.passed());
            records.push(record);
            self.console.flush();
        }

        (summary, records)
    }
}

/// Entry point for `morphocheck leaks`. Returns whether the process should
/// exit with a failure status.
pub fn run(args: LeakArgs) -> Result<bool, Box<dyn Error>> {
    let settings = Settings::load();
    let mode = RunMode::from_flag(args.ci);
    let color = !mode.is_ci() && io::stdout().is_tty();

    let workers = args
        .multi_thread
        .then(|| args.workers.unwrap_or(settings.workers));
    let interpreter = args.interpreter.as_deref().unwrap_or(&settings.interpreter);
    let checker = args.checker.as_deref().unwrap_or(&settings.checker);
    let ext = args.ext.as_deref().unwrap_or(&settings.extension);
    let cmd = LeakCommand::new(checker, interpreter, workers)?;

    let failure_path = args
        .failure_log
        .clone()
        .unwrap_or_else(|| failure_log::default_path(args.multi_thread));

    let mut console = Console::new(io::stdout(), color);
    console.begin();
    if let Some(n) = workers {
        console.log(LogLevel::Info, format!("Running tests with {} threads", n));
    }

    let files = discover(&args.root, ext);
    let failures = FailureLog::create(&failure_path)?;
    let mut session = LeakSession::new(cmd, args.diagnostic_log.clone(), mode, failures, console);
    let (summary, records) = session.run_all(&files);

    let console = session.console();
    console.end();
    let level = if summary.all_passed() {
        LogLevel::Success
    } else {
        LogLevel::Warn
    };
    console.log(level, summary);
    console.flush();

    if let Some(path) = args.report.as_ref() {
        let entries = records.iter().map(LeakEntry::from).collect();
        RunReport::new("leaks", mode, summary, entries).write(path)?;
    }

    Ok(summary.should_fail(mode))
}
