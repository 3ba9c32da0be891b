//! docs.rs
//!
//! Help-coverage checker: asks the interpreter which methods each core
//! class responds to, then queries the built-in help for every one.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use clap::Args;
use crossterm::tty::IsTty;

use crate::config::Settings;
use crate::logger::Console;
use crate::report::{DocEntry, RunReport};
use crate::state::{LogLevel, RunMode, RunSummary};
use crate::test_harness::split_command;

const NO_HELP: &str = "No help found for";

#[derive(Args, Debug, Clone)]
pub struct DocsArgs {
    #[arg(
        short = 'c',
        long = "ci",
        default_value_t = false,
        help = "Exit non-zero when any method is undocumented"
    )]
    pub ci: bool,

    #[arg(long = "class", help = "Class to check (repeatable; default: core classes)")]
    pub classes: Vec<String>,

    #[arg(long, help = "Interpreter command (or set MORPHOCHECK_INTERPRETER)")]
    pub interpreter: Option<String>,

    #[arg(long, help = "Write a JSON run report to this file")]
    pub report: Option<PathBuf>,
}

/// Feeds `input` to the interpreter on stdin and returns its stdout.
pub fn query_interpreter(interpreter: &[String], input: &str) -> Result<String, String> {
    let (program, args) = interpreter
        .split_first()
        .ok_or_else(|| "interpreter command is empty".to_string())?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("{}: {}", program, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        // The interpreter may exit before reading everything.
        let _ = stdin.write_all(input.as_bytes());
        let _ = stdin.write_all(b"\n");
    }

    let out = child.wait_with_output().map_err(|e| e.to_string())?;
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}

/// Method names from a printed `respondsto()` list such as
/// `[append, count, pop]`. Output mentioning `Error` yields nothing.
pub fn parse_methods(listing: &str) -> Vec<String> {
    if listing.contains("Error") {
        return Vec::new();
    }
    listing
        .trim_matches(|c| c == '[' || c == ']' || c == '\n')
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn has_help(output: &str) -> bool {
    !output.contains(NO_HELP)
}

pub fn class_methods(interpreter: &[String], class: &str) -> Result<Vec<String>, String> {
    let out = query_interpreter(interpreter, &format!("print {}.respondsto()", class))?;
    Ok(parse_methods(&out))
}

pub fn is_documented(interpreter: &[String], query: &str) -> Result<bool, String> {
    let out = query_interpreter(interpreter, &format!("? {}", query))?;
    Ok(has_help(&out))
}

/// Checks every method of every class, in order.
pub fn check_classes<W: Write>(
    interpreter: &[String],
    classes: &[String],
    console: &mut Console<W>,
) -> Vec<DocEntry> {
    let mut entries = Vec::new();

    for class in classes {
        let methods = match class_methods(interpreter, class) {
            Ok(m) => m,
            Err(e) => {
                console.log(LogLevel::Error, format!("{}: {}", class, e));
                entries.push(DocEntry {
                    query: class.clone(),
                    documented: false,
                });
                continue;
            }
        };

        for method in methods {
            let query = format!("{}.{}", class, method);
            let documented = match is_documented(interpreter, &query) {
                Ok(d) => d,
                Err(e) => {
                    console.log(LogLevel::Error, format!("{}: {}", query, e));
                    false
                }
            };
            entries.push(DocEntry { query, documented });
        }
    }

    entries
}

/// Entry point for `morphocheck docs`.
pub fn run(args: DocsArgs) -> Result<bool, Box<dyn Error>> {
    let settings = Settings::load();
    let mode = RunMode::from_flag(args.ci);
    let interpreter =
        split_command(args.interpreter.as_deref().unwrap_or(&settings.interpreter));
    let classes = if args.classes.is_empty() {
        settings.classes.clone()
    } else {
        args.classes.clone()
    };

    let mut console = Console::new(io::stdout(), !mode.is_ci() && io::stdout().is_tty());
    console.begin();

    let entries = check_classes(&interpreter, &classes, &mut console);

    let mut summary = RunSummary::default();
    for entry in &entries {
        console.status(&entry.query, entry.documented, None);
        summary.record(entry.documented);
    }

    console.end();
    let level = if summary.all_passed() {
        LogLevel::Success
    } else {
        LogLevel::Warn
    };
    console.log(level, summary);
    console.flush();

    if let Some(path) = args.report.as_ref() {
        RunReport::new("docs", mode, summary, entries).write(path)?;
    }

    Ok(summary.should_fail(mode))
}
