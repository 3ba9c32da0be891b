//! classify.rs
//!
//! Turns the files a checker run leaves behind into a `RunResult`.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::state::RunResult;

const SUMMARY_MARKER: &str = "ERROR SUMMARY";

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"ERROR SUMMARY: (\d+) errors").unwrap())
}

/// Error count from the checker's summary line. If several summary lines
/// are present the last one wins.
pub fn parse_error_summary(log: &str) -> Option<usize> {
    log.lines()
        .filter(|l| l.contains(SUMMARY_MARKER))
        .filter_map(|l| summary_re().captures(l))
        .filter_map(|c| c.get(1)?.as_str().parse::<usize>().ok())
        .last()
}

pub fn classify_log(log: &str) -> RunResult {
    match parse_error_summary(log) {
        Some(0) => RunResult::Passed,
        Some(n) => RunResult::MemoryErrors(n),
        None => RunResult::NoSummary,
    }
}

/// Classified run plus the diagnostic text, when a log was readable.
pub struct Classified {
    pub result: RunResult,
    pub diagnostics: Option<String>,
}

/// Classifies one run from the interpreter output path and the shared
/// diagnostic log. A missing output file wins over anything in the log.
pub fn classify_run(out_path: &Path, diagnostic_log: &Path) -> Classified {
    if !out_path.exists() {
        return Classified {
            result: RunResult::CouldNotRun,
            diagnostics: None,
        };
    }

    match fs::read(diagnostic_log) {
        Ok(raw) => {
            let text = String::from_utf8_lossy(&raw).into_owned();
            Classified {
                result: classify_log(&text),
                diagnostics: Some(text),
            }
        }
        Err(_) => Classified {
            result: RunResult::MissingLog,
            diagnostics: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CLEAN: &str = "\
==4242== HEAP SUMMARY:
==4242==     in use at exit: 0 bytes in 0 blocks
==4242== All heap blocks were freed -- no leaks are possible
==4242== For lists of detected and suppressed errors, rerun with: -s
==4242== ERROR SUMMARY: 0 errors from 0 contexts (suppressed: 0 from 0)
";

    const LEAKY: &str = "\
==4243== LEAK SUMMARY:
==4243==    definitely lost: 48 bytes in 2 blocks
==4243== ERROR SUMMARY: 2 errors from 2 contexts (suppressed: 0 from 0)
";

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "morphocheck-classify-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn summary_count_is_extracted() {
        assert_eq!(parse_error_summary(CLEAN), Some(0));
        assert_eq!(parse_error_summary(LEAKY), Some(2));
        assert_eq!(parse_error_summary("==1== HEAP SUMMARY:\n"), None);
    }

    #[test]
    fn last_summary_line_wins() {
        let log = format!("{}{}", CLEAN, LEAKY);
        assert_eq!(parse_error_summary(&log), Some(2));
    }

    #[test]
    fn log_classification() {
        assert_eq!(classify_log(CLEAN), RunResult::Passed);
        assert_eq!(classify_log(LEAKY), RunResult::MemoryErrors(2));
        assert_eq!(classify_log(""), RunResult::NoSummary);
    }

    #[test]
    fn missing_output_beats_log_contents() {
        let dir = scratch("no-output");
        let log = dir.join("valgrind.log");
        fs::write(&log, CLEAN).unwrap();

        let c = classify_run(&dir.join("a.morpho.out"), &log);
        assert_eq!(c.result, RunResult::CouldNotRun);
        assert!(c.diagnostics.is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_log_is_reported() {
        let dir = scratch("no-log");
        let out = dir.join("a.morpho.out");
        fs::write(&out, "").unwrap();

        let c = classify_run(&out, &dir.join("valgrind.log"));
        assert_eq!(c.result, RunResult::MissingLog);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn leaky_log_keeps_diagnostics() {
        let dir = scratch("leaky");
        let out = dir.join("a.morpho.out");
        let log = dir.join("valgrind.log");
        fs::write(&out, "").unwrap();
        fs::write(&log, LEAKY).unwrap();

        let c = classify_run(&out, &log);
        assert_eq!(c.result, RunResult::MemoryErrors(2));
        assert_eq!(c.diagnostics.as_deref(), Some(LEAKY));

        let _ = fs::remove_dir_all(&dir);
    }
}
