//! normalize.rs
//!
//! Pure line transforms that reduce interpreter output and test annotations
//! to a comparable form. Errors collapse to `@error[NAME]`; stack trace
//! lines collapse to `@stacktrace` and are then dropped.

use std::sync::OnceLock;

use regex::Regex;

pub const ERROR_MARKER: &str = "@error";
pub const STACKTRACE_MARKER: &str = "@stacktrace";

fn control_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b[^m]*m").unwrap())
}

fn quoted_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `[A-z]` also admits `_`, `^` and the bracket characters.
    RE.get_or_init(|| Regex::new(r"^.*[Ee]rror[ :]*'([A-z;a-z]*)'.*$").unwrap())
}

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[Ee]rror[ :]").unwrap())
}

fn expect_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"// expect(?::\s?|\s)(.*)").unwrap())
}

/* ============================================================
   Output transforms
   ============================================================ */

/// Strips ANSI color sequences and trailing whitespace.
pub fn remove_control_characters(line: &str) -> String {
    control_re().replace_all(line.trim_end(), "").into_owned()
}

/// Rewrites a line carrying `error ... 'NAME'` to `@error[NAME]`.
/// Lines without a quoted error name come back with trailing whitespace
/// stripped and otherwise untouched.
pub fn simplify_errors(line: &str) -> String {
    let line = line.trim_end();
    match quoted_error_re().captures(line) {
        Some(c) => error_tag(c.get(1).map_or("", |m| m.as_str())),
        None => line.to_string(),
    }
}

pub fn simplify_stacktrace(line: &str) -> String {
    let line = line.trim_end();
    if line.contains("at line") {
        STACKTRACE_MARKER.to_string()
    } else {
        line.to_string()
    }
}

pub fn is_error(line: &str) -> bool {
    line.contains(ERROR_MARKER)
}

fn is_in(line: &str) -> bool {
    line.contains("in ")
}

/// Normalizes a whole interpreter transcript, one entry per surviving line.
///
/// A line directly after an error that names a location (`in ...`) is part
/// of the trace and is removed together with `at line` lines.
pub fn normalize_output(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .map(remove_control_characters)
        .map(|l| simplify_errors(&l))
        .map(|l| simplify_stacktrace(&l))
        .collect();

    for i in 1..lines.len() {
        if is_error(&lines[i - 1]) && is_in(&lines[i]) {
            lines[i] = STACKTRACE_MARKER.to_string();
        }
    }

    lines.retain(|l| l != STACKTRACE_MARKER);
    lines
}

/* ============================================================
   Annotation detectors
   ============================================================ */

/// True when a source line declares an expected error.
pub fn is_error_line(line: &str) -> bool {
    error_line_re().is_match(line)
}

/// Literal values declared with `// expect: value` or `// expect value`.
pub fn find_value(line: &str) -> Vec<String> {
    expect_value_re()
        .captures_iter(line)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .collect()
}

/// Expectations contributed by one source line. The error detector wins
/// over the value detector; an error line with no quoted name yields
/// `@error[]`.
pub fn find_expected(line: &str) -> Vec<String> {
    if is_error_line(line) {
        let simplified = simplify_errors(line);
        if simplified.starts_with(ERROR_MARKER) {
            vec![simplified]
        } else {
            vec![error_tag("")]
        }
    } else {
        find_value(line)
    }
}

fn error_tag(name: &str) -> String {
    format!("{}[{}]", ERROR_MARKER, name)
}
