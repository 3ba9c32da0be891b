use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::state::{RunMode, RunSummary, TestRecord};

#[derive(Debug, Serialize)]
pub struct LeakEntry {
    pub file: String,
    pub outcome: &'static str,
    pub errors: Option<usize>,
    pub expected: Vec<String>,
    pub output: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DocEntry {
    pub query: String,
    pub documented: bool,
}

#[derive(Debug, Serialize)]
pub struct RunReport<T: Serialize> {
    pub generated_at: String,
    pub harness: &'static str,
    pub mode: RunMode,
    pub passed: usize,
    pub total: usize,
    pub results: Vec<T>,
}

impl<T: Serialize> RunReport<T> {
    pub fn new(harness: &'static str, mode: RunMode, summary: RunSummary, results: Vec<T>) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            harness,
            mode,
            passed: summary.passed,
            total: summary.total,
            results,
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, text).map_err(|e| e.to_string())
    }
}

impl From<&TestRecord> for LeakEntry {
    fn from(r: &TestRecord) -> Self {
        Self {
            file: r.file.display().to_string(),
            outcome: r.result.label(),
            errors: r.result.error_count(),
            expected: r.expectations.clone(),
            output: r.output.clone(),
        }
    }
}
