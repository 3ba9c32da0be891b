//! expect.rs
//!
//! Reads the expected-output annotations embedded in a test script.
//! The leak runner records these but never compares them against output.

use std::fs;
use std::path::Path;

use crate::normalize::{find_expected, normalize_output};

/// Expectations for a script body, in source line order.
pub fn extract_expectations(source: &str) -> Vec<String> {
    source.lines().flat_map(find_expected).collect()
}

pub fn expectations_for(path: &Path) -> Result<Vec<String>, String> {
    let source = fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok(extract_expectations(&source))
}

/// Normalized transcript of an interpreter output file.
pub fn output_for(path: &Path) -> Result<Vec<String>, String> {
    let raw = fs::read(path).map_err(|e| e.to_string())?;
    Ok(normalize_output(&String::from_utf8_lossy(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectations_follow_line_order() {
        let src = "\
var a = [1, 2]
print a[0] // expect: 1
print a[5] // expect error 'IdxBnds'
print a[1] // expect: 2
";
        assert_eq!(
            extract_expectations(src),
            vec!["1", "@error[IdxBnds]", "2"]
        );
    }

    #[test]
    fn script_without_annotations_expects_nothing() {
        assert!(extract_expectations("print 1\n").is_empty());
        assert!(extract_expectations("").is_empty());
    }

    #[test]
    fn missing_script_is_an_error() {
        let err = expectations_for(Path::new("/nonexistent/morphocheck/x.morpho"));
        assert!(err.is_err());
    }
}
