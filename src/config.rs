use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_INTERPRETER: &str = "morpho6";
pub const DEFAULT_CHECKER: &str = "valgrind --leak-check=full";
pub const DEFAULT_EXTENSION: &str = "morpho";
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_CLASSES: [&str; 5] = ["Array", "List", "String", "System", "Tuple"];

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    interpreter: Option<String>,
    checker: Option<String>,
    workers: Option<usize>,
    extension: Option<String>,
    classes: Option<Vec<String>>,
}

/// Settings shared by both harnesses, before command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub interpreter: String,
    pub checker: String,
    pub workers: usize,
    pub extension: String,
    pub classes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            checker: DEFAULT_CHECKER.to_string(),
            workers: DEFAULT_WORKERS,
            extension: DEFAULT_EXTENSION.to_string(),
            classes: DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Settings {
    /// Defaults, then `config.toml`, then `MORPHOCHECK_*` variables.
    pub fn load() -> Self {
        Self::resolve(load_file_config(), |key| env::var(key).ok())
    }

    fn resolve(file: Option<FileConfig>, var: impl Fn(&str) -> Option<String>) -> Self {
        let mut s = Settings::default();

        if let Some(cfg) = file {
            if let Some(v) = cfg.interpreter {
                s.interpreter = v;
            }
            if let Some(v) = cfg.checker {
                s.checker = v;
            }
            if let Some(v) = cfg.workers {
                s.workers = v;
            }
            if let Some(v) = cfg.extension {
                s.extension = v;
            }
            if let Some(v) = cfg.classes {
                s.classes = v;
            }
        }

        if let Some(v) = var("MORPHOCHECK_INTERPRETER").filter(|v| !v.trim().is_empty()) {
            s.interpreter = v;
        }
        if let Some(v) = var("MORPHOCHECK_CHECKER").filter(|v| !v.trim().is_empty()) {
            s.checker = v;
        }

        s
    }
}

fn config_path() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("morphocheck");
    dir.push("config.toml");
    dir
}

fn load_file_config() -> Option<FileConfig> {
    let raw = fs::read_to_string(config_path()).ok()?;
    toml::from_str(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let s = Settings::resolve(None, no_env);
        assert_eq!(s.interpreter, "morpho6");
        assert_eq!(s.checker, "valgrind --leak-check=full");
        assert_eq!(s.workers, 4);
        assert_eq!(s.extension, "morpho");
        assert_eq!(s.classes.len(), 5);
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg: FileConfig = toml::from_str(
            r#"
interpreter = "/opt/morpho/bin/morpho6"
workers = 8
classes = ["Matrix"]
"#,
        )
        .unwrap();
        let s = Settings::resolve(Some(cfg), no_env);
        assert_eq!(s.interpreter, "/opt/morpho/bin/morpho6");
        assert_eq!(s.workers, 8);
        assert_eq!(s.classes, vec!["Matrix".to_string()]);
        assert_eq!(s.checker, DEFAULT_CHECKER);
    }

    #[test]
    fn environment_overrides_file() {
        let cfg = FileConfig {
            interpreter: Some("from-file".into()),
            ..FileConfig::default()
        };
        let s = Settings::resolve(Some(cfg), |k| match k {
            "MORPHOCHECK_INTERPRETER" => Some("from-env".into()),
            "MORPHOCHECK_CHECKER" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(s.interpreter, "from-env");
        assert_eq!(s.checker, DEFAULT_CHECKER);
    }
}
