use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Interpreter invocation wrapped in the memory checker.
///
/// Built once per run; every test reuses the same diagnostic log path, so
/// invocations must never overlap.
#[derive(Debug, Clone)]
pub struct LeakCommand {
    checker: Vec<String>,
    interpreter: Vec<String>,
    workers: Option<usize>,
}

impl LeakCommand {
    pub fn new(checker: &str, interpreter: &str, workers: Option<usize>) -> Result<Self, String> {
        let checker = split_command(checker);
        let interpreter = split_command(interpreter);
        if checker.is_empty() {
            return Err("checker command is empty".to_string());
        }
        if interpreter.is_empty() {
            return Err("interpreter command is empty".to_string());
        }
        Ok(Self {
            checker,
            interpreter,
            workers,
        })
    }

    /// Program and arguments for one test:
    /// `<checker..> --log-file=<log> <interpreter..> [-w<N>] <file>`.
    pub fn argv(&self, file: &Path, diagnostic_log: &Path) -> Vec<String> {
        let mut argv = self.checker.clone();
        argv.push(format!("--log-file={}", diagnostic_log.display()));
        argv.extend(self.interpreter.iter().cloned());
        if let Some(n) = self.workers {
            argv.push(format!("-w{}", n));
        }
        argv.push(file.display().to_string());
        argv
    }
}

pub fn split_command(cmd: &str) -> Vec<String> {
    cmd.split_whitespace().map(str::to_string).collect()
}

/// `<file>.out`, where the interpreter transcript is written.
pub fn output_path(file: &Path) -> PathBuf {
    let mut os = file.as_os_str().to_owned();
    os.push(".out");
    PathBuf::from(os)
}

/// Runs one test script under the checker and blocks until it exits.
///
/// Interpreter stdout and stderr both land in `<file>.out`. Any diagnostic
/// log left over from an earlier run is removed first. When the process
/// cannot be started the output file is removed again, so the caller sees
/// the test as not having run.
pub fn run_under_checker(
    cmd: &LeakCommand,
    file: &Path,
    diagnostic_log: &Path,
) -> Result<PathBuf, String> {
    remove_if_exists(diagnostic_log).map_err(|e| e.to_string())?;

    let out_path = output_path(file);
    let stdout = File::create(&out_path).map_err(|e| e.to_string())?;
    let stderr = stdout.try_clone().map_err(|e| e.to_string())?;

    let argv = cmd.argv(file, diagnostic_log);
    let status = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .status();

    match status {
        Ok(_) => Ok(out_path),
        Err(e) => {
            let _ = remove_if_exists(&out_path);
            Err(format!("{}: {}", argv[0], e))
        }
    }
}

pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
