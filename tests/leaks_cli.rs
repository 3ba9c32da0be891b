#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const FAKE_CHECKER: &str = r#"
log=""
last=""
for a in "$@"; do
  case "$a" in --log-file=*) log="${a#--log-file=}";; esac
  last="$a"
done
echo "ran $last"
n=$(sed -n 's/^\/\/ leaks=\([0-9]*\)$/\1/p' "$last")
echo "==7== ERROR SUMMARY: ${n:-0} errors from ${n:-0} contexts (suppressed: 0 from 0)" > "$log"
"#;

fn corpus(name: &str, leaks: &[usize]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "morphocheck-cli-{}-{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("tests")).unwrap();
    fs::write(dir.join("checker.sh"), FAKE_CHECKER).unwrap();
    for (i, n) in leaks.iter().enumerate() {
        let file = dir.join("tests").join(format!("t{}.morpho", i + 1));
        fs::write(file, format!("print {} // expect: {}\n// leaks={}\n", i, i, n)).unwrap();
    }
    dir
}

fn run_leaks(dir: &Path, extra: &[&str]) -> Output {
    let checker = format!("sh {}", dir.join("checker.sh").display());
    Command::new(env!("CARGO_BIN_EXE_morphocheck"))
        .current_dir(dir)
        .env_remove("MORPHOCHECK_INTERPRETER")
        .env_remove("MORPHOCHECK_CHECKER")
        .arg("leaks")
        .args(["--checker", checker.as_str(), "--interpreter", "morpho6", "--ext", "morpho"])
        .args(extra)
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn one_leaky_script_out_of_three() {
    let dir = corpus("mixed", &[0, 2, 0]);

    let out = run_leaks(&dir, &[]);
    let text = stdout(&out);
    assert!(out.status.success());
    assert!(text.contains("--Begin testing"));
    assert!(text.contains("2 out of 3 tests passed."));
    assert!(text.contains("tests/t2.morpho: Failed"));

    let log = fs::read_to_string(dir.join("FailedValgrindTests.log")).unwrap();
    assert_eq!(log.matches(": Failed").count(), 1);
    assert!(log.contains("tests/t2.morpho: Failed\n2  Memory errors found."));
    assert!(!dir.join("valgrind.log").exists());
    assert!(dir.join("tests/t1.morpho.out").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn ci_mode_fails_the_process() {
    let dir = corpus("ci", &[0, 1]);

    let ci = run_leaks(&dir, &["-c"]);
    assert!(!ci.status.success());
    let text = stdout(&ci);
    assert!(text.contains("::error file=tests/t2.morpho::tests/t2.morpho Failed"));
    assert!(text.contains("1 out of 2 tests passed."));

    let interactive = run_leaks(&dir, &[]);
    assert!(interactive.status.success());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn repeated_runs_agree() {
    let dir = corpus("repeat", &[0, 3, 0, 0]);

    let first = stdout(&run_leaks(&dir, &[]));
    let second = stdout(&run_leaks(&dir, &[]));
    assert!(first.contains("3 out of 4 tests passed."));
    assert!(second.contains("3 out of 4 tests passed."));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn multi_thread_mode_switches_log_and_reports_json() {
    let dir = corpus("mt", &[0, 5]);

    let out = run_leaks(&dir, &["-m", "--workers", "2", "--report", "report.json"]);
    let text = stdout(&out);
    assert!(text.contains("Running tests with 2 threads"));
    assert!(dir.join("FailedTestsValgrindMultiThreaded.log").exists());
    assert!(!dir.join("FailedValgrindTests.log").exists());

    let transcript = fs::read_to_string(dir.join("tests/t1.morpho.out")).unwrap();
    assert!(transcript.contains("ran tests/t1.morpho"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["passed"], 1);
    assert_eq!(report["total"], 2);
    assert_eq!(report["results"][1]["errors"], 5);
    assert_eq!(report["results"][0]["expected"][0], "0");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_corpus_passes() {
    let dir = corpus("empty", &[]);

    let out = run_leaks(&dir, &["-c"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("0 out of 0 tests passed."));

    let _ = fs::remove_dir_all(&dir);
}
