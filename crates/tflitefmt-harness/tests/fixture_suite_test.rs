//! Runs the checked-in fixture sets and the `harness` binary end to end.

use std::path::{Path, PathBuf};
use std::process::Command;

use tflitefmt_harness::fixtures::load_dir;
use tflitefmt_harness::structured_log::{validate_log_file, validate_log_line};
use tflitefmt_harness::{TestRunner, VerificationSummary};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tflitefmt-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn all_fixture_sets_pass_in_both_modes() {
    let sets = load_dir(&fixture_dir()).expect("fixtures load");
    assert!(sets.len() >= 5);

    let mut results = Vec::new();
    for mode in ["strict", "hardened"] {
        let runner = TestRunner::new("fixture-suite", mode);
        for set in &sets {
            results.extend(runner.run(set));
        }
    }
    let summary = VerificationSummary::from_results(results);
    let failures: Vec<_> = summary
        .failures()
        .map(|r| format!("{} [{}]: {}", r.case_name, r.mode, r.diff.as_deref().unwrap_or("")))
        .collect();
    assert!(failures.is_empty(), "failing cases:\n{}", failures.join("\n"));
    assert!(summary.total > 50);
}

#[test]
fn every_case_declares_a_known_mode_and_function() {
    for set in load_dir(&fixture_dir()).expect("fixtures load") {
        for case in &set.cases {
            assert!(
                ["strict", "hardened", "both"].contains(&case.mode.as_str()),
                "{}: mode {}",
                case.name,
                case.mode
            );
            assert!(
                ["format", "arg_plan"].contains(&case.function.as_str()),
                "{}: function {}",
                case.name,
                case.function
            );
        }
    }
}

#[test]
fn verify_command_writes_report_log_and_index() {
    let out = scratch_dir("verify");
    let report = out.join("report.md");
    let log = out.join("run.jsonl");

    let status = Command::new(env!("CARGO_BIN_EXE_harness"))
        .arg("verify")
        .arg("--fixture")
        .arg(fixture_dir())
        .arg("--report")
        .arg(&report)
        .arg("--log")
        .arg(&log)
        .status()
        .expect("run harness");
    assert!(status.success());

    let markdown = std::fs::read_to_string(&report).expect("markdown report");
    assert!(markdown.contains("- Mode: strict+hardened"));
    assert!(markdown.contains("- Failed: 0"));
    assert!(out.join("report.json").exists());

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.index.json")).unwrap())
            .unwrap();
    assert_eq!(index["artifacts"].as_array().map(Vec::len), Some(3));

    let (records, errors) = validate_log_file(&log).expect("log readable");
    assert!(errors.is_empty(), "{errors:?}");
    assert!(records > 2);

    std::fs::remove_dir_all(&out).ok();
}

#[test]
fn verify_command_streams_log_to_stdout() {
    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .arg("verify")
        .arg("--fixture")
        .arg(fixture_dir())
        .args(["--mode", "strict", "--log", "-"])
        .output()
        .expect("run harness");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<String> = stdout
        .lines()
        .enumerate()
        .map(|(i, line)| {
            validate_log_line(line, i + 1)
                .unwrap_or_else(|errors| panic!("line {}: {errors:?}", i + 1))
                .event
        })
        .collect();
    assert_eq!(events.first().map(String::as_str), Some("verify_start"));
    assert_eq!(events.last().map(String::as_str), Some("verify_end"));
    assert!(events.len() > 2);
}

#[test]
fn render_command_reports_failure_code() {
    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .args(["render", "--format", "%s", "--args", r#"[{"str":"0123456789"}]"#, "--max-len", "4"])
        .output()
        .expect("run harness");
    assert!(!output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "error:output_too_long");

    let output = Command::new(env!("CARGO_BIN_EXE_harness"))
        .args(["render", "--format", "%05.1f", "--args", r#"[{"double":2.34}]"#])
        .output()
        .expect("run harness");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "002.3");
}
