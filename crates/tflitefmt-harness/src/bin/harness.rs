//! CLI entrypoint for the tflitefmt conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tflitefmt_harness::exec::execute_fixture_case;
use tflitefmt_harness::fixtures::load_dir;
use tflitefmt_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, StreamKind, now_utc, validate_log_file,
};
use tflitefmt_harness::{ConformanceReport, HarnessError, TestRunner, VerificationSummary};

/// Conformance tooling for tflitefmt.
#[derive(Debug, Parser)]
#[command(name = "tflitefmt-harness")]
#[command(about = "Fixture-driven conformance harness for tflitefmt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run fixture sets and report.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Markdown report path; a `.json` twin and an artifact index are written beside it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL log path; `-` writes the records to stdout.
        #[arg(long)]
        log: Option<PathBuf>,
        /// `strict`, `hardened` or `both`.
        #[arg(long, default_value = "both")]
        mode: String,
    },
    /// Validate a JSONL log written by `verify`.
    ValidateLog {
        #[arg(long)]
        path: PathBuf,
    },
    /// Render one format string with JSON-encoded arguments.
    Render {
        #[arg(long)]
        format: String,
        /// e.g. `[{"int":42},{"str":"ok"}]`
        #[arg(long, default_value = "[]")]
        args: String,
        #[arg(long, default_value = "strict")]
        mode: String,
        /// Output limit; 0 = unlimited.
        #[arg(long)]
        max_len: Option<usize>,
    },
    /// Print the argument slots a format string consumes.
    Plan {
        #[arg(long)]
        format: String,
    },
}

fn modes(mode: &str) -> Result<Vec<&'static str>, HarnessError> {
    match mode.to_ascii_lowercase().as_str() {
        "strict" => Ok(vec!["strict"]),
        "hardened" => Ok(vec!["hardened"]),
        "both" => Ok(vec!["strict", "hardened"]),
        _ => Err(HarnessError::UnknownMode(mode.to_string())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            report,
            log,
            mode,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let modes = modes(&mode)?;
            let fixture_sets = load_dir(&fixture)?;
            let run_id = format!("verify-{}", std::process::id());

            let log_file = log.as_ref().filter(|path| path.as_os_str() != "-");
            let mut emitter = match (&log, log_file) {
                (_, Some(path)) => Some(LogEmitter::to_file(path, &run_id)?),
                (Some(_), None) => Some(LogEmitter::to_stdout(&run_id)),
                (None, None) => None,
            };
            if let Some(emitter) = emitter.as_mut() {
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "verify_start")
                        .with_stream(StreamKind::Conformance)
                        .with_details(serde_json::json!({
                            "fixture_dir": fixture.display().to_string(),
                            "sets": fixture_sets.len(),
                        })),
                )?;
            }

            let mut results = Vec::new();
            for mode in &modes {
                let runner = TestRunner::new("fixture-verify", *mode);
                for set in &fixture_sets {
                    match emitter.as_mut() {
                        Some(emitter) => results.extend(runner.run_logged(set, emitter)?),
                        None => results.extend(runner.run(set)),
                    }
                }
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("tflitefmt Conformance Report"),
                mode: modes.join("+"),
                timestamp: now_utc(),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );

            if let Some(emitter) = emitter.as_mut() {
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "verify_end")
                        .with_stream(StreamKind::Conformance)
                        .with_details(serde_json::json!({
                            "total": report_doc.summary.total,
                            "passed": report_doc.summary.passed,
                            "failed": report_doc.summary.failed,
                        })),
                )?;
                emitter.flush()?;
            }

            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;

                let mut index = ArtifactIndex::new(&run_id);
                index.add_file(&report_path, "report_markdown")?;
                index.add_file(&json_path, "report_json")?;
                if let Some(log_path) = log_file {
                    index.add_file(log_path, "log_jsonl")?;
                }
                let index_path = report_path.with_extension("index.json");
                std::fs::write(&index_path, index.to_json()?)?;
            }

            if !report_doc.summary.all_passed() {
                return Err(HarnessError::VerificationFailed {
                    failed: report_doc.summary.failed,
                    total: report_doc.summary.total,
                }
                .into());
            }
        }
        Command::ValidateLog { path } => {
            let (lines, errors) = validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("{lines} record(s), {} error(s)", errors.len());
            if !errors.is_empty() {
                return Err(format!("{} invalid log record(s)", errors.len()).into());
            }
        }
        Command::Render {
            format,
            args,
            mode,
            max_len,
        } => {
            let args: serde_json::Value = serde_json::from_str(&args)?;
            let inputs = serde_json::json!({ "format": format, "args": args, "max_len": max_len });
            let run = execute_fixture_case("format", &inputs, &mode)?;
            println!("{}", run.output);
            if let Some(note) = run.note {
                eprintln!("note: {note}");
            }
            if run.error_code != 0 {
                return Err(format!("format failed with code {}", run.error_code).into());
            }
        }
        Command::Plan { format } => {
            let run = execute_fixture_case(
                "arg_plan",
                &serde_json::json!({ "format": format }),
                "strict",
            )?;
            for (i, slot) in run.output.split(',').filter(|s| !s.is_empty()).enumerate() {
                println!("{i}: {slot}");
            }
        }
    }
    Ok(())
}
