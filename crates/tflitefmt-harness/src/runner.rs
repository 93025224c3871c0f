//! Test execution engine.

use std::time::Instant;

use crate::diff;
use crate::exec::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;

/// Runs fixture sets under one mode.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// `strict` or `hardened`.
    pub mode: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            mode: mode.into(),
        }
    }

    /// Run every case in `fixture_set` that applies to this mode.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| mode_matches(&self.mode, &case.mode))
            .map(|case| self.run_case(case))
            .collect()
    }

    /// [`run`](Self::run), emitting one log record per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let results = self.run(fixture_set);
        for r in &results {
            let (level, outcome) = if r.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let entry = LogEntry::new("", level, "fixture_case")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.mode.as_str())
                .with_case(&fixture_set.family, &r.case_name)
                .with_outcome(outcome)
                .with_error_code(r.actual_error)
                .with_latency_ns(r.latency_ns);
            let entry = match &r.diff {
                Some(diff) => entry.with_details(serde_json::json!({ "diff": diff })),
                None => entry,
            };
            log.emit_entry(entry)?;
        }
        Ok(results)
    }

    fn run_case(&self, case: &FixtureCase) -> VerificationResult {
        let started = Instant::now();
        let execution = execute_fixture_case(&case.function, &case.inputs, &self.mode);
        let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

        let case_name = if case.mode.eq_ignore_ascii_case("both") {
            format!("{} [{}]", case.name, self.mode)
        } else {
            case.name.clone()
        };

        let (actual, actual_error, note) = match execution {
            Ok(run) => (run.output, run.error_code, run.note),
            Err(err) => (format!("unsupported:{err}"), -1, None),
        };
        let passed = actual == case.expected_output && actual_error == case.expected_error;

        let diff = if actual != case.expected_output {
            Some(diff::render_diff(&case.expected_output, &actual))
        } else if actual_error != case.expected_error {
            Some(format!(
                "error code: expected {}, got {actual_error}",
                case.expected_error
            ))
        } else {
            note
        };

        VerificationResult {
            case_name,
            reference: case.reference.clone(),
            mode: self.mode.clone(),
            passed,
            expected: case.expected_output.clone(),
            actual,
            expected_error: case.expected_error,
            actual_error,
            diff,
            latency_ns,
        }
    }
}

fn mode_matches(active_mode: &str, case_mode: &str) -> bool {
    case_mode.eq_ignore_ascii_case(active_mode) || case_mode.eq_ignore_ascii_case("both")
}
