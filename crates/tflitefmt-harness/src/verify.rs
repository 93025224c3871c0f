//! Verification results.

use serde::{Deserialize, Serialize};

/// Result of verifying a single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub case_name: String,
    pub reference: String,
    /// Mode the case ran under.
    pub mode: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
    pub expected_error: i32,
    pub actual_error: i32,
    /// Diff or notes when the case failed or produced warnings.
    pub diff: Option<String>,
    pub latency_ns: u64,
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed cases only.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            reference: "C11 7.21.6.1".to_string(),
            mode: "strict".to_string(),
            passed,
            expected: "a".to_string(),
            actual: if passed { "a" } else { "b" }.to_string(),
            expected_error: 0,
            actual_error: 0,
            diff: None,
            latency_ns: 0,
        }
    }

    #[test]
    fn summary_counts() {
        let summary =
            VerificationSummary::from_results(vec![result("x", true), result("y", false)]);
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
        assert!(!summary.all_passed());
        assert_eq!(summary.failures().next().map(|r| r.case_name.as_str()), Some("y"));
    }
}
