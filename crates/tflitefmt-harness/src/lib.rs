//! Conformance harness for tflitefmt.
//!
//! This crate provides:
//! - Fixture sets: JSON cases pairing a format and typed arguments with the
//!   expected rendering or error
//! - Fixture execution against the core engine in strict or hardened mode
//! - Verification summaries, text diffs and markdown/JSON reports
//! - A JSONL structured log with an SHA-256 artifact index

#![forbid(unsafe_code)]

pub mod diff;
pub mod error;
pub mod exec;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
