//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path}: {source}")]
    Fixture {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fixture JSON files found in {}", dir.display())]
    NoFixtures { dir: PathBuf },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unsupported mode '{0}', expected strict|hardened|both")]
    UnknownMode(String),
    #[error("{failed} of {total} cases failed")]
    VerificationFailed { failed: usize, total: usize },
}
