//! Membrane between the C entry points and the safe formatting engine.
//!
//! - **Configuration** (`config`): strict/hardened mode and the output length
//!   limit, resolved once per process.
//! - **Handoff ledger** (`handoff`): every buffer handed to a host that opted
//!   into tracking, until the host gives it back.
//! - **Metrics** (`metrics`): relaxed atomic counters for diagnostics.

#![deny(unsafe_code)]

pub mod config;
pub mod handoff;
pub mod metrics;

pub use config::{ConfigCell, RuntimeConfig, SafetyLevel, runtime_config, set_runtime_config};
pub use handoff::{HandoffLedger, LedgerStats, ReleaseOutcome, global_ledger};
pub use metrics::{FormatMetrics, MetricsSnapshot, global_metrics};
