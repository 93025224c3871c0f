//! Counter snapshot for hosts and leak checks.

use std::ffi::c_int;

use tflitefmt_membrane::{global_ledger, global_metrics};

/// Formatting counters plus handoff-ledger totals.
///
/// Ledger fields stay zero unless the host enabled tracking.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatStatsSnapshot {
    pub formats: u64,
    pub failures: u64,
    pub truncations: u64,
    pub repairs: u64,
    pub bytes_rendered: u64,
    pub reporter_messages: u64,
    pub handed_out: u64,
    pub released: u64,
    pub forgotten: u64,
    pub unknown_releases: u64,
    pub outstanding: u64,
    pub outstanding_bytes: u64,
}

/// Current counters.
#[must_use]
pub fn format_stats() -> FormatStatsSnapshot {
    let metrics = global_metrics().snapshot();
    let ledger = global_ledger().stats();
    FormatStatsSnapshot {
        formats: metrics.formats,
        failures: metrics.failures,
        truncations: metrics.truncations,
        repairs: metrics.repairs,
        bytes_rendered: metrics.bytes_rendered,
        reporter_messages: metrics.reporter_messages,
        handed_out: ledger.handed_out,
        released: ledger.released,
        forgotten: ledger.forgotten,
        unknown_releases: ledger.unknown_releases,
        outstanding: ledger.outstanding as u64,
        outstanding_bytes: ledger.outstanding_bytes as u64,
    }
}

abi_fn! {
    /// Copy the current counters into `*out`. Returns 0, or -1 for NULL `out`.
    fn UnityTFLiteStats(out: *mut FormatStatsSnapshot) -> c_int {
        if out.is_null() {
            return -1;
        }
        // SAFETY: `out` is validated non-null above.
        *out = format_stats();
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_out_is_refused() {
        assert_eq!(unsafe { UnityTFLiteStats(std::ptr::null_mut()) }, -1);
    }

    #[test]
    fn export_matches_rust_snapshot_shape() {
        let mut out = FormatStatsSnapshot::default();
        assert_eq!(unsafe { UnityTFLiteStats(&mut out) }, 0);
        // Counters only grow, so a later snapshot dominates.
        let later = format_stats();
        assert!(later.formats >= out.formats);
        assert!(later.reporter_messages >= out.reporter_messages);
    }
}
