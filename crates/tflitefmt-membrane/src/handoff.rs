//! Ledger of buffers whose ownership has passed to the host.
//!
//! The formatter never frees what it hands out. The ledger only remembers
//! address and length so that the explicit release entry point can tell a
//! buffer it produced from a foreign or already-released pointer, and so
//! leak checks can count what is still outstanding.
//!
//! Tracking is off until a host turns it on. Mono frees returned strings
//! with `free` behind the ledger's back; entries it leaves behind would go
//! stale and, once `malloc` reuses the address, vouch for memory this
//! library never produced. A host that enables tracking commits to giving
//! every buffer back through the release API (or reporting its own `free`
//! through [`HandoffLedger::forget`]).
//!
//! Keys are addresses (`usize`) so the ledger stays free of raw pointers
//! and can live in a `static`.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Result of [`HandoffLedger::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Known buffer; the caller may now free it.
    Released { len: usize },
    /// Not produced by this formatter, or already released.
    Unknown,
    /// Tracking is off; the ledger cannot vouch either way.
    Untracked,
    /// NULL address.
    Null,
}

/// Lifetime totals for a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub handed_out: u64,
    pub released: u64,
    pub forgotten: u64,
    pub unknown_releases: u64,
    pub outstanding: usize,
    pub outstanding_bytes: usize,
}

pub struct HandoffLedger {
    tracking: AtomicBool,
    live: Mutex<BTreeMap<usize, usize>>,
    handed_out: AtomicU64,
    released: AtomicU64,
    forgotten: AtomicU64,
    unknown_releases: AtomicU64,
}

impl HandoffLedger {
    /// A ledger with tracking off.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_tracking(false)
    }

    /// A ledger with tracking on.
    #[must_use]
    pub const fn tracked() -> Self {
        Self::with_tracking(true)
    }

    const fn with_tracking(tracking: bool) -> Self {
        Self {
            tracking: AtomicBool::new(tracking),
            live: Mutex::new(BTreeMap::new()),
            handed_out: AtomicU64::new(0),
            released: AtomicU64::new(0),
            forgotten: AtomicU64::new(0),
            unknown_releases: AtomicU64::new(0),
        }
    }

    /// Turn tracking on or off. Turning it off drops every entry: the host
    /// no longer promises to report what it frees.
    pub fn set_tracking(&self, enabled: bool) {
        let mut live = self.live.lock();
        self.tracking.store(enabled, Ordering::Relaxed);
        if !enabled {
            live.clear();
        }
    }

    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.tracking.load(Ordering::Relaxed)
    }

    /// Record a buffer of `len` bytes (terminator included) at `addr`.
    /// No-op while tracking is off.
    pub fn record(&self, addr: usize, len: usize) {
        if addr == 0 {
            return;
        }
        let mut live = self.live.lock();
        if !self.is_tracking() {
            return;
        }
        live.insert(addr, len);
        drop(live);
        self.handed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Take `addr` out of the ledger ahead of freeing it.
    pub fn release(&self, addr: usize) -> ReleaseOutcome {
        if addr == 0 {
            return ReleaseOutcome::Null;
        }
        let mut live = self.live.lock();
        if !self.is_tracking() {
            return ReleaseOutcome::Untracked;
        }
        match live.remove(&addr) {
            Some(len) => {
                self.released.fetch_add(1, Ordering::Relaxed);
                ReleaseOutcome::Released { len }
            }
            None => {
                self.unknown_releases.fetch_add(1, Ordering::Relaxed);
                ReleaseOutcome::Unknown
            }
        }
    }

    /// Drop `addr` without claiming it: the host freed it with its own `free`.
    /// Returns whether the address was known.
    pub fn forget(&self, addr: usize) -> bool {
        let known = self.live.lock().remove(&addr).is_some();
        if known {
            self.forgotten.fetch_add(1, Ordering::Relaxed);
        }
        known
    }

    #[must_use]
    pub fn contains(&self, addr: usize) -> bool {
        self.live.lock().contains_key(&addr)
    }

    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.live.lock().len()
    }

    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        let (outstanding, outstanding_bytes) = {
            let live = self.live.lock();
            (live.len(), live.values().sum())
        };
        LedgerStats {
            handed_out: self.handed_out.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            forgotten: self.forgotten.load(Ordering::Relaxed),
            unknown_releases: self.unknown_releases.load(Ordering::Relaxed),
            outstanding,
            outstanding_bytes,
        }
    }
}

impl Default for HandoffLedger {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_LEDGER: HandoffLedger = HandoffLedger::new();

/// The ledger shared by every exported entry point.
#[must_use]
pub fn global_ledger() -> &'static HandoffLedger {
    &GLOBAL_LEDGER
}
