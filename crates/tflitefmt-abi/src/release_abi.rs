//! Explicit release of handed-off buffers.
//!
//! With tracking on, only buffers the ledger knows are freed; NULL, foreign
//! pointers and second releases are refused without touching the allocator.
//! With tracking off (the default, for hosts that free with `free`), the
//! ledger cannot vouch for any pointer and release is a plain `free`.

use std::ffi::{c_char, c_int, c_void};

use tflitefmt_membrane::{ReleaseOutcome, global_ledger};

pub const RELEASED: c_int = 1;
pub const RELEASE_NULL: c_int = 0;
pub const RELEASE_UNKNOWN: c_int = -1;

abi_fn! {
    /// Free a buffer returned by `UnityTFLiteStringFormat`.
    ///
    /// Returns 1 when released, 0 for NULL and -1 for a pointer this library
    /// did not hand out or has already released (left untouched). The -1
    /// check needs tracking; without it every non-NULL pointer is freed.
    fn UnityTFLiteStringFree(ptr: *const c_char) -> c_int {
        match global_ledger().release(ptr as usize) {
            ReleaseOutcome::Released { .. } | ReleaseOutcome::Untracked => {
                // SAFETY: tracked pointers are live `malloc` results from this
                // library; untracked ones are the caller's to vouch for.
                libc::free(ptr.cast_mut().cast::<c_void>());
                RELEASED
            }
            ReleaseOutcome::Null => RELEASE_NULL,
            ReleaseOutcome::Unknown => RELEASE_UNKNOWN,
        }
    }
}

abi_fn! {
    /// Drop the ledger entry for a buffer the host already freed with `free`.
    fn UnityTFLiteStringForget(ptr: *const c_char) {
        global_ledger().forget(ptr as usize);
    }
}

abi_fn! {
    /// Buffers handed out and neither released nor forgotten (0 while
    /// tracking is off).
    fn UnityTFLiteStringOutstanding() -> usize {
        global_ledger().outstanding()
    }
}

abi_fn! {
    /// Turn handoff tracking on (non-zero) or off (0).
    ///
    /// A host that turns it on promises to return every later buffer through
    /// `UnityTFLiteStringFree` or report its own `free` through
    /// `UnityTFLiteStringForget`. Buffers handed out before tracking was
    /// enabled are unknown to the ledger. Turning it off drops all entries.
    fn UnityTFLiteStringTrack(enabled: c_int) {
        global_ledger().set_tracking(enabled != 0);
    }
}
