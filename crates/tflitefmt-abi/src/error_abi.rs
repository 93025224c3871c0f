//! Thread-local last-error slot.
//!
//! Every format call stores its outcome here: `0` on success, otherwise the
//! `FormatError` code. The slot belongs to the calling thread, so concurrent
//! callers never see each other's results.

use std::cell::Cell;
use std::ffi::c_int;

use tflitefmt_core::FormatError;
use tflitefmt_core::error::FORMAT_OK;

thread_local! {
    static LAST_ERROR: Cell<c_int> = const { Cell::new(FORMAT_OK) };
}

pub(crate) fn set_last_error(code: c_int) {
    LAST_ERROR.with(|slot| slot.set(code));
}

pub(crate) fn record_outcome<T>(result: &Result<T, FormatError>) {
    set_last_error(match result {
        Ok(_) => FORMAT_OK,
        Err(err) => err.code(),
    });
}

/// Code of the current thread's last format failure.
#[must_use]
pub fn last_error() -> c_int {
    LAST_ERROR.with(Cell::get)
}

abi_fn! {
    /// Code of the last failure on the calling thread; `0` when the last call
    /// succeeded. Codes: 1 NULL format, 2 invalid or unsupported directive, 3 missing
    /// argument, 4 argument mismatch, 5 output too long, 6 out of memory.
    fn UnityTFLiteLastError() -> c_int {
        last_error()
    }
}
