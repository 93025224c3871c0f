//! Runtime configuration override for hosts without environment variables.

use std::ffi::c_int;

use tflitefmt_membrane::{RuntimeConfig, SafetyLevel, set_runtime_config};

pub const MODE_STRICT: c_int = 0;
pub const MODE_HARDENED: c_int = 1;

abi_fn! {
    /// Pin mode (0 strict, 1 hardened) and output limit (0 = unlimited) for
    /// the rest of the process. Returns 0, or -1 for an unknown mode.
    fn UnityTFLiteConfigure(mode: c_int, max_len: usize) -> c_int {
        let level = match mode {
            MODE_STRICT => SafetyLevel::Strict,
            MODE_HARDENED => SafetyLevel::Hardened,
            _ => return -1,
        };
        set_runtime_config(RuntimeConfig {
            level,
            max_len: (max_len != 0).then_some(max_len),
        });
        0
    }
}
