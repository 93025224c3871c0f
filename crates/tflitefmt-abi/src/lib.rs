#![feature(c_variadic)]
// Every export takes raw pointers from C# or native callers; the contract for
// each lives on the symbol's doc comment.
#![allow(clippy::missing_safety_doc)]
//! # tflitefmt-abi
//!
//! `extern "C"` surface of the Unity TensorFlow Lite string-format helper.
//!
//! Builds as a `cdylib` (Android, desktop players) and a `staticlib` (iOS,
//! where managed code binds through `__Internal`). The managed side imports
//! `UnityTFLiteStringFormat` unchanged.
//!
//! # Architecture
//!
//! ```text
//! C/C# caller -> ABI entry (this crate) -> validate -> va_list extraction
//!             -> core render -> malloc'd copy -> (handoff ledger) -> caller owns the buffer
//! ```
//!
//! In **strict** mode malformed directives and oversized output produce a
//! NULL return with a code readable through `UnityTFLiteLastError`.
//! In **hardened** mode the same inputs are repaired: a bad `%` is copied
//! literally and output is truncated at the configured limit. A `long double`
//! conversion (`%Lf`) is refused in both modes before any argument is read.

#[macro_use]
mod macros;

pub mod config_abi;
pub mod error_abi;
pub mod format_abi;
pub mod release_abi;
pub mod reporter_abi;
pub mod stats_abi;
