//! TFLite error-reporter callback and host log sink.
//!
//! The interpreter calls its error reporter as
//! `void (*)(void* user_data, const char* format, va_list args)`.
//! [`UnityTFLiteErrorReporter`] has that shape: it renders the message in
//! hardened mode (a reporter never fails), prefixes it and passes it to the
//! sink the host registered. The message pointer is only valid during the
//! sink call. Without a sink the line goes to stderr.

use std::ffi::{CStr, CString, VaList, c_char, c_int, c_void};

use parking_lot::RwLock;
use tflitefmt_core::{ArgSource, RenderOptions, arg_plan, render, validate};
use tflitefmt_membrane::{FormatMetrics, global_metrics, runtime_config};

/// Host log callback: `(level, message, user_data)`.
pub type LogSink = extern "C" fn(level: c_int, msg: *const c_char, user_data: *mut c_void);

pub const LEVEL_WARNING: c_int = 1;
pub const WARNING_PREFIX: &[u8] = b"TFLite Warning: ";

static SINK: RwLock<Option<LogSink>> = RwLock::new(None);

abi_fn! {
    /// Register the host log sink; NULL restores the stderr fallback.
    fn UnityTFLiteSetLogSink(sink: Option<LogSink>) {
        *SINK.write() = sink;
    }
}

/// Prefixed reporter line for `fmt`.
///
/// Rendering is hardened; if arguments still do not fit the format, the
/// error text stands in for the message.
pub fn reporter_message<S: ArgSource + ?Sized>(fmt: &[u8], args: &mut S) -> Vec<u8> {
    let body = render(fmt, args, &reporter_options())
        .unwrap_or_else(|err| format!("<{err}>").into_bytes());
    prefixed(&body)
}

fn reporter_options() -> RenderOptions {
    RenderOptions::hardened().with_max_len(runtime_config().max_len)
}

fn prefixed(body: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(WARNING_PREFIX.len() + body.len());
    line.extend_from_slice(WARNING_PREFIX);
    line.extend_from_slice(body);
    line
}

/// Deliver `line` to the registered sink, or stderr.
///
/// A `%c` of 0 can put a NUL inside the line; the text stops there.
pub fn deliver(level: c_int, line: Vec<u8>, user_data: *mut c_void) {
    let line = CString::new(line).unwrap_or_else(|err| {
        let end = err.nul_position();
        let mut bytes = err.into_vec();
        bytes.truncate(end);
        CString::new(bytes).unwrap_or_default()
    });
    FormatMetrics::inc(&global_metrics().reporter_messages);

    // Copy the pointer out so a sink may re-register without deadlocking.
    let sink = *SINK.read();
    match sink {
        Some(sink) => sink(level, line.as_ptr(), user_data),
        None => eprintln!("{}", line.to_string_lossy()),
    }
}

/// Render and deliver one warning with an already-typed argument source.
pub fn report<S: ArgSource + ?Sized>(user_data: *mut c_void, fmt: &[u8], args: &mut S) {
    deliver(LEVEL_WARNING, reporter_message(fmt, args), user_data);
}

/// TFLite error reporter. NULL formats are dropped.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn UnityTFLiteErrorReporter(
    user_data: *mut c_void,
    format: *const c_char,
    ap: VaList,
) {
    if format.is_null() {
        return;
    }
    // SAFETY: non-NULL format is a C string by the reporter contract.
    let fmt = unsafe { CStr::from_ptr(format) }.to_bytes();
    // An unreadable slot means the cursor is not walked at all.
    if let Err(err) = validate(fmt, &reporter_options()) {
        return deliver(LEVEL_WARNING, prefixed(format!("<{err}>").as_bytes()), user_data);
    }
    let plan = arg_plan(fmt);
    let mut cursor = ap.clone();
    let mut args = read_va_args!(&plan, cursor);
    report(user_data, fmt, &mut args);
}
