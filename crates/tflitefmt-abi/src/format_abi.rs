//! Format-and-handoff entry points.
//!
//! Each successful call renders into a growing buffer, copies the result
//! into a fresh `malloc` allocation with a trailing NUL and hands that
//! allocation to the caller. The library keeps no reference to it, beyond a
//! ledger entry when the host enabled tracking. Mono marshals the returned
//! `string` and frees it with `free`; native callers may use
//! `UnityTFLiteStringFree` instead.

use std::ffi::{CStr, VaList, c_char};
use std::ptr;

use tflitefmt_core::{ArgSource, FormatError, RenderOptions, arg_plan, render_report, validate};
use tflitefmt_membrane::{FormatMetrics, RuntimeConfig, global_ledger, global_metrics, runtime_config};

use crate::error_abi::{record_outcome, set_last_error};

/// Render options for a runtime configuration.
pub(crate) fn options_for(config: RuntimeConfig) -> RenderOptions {
    let base = if config.level.heals_enabled() {
        RenderOptions::hardened()
    } else {
        RenderOptions::strict()
    };
    base.with_max_len(config.max_len)
}

/// Bytes of a `%s` argument, reading at most `max` of them.
///
/// # Safety
///
/// `ptr` is NULL, a NUL-terminated string, or points to at least `max`
/// readable bytes.
pub(crate) unsafe fn c_str_bytes(ptr: *const c_char, max: Option<usize>) -> Option<Vec<u8>> {
    if ptr.is_null() {
        return None;
    }
    let len = match max {
        Some(max) => unsafe { libc::strnlen(ptr, max) },
        None => unsafe { libc::strlen(ptr) },
    };
    // SAFETY: `len` bytes from `ptr` are readable per the contract above.
    Some(unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }.to_vec())
}

/// Validate the format before anything is read off the argument cursor.
unsafe fn prepare<'a>(format: *const c_char) -> Result<(&'a [u8], RuntimeConfig), FormatError> {
    if format.is_null() {
        return Err(FormatError::NullFormat);
    }
    // SAFETY: non-NULL format is a C string by the caller's contract.
    let fmt = unsafe { CStr::from_ptr(format) }.to_bytes();
    let config = runtime_config();
    validate(fmt, &options_for(config))?;
    Ok((fmt, config))
}

fn fail(err: FormatError) -> *const c_char {
    FormatMetrics::inc(&global_metrics().failures);
    set_last_error(err.code());
    ptr::null()
}

/// Copy `bytes` plus a terminator into a new C heap allocation and record
/// it in the handoff ledger (when tracking is on).
fn hand_off(bytes: &[u8]) -> Result<*const c_char, FormatError> {
    let size = bytes.len() + 1;
    // SAFETY: plain C allocation; NULL is checked before use.
    let buf = unsafe { libc::malloc(size) }.cast::<u8>();
    if buf.is_null() {
        return Err(FormatError::OutOfMemory { requested: size });
    }
    // SAFETY: `buf` holds `size` bytes and does not overlap `bytes`.
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), buf, bytes.len());
        *buf.add(bytes.len()) = 0;
    }
    global_ledger().record(buf as usize, size);
    Ok(buf.cast_const().cast())
}

fn format_with_config<S: ArgSource + ?Sized>(
    fmt: &[u8],
    args: &mut S,
    config: RuntimeConfig,
) -> *const c_char {
    let metrics = global_metrics();
    FormatMetrics::inc(&metrics.formats);

    let result = render_report(fmt, args, &options_for(config)).and_then(|report| {
        let out = hand_off(&report.bytes)?;
        FormatMetrics::add(&metrics.bytes_rendered, report.bytes.len() as u64);
        FormatMetrics::add(&metrics.repairs, report.repairs as u64);
        if report.truncated {
            FormatMetrics::inc(&metrics.truncations);
        }
        Ok(out)
    });
    record_outcome(&result);
    result.unwrap_or_else(|_| {
        FormatMetrics::inc(&metrics.failures);
        ptr::null()
    })
}

/// Format with an already-typed argument source and hand the result off.
///
/// Returns NULL on failure with the reason in the thread's last-error slot.
/// A non-NULL result is owned by the caller.
#[must_use]
pub fn format_to_handoff<S: ArgSource + ?Sized>(fmt: &[u8], args: &mut S) -> *const c_char {
    let config = runtime_config();
    if let Err(err) = validate(fmt, &options_for(config)) {
        return fail(err);
    }
    format_with_config(fmt, args, config)
}

/// Format `format` with the arguments in `ap` into a new NUL-terminated
/// buffer owned by the caller.
///
/// The cursor is duplicated before reading, so `ap` itself is left
/// unconsumed. Returns NULL on failure; see `UnityTFLiteLastError`.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn UnityTFLiteStringFormat(
    format: *const c_char,
    ap: VaList,
) -> *const c_char {
    let (fmt, config) = match unsafe { prepare(format) } {
        Ok(prepared) => prepared,
        Err(err) => return fail(err),
    };
    let plan = arg_plan(fmt);
    let mut cursor = ap.clone();
    let mut args = read_va_args!(&plan, cursor);
    format_with_config(fmt, &mut args, config)
}

/// Variadic twin of [`UnityTFLiteStringFormat`] for native callers.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub unsafe extern "C" fn UnityTFLiteStringFormatArgs(
    format: *const c_char,
    mut args: ...
) -> *const c_char {
    let (fmt, config) = match unsafe { prepare(format) } {
        Ok(prepared) => prepared,
        Err(err) => return fail(err),
    };
    let plan = arg_plan(fmt);
    let mut values = read_va_args!(&plan, args);
    format_with_config(fmt, &mut values, config)
}
