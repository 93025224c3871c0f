//! Helper macros for the exported entry points.

/// Generate a `#[unsafe(no_mangle)] pub unsafe extern "C" fn` with the given
/// signature and body.
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment for the export.
///     fn UnityTFLiteExample(arg: c_int) -> c_int {
///         arg
///     }
/// }
/// ```
///
/// C-variadic exports cannot go through this macro and are written out by hand.
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? ) -> $ret:ty
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(non_snake_case, unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) -> $ret {
            unsafe { $body }
        }
    };

    (
        $(#[$meta:meta])*
        fn $name:ident( $($arg:ident : $argty:ty),* $(,)? )
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        #[allow(non_snake_case, unused_unsafe)]
        pub unsafe extern "C" fn $name( $($arg : $argty),* ) {
            unsafe { $body }
        }
    };
}

/// Read one value per planned slot off a C argument cursor.
///
/// `$ap` is either the cursor of a `...` function or a `va_list` parameter.
/// The C type read for each slot follows the directive's length modifier so
/// that the cursor advances exactly as the caller's `va_start` expects:
/// `hh`/`h`/none read `int`, `l` reads `long`, `ll` and `L` read
/// `long long`, `z`/`t` read the pointer-sized integers, `j` reads
/// `intmax_t`, every floating conversion reads `double`. The plan must come
/// from a format that passed `validate`, so no `long double` slot is read.
///
/// A `%s` argument is read no further than its precision.
///
/// Expands to an `ArgList`.
macro_rules! read_va_args {
    ($plan:expr, $ap:expr) => {{
        use ::std::ffi::{c_char, c_int, c_long, c_longlong, c_uint, c_ulong, c_ulonglong, c_void};
        use ::tflitefmt_core::{ArgClass, ArgList, LengthMod, RawArg};

        let plan: &[ArgClass] = $plan;
        let mut values: Vec<RawArg> = Vec::with_capacity(plan.len());
        for &class in plan {
            let raw = match class {
                ArgClass::Signed(length) => RawArg::Signed(match length {
                    LengthMod::L => i64::from(unsafe { $ap.next_arg::<c_long>() }),
                    LengthMod::Ll | LengthMod::BigL => unsafe { $ap.next_arg::<c_longlong>() },
                    LengthMod::Z | LengthMod::T => (unsafe { $ap.next_arg::<isize>() }) as i64,
                    LengthMod::J => unsafe { $ap.next_arg::<i64>() },
                    _ => i64::from(unsafe { $ap.next_arg::<c_int>() }),
                }),
                ArgClass::Unsigned(length) => RawArg::Unsigned(match length {
                    LengthMod::L => u64::from(unsafe { $ap.next_arg::<c_ulong>() }),
                    LengthMod::Ll | LengthMod::BigL => unsafe { $ap.next_arg::<c_ulonglong>() },
                    LengthMod::Z | LengthMod::T => (unsafe { $ap.next_arg::<usize>() }) as u64,
                    LengthMod::J => unsafe { $ap.next_arg::<u64>() },
                    _ => u64::from(unsafe { $ap.next_arg::<c_uint>() }),
                }),
                ArgClass::Char => RawArg::Signed(i64::from(unsafe { $ap.next_arg::<c_int>() })),
                ArgClass::Double => RawArg::Double(unsafe { $ap.next_arg::<f64>() }),
                ArgClass::Str(bound) => {
                    let ptr = unsafe { $ap.next_arg::<*const c_char>() };
                    let max = bound.resolve(values.last());
                    // SAFETY: a non-NULL `%s` argument is a C string, or an
                    // array of at least `max` bytes, by the caller's contract.
                    RawArg::Str(unsafe { $crate::format_abi::c_str_bytes(ptr, max) })
                }
                ArgClass::Pointer | ArgClass::Count => {
                    RawArg::Pointer((unsafe { $ap.next_arg::<*mut c_void>() }) as usize)
                }
            };
            values.push(raw);
        }
        ArgList::new(values)
    }};
}
