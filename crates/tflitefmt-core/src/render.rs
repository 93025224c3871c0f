//! The render loop: segments + argument source -> growing byte buffer.
//!
//! There is no fixed intermediate capacity. Output grows as needed up to an
//! optional limit; what happens at the limit depends on the mode.

use crate::args::{ArgClass, ArgSource, RawArg};
use crate::directive::{Directive, LengthMod, Precision, Segment, Width, segments};
use crate::emit::{
    format_char, format_float, format_pointer, format_signed, format_str, format_unsigned,
};
use crate::error::FormatError;

/// Widths and precisions above C's `INT_MAX` are rejected, as printf does.
const MAX_FIELD: usize = i32::MAX as usize;

/// How [`render`] treats malformed input and oversized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Strict rejects; hardened repairs (literal `%`, truncation).
    pub strict: bool,
    /// Maximum rendered length in bytes, excluding the terminator.
    pub max_len: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::strict()
    }
}

impl RenderOptions {
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict: true,
            max_len: None,
        }
    }

    #[must_use]
    pub const fn hardened() -> Self {
        Self {
            strict: false,
            max_len: None,
        }
    }

    #[must_use]
    pub const fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }
}

/// Output of [`render_report`]: the bytes plus what hardened mode repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Rendered bytes, terminator excluded.
    pub bytes: Vec<u8>,
    /// Malformed directives copied through as a literal `%`.
    pub repairs: usize,
    /// Output was cut at the limit.
    pub truncated: bool,
}

/// Render `fmt` with arguments drawn from `args`.
///
/// The returned bytes exclude the terminator.
pub fn render<S: ArgSource + ?Sized>(
    fmt: &[u8],
    args: &mut S,
    options: &RenderOptions,
) -> Result<Vec<u8>, FormatError> {
    render_report(fmt, args, options).map(|report| report.bytes)
}

/// [`render`], also reporting repairs and truncation.
pub fn render_report<S: ArgSource + ?Sized>(
    fmt: &[u8],
    args: &mut S,
    options: &RenderOptions,
) -> Result<RenderReport, FormatError> {
    let mut out = Vec::with_capacity(fmt.len() + 16);
    let mut cursor = Cursor { args, index: 0 };
    let mut repairs = 0;
    let mut truncated = false;

    for segment in segments(fmt) {
        match segment {
            Segment::Literal(bytes) => out.extend_from_slice(bytes),
            Segment::Percent => out.push(b'%'),
            Segment::Malformed { offset } => {
                if options.strict {
                    return Err(FormatError::InvalidDirective { offset });
                }
                out.push(b'%');
                repairs += 1;
            }
            Segment::Unsupported { offset } => {
                return Err(FormatError::InvalidDirective { offset });
            }
            Segment::Directive(directive) => {
                let resolved = cursor.resolve(directive, options.max_len)?;
                cursor.convert(&resolved, &mut out)?;
            }
        }

        if let Some(limit) = options.max_len
            && out.len() > limit
        {
            if options.strict {
                return Err(FormatError::OutputTooLong {
                    len: out.len(),
                    limit,
                });
            }
            out.truncate(limit);
            truncated = true;
            break;
        }
    }
    Ok(RenderReport {
        bytes: out,
        repairs,
        truncated,
    })
}

/// Reject what [`render`] would reject before reading a single argument.
///
/// A raw `va_list` must not be walked past a directive whose slot is
/// unreadable (`%Lf`, any mode) or that strict mode refuses (malformed `%`):
/// the slots after it would not line up with what the caller pushed.
pub fn validate(fmt: &[u8], options: &RenderOptions) -> Result<(), FormatError> {
    for segment in segments(fmt) {
        match segment {
            Segment::Unsupported { offset } => {
                return Err(FormatError::InvalidDirective { offset });
            }
            Segment::Malformed { offset } if options.strict => {
                return Err(FormatError::InvalidDirective { offset });
            }
            _ => {}
        }
    }
    Ok(())
}

/// [`render`], decoded lossily as UTF-8.
pub fn render_to_string<S: ArgSource + ?Sized>(
    fmt: &[u8],
    args: &mut S,
    options: &RenderOptions,
) -> Result<String, FormatError> {
    render(fmt, args, options).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

struct Cursor<'s, S: ?Sized> {
    args: &'s mut S,
    index: usize,
}

impl<S: ArgSource + ?Sized> Cursor<'_, S> {
    fn take(&mut self, class: ArgClass) -> Result<RawArg, FormatError> {
        let index = self.index;
        let raw = self
            .args
            .next_arg(class)
            .ok_or(FormatError::MissingArgument { index })?;
        if !class.accepts(&raw) {
            return Err(FormatError::ArgumentMismatch {
                index,
                expected: class.name(),
                found: raw.kind(),
            });
        }
        self.index += 1;
        Ok(raw)
    }

    fn take_int(&mut self) -> Result<i32, FormatError> {
        let raw = self.take(ArgClass::Signed(LengthMod::None))?;
        Ok(signed_value(&raw, LengthMod::None) as i32)
    }

    /// Pull `*` width/precision and clamp both so a single directive cannot
    /// outgrow the output limit.
    fn resolve(
        &mut self,
        mut directive: Directive,
        max_len: Option<usize>,
    ) -> Result<Directive, FormatError> {
        if directive.width == Width::FromArg {
            let w = self.take_int()?;
            if w < 0 {
                directive.flags.left_justify = true;
                directive.flags.zero_pad = false;
            }
            directive.width = Width::Fixed(w.unsigned_abs() as usize);
        }
        if directive.precision == Precision::FromArg {
            let p = self.take_int()?;
            // A negative precision is taken as if it were omitted.
            directive.precision = if p < 0 {
                Precision::None
            } else {
                Precision::Fixed(p as usize)
            };
        }

        for field in [directive.field_width(), directive.fixed_precision().unwrap_or(0)] {
            if field > MAX_FIELD {
                return Err(FormatError::OutputTooLong {
                    len: field,
                    limit: MAX_FIELD,
                });
            }
        }
        if let Some(limit) = max_len {
            let cap = limit.saturating_add(1);
            if let Width::Fixed(w) = directive.width {
                directive.width = Width::Fixed(w.min(cap));
            }
            if let Precision::Fixed(p) = directive.precision {
                directive.precision = Precision::Fixed(p.min(cap));
            }
        }
        Ok(directive)
    }

    fn convert(&mut self, directive: &Directive, out: &mut Vec<u8>) -> Result<(), FormatError> {
        let Some(class) = ArgClass::of(directive) else {
            return Ok(());
        };
        let raw = self.take(class)?;
        match (class, raw) {
            (ArgClass::Signed(length), raw) => {
                format_signed(signed_value(&raw, length), directive, out);
            }
            (ArgClass::Unsigned(length), raw) => {
                format_unsigned(unsigned_value(&raw, length), directive, out);
            }
            (ArgClass::Char, raw) => {
                format_char(unsigned_value(&raw, LengthMod::Hh) as u8, directive, out);
            }
            (ArgClass::Double, RawArg::Double(value)) => format_float(value, directive, out),
            (ArgClass::Str(_), RawArg::Str(Some(bytes))) => format_str(&bytes, directive, out),
            (ArgClass::Str(_), RawArg::Str(None)) => format_str(b"(null)", directive, out),
            (ArgClass::Pointer, RawArg::Pointer(addr)) => format_pointer(addr, directive, out),
            // %n is consumed and never written through.
            (ArgClass::Count, _) => {}
            _ => {}
        }
        Ok(())
    }
}

/// Reinterpret an integer slot as the C type named by `length`.
fn signed_value(raw: &RawArg, length: LengthMod) -> i64 {
    let v = match *raw {
        RawArg::Signed(v) => v,
        RawArg::Unsigned(u) => u as i64,
        _ => 0,
    };
    match length {
        LengthMod::Hh => i64::from(v as i8),
        LengthMod::H => i64::from(v as i16),
        LengthMod::None => i64::from(v as i32),
        // glibc reads `%Ld` as `long long`.
        LengthMod::L
        | LengthMod::Ll
        | LengthMod::Z
        | LengthMod::T
        | LengthMod::J
        | LengthMod::BigL => v,
    }
}

fn unsigned_value(raw: &RawArg, length: LengthMod) -> u64 {
    let v = match *raw {
        RawArg::Signed(v) => v as u64,
        RawArg::Unsigned(u) => u,
        _ => 0,
    };
    match length {
        LengthMod::Hh => u64::from(v as u8),
        LengthMod::H => u64::from(v as u16),
        LengthMod::None => u64::from(v as u32),
        LengthMod::L
        | LengthMod::Ll
        | LengthMod::Z
        | LengthMod::T
        | LengthMod::J
        | LengthMod::BigL => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgList;

    fn strict(fmt: &str, args: Vec<RawArg>) -> Result<String, FormatError> {
        render_to_string(fmt.as_bytes(), &mut ArgList::new(args), &RenderOptions::strict())
    }

    fn hardened(fmt: &str, args: Vec<RawArg>, max_len: Option<usize>) -> String {
        render_to_string(
            fmt.as_bytes(),
            &mut ArgList::new(args),
            &RenderOptions::hardened().with_max_len(max_len),
        )
        .unwrap()
    }

    #[test]
    fn renders_int_and_string() {
        let out = strict("%d-%s", vec![RawArg::Signed(42), RawArg::str("ok")]).unwrap();
        assert_eq!(out, "42-ok");
    }

    #[test]
    fn empty_format_renders_empty() {
        assert_eq!(strict("", vec![]).unwrap(), "");
    }

    #[test]
    fn output_longer_than_legacy_buffer_is_complete() {
        let long = "x".repeat(2000);
        let out = strict("[%s]", vec![RawArg::str(&long)]).unwrap();
        assert_eq!(out.len(), 2002);
        assert!(out.starts_with("[xxx") && out.ends_with("xx]"));
    }

    #[test]
    fn star_width_and_precision() {
        let out = strict(
            "%*.*f|%-*d|",
            vec![
                RawArg::Signed(8),
                RawArg::Signed(2),
                RawArg::Double(3.14159),
                RawArg::Signed(-4),
                RawArg::Signed(7),
            ],
        )
        .unwrap();
        assert_eq!(out, "    3.14|7   |");
    }

    #[test]
    fn negative_star_precision_is_ignored() {
        let out = strict("%.*s", vec![RawArg::Signed(-1), RawArg::str("abc")]).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn length_modifiers_truncate() {
        let out = strict(
            "%hhd %hu %d %lld %x",
            vec![
                RawArg::Signed(0x1ff),
                RawArg::Unsigned(0x1_0001),
                RawArg::Signed(0x1_0000_0005),
                RawArg::Signed(-5_000_000_000),
                RawArg::Signed(-1),
            ],
        )
        .unwrap();
        assert_eq!(out, "-1 1 5 -5000000000 ffffffff");
    }

    #[test]
    fn null_string_and_pointer() {
        let out = strict("%s %p", vec![RawArg::Str(None), RawArg::Pointer(0)]).unwrap();
        assert_eq!(out, "(null) (nil)");
    }

    #[test]
    fn count_directive_consumes_without_writing() {
        let out = strict("ab%nc%d", vec![RawArg::Pointer(0x1000), RawArg::Signed(1)]).unwrap();
        assert_eq!(out, "abc1");
    }

    #[test]
    fn char_and_percent() {
        let out = strict("%c%%%5c", vec![RawArg::Signed(65), RawArg::Signed(66)]).unwrap();
        assert_eq!(out, "A%    B");
    }

    #[test]
    fn strict_rejects_malformed_directive() {
        assert_eq!(
            strict("abc %y", vec![]),
            Err(FormatError::InvalidDirective { offset: 4 })
        );
    }

    #[test]
    fn hardened_emits_malformed_directive_literally() {
        assert_eq!(hardened("abc %y%", vec![], None), "abc %y%");
    }

    #[test]
    fn missing_argument_reports_slot() {
        assert_eq!(
            strict("%d %d", vec![RawArg::Signed(1)]),
            Err(FormatError::MissingArgument { index: 1 })
        );
    }

    #[test]
    fn mismatched_argument_reports_kinds() {
        assert_eq!(
            strict("%f", vec![RawArg::Signed(1)]),
            Err(FormatError::ArgumentMismatch {
                index: 0,
                expected: "double",
                found: "signed integer",
            })
        );
    }

    #[test]
    fn strict_limit_rejects_long_output() {
        let result = render(
            b"%s",
            &mut ArgList::new(vec![RawArg::str("abcdef")]),
            &RenderOptions::strict().with_max_len(Some(4)),
        );
        assert_eq!(result, Err(FormatError::OutputTooLong { len: 6, limit: 4 }));
    }

    #[test]
    fn hardened_limit_truncates() {
        assert_eq!(hardened("%s-%s", vec![RawArg::str("abc"), RawArg::str("def")], Some(5)), "abc-d");
    }

    #[test]
    fn limit_caps_huge_width_before_padding() {
        let out = hardened("%*d", vec![RawArg::Signed(1_000_000_000), RawArg::Signed(1)], Some(8));
        assert_eq!(out, "        ");
    }

    #[test]
    fn width_above_int_max_is_rejected() {
        let result = strict("%4294967296d", vec![RawArg::Signed(1)]);
        assert!(matches!(result, Err(FormatError::OutputTooLong { .. })));
    }

    #[test]
    fn exact_limit_is_accepted() {
        let result = render(
            b"abcd",
            &mut ArgList::default(),
            &RenderOptions::strict().with_max_len(Some(4)),
        );
        assert_eq!(result.unwrap(), b"abcd");
    }

    #[test]
    fn long_double_float_is_rejected_in_both_modes() {
        let args = || ArgList::new(vec![RawArg::Double(1.5), RawArg::Signed(7)]);
        for options in [RenderOptions::strict(), RenderOptions::hardened()] {
            assert_eq!(
                render(b"x %Lf|%d", &mut args(), &options),
                Err(FormatError::InvalidDirective { offset: 2 })
            );
        }
    }

    #[test]
    fn big_l_integer_reads_long_long() {
        let out = strict("%Ld", vec![RawArg::Signed(-5_000_000_000)]).unwrap();
        assert_eq!(out, "-5000000000");
    }

    #[test]
    fn validate_matches_mode() {
        let strict_opts = RenderOptions::strict();
        let hardened_opts = RenderOptions::hardened();
        assert_eq!(validate(b"ok %d %s", &strict_opts), Ok(()));
        assert_eq!(
            validate(b"ok %d %", &strict_opts),
            Err(FormatError::InvalidDirective { offset: 6 })
        );
        assert_eq!(validate(b"ok %d %", &hardened_opts), Ok(()));
        assert_eq!(
            validate(b"%d %Le", &hardened_opts),
            Err(FormatError::InvalidDirective { offset: 3 })
        );
        assert_eq!(validate(b"100%% fine", &strict_opts), Ok(()));
    }

    #[test]
    fn report_counts_repairs_and_truncation() {
        let report = render_report(
            b"50%! and %s",
            &mut ArgList::new(vec![RawArg::str("more text")]),
            &RenderOptions::hardened().with_max_len(Some(10)),
        )
        .unwrap();
        assert_eq!(report.bytes, b"50%! and m");
        assert_eq!(report.repairs, 1);
        assert!(report.truncated);
    }
}
