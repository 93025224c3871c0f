//! Conversion renderers.
//!
//! Each function appends one converted field to `out` with the directive's
//! flags, width and precision applied. Width and precision must already be
//! resolved (no pending `*`).
//!
//! Reference: ISO C11 7.21.6.1, POSIX.1-2024 fprintf.

use std::fmt::Write as _;

use crate::directive::{Directive, FormatFlags};

// ---------------------------------------------------------------------------
// Field layout
// ---------------------------------------------------------------------------

/// A converted value split into the parts padding is inserted between:
/// `[spaces][sign][prefix][zero fill][zeros][body][spaces]`.
struct Field<'a> {
    sign: Option<u8>,
    prefix: &'static [u8],
    zeros: usize,
    body: &'a [u8],
    /// Whether the `0` flag may pad this conversion.
    zero_fill: bool,
}

impl<'a> Field<'a> {
    fn body(body: &'a [u8]) -> Self {
        Self {
            sign: None,
            prefix: b"",
            zeros: 0,
            body,
            zero_fill: false,
        }
    }
}

fn write_field(out: &mut Vec<u8>, directive: &Directive, field: Field<'_>) {
    let flags = directive.flags;
    let content = usize::from(field.sign.is_some())
        + field.prefix.len()
        + field.zeros
        + field.body.len();
    let fill = directive.field_width().saturating_sub(content);
    let zero_fill = field.zero_fill && flags.zero_pad && !flags.left_justify;

    if !flags.left_justify && !zero_fill {
        pad(out, b' ', fill);
    }
    if let Some(sign) = field.sign {
        out.push(sign);
    }
    out.extend_from_slice(field.prefix);
    if zero_fill {
        pad(out, b'0', fill);
    }
    pad(out, b'0', field.zeros);
    out.extend_from_slice(field.body);
    if flags.left_justify {
        pad(out, b' ', fill);
    }
}

fn pad(out: &mut Vec<u8>, byte: u8, count: usize) {
    out.resize(out.len() + count, byte);
}

fn sign_for(negative: bool, flags: FormatFlags) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if flags.force_sign {
        Some(b'+')
    } else if flags.space_sign {
        Some(b' ')
    } else {
        None
    }
}

/// Write `value` in `base` right-aligned into `buf`; returns the digits.
fn render_digits(mut value: u64, base: u64, uppercase: bool, buf: &mut [u8; 64]) -> &[u8] {
    let alpha = if uppercase { b'A' } else { b'a' };
    let mut pos = buf.len();
    loop {
        pos -= 1;
        let digit = (value % base) as u8;
        buf[pos] = if digit < 10 {
            b'0' + digit
        } else {
            alpha + (digit - 10)
        };
        value /= base;
        if value == 0 {
            break;
        }
    }
    &buf[pos..]
}

// ---------------------------------------------------------------------------
// Integers
// ---------------------------------------------------------------------------

/// `%d` / `%i`.
pub fn format_signed(value: i64, directive: &Directive, out: &mut Vec<u8>) {
    let mut buf = [0u8; 64];
    let precision = directive.fixed_precision();
    // Precision 0 with value 0 produces no digits.
    let digits: &[u8] = if value == 0 && precision == Some(0) {
        b""
    } else {
        render_digits(value.unsigned_abs(), 10, false, &mut buf)
    };
    write_field(
        out,
        directive,
        Field {
            sign: sign_for(value < 0, directive.flags),
            prefix: b"",
            zeros: precision.unwrap_or(1).saturating_sub(digits.len()),
            body: digits,
            // An explicit precision disables the '0' flag for integers.
            zero_fill: precision.is_none(),
        },
    );
}

/// `%u` / `%o` / `%x` / `%X`.
pub fn format_unsigned(value: u64, directive: &Directive, out: &mut Vec<u8>) {
    let (base, uppercase) = match directive.conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    };
    let mut buf = [0u8; 64];
    let precision = directive.fixed_precision();
    let digits: &[u8] = if value == 0 && precision == Some(0) {
        b""
    } else {
        render_digits(value, base, uppercase, &mut buf)
    };

    let alt = directive.flags.alt_form;
    let mut zeros = precision.unwrap_or(1).saturating_sub(digits.len());
    let prefix: &'static [u8] = match directive.conversion {
        b'x' if alt && value != 0 => b"0x",
        b'X' if alt && value != 0 => b"0X",
        _ => b"",
    };
    // '#' with 'o' forces the first digit to be zero.
    if alt && directive.conversion == b'o' && zeros == 0 && digits.first() != Some(&b'0') {
        zeros = 1;
    }

    write_field(
        out,
        directive,
        Field {
            sign: None,
            prefix,
            zeros,
            body: digits,
            zero_fill: precision.is_none(),
        },
    );
}

// ---------------------------------------------------------------------------
// Characters, strings, pointers
// ---------------------------------------------------------------------------

/// `%c`.
pub fn format_char(c: u8, directive: &Directive, out: &mut Vec<u8>) {
    write_field(out, directive, Field::body(&[c]));
}

/// `%s`. `s` excludes the terminator; precision caps the bytes taken.
pub fn format_str(s: &[u8], directive: &Directive, out: &mut Vec<u8>) {
    let take = directive.fixed_precision().map_or(s.len(), |p| p.min(s.len()));
    write_field(out, directive, Field::body(&s[..take]));
}

/// `%p`: `0x` followed by lowercase hex, or `(nil)` for NULL.
pub fn format_pointer(addr: usize, directive: &Directive, out: &mut Vec<u8>) {
    if addr == 0 {
        return write_field(out, directive, Field::body(b"(nil)"));
    }
    let mut buf = [0u8; 64];
    let digits = render_digits(addr as u64, 16, false, &mut buf);
    write_field(
        out,
        directive,
        Field {
            prefix: b"0x",
            ..Field::body(digits)
        },
    );
}

// ---------------------------------------------------------------------------
// Floating point
// ---------------------------------------------------------------------------

/// `%f %F %e %E %g %G %a %A`.
///
/// Digit generation uses Rust's correctly rounded float formatting; the
/// exponent, `%g` selection and hex layout follow C.
pub fn format_float(value: f64, directive: &Directive, out: &mut Vec<u8>) {
    let uppercase = directive.conversion.is_ascii_uppercase();
    let sign = sign_for(value.is_sign_negative(), directive.flags);

    if !value.is_finite() {
        let body: &[u8] = match (value.is_nan(), uppercase) {
            (true, false) => b"nan",
            (true, true) => b"NAN",
            (false, false) => b"inf",
            (false, true) => b"INF",
        };
        return write_field(
            out,
            directive,
            Field {
                sign,
                ..Field::body(body)
            },
        );
    }

    let abs = value.abs();
    let precision = directive.fixed_precision();
    let alt = directive.flags.alt_form;
    let mut body = match directive.conversion | 0x20 {
        b'e' => exponent_form(abs, precision.unwrap_or(6), alt),
        b'g' => general_form(abs, precision.unwrap_or(6), alt),
        b'a' => hex_form(abs, precision, alt),
        _ => fixed_form(abs, precision.unwrap_or(6), alt),
    };
    if uppercase {
        body.make_ascii_uppercase();
    }
    // '0' pads between "0x" and the digits.
    let prefix: &'static [u8] = match directive.conversion {
        b'a' => b"0x",
        b'A' => b"0X",
        _ => b"",
    };

    write_field(
        out,
        directive,
        Field {
            sign,
            prefix,
            zeros: 0,
            body: body.as_bytes(),
            zero_fill: true,
        },
    );
}

/// `%f`: `ddd.ddd`.
fn fixed_form(value: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

/// `%e`: `d.ddde±dd`.
fn exponent_form(value: f64, precision: usize, alt: bool) -> String {
    let (mantissa, exp) = split_exponent(value, precision);
    let mut s = String::with_capacity(mantissa.len() + 6);
    s.push_str(&mantissa);
    if alt && precision == 0 {
        s.push('.');
    }
    s.push('e');
    s.push(if exp < 0 { '-' } else { '+' });
    let _ = write!(s, "{:02}", exp.unsigned_abs());
    s
}

/// Rust renders `1.5e3`; split that into mantissa text and exponent.
fn split_exponent(value: f64, precision: usize) -> (String, i32) {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

/// `%g`: `%e` when the exponent is below -4 or at least the precision,
/// `%f` otherwise; trailing zeros dropped unless `#`.
fn general_form(value: f64, precision: usize, alt: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        split_exponent(value, p - 1).1
    };

    let mut s = if exp >= -4 && i64::from(exp) < p as i64 {
        fixed_form(value, (p as i64 - 1 - i64::from(exp)) as usize, alt)
    } else {
        exponent_form(value, p - 1, alt)
    };
    if !alt {
        strip_trailing_zeros(&mut s);
    }
    s
}

/// Drop trailing fractional zeros (and a bare '.') before any exponent.
fn strip_trailing_zeros(s: &mut String) {
    let split = s.find('e').unwrap_or(s.len());
    let (mantissa, exponent) = s.split_at(split);
    if !mantissa.contains('.') {
        return;
    }
    let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
    *s = format!("{trimmed}{exponent}");
}

/// `%a` without its `0x` prefix: `h.hhhp±d`.
fn hex_form(value: f64, precision: Option<usize>, alt: bool) -> String {
    const FRAC_BITS: u32 = 52;
    const FRAC_DIGITS: usize = 13;

    let bits = value.to_bits();
    let biased = ((bits >> FRAC_BITS) & 0x7ff) as i32;
    let mut frac = bits & ((1u64 << FRAC_BITS) - 1);
    let (mut lead, exp) = match (value == 0.0, biased) {
        (true, _) => (0u64, 0),
        (false, 0) => (0, -1022), // subnormal
        (false, b) => (1, b - 1023),
    };

    let digits = match precision {
        Some(p) if p < FRAC_DIGITS => {
            // Round to nearest, ties to even.
            let shift = (FRAC_DIGITS - p) as u32 * 4;
            let rem = frac & ((1u64 << shift) - 1);
            let half = 1u64 << (shift - 1);
            frac >>= shift;
            // With no hex digits kept, the leading digit is the one rounded.
            let odd = if p == 0 { lead & 1 == 1 } else { frac & 1 == 1 };
            if rem > half || (rem == half && odd) {
                frac += 1;
                if frac == 1u64 << (p as u32 * 4) {
                    frac = 0;
                    lead += 1;
                }
            }
            if p == 0 {
                String::new()
            } else {
                format!("{frac:0p$x}")
            }
        }
        Some(p) => {
            let mut d = format!("{frac:013x}");
            d.extend(std::iter::repeat_n('0', p - FRAC_DIGITS));
            d
        }
        None => {
            let d = format!("{frac:013x}");
            d.trim_end_matches('0').to_string()
        }
    };

    let mut s = String::with_capacity(digits.len() + 12);
    let _ = write!(s, "{lead}");
    if !digits.is_empty() || alt {
        s.push('.');
        s.push_str(&digits);
    }
    let _ = write!(s, "p{}{}", if exp < 0 { '-' } else { '+' }, exp.unsigned_abs());
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::LengthMod;

    fn flags(f: impl FnOnce(&mut FormatFlags)) -> FormatFlags {
        let mut flags = FormatFlags::default();
        f(&mut flags);
        flags
    }

    fn float(d: Directive, value: f64) -> String {
        let mut out = Vec::new();
        format_float(value, &d, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_signed_basic() {
        let mut buf = Vec::new();
        format_signed(42, &Directive::plain(b'd'), &mut buf);
        assert_eq!(&buf, b"42");
    }

    #[test]
    fn test_format_signed_negative() {
        let mut buf = Vec::new();
        format_signed(-123, &Directive::plain(b'd'), &mut buf);
        assert_eq!(&buf, b"-123");
    }

    #[test]
    fn test_format_signed_width_pad() {
        let mut buf = Vec::new();
        format_signed(42, &Directive::plain(b'd').with_width(8), &mut buf);
        assert_eq!(&buf, b"      42");
    }

    #[test]
    fn test_format_signed_zero_pad_after_sign() {
        let d = Directive::plain(b'd')
            .with_width(6)
            .with_flags(flags(|f| f.zero_pad = true));
        let mut buf = Vec::new();
        format_signed(-42, &d, &mut buf);
        assert_eq!(&buf, b"-00042");
    }

    #[test]
    fn test_precision_disables_zero_flag() {
        let d = Directive::plain(b'd')
            .with_width(6)
            .with_precision(3)
            .with_flags(flags(|f| f.zero_pad = true));
        let mut buf = Vec::new();
        format_signed(7, &d, &mut buf);
        assert_eq!(&buf, b"   007");
    }

    #[test]
    fn test_format_signed_left_justify() {
        let d = Directive::plain(b'd')
            .with_width(8)
            .with_flags(flags(|f| f.left_justify = true));
        let mut buf = Vec::new();
        format_signed(42, &d, &mut buf);
        assert_eq!(&buf, b"42      ");
    }

    #[test]
    fn test_force_and_space_sign() {
        let mut buf = Vec::new();
        format_signed(42, &Directive::plain(b'd').with_flags(flags(|f| f.force_sign = true)), &mut buf);
        format_signed(42, &Directive::plain(b'd').with_flags(flags(|f| f.space_sign = true)), &mut buf);
        assert_eq!(&buf, b"+42 42");
    }

    #[test]
    fn test_precision_zero_value_zero() {
        let mut buf = Vec::new();
        format_signed(0, &Directive::plain(b'd').with_precision(0), &mut buf);
        assert_eq!(&buf, b"");
    }

    #[test]
    fn test_i64_min() {
        let mut buf = Vec::new();
        format_signed(i64::MIN, &Directive::plain(b'd').with_length(LengthMod::Ll), &mut buf);
        assert_eq!(&buf, b"-9223372036854775808");
    }

    #[test]
    fn test_format_unsigned_hex_alt() {
        let alt = flags(|f| f.alt_form = true);
        let mut buf = Vec::new();
        format_unsigned(255, &Directive::plain(b'x').with_flags(alt), &mut buf);
        buf.push(b'|');
        format_unsigned(255, &Directive::plain(b'X').with_flags(alt), &mut buf);
        buf.push(b'|');
        format_unsigned(0, &Directive::plain(b'x').with_flags(alt), &mut buf);
        assert_eq!(&buf, b"0xff|0XFF|0");
    }

    #[test]
    fn test_format_unsigned_octal_alt() {
        let alt = flags(|f| f.alt_form = true);
        let mut buf = Vec::new();
        format_unsigned(8, &Directive::plain(b'o').with_flags(alt), &mut buf);
        buf.push(b'|');
        format_unsigned(0, &Directive::plain(b'o').with_flags(alt), &mut buf);
        buf.push(b'|');
        format_unsigned(0, &Directive::plain(b'o').with_flags(alt).with_precision(0), &mut buf);
        assert_eq!(&buf, b"010|0|0");
    }

    #[test]
    fn test_format_unsigned_zero_pad_after_prefix() {
        let d = Directive::plain(b'x')
            .with_width(8)
            .with_flags(flags(|f| {
                f.alt_form = true;
                f.zero_pad = true;
            }));
        let mut buf = Vec::new();
        format_unsigned(0xbeef, &d, &mut buf);
        assert_eq!(&buf, b"0x00beef");
    }

    #[test]
    fn test_format_str_precision_and_width() {
        let mut buf = Vec::new();
        format_str(b"hello", &Directive::plain(b's').with_precision(3), &mut buf);
        buf.push(b'|');
        format_str(
            b"ok",
            &Directive::plain(b's')
                .with_width(4)
                .with_flags(flags(|f| f.left_justify = true)),
            &mut buf,
        );
        buf.push(b'|');
        assert_eq!(&buf, b"hel|ok  |");
    }

    #[test]
    fn test_format_char() {
        let mut buf = Vec::new();
        format_char(b'A', &Directive::plain(b'c').with_width(5), &mut buf);
        assert_eq!(&buf, b"    A");
    }

    #[test]
    fn test_format_pointer() {
        let mut buf = Vec::new();
        format_pointer(0, &Directive::plain(b'p'), &mut buf);
        buf.push(b'|');
        format_pointer(0xDEAD, &Directive::plain(b'p'), &mut buf);
        assert_eq!(&buf, b"(nil)|0xdead");
    }

    #[test]
    fn test_fixed() {
        assert_eq!(float(Directive::plain(b'f'), core::f64::consts::PI), "3.141593");
        assert_eq!(float(Directive::plain(b'f').with_precision(2), -1.005e3), "-1005.00");
        assert_eq!(float(Directive::plain(b'f').with_precision(0), 3.7), "4");
        assert_eq!(
            float(
                Directive::plain(b'f')
                    .with_precision(0)
                    .with_flags(flags(|f| f.alt_form = true)),
                3.0
            ),
            "3."
        );
        assert_eq!(float(Directive::plain(b'f'), -0.0), "-0.000000");
    }

    #[test]
    fn test_fixed_zero_pad() {
        let d = Directive::plain(b'f')
            .with_width(8)
            .with_precision(3)
            .with_flags(flags(|f| f.zero_pad = true));
        assert_eq!(float(d, -3.14159), "-003.142");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(float(Directive::plain(b'e'), 12345.678), "1.234568e+04");
        assert_eq!(float(Directive::plain(b'E').with_precision(2), 0.000123), "1.23E-04");
        assert_eq!(float(Directive::plain(b'e').with_precision(2), 9.996), "1.00e+01");
        assert_eq!(
            float(
                Directive::plain(b'e')
                    .with_precision(2)
                    .with_flags(flags(|f| f.force_sign = true)),
                0.0
            ),
            "+0.00e+00"
        );
        assert_eq!(float(Directive::plain(b'e').with_precision(1), 1e-300), "1.0e-300");
    }

    #[test]
    fn test_general() {
        let g = Directive::plain(b'g');
        assert_eq!(float(g, 0.0001), "0.0001");
        assert_eq!(float(g, 0.00001), "1e-05");
        assert_eq!(float(g, 100000.0), "100000");
        assert_eq!(float(g, 1000000.0), "1e+06");
        assert_eq!(float(g, 123456789.0), "1.23457e+08");
        assert_eq!(float(g, 2.5), "2.5");
        assert_eq!(float(g, 0.0), "0");
        assert_eq!(float(Directive::plain(b'G'), 1e-10), "1E-10");
        assert_eq!(
            float(g.with_flags(flags(|f| f.alt_form = true)), 1.0),
            "1.00000"
        );
    }

    #[test]
    fn test_hex() {
        let a = Directive::plain(b'a');
        assert_eq!(float(a, 1.0), "0x1p+0");
        assert_eq!(float(a, 0.5), "0x1p-1");
        assert_eq!(float(a, 3.0), "0x1.8p+1");
        assert_eq!(float(a, 0.0), "0x0p+0");
        assert_eq!(float(a, -2.0), "-0x1p+1");
        assert_eq!(float(a.with_precision(1), 1.0), "0x1.0p+0");
        assert_eq!(float(Directive::plain(b'A'), 255.0), "0X1.FEP+7");
    }

    #[test]
    fn test_hex_zero_pad_follows_prefix() {
        let zero = flags(|f| f.zero_pad = true);
        assert_eq!(float(Directive::plain(b'a').with_width(10).with_flags(zero), 1.0), "0x00001p+0");
        assert_eq!(float(Directive::plain(b'A').with_width(10).with_flags(zero), -1.0), "-0X0001P+0");
        assert_eq!(float(Directive::plain(b'a').with_width(10), 1.0), "    0x1p+0");
    }

    #[test]
    fn test_hex_precision_zero_rounds_leading_digit() {
        let a0 = Directive::plain(b'a').with_precision(0);
        // Ties go to the even leading digit.
        assert_eq!(float(a0, 1.5), "0x2p+0");
        assert_eq!(float(a0, 1.25), "0x1p+0");
        assert_eq!(float(a0, 1.75), "0x2p+0");
        assert_eq!(float(a0.with_flags(flags(|f| f.alt_form = true)), 1.0), "0x1.p+0");
        assert_eq!(float(Directive::plain(b'a').with_precision(1), 1.03125), "0x1.0p+0");
        assert_eq!(float(Directive::plain(b'a').with_precision(1), 1.09375), "0x1.2p+0");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(float(Directive::plain(b'f'), f64::NAN), "nan");
        assert_eq!(float(Directive::plain(b'F'), f64::INFINITY), "INF");
        assert_eq!(float(Directive::plain(b'e'), f64::NEG_INFINITY), "-inf");
        let padded = Directive::plain(b'f')
            .with_width(5)
            .with_flags(flags(|f| f.zero_pad = true));
        assert_eq!(float(padded, f64::INFINITY), "  inf");
    }
}
