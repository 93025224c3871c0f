//! printf directive parser.
//!
//! Splits a format string into literal runs and `%` directives following
//! ISO C11 7.21.6.1. Parsing is byte-oriented: format strings arrive from C
//! and are not required to be UTF-8.

// ---------------------------------------------------------------------------
// Directive types
// ---------------------------------------------------------------------------

/// Flags parsed from a directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier. Decides which C type the argument slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

/// One parsed `%` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

impl Directive {
    /// A directive with no flags, width, precision or length modifier.
    #[must_use]
    pub const fn plain(conversion: u8) -> Self {
        Self {
            flags: FormatFlags {
                left_justify: false,
                force_sign: false,
                space_sign: false,
                alt_form: false,
                zero_pad: false,
            },
            width: Width::None,
            precision: Precision::None,
            length: LengthMod::None,
            conversion,
        }
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = Width::Fixed(width);
        self
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Precision::Fixed(precision);
        self
    }

    #[must_use]
    pub const fn with_length(mut self, length: LengthMod) -> Self {
        self.length = length;
        self
    }

    /// Resolved field width (0 when absent or still pending a `*` argument).
    #[must_use]
    pub const fn field_width(&self) -> usize {
        match self.width {
            Width::Fixed(w) => w,
            _ => 0,
        }
    }

    /// Resolved precision, if any.
    #[must_use]
    pub const fn fixed_precision(&self) -> Option<usize> {
        match self.precision {
            Precision::Fixed(p) => Some(p),
            _ => None,
        }
    }

    /// True for `f F e E g G a A`.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(
            self.conversion,
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A'
        )
    }

    /// Whether the argument slot can be read at all.
    ///
    /// `%Lf` and friends take a `long double`, which has no portable Rust
    /// type; reading a `double` instead would misalign every later slot.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !(self.is_float() && matches!(self.length, LengthMod::BigL))
    }
}

/// A piece of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Bytes emitted verbatim.
    Literal(&'a [u8]),
    /// `%%`.
    Percent,
    /// A conversion that consumes argument slots.
    Directive(Directive),
    /// A `%` that does not start a valid directive. `offset` is the byte
    /// position of the `%` in the format string.
    Malformed { offset: usize },
    /// A well-formed directive whose argument cannot be read (`%Lf`).
    /// Rejected in every mode.
    Unsupported { offset: usize },
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse one directive starting at the byte after `%`.
///
/// Returns the directive and the number of bytes consumed from `fmt`, or
/// `None` when the bytes do not form a directive. A `%` conversion (as in
/// `%%`) is returned like any other so callers can treat it as a literal.
#[must_use]
pub fn parse_directive(fmt: &[u8]) -> Option<(Directive, usize)> {
    let mut pos = 0;
    let at = |pos: usize| fmt.get(pos).copied();

    let mut flags = FormatFlags::default();
    while let Some(b) = at(pos) {
        match b {
            b'-' => flags.left_justify = true,
            b'+' => flags.force_sign = true,
            b' ' => flags.space_sign = true,
            b'#' => flags.alt_form = true,
            b'0' => flags.zero_pad = true,
            _ => break,
        }
        pos += 1;
    }
    // '+' overrides ' '; '-' overrides '0'.
    if flags.force_sign {
        flags.space_sign = false;
    }
    if flags.left_justify {
        flags.zero_pad = false;
    }

    let width = if at(pos) == Some(b'*') {
        pos += 1;
        Width::FromArg
    } else {
        match take_decimal(fmt, &mut pos) {
            Some(w) => Width::Fixed(w),
            None => Width::None,
        }
    };

    let precision = if at(pos) == Some(b'.') {
        pos += 1;
        if at(pos) == Some(b'*') {
            pos += 1;
            Precision::FromArg
        } else {
            // A lone '.' means precision zero.
            Precision::Fixed(take_decimal(fmt, &mut pos).unwrap_or(0))
        }
    } else {
        Precision::None
    };

    let length = match (at(pos), at(pos + 1)) {
        (Some(b'h'), Some(b'h')) => {
            pos += 2;
            LengthMod::Hh
        }
        (Some(b'l'), Some(b'l')) => {
            pos += 2;
            LengthMod::Ll
        }
        (Some(b @ (b'h' | b'l' | b'z' | b't' | b'j' | b'L' | b'q')), _) => {
            pos += 1;
            match b {
                b'h' => LengthMod::H,
                b'l' => LengthMod::L,
                b'z' => LengthMod::Z,
                b't' => LengthMod::T,
                b'j' => LengthMod::J,
                b'q' => LengthMod::Ll,
                _ => LengthMod::BigL,
            }
        }
        _ => LengthMod::None,
    };

    let conversion = at(pos)?;
    pos += 1;
    match conversion {
        b'd' | b'i' | b'u' | b'o' | b'x' | b'X' | b'c' | b's' | b'p' | b'n' | b'%' | b'f'
        | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => {}
        _ => return None,
    }

    Some((
        Directive {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

/// Iterate over the segments of a format string.
#[must_use]
pub fn segments(fmt: &[u8]) -> Segments<'_> {
    Segments { fmt, pos: 0 }
}

/// Iterator returned by [`segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    fmt: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        let fmt = self.fmt;
        let start = self.pos;
        if start >= fmt.len() {
            return None;
        }

        if fmt[start] != b'%' {
            let end = fmt[start..]
                .iter()
                .position(|&b| b == b'%')
                .map_or(fmt.len(), |i| start + i);
            self.pos = end;
            return Some(Segment::Literal(&fmt[start..end]));
        }

        match parse_directive(&fmt[start + 1..]) {
            Some((directive, consumed)) => {
                self.pos = start + 1 + consumed;
                if directive.conversion == b'%' {
                    Some(Segment::Percent)
                } else if !directive.is_supported() {
                    Some(Segment::Unsupported { offset: start })
                } else {
                    Some(Segment::Directive(directive))
                }
            }
            None => {
                // Only the '%' is consumed; what follows is read as literal text.
                self.pos = start + 1;
                Some(Segment::Malformed { offset: start })
            }
        }
    }
}

fn take_decimal(fmt: &[u8], pos: &mut usize) -> Option<usize> {
    let start = *pos;
    let mut value = 0_usize;
    while let Some(&d) = fmt.get(*pos).filter(|b| b.is_ascii_digit()) {
        value = value.saturating_mul(10).saturating_add(usize::from(d - b'0'));
        *pos += 1;
    }
    (*pos > start).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_int() {
        let (d, consumed) = parse_directive(b"d").unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(d, Directive::plain(b'd'));
    }

    #[test]
    fn test_parse_width_precision() {
        let (d, consumed) = parse_directive(b"10.5f").unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(d.width, Width::Fixed(10));
        assert_eq!(d.precision, Precision::Fixed(5));
        assert!(d.is_float());
    }

    #[test]
    fn test_lone_dot_is_zero_precision() {
        let (d, _) = parse_directive(b".s").unwrap();
        assert_eq!(d.precision, Precision::Fixed(0));
    }

    #[test]
    fn test_flag_overrides() {
        let (d, _) = parse_directive(b"-+ #010d").unwrap();
        assert!(d.flags.left_justify);
        assert!(d.flags.force_sign);
        assert!(!d.flags.space_sign);
        assert!(d.flags.alt_form);
        assert!(!d.flags.zero_pad);
        assert_eq!(d.width, Width::Fixed(10));
    }

    #[test]
    fn test_length_modifiers() {
        let cases: [(&[u8], LengthMod); 8] = [
            (b"hhd", LengthMod::Hh),
            (b"hd", LengthMod::H),
            (b"ld", LengthMod::L),
            (b"lld", LengthMod::Ll),
            (b"zu", LengthMod::Z),
            (b"td", LengthMod::T),
            (b"jd", LengthMod::J),
            (b"Lf", LengthMod::BigL),
        ];
        for (fmt, expected) in cases {
            let (d, consumed) = parse_directive(fmt).unwrap();
            assert_eq!(d.length, expected, "{}", String::from_utf8_lossy(fmt));
            assert_eq!(consumed, fmt.len());
        }
    }

    #[test]
    fn test_star_width_and_precision() {
        let (d, _) = parse_directive(b"*.*f").unwrap();
        assert_eq!(d.width, Width::FromArg);
        assert_eq!(d.precision, Precision::FromArg);
    }

    #[test]
    fn test_unknown_conversion_rejected() {
        assert!(parse_directive(b"y").is_none());
        assert!(parse_directive(b"5").is_none());
        assert!(parse_directive(b"").is_none());
    }

    #[test]
    fn test_segments_mixed() {
        let segs: Vec<_> = segments(b"hello %d world %s!").collect();
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[0], Segment::Literal(b"hello "));
        assert!(matches!(&segs[1], Segment::Directive(d) if d.conversion == b'd'));
        assert_eq!(segs[2], Segment::Literal(b" world "));
        assert!(matches!(&segs[3], Segment::Directive(d) if d.conversion == b's'));
        assert_eq!(segs[4], Segment::Literal(b"!"));
    }

    #[test]
    fn test_segments_percent_escape() {
        let segs: Vec<_> = segments(b"100%%").collect();
        assert_eq!(segs, vec![Segment::Literal(b"100"), Segment::Percent]);
    }

    #[test]
    fn test_segments_malformed_and_trailing_percent() {
        let segs: Vec<_> = segments(b"a%yb%").collect();
        assert_eq!(
            segs,
            vec![
                Segment::Literal(b"a"),
                Segment::Malformed { offset: 1 },
                Segment::Literal(b"yb"),
                Segment::Malformed { offset: 4 },
            ]
        );
    }

    #[test]
    fn test_long_double_floats_are_unsupported() {
        let segs: Vec<_> = segments(b"%Lf|%Ld|%Le").collect();
        assert_eq!(segs[0], Segment::Unsupported { offset: 0 });
        assert!(matches!(&segs[2], Segment::Directive(d) if d.length == LengthMod::BigL));
        assert_eq!(segs[4], Segment::Unsupported { offset: 8 });
        assert!(parse_directive(b"Lg").is_some_and(|(d, _)| !d.is_supported()));
        assert!(parse_directive(b"lf").is_some_and(|(d, _)| d.is_supported()));
    }

    #[test]
    fn test_segments_empty() {
        assert_eq!(segments(b"").count(), 0);
    }

    #[test]
    fn test_huge_width_saturates() {
        let (d, _) = parse_directive(b"99999999999999999999999d").unwrap();
        assert_eq!(d.width, Width::Fixed(usize::MAX));
    }
}
