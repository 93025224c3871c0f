//! Argument plans and argument sources.
//!
//! A C `va_list` carries no type information, so the caller has to know
//! what each slot holds before reading it. [`arg_plan`] derives that list
//! from the format string; the ABI layer walks it, reads one value per slot
//! with the matching C type and hands the values back through an
//! [`ArgSource`].

use crate::directive::{Directive, LengthMod, Precision, Segment, Width, segments};

/// What a single argument slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    /// `d i`, and `*` width/precision.
    Signed(LengthMod),
    /// `u o x X`.
    Unsigned(LengthMod),
    /// `f F e E g G a A`.
    Double,
    /// `c` (promoted to `int`).
    Char,
    /// `s`, with how far the string may be read.
    Str(StrBound),
    /// `p`.
    Pointer,
    /// `n`.
    Count,
}

impl ArgClass {
    /// Slot class consumed by a directive's conversion (not counting `*`).
    #[must_use]
    pub const fn of(directive: &Directive) -> Option<Self> {
        Some(match directive.conversion {
            b'd' | b'i' => Self::Signed(directive.length),
            b'u' | b'o' | b'x' | b'X' => Self::Unsigned(directive.length),
            b'f' | b'F' | b'e' | b'E' | b'g' | b'G' | b'a' | b'A' => Self::Double,
            b'c' => Self::Char,
            b's' => Self::Str(match directive.precision {
                Precision::None => StrBound::Terminated,
                Precision::Fixed(p) => StrBound::Max(p),
                Precision::FromArg => StrBound::FromArg,
            }),
            b'p' => Self::Pointer,
            b'n' => Self::Count,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Signed(_) => "signed integer",
            Self::Unsigned(_) => "unsigned integer",
            Self::Double => "double",
            Self::Char => "char",
            Self::Str(_) => "string",
            Self::Pointer => "pointer",
            Self::Count => "count pointer",
        }
    }

    /// Whether `raw` can fill a slot of this class.
    ///
    /// Signedness is not checked: C callers routinely pass `int` to `%u`.
    #[must_use]
    pub fn accepts(self, raw: &RawArg) -> bool {
        match self {
            Self::Signed(_) | Self::Unsigned(_) | Self::Char => {
                matches!(raw, RawArg::Signed(_) | RawArg::Unsigned(_))
            }
            Self::Double => matches!(raw, RawArg::Double(_)),
            Self::Str(_) => matches!(raw, RawArg::Str(_)),
            Self::Pointer | Self::Count => matches!(raw, RawArg::Pointer(_)),
        }
    }
}

/// How many bytes of a `%s` argument may be read.
///
/// C allows `%.3s` on an array with no terminator, so a precision bounds
/// the read as well as the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrBound {
    /// Up to the terminator.
    Terminated,
    /// At most this many bytes.
    Max(usize),
    /// `.*`: bounded by the precision slot read just before this one; a
    /// negative precision means [`StrBound::Terminated`].
    FromArg,
}

impl StrBound {
    /// Resolve against the value of the preceding slot.
    #[must_use]
    pub fn resolve(self, previous: Option<&RawArg>) -> Option<usize> {
        match self {
            Self::Terminated => None,
            Self::Max(n) => Some(n),
            Self::FromArg => match previous {
                Some(RawArg::Signed(p)) => usize::try_from(*p as i32).ok(),
                _ => None,
            },
        }
    }
}

/// One argument value already read off a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum RawArg {
    Signed(i64),
    Unsigned(u64),
    Double(f64),
    Pointer(usize),
    /// Bytes of a C string without its terminator. `None` is a NULL `char*`.
    Str(Option<Vec<u8>>),
}

impl RawArg {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Signed(_) => "signed integer",
            Self::Unsigned(_) => "unsigned integer",
            Self::Double(_) => "double",
            Self::Pointer(_) => "pointer",
            Self::Str(_) => "string",
        }
    }

    /// Convenience for building string arguments in tests and fixtures.
    #[must_use]
    pub fn str(s: impl AsRef<[u8]>) -> Self {
        Self::Str(Some(s.as_ref().to_vec()))
    }
}

/// Ordered argument slots consumed by `fmt`.
///
/// A `*` width precedes a `*` precision, which precedes the conversion's
/// own slot, matching the order C reads them in.
#[must_use]
pub fn arg_plan(fmt: &[u8]) -> Vec<ArgClass> {
    let mut plan = Vec::new();
    for segment in segments(fmt) {
        let Segment::Directive(directive) = segment else {
            continue;
        };
        if matches!(directive.width, Width::FromArg) {
            plan.push(ArgClass::Signed(LengthMod::None));
        }
        if matches!(directive.precision, Precision::FromArg) {
            plan.push(ArgClass::Signed(LengthMod::None));
        }
        if let Some(class) = ArgClass::of(&directive) {
            plan.push(class);
        }
    }
    plan
}

/// Supplies argument values to the renderer, one slot at a time.
pub trait ArgSource {
    /// Next value for a slot of `class`, or `None` when exhausted.
    fn next_arg(&mut self, class: ArgClass) -> Option<RawArg>;
}

/// An owned, already-extracted argument list.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    args: std::vec::IntoIter<RawArg>,
}

impl ArgList {
    #[must_use]
    pub fn new(args: Vec<RawArg>) -> Self {
        Self {
            args: args.into_iter(),
        }
    }

    /// Values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.args.len()
    }
}

impl FromIterator<RawArg> for ArgList {
    fn from_iter<I: IntoIterator<Item = RawArg>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ArgSource for ArgList {
    fn next_arg(&mut self, _class: ArgClass) -> Option<RawArg> {
        self.args.next()
    }
}
