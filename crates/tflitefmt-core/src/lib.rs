//! # tflitefmt-core
//!
//! Safe Rust printf engine behind the TFLite Unity string-format helper.
//!
//! The ABI crate pulls raw values off a C `va_list` according to the
//! [`arg_plan`] of a format string; everything after that point (directive
//! parsing, argument checking, rendering, length limits) happens here
//! without `unsafe`.
//!
//! ```text
//! format bytes -> segments() -> arg_plan() -> ArgSource -> render() -> Vec<u8>
//! ```

#![deny(unsafe_code)]

pub mod args;
pub mod directive;
pub mod emit;
pub mod error;
pub mod render;

pub use args::{ArgClass, ArgList, ArgSource, RawArg, StrBound, arg_plan};
pub use directive::{
    Directive, FormatFlags, LengthMod, Precision, Segment, Segments, Width, parse_directive,
    segments,
};
pub use error::FormatError;
pub use render::{
    RenderOptions, RenderReport, render, render_report, render_to_string, validate,
};
