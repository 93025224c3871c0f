//! Execute one fixture case against the core engine.

use serde::{Deserialize, Serialize};
use tflitefmt_core::{ArgClass, ArgList, RawArg, RenderOptions, arg_plan, render};
use tflitefmt_membrane::{RuntimeConfig, SafetyLevel};

use crate::error::HarnessError;

/// A typed argument as written in fixture JSON, e.g. `{"int": 42}` or
/// `{"str": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Double(f64),
    Str(Option<String>),
    Ptr(usize),
}

impl From<FixtureArg> for RawArg {
    fn from(arg: FixtureArg) -> Self {
        match arg {
            FixtureArg::Int(v) => Self::Signed(v),
            FixtureArg::Uint(v) => Self::Unsigned(v),
            FixtureArg::Double(v) => Self::Double(v),
            FixtureArg::Str(s) => Self::Str(s.map(String::into_bytes)),
            FixtureArg::Ptr(p) => Self::Pointer(p),
        }
    }
}

/// `inputs` object of a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInputs {
    pub format: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
    /// Output limit; `0` means unlimited, absent means the default limit.
    #[serde(default)]
    pub max_len: Option<usize>,
}

/// What a case produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRun {
    /// Rendering, or `error:<name>`.
    pub output: String,
    /// Last-error code the ABI would report.
    pub error_code: i32,
    /// Arguments supplied but never consumed.
    pub note: Option<String>,
}

pub fn parse_mode(mode: &str) -> Result<SafetyLevel, HarnessError> {
    match mode.to_ascii_lowercase().as_str() {
        "strict" => Ok(SafetyLevel::Strict),
        "hardened" => Ok(SafetyLevel::Hardened),
        _ => Err(HarnessError::UnknownMode(mode.to_string())),
    }
}

fn options(level: SafetyLevel, max_len: Option<usize>) -> RenderOptions {
    let limit = match max_len {
        Some(0) => None,
        Some(n) => Some(n),
        None => RuntimeConfig::default().max_len,
    };
    let base = if level.heals_enabled() {
        RenderOptions::hardened()
    } else {
        RenderOptions::strict()
    };
    base.with_max_len(limit)
}

fn class_label(class: ArgClass) -> String {
    match class {
        ArgClass::Signed(length) | ArgClass::Unsigned(length) => {
            format!("{}:{length:?}", class.name())
        }
        _ => class.name().to_string(),
    }
}

/// Run `function` with `inputs` under `mode`.
pub fn execute_fixture_case(
    function: &str,
    inputs: &serde_json::Value,
    mode: &str,
) -> Result<CaseRun, HarnessError> {
    let level = parse_mode(mode)?;
    let inputs: FormatInputs = serde_json::from_value(inputs.clone())?;

    match function {
        "format" => {
            let mut args: ArgList = inputs.args.into_iter().map(RawArg::from).collect();
            let result = render(
                inputs.format.as_bytes(),
                &mut args,
                &options(level, inputs.max_len),
            );
            let note = (args.remaining() > 0)
                .then(|| format!("{} argument(s) not consumed", args.remaining()));
            Ok(match result {
                Ok(bytes) => CaseRun {
                    output: String::from_utf8_lossy(&bytes).into_owned(),
                    error_code: 0,
                    note,
                },
                Err(err) => CaseRun {
                    output: format!("error:{}", err.name()),
                    error_code: err.code(),
                    note,
                },
            })
        }
        "arg_plan" => {
            let plan = arg_plan(inputs.format.as_bytes());
            Ok(CaseRun {
                output: plan.into_iter().map(class_label).collect::<Vec<_>>().join(","),
                error_code: 0,
                note: None,
            })
        }
        other => Err(HarnessError::UnknownFunction(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_case_renders() {
        let run = execute_fixture_case(
            "format",
            &json!({"format": "%d-%s", "args": [{"int": 42}, {"str": "ok"}]}),
            "strict",
        )
        .unwrap();
        assert_eq!(run.output, "42-ok");
        assert_eq!(run.error_code, 0);
        assert_eq!(run.note, None);
    }

    #[test]
    fn failures_render_as_error_names() {
        let run = execute_fixture_case(
            "format",
            &json!({"format": "%s", "args": [{"str": "0123456789"}], "max_len": 4}),
            "strict",
        )
        .unwrap();
        assert_eq!(run.output, "error:output_too_long");
        assert_eq!(run.error_code, 5);
    }

    #[test]
    fn unused_arguments_are_noted() {
        let run = execute_fixture_case(
            "format",
            &json!({"format": "x", "args": [{"int": 1}]}),
            "hardened",
        )
        .unwrap();
        assert_eq!(run.note.as_deref(), Some("1 argument(s) not consumed"));
    }

    #[test]
    fn plan_labels_include_length() {
        let run = execute_fixture_case("arg_plan", &json!({"format": "%*ld %s"}), "strict").unwrap();
        assert_eq!(run.output, "signed integer:None,signed integer:L,string");
    }

    #[test]
    fn unknown_function_and_mode_are_errors() {
        let inputs = json!({"format": ""});
        assert!(matches!(
            execute_fixture_case("sprintf", &inputs, "strict"),
            Err(HarnessError::UnknownFunction(_))
        ));
        assert!(matches!(
            execute_fixture_case("format", &inputs, "lenient"),
            Err(HarnessError::UnknownMode(_))
        ));
    }
}
