//! Test execution engine.
//!
//! Each fixture case names an unprefixed C function; the runner calls the
//! matching safe implementation in `wasmlibc-core` and renders the result as
//! a string so it can be compared with the fixture's expectation.

use serde_json::Value;
use wasmlibc_core::errno::{EINVAL, EOVERFLOW, errno_name};
use wasmlibc_core::stdio::{
    FormatArg, FormatError, arg_plan, format_bytes, parse_format_string, render,
};
use wasmlibc_core::math::MathFn;
use wasmlibc_core::{math, redirect, string, time};

use crate::diff;
use crate::fixtures::{FixtureArg, FixtureCase, FixtureSet};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::VerificationResult;

/// Output of one executed case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRun {
    pub output: String,
    /// errno the C function would leave behind (0 when untouched).
    pub errno: i32,
}

impl CaseRun {
    fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            errno: 0,
        }
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| verify_case(&fixture_set.family, case))
            .collect()
    }
}

fn verify_case(family: &str, case: &FixtureCase) -> VerificationResult {
    let (actual, actual_errno) = match execute_case(&case.function, &case.inputs) {
        Ok(run) => (run.output, errno_name(run.errno).to_string()),
        Err(err) => (format!("unsupported:{err}"), String::from("0")),
    };

    let output_ok = actual == case.expected_output;
    let errno_ok = actual_errno == case.expected_errno;
    let diff = if !output_ok {
        Some(diff::render_diff(&case.expected_output, &actual))
    } else if !errno_ok {
        Some(format!(
            "errno: expected {}, got {actual_errno}",
            case.expected_errno
        ))
    } else {
        None
    };

    VerificationResult {
        case_name: case.name.clone(),
        family: family.to_string(),
        symbol: case.function.clone(),
        passed: output_ok && errno_ok,
        expected: case.expected_output.clone(),
        actual,
        expected_errno: case.expected_errno.clone(),
        actual_errno,
        diff,
    }
}

/// Write one `fixture_case` record per result.
pub fn log_results(
    emitter: &mut LogEmitter,
    results: &[VerificationResult],
) -> std::io::Result<()> {
    for result in results {
        let (level, outcome) = if result.passed {
            (LogLevel::Info, Outcome::Pass)
        } else {
            (LogLevel::Error, Outcome::Fail)
        };
        let mut details = serde_json::json!({
            "case": result.case_name,
            "expected": result.expected,
            "actual": result.actual,
            "expected_errno": result.expected_errno,
            "actual_errno": result.actual_errno,
        });
        if let Some(diff) = &result.diff {
            details["diff"] = Value::String(diff.clone());
        }
        let entry = LogEntry::new("", level, "fixture_case")
            .with_api(&result.family, &result.symbol)
            .with_outcome(outcome)
            .with_details(details);
        emitter.emit_entry(entry)?;
    }
    Ok(())
}

/// Execute one case by function name.
pub fn execute_case(function: &str, inputs: &Value) -> Result<CaseRun, String> {
    if let Some(func) = MathFn::from_name(function) {
        return run_math(func, float(inputs, "x")?);
    }
    match function {
        "strlen" => Ok(CaseRun::ok(string::strlen(&bytes(inputs, "s")?).to_string())),
        "strcmp" => {
            let r = string::strcmp(&bytes(inputs, "l")?, &bytes(inputs, "r")?);
            Ok(CaseRun::ok(r.signum().to_string()))
        }
        "strncmp" => {
            let r = string::strncmp(&bytes(inputs, "l")?, &bytes(inputs, "r")?, uint(inputs, "n")?);
            Ok(CaseRun::ok(r.signum().to_string()))
        }
        "strcpy" => {
            let src = bytes(inputs, "src")?;
            let mut dest = vec![0xFF; string::strlen(&src) + 1];
            string::strcpy(&mut dest, &src);
            Ok(CaseRun::ok(c_string(&dest)))
        }
        "strncpy" => {
            let n = uint(inputs, "n")?;
            let mut dest = vec![0xFF; n];
            string::strncpy(&mut dest, &bytes(inputs, "src")?, n);
            Ok(CaseRun::ok(format!("{dest:?}")))
        }
        "strcat" | "strncat" => {
            let src = bytes(inputs, "src")?;
            let mut dest = bytes(inputs, "dest")?;
            dest.truncate(string::strlen(&dest));
            let n = if function == "strncat" {
                uint(inputs, "n")?
            } else {
                usize::MAX
            };
            dest.resize(dest.len() + string::strlen(&src).min(n) + 1, 0);
            string::strncat(&mut dest, &src, n);
            Ok(CaseRun::ok(c_string(&dest)))
        }
        "strspn" => Ok(CaseRun::ok(
            string::strspn(&bytes(inputs, "s")?, &bytes(inputs, "set")?).to_string(),
        )),
        "strcspn" => Ok(CaseRun::ok(
            string::strcspn(&bytes(inputs, "s")?, &bytes(inputs, "set")?).to_string(),
        )),
        "strchr" | "strrchr" => {
            let s = bytes(inputs, "s")?;
            let c = int(inputs, "c")? as u8;
            let found = if function == "strchr" {
                string::strchr(&s, c)
            } else {
                string::strrchr(&s, c)
            };
            Ok(CaseRun::ok(index(found)))
        }
        "memchr" => {
            let s = bytes(inputs, "s")?;
            let found = string::memchr(&s, int(inputs, "c")? as u8, uint(inputs, "n")?);
            Ok(CaseRun::ok(index(found)))
        }
        "sprintf" => run_sprintf(inputs),
        "localtime" => {
            let t = inputs
                .get("t")
                .and_then(Value::as_i64)
                .ok_or("missing integer 't'")?;
            let offset = inputs.get("offset").and_then(Value::as_i64).unwrap_or(0);
            let offset = i32::try_from(offset).map_err(|_| "offset out of range")?;
            Ok(run_localtime(t, offset))
        }
        "redirect" => {
            let name = inputs
                .get("name")
                .and_then(Value::as_str)
                .ok_or("missing string 'name'")?;
            Ok(CaseRun::ok(
                redirect::lookup(name).map_or("null", |e| e.replacement),
            ))
        }
        other => Err(format!("no runner for '{other}'")),
    }
}

fn run_math(func: MathFn, x: f64) -> Result<CaseRun, String> {
    let value = func.eval(x);
    // The sign of a NaN result is unspecified and differs between hosts.
    let value = if value.is_nan() { f64::NAN } else { value };
    let rendered = format_bytes(b"%.17g", &[FormatArg::Float(value)]).map_err(|e| e.to_string())?;
    Ok(CaseRun {
        output: String::from_utf8_lossy(&rendered.bytes).into_owned(),
        errno: math::check(func, x).map_or(0, math::MathFault::errno),
    })
}

fn run_sprintf(inputs: &Value) -> Result<CaseRun, String> {
    let format = inputs
        .get("format")
        .and_then(Value::as_str)
        .ok_or("missing string 'format'")?;
    let args: Vec<FixtureArg> = match inputs.get("args") {
        Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| e.to_string())?,
        None => Vec::new(),
    };
    let values: Vec<FormatArg<'_>> = args
        .iter()
        .map(|arg| match arg {
            FixtureArg::Int(v) => FormatArg::Int(*v),
            FixtureArg::Float(v) => FormatArg::Float(*v),
            FixtureArg::Str(s) => FormatArg::Str(s.as_deref().map(str::as_bytes)),
            FixtureArg::Ptr(p) => FormatArg::Pointer(*p as usize),
        })
        .collect();

    // Same order as the C entry point: the directive types are checked
    // before any argument is consumed.
    let segments = parse_format_string(format.as_bytes());
    let rendered = arg_plan(&segments).and_then(|_| render(&segments, &values));
    match rendered {
        Ok(rendered) => Ok(CaseRun::ok(String::from_utf8_lossy(&rendered.bytes))),
        Err(err) => Ok(CaseRun {
            output: format!("error:{err}"),
            errno: if err == FormatError::Overflow {
                EOVERFLOW
            } else {
                EINVAL
            },
        }),
    }
}

fn run_localtime(t: i64, offset: i32) -> CaseRun {
    let Some(tm) = time::localtime_fixed(t, offset) else {
        return CaseRun {
            output: String::from("null"),
            errno: EOVERFLOW,
        };
    };
    let zone = time::zone_name(offset);
    CaseRun::ok(format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} wday={} yday={} isdst={} gmtoff={} zone={}",
        i64::from(tm.tm_year) + 1900,
        tm.tm_mon + 1,
        tm.tm_mday,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec,
        tm.tm_wday,
        tm.tm_yday,
        tm.tm_isdst,
        tm.tm_gmtoff,
        c_string(&zone),
    ))
}

/// A byte-string input: a JSON string or an array of byte values.
fn bytes(inputs: &Value, key: &str) -> Result<Vec<u8>, String> {
    match inputs.get(key) {
        Some(Value::String(s)) => Ok(s.as_bytes().to_vec()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| format!("'{key}' holds a non-byte value"))
            })
            .collect(),
        _ => Err(format!("missing byte string '{key}'")),
    }
}

fn uint(inputs: &Value, key: &str) -> Result<usize, String> {
    inputs
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| format!("missing unsigned '{key}'"))
}

fn int(inputs: &Value, key: &str) -> Result<i64, String> {
    inputs
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("missing integer '{key}'"))
}

/// A double input; JSON has no NaN or infinities, so those come as strings.
fn float(inputs: &Value, key: &str) -> Result<f64, String> {
    match inputs.get(key) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("'{key}' is not a double")),
        Some(Value::String(s)) => match s.as_str() {
            "nan" => Ok(f64::NAN),
            "inf" => Ok(f64::INFINITY),
            "-inf" => Ok(f64::NEG_INFINITY),
            other => other.parse().map_err(|_| format!("'{key}' is not a double")),
        },
        _ => Err(format!("missing double '{key}'")),
    }
}

fn c_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(&buf[..string::strlen(buf)]).into_owned()
}

fn index(found: Option<usize>) -> String {
    found.map_or_else(|| String::from("null"), |i| i.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sprintf_case_matches_c() {
        let run = execute_case(
            "sprintf",
            &json!({"format": "%d-%s", "args": [{"int": 42}, {"str": "x"}]}),
        )
        .expect("sprintf runner");
        assert_eq!(run, CaseRun::ok("42-x"));
    }

    #[test]
    fn sprintf_error_sets_errno() {
        let run = execute_case("sprintf", &json!({"format": "%d"})).expect("sprintf runner");
        assert_eq!(run.output, "error:missing argument");
        assert_eq!(run.errno, EINVAL);
    }

    #[test]
    fn math_reports_domain_error() {
        let run = execute_case("sqrt", &json!({"x": -1.0})).expect("math runner");
        assert_eq!(run.output, "nan");
        assert_eq!(errno_name(run.errno), "EDOM");

        let run = execute_case("atanh", &json!({"x": "nan"})).expect("math runner");
        assert_eq!(run.errno, 0);
    }

    #[test]
    fn math_dispatch_covers_exported_functions_only() {
        for func in MathFn::ALL {
            let run = execute_case(func.name(), &json!({"x": 0.5})).expect("math runner");
            assert_eq!(run.errno != 0, func == MathFn::Acosh, "{}", func.name());
        }
        let err = execute_case("cbrt", &json!({"x": 8.0})).expect_err("cbrt is not exported");
        assert_eq!(err, "no runner for 'cbrt'");
    }

    #[test]
    fn strncpy_shows_padding() {
        let run = execute_case("strncpy", &json!({"src": "ab", "n": 4})).expect("strncpy runner");
        assert_eq!(run.output, "[97, 98, 0, 0]");
    }

    #[test]
    fn strncat_appends_bounded() {
        let run = execute_case("strncat", &json!({"dest": "foo", "src": "barbaz", "n": 3}))
            .expect("strncat runner");
        assert_eq!(run.output, "foobar");
    }

    #[test]
    fn localtime_renders_fields() {
        let run = execute_case("localtime", &json!({"t": 0, "offset": -3600})).expect("runner");
        assert_eq!(
            run.output,
            "1969-12-31 23:00:00 wday=3 yday=364 isdst=0 gmtoff=-3600 zone=-0100"
        );
    }

    #[test]
    fn unknown_function_is_unsupported() {
        assert!(execute_case("printf", &json!({})).is_err());
    }

    #[test]
    fn runner_flags_errno_mismatch() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"math",
                "cases":[
                    {"name":"sqrt_neg","function":"sqrt","inputs":{"x":-4},"expected_output":"nan","expected_errno":"0"}
                ]
            }"#,
        )
        .expect("valid fixture json");
        let results = TestRunner::new("errno").run(&fixture);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert_eq!(results[0].actual_errno, "EDOM");
        assert!(results[0].diff.as_deref().is_some_and(|d| d.starts_with("errno")));
    }
}
