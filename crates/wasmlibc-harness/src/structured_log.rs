//! Structured logging contract for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL log record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or an in-memory buffer.
//! - [`validate_log_line`]: validates a single JSONL line against the schema.
//! - [`validate_log_file`]: validates an entire JSONL file.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Test/verification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skip,
    Error,
}

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "fatal"];
const OUTCOMES: [&str; 4] = ["pass", "fail", "skip", "error"];

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            symbol: None,
            family: None,
            outcome: None,
            errno: None,
            artifact_refs: None,
            details: None,
        }
    }

    /// Set the symbol family and symbol.
    #[must_use]
    pub fn with_api(mut self, family: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    #[must_use]
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

enum Sink {
    File(std::io::BufWriter<std::fs::File>),
    Buffer(Vec<u8>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::File(w) => w.write(buf),
            Self::Buffer(v) => v.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::File(w) => w.flush(),
            Self::Buffer(_) => Ok(()),
        }
    }
}

/// Writes structured JSONL log entries to a file or buffer.
pub struct LogEmitter {
    sink: Sink,
    seq: u64,
    run_id: String,
}

impl LogEmitter {
    /// Create an emitter that writes to a file.
    pub fn to_file(path: &Path, run_id: &str) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            sink: Sink::File(std::io::BufWriter::new(file)),
            seq: 0,
            run_id: run_id.to_string(),
        })
    }

    /// Create an emitter that keeps lines in memory (for testing).
    #[must_use]
    pub fn to_buffer(run_id: &str) -> Self {
        Self {
            sink: Sink::Buffer(Vec::new()),
            seq: 0,
            run_id: run_id.to_string(),
        }
    }

    /// Lines written so far by a buffer emitter; empty for file emitters.
    #[must_use]
    pub fn buffered(&self) -> &[u8] {
        match &self.sink {
            Sink::Buffer(v) => v,
            Sink::File(_) => &[],
        }
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{:03}", self.run_id, self.seq)
    }

    /// Emit a log entry with an auto-generated trace_id.
    pub fn emit(&mut self, level: LogLevel, event: &str) -> std::io::Result<LogEntry> {
        let trace_id = self.next_trace_id();
        let entry = LogEntry::new(trace_id, level, event);
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.sink, "{line}")?;
        Ok(entry)
    }

    /// Emit a fully-populated log entry; an empty trace_id is filled in.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.sink, "{line}")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.sink.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(LogValidationError {
            line_number,
            field: field.to_string(),
            message,
        });
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            fail("<json>", format!("invalid JSON: {e}"));
            return Err(errors);
        }
    };
    let Some(obj) = value.as_object() else {
        fail("<root>", String::from("expected JSON object"));
        return Err(errors);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            fail(field, String::from("required field missing"));
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !LEVELS.contains(&level)
    {
        fail("level", format!("invalid level: '{level}'"));
    }

    if let Some(outcome) = obj.get("outcome").and_then(|v| v.as_str())
        && !OUTCOMES.contains(&outcome)
    {
        fail("outcome", format!("invalid outcome: '{outcome}'"));
    }

    if let Some(errno) = obj.get("errno")
        && !errno.is_i64()
    {
        fail("errno", format!("errno must be an integer, got {errno}"));
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str())
        && !trace_id.contains("::")
    {
        fail(
            "trace_id",
            format!("trace_id should follow <run_id>::<seq> format, got: '{trace_id}'"),
        );
    }

    if let Some(ts) = obj.get("timestamp").and_then(|v| v.as_str())
        && !ts.ends_with('Z')
    {
        fail("timestamp", format!("timestamp must be UTC, got: '{ts}'"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<LogEntry>(value).map_err(|e| {
        vec![LogValidationError {
            line_number,
            field: String::from("<deserialization>"),
            message: format!("failed to deserialize: {e}"),
        }]
    })
}

/// Validate an entire JSONL file.
///
/// Returns the non-empty line count and any validation errors found.
pub fn validate_log_file(path: &Path) -> Result<(usize, Vec<LogValidationError>), std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let mut all_errors = Vec::new();
    let mut line_count = 0;

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        line_count += 1;
        if let Err(errs) = validate_log_line(line, i + 1) {
            all_errors.extend(errs);
        }
    }

    Ok((line_count, all_errors))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
    format_utc(secs, duration.subsec_millis())
}

fn format_utc(secs: i64, millis: u32) -> String {
    match wasmlibc_core::time::epoch_to_broken_down(secs) {
        Some(tm) => format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{millis:03}Z",
            i64::from(tm.tm_year) + 1900,
            tm.tm_mon + 1,
            tm.tm_mday,
            tm.tm_hour,
            tm.tm_min,
            tm.tm_sec,
        ),
        None => String::from("1970-01-01T00:00:00.000Z"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("run-1::001", LogLevel::Info, "verify_start");
        let json = entry.to_jsonl().expect("serialize");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "verify_start");
        assert!(parsed.get("symbol").is_none());
        assert!(parsed.get("outcome").is_none());
    }

    #[test]
    fn log_entry_with_optional_fields() {
        let entry = LogEntry::new("run-1::002", LogLevel::Error, "fixture_case")
            .with_api("math", "sqrt")
            .with_outcome(Outcome::Fail)
            .with_errno(33)
            .with_artifacts(vec![String::from("report.md")])
            .with_details(serde_json::json!({"expected": "nan"}));
        let parsed: serde_json::Value =
            serde_json::from_str(&entry.to_jsonl().expect("serialize")).expect("parse");
        assert_eq!(parsed["family"], "math");
        assert_eq!(parsed["symbol"], "sqrt");
        assert_eq!(parsed["outcome"], "fail");
        assert_eq!(parsed["errno"], 33);
        assert!(parsed["artifact_refs"].is_array());
        assert!(parsed["details"].is_object());
    }

    #[test]
    fn validate_valid_line() {
        let json = LogEntry::new("run-1::001", LogLevel::Info, "x")
            .to_jsonl()
            .expect("serialize");
        let result = validate_log_line(&json, 1);
        assert!(result.is_ok(), "valid line should pass: {result:?}");
    }

    #[test]
    fn validate_missing_required_field() {
        let json = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"info","event":"test"}"#;
        let errors = validate_log_line(json, 1).expect_err("missing trace_id");
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn validate_rejects_bad_enums_and_types() {
        let json = r#"{"timestamp":"2026-01-01T00:00:00Z","trace_id":"a::1","level":"critical","event":"t","outcome":"maybe","errno":"EDOM"}"#;
        let errors = validate_log_line(json, 7).expect_err("invalid line");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["level", "outcome", "errno"]);
        assert!(errors.iter().all(|e| e.line_number == 7));
    }

    #[test]
    fn validate_invalid_json_and_trace_id() {
        let errors = validate_log_line("not json at all", 1).expect_err("invalid json");
        assert!(errors.iter().any(|e| e.field == "<json>"));

        let json = r#"{"timestamp":"2026-01-01T00:00:00Z","trace_id":"no-separator","level":"info","event":"t"}"#;
        let errors = validate_log_line(json, 1).expect_err("bad trace id");
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn emitter_generates_sequential_trace_ids() {
        let mut emitter = LogEmitter::to_buffer("run-42");
        let e1 = emitter.emit(LogLevel::Info, "start").expect("emit");
        let e2 = emitter.emit(LogLevel::Info, "end").expect("emit");
        assert_eq!(e1.trace_id, "run-42::001");
        assert_eq!(e2.trace_id, "run-42::002");

        emitter
            .emit_entry(LogEntry::new("", LogLevel::Debug, "filled"))
            .expect("emit");
        let text = String::from_utf8(emitter.buffered().to_vec()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("\"trace_id\":\"run-42::003\""));
        for (i, line) in lines.iter().enumerate() {
            validate_log_line(line, i + 1).expect("emitted lines validate");
        }
    }

    #[test]
    fn timestamps_are_calendar_exact() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_utc(951_782_400, 5), "2000-02-29T00:00:00.005Z");
        assert!(now_utc().ends_with('Z'));
    }
}
