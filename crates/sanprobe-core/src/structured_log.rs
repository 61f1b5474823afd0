//! Structured JSONL fault log.
//!
//! Provides:
//! - [`LogEntry`]: one JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes records to any [`Write`] sink, dropping records
//!   below the configured threshold and flushing after every line.
//! - [`validate_log_line`]: checks a single JSONL line against the schema.
//!
//! Every record is flushed before the caller proceeds, so a fault record
//! written just ahead of a trap survives the trap.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::ProbeError;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: [Self; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Parse a level name (case-insensitive). `warning` is accepted for `warn`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

/// The three deliberate fault points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    UninitializedRead,
    DivisionByZero,
    ArgumentIndexOutOfBounds,
}

/// What happens at a fault point after its record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The process is about to terminate (signal or panic).
    Trapped,
    /// A substitute was used and execution continues.
    Recovered,
    /// Real undefined behavior follows; the instrument decides.
    Undefined,
}

/// Canonical structured log record.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<FaultKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argc: Option<usize>,
    /// Integer parsed from the first extra argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create an entry with required fields only. The emitter assigns `trace_id`.
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: String::new(),
            level,
            event: event.into(),
            mode: None,
            fault: None,
            argc: None,
            value: None,
            outcome: None,
            exit_code: None,
            details: None,
        }
    }

    /// Shorthand for a `fault` event.
    #[must_use]
    pub fn fault(level: LogLevel, kind: FaultKind, outcome: Outcome) -> Self {
        let mut entry = Self::new(level, "fault");
        entry.fault = Some(kind);
        entry.outcome = Some(outcome);
        entry
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn with_argc(mut self, argc: usize) -> Self {
        self.argc = Some(argc);
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

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

/// Writes JSONL records to `W`, one flushed line per record.
pub struct LogEmitter<W: Write> {
    writer: W,
    seq: u64,
    run_id: String,
    /// `None` disables logging entirely.
    threshold: Option<LogLevel>,
}

impl LogEmitter<std::io::Stderr> {
    /// Emitter on the process's standard error, keyed by pid.
    #[must_use]
    pub fn to_stderr(threshold: Option<LogLevel>) -> Self {
        Self::new(
            std::io::stderr(),
            std::process::id().to_string(),
            threshold,
        )
    }
}

impl LogEmitter<Vec<u8>> {
    /// In-memory emitter for tests.
    #[must_use]
    pub fn to_buffer(run_id: &str, threshold: Option<LogLevel>) -> Self {
        Self::new(Vec::new(), run_id, threshold)
    }

    /// Recorded output as UTF-8 text.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.writer).into_owned()
    }
}

impl<W: Write> LogEmitter<W> {
    pub fn new(writer: W, run_id: impl Into<String>, threshold: Option<LogLevel>) -> Self {
        Self {
            writer,
            seq: 0,
            run_id: run_id.into(),
            threshold,
        }
    }

    /// Whether a record at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.threshold.is_some_and(|min| level >= min)
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("sanprobe::{}::{:03}", self.run_id, self.seq)
    }

    /// Emit `entry` if it passes the threshold. Assigns a trace id when missing.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> Result<(), ProbeError> {
        if !self.enabled(entry.level) {
            return Ok(());
        }
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = entry.to_jsonl()?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

/// Validate a single JSONL line against the schema.
pub fn validate_log_line(line: &str) -> Result<LogEntry, Vec<LogValidationError>> {
    let error = |field: &str, message: String| LogValidationError {
        field: field.to_string(),
        message,
    };

    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| vec![error("<json>", format!("invalid JSON: {e}"))])?;

    let Some(obj) = value.as_object() else {
        return Err(vec![error("<root>", "expected JSON object".to_string())]);
    };

    let mut errors = Vec::new();
    for field in ["timestamp", "trace_id", "level", "event"] {
        if !obj.contains_key(field) {
            errors.push(error(field, "required field missing".to_string()));
        }
    }

    if let Some(level) = obj.get("level").and_then(|v| v.as_str())
        && !LogLevel::ALL.iter().any(|l| l.as_str() == level)
    {
        errors.push(error("level", format!("unknown level '{level}'")));
    }

    if obj.get("event").and_then(|v| v.as_str()) == Some("fault") && !obj.contains_key("fault")
    {
        errors.push(error("fault", "fault event without fault kind".to_string()));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value).map_err(|e| vec![error("<schema>", e.to_string())])
}

/// RFC 3339 UTC timestamp with millisecond precision.
fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{:03}Z",
        (secs % 86_400) / 3600,
        (secs % 3600) / 60,
        secs % 60,
        duration.subsec_millis(),
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new(LogLevel::Info, "probe_start");
        let json = entry.to_jsonl().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "probe_start");
        assert!(parsed.get("fault").is_none());
        assert!(parsed.get("details").is_none());
    }

    #[test]
    fn fault_entry_uses_snake_case_kind() {
        let entry = LogEntry::fault(
            LogLevel::Error,
            FaultKind::ArgumentIndexOutOfBounds,
            Outcome::Undefined,
        );
        let parsed: serde_json::Value = serde_json::from_str(&entry.to_jsonl().unwrap()).unwrap();
        assert_eq!(parsed["event"], "fault");
        assert_eq!(parsed["fault"], "argument_index_out_of_bounds");
        assert_eq!(parsed["outcome"], "undefined");
    }

    #[test]
    fn emitter_assigns_sequential_trace_ids() {
        let mut emitter = LogEmitter::to_buffer("run-1", Some(LogLevel::Trace));
        emitter
            .emit_entry(LogEntry::new(LogLevel::Info, "a"))
            .unwrap();
        emitter
            .emit_entry(LogEntry::new(LogLevel::Info, "b"))
            .unwrap();
        let text = emitter.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second = validate_log_line(lines[1]).unwrap();
        assert_eq!(second.trace_id, "sanprobe::run-1::002");
        assert_eq!(second.event, "b");
    }

    #[test]
    fn emitter_drops_records_below_threshold() {
        let mut emitter = LogEmitter::to_buffer("run-1", Some(LogLevel::Warn));
        assert!(!emitter.enabled(LogLevel::Info));
        assert!(emitter.enabled(LogLevel::Error));
        emitter
            .emit_entry(LogEntry::new(LogLevel::Info, "quiet"))
            .unwrap();
        emitter
            .emit_entry(LogEntry::new(LogLevel::Warn, "loud"))
            .unwrap();
        let text = emitter.contents();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"loud\""));
        // Dropped records do not consume a sequence number.
        assert!(text.contains("sanprobe::run-1::001"));
    }

    #[test]
    fn disabled_emitter_writes_nothing() {
        let mut emitter = LogEmitter::to_buffer("run-1", None);
        emitter
            .emit_entry(LogEntry::new(LogLevel::Fatal, "x"))
            .unwrap();
        assert!(emitter.into_inner().is_empty());
    }

    #[test]
    fn level_parsing_is_loose() {
        assert_eq!(LogLevel::from_str_loose("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str_loose(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str_loose("verbose"), None);
        assert!(LogLevel::Trace < LogLevel::Fatal);
    }

    #[test]
    fn validate_rejects_missing_fields_and_bad_level() {
        let errors = validate_log_line(r#"{"level":"loud","event":"x"}"#).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"timestamp"));
        assert!(fields.contains(&"trace_id"));
        assert!(fields.contains(&"level"));

        assert!(validate_log_line("not json").is_err());
        assert!(validate_log_line("[1,2]").is_err());
    }

    #[test]
    fn validate_requires_kind_on_fault_events() {
        let line = r#"{"timestamp":"t","trace_id":"id","level":"warn","event":"fault"}"#;
        let errors = validate_log_line(line).unwrap_err();
        assert_eq!(errors[0].field, "fault");
    }

    #[test]
    fn civil_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }

    #[test]
    fn timestamp_shape() {
        let ts = now_utc();
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }
}
