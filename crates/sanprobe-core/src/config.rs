//! Runtime configuration.
//!
//! Read from the environment only; argv belongs to the fault points.
//! - `SANPROBE_MODE`: how each fault point behaves (see [`FaultMode`]).
//!   Unknown values fall back to `raw`.
//! - `SANPROBE_LOG`: minimum level for stderr records, or `off`.
//!   Unknown values fall back to `warn`.

use crate::structured_log::LogLevel;

pub const MODE_ENV: &str = "SANPROBE_MODE";
pub const LOG_ENV: &str = "SANPROBE_LOG";

/// How the fault points execute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultMode {
    /// Real undefined behavior through `unsafe`; division by zero raises `SIGFPE`.
    /// This is the mode to run under a sanitizer.
    #[default]
    Raw,
    /// Memory-safe. Uninitialized memory is replaced by a poison pattern;
    /// division by zero and out-of-bounds argv access panic.
    Trap,
    /// Like `Trap`, except an out-of-bounds argv access is logged and skipped.
    /// Division by zero still panics.
    Recover,
}

impl FaultMode {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trap" | "panic" | "safe" => Self::Trap,
            "recover" | "continue" | "report" => Self::Recover,
            _ => Self::Raw,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Trap => "trap",
            Self::Recover => "recover",
        }
    }

    /// Returns true if fault points execute real undefined behavior.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    pub mode: FaultMode,
    /// `None` disables the structured log.
    pub log_level: Option<LogLevel>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            mode: FaultMode::Raw,
            log_level: Some(LogLevel::Warn),
        }
    }
}

impl ProbeConfig {
    /// Resolve from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            mode: lookup(MODE_ENV)
                .map(|raw| FaultMode::from_str_loose(&raw))
                .unwrap_or(defaults.mode),
            log_level: lookup(LOG_ENV)
                .map(|raw| parse_log_threshold(&raw))
                .unwrap_or(defaults.log_level),
        }
    }
}

fn parse_log_threshold(raw: &str) -> Option<LogLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "none" | "quiet" | "0" => None,
        other => Some(LogLevel::from_str_loose(other).unwrap_or(LogLevel::Warn)),
    }
}
