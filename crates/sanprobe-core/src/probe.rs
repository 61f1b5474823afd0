//! The single-shot driver.
//!
//! With no extra argument it allocates and releases the record and returns.
//! With one, it walks the fault points in order:
//! uninitialized read, `4 / x`, `argv[x]`, then the dispatched `x + 4`.

use std::io::Write;

use serde_json::json;

use crate::buffer;
use crate::config::{FaultMode, ProbeConfig};
use crate::conversion::strtol_base10;
use crate::error::ProbeError;
use crate::raw;
use crate::record::{OffsetRecord, dispatch};
use crate::structured_log::{FaultKind, LogEmitter, LogEntry, LogLevel, Outcome};

/// Dividend at the division fault point.
pub const DIVIDEND: i32 = 4;

pub struct Probe {
    config: ProbeConfig,
}

impl Probe {
    #[must_use]
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn mode(&self) -> FaultMode {
        self.config.mode
    }

    /// Run once over `argv` (program name first).
    ///
    /// Returns normally only when no fatal fault was reached. Stdout is
    /// flushed ahead of every fault point.
    pub fn run<A, W, L>(
        &self,
        argv: &[A],
        out: &mut W,
        log: &mut LogEmitter<L>,
    ) -> Result<(), ProbeError>
    where
        A: AsRef<[u8]>,
        W: Write,
        L: Write,
    {
        let argc = argv.len();
        log.emit_entry(
            LogEntry::new(LogLevel::Info, "probe_start")
                .with_mode(self.mode().as_str())
                .with_argc(argc),
        )?;

        let record = OffsetRecord::boxed();

        if let Some(arg) = argv.get(1) {
            self.print_indeterminate(out, log)?;

            let conversion = strtol_base10(arg.as_ref());
            let x = conversion.value as i32;
            log.emit_entry(
                LogEntry::new(LogLevel::Debug, "argument_parsed")
                    .with_value(x)
                    .with_details(json!({
                        "consumed": conversion.consumed,
                        "status": format!("{:?}", conversion.status),
                    })),
            )?;

            let quotient = self.divide(x, out, log)?;
            writeln!(out, "{quotient}")?;

            self.write_indexed_argument(argv, x, out, log)?;

            writeln!(out, "{}", dispatch(record.as_ref(), x))?;
        }

        drop(record);
        out.flush()?;

        log.emit_entry(
            LogEntry::new(LogLevel::Info, "probe_finish")
                .with_mode(self.mode().as_str())
                .with_exit_code(0),
        )
    }

    #[allow(unsafe_code)]
    fn print_indeterminate<W: Write, L: Write>(
        &self,
        out: &mut W,
        log: &mut LogEmitter<L>,
    ) -> Result<(), ProbeError> {
        if self.mode().is_raw() {
            self.report(
                log,
                LogEntry::fault(LogLevel::Error, FaultKind::UninitializedRead, Outcome::Undefined),
            )?;
            out.flush()?;
            // SAFETY: none; the indeterminate read is the probed fault.
            unsafe { raw::print_uninit_array(out) }?;
        } else {
            self.report(
                log,
                LogEntry::fault(LogLevel::Warn, FaultKind::UninitializedRead, Outcome::Recovered)
                    .with_details(json!({ "poison": format!("{:#010x}", buffer::POISON as u32) })),
            )?;
            buffer::print_array(out, &buffer::poisoned())?;
        }
        Ok(())
    }

    fn divide<W: Write, L: Write>(
        &self,
        x: i32,
        out: &mut W,
        log: &mut LogEmitter<L>,
    ) -> Result<i32, ProbeError> {
        if x == 0 {
            self.report(
                log,
                LogEntry::fault(LogLevel::Fatal, FaultKind::DivisionByZero, Outcome::Trapped)
                    .with_value(x),
            )?;
            out.flush()?;
        }
        Ok(match self.mode() {
            FaultMode::Raw => raw::divide_or_trap(DIVIDEND, x),
            FaultMode::Trap | FaultMode::Recover => DIVIDEND / x,
        })
    }

    #[allow(unsafe_code)]
    fn write_indexed_argument<A, W, L>(
        &self,
        argv: &[A],
        x: i32,
        out: &mut W,
        log: &mut LogEmitter<L>,
    ) -> Result<(), ProbeError>
    where
        A: AsRef<[u8]>,
        W: Write,
        L: Write,
    {
        let argc = argv.len();
        let in_bounds = usize::try_from(x).is_ok_and(|index| index < argc);

        if !in_bounds {
            let (level, outcome) = match self.mode() {
                FaultMode::Raw => (LogLevel::Error, Outcome::Undefined),
                FaultMode::Trap => (LogLevel::Fatal, Outcome::Trapped),
                FaultMode::Recover => (LogLevel::Warn, Outcome::Recovered),
            };
            self.report(
                log,
                LogEntry::fault(level, FaultKind::ArgumentIndexOutOfBounds, outcome)
                    .with_value(x)
                    .with_argc(argc),
            )?;
            out.flush()?;
        }

        match self.mode() {
            FaultMode::Raw => {
                let c_argv = raw::CArgv::new(argv)?;
                // SAFETY: none when out of bounds; that read is the probed fault.
                unsafe { raw::write_arg_unchecked(out, &c_argv, x) }?;
            }
            FaultMode::Trap => {
                // Negative values wrap to huge indices and fail the bounds check.
                out.write_all(argv[x as usize].as_ref())?;
            }
            FaultMode::Recover => {
                if in_bounds {
                    out.write_all(argv[x as usize].as_ref())?;
                }
            }
        }
        Ok(())
    }

    fn report<L: Write>(&self, log: &mut LogEmitter<L>, entry: LogEntry) -> Result<(), ProbeError> {
        log.emit_entry(entry.with_mode(self.mode().as_str()))
    }
}
