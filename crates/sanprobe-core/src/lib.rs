//! # sanprobe-core
//!
//! Deliberate fault points for exercising dynamic bug-detection instruments.
//!
//! The probe reads uninitialized memory, divides by a caller-controlled value,
//! indexes the argument vector out of bounds and calls through a vtable. In
//! [`FaultMode::Raw`] these are real undefined behavior confined to the
//! [`raw`] module; the other modes replace each one with the nearest safe
//! runtime error or a logged substitute. The rest of the crate denies
//! `unsafe` code.

#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod conversion;
pub mod error;
pub mod probe;
#[allow(unsafe_code)]
pub mod raw;
pub mod record;
pub mod structured_log;

pub use config::{FaultMode, ProbeConfig};
pub use error::ProbeError;
pub use probe::Probe;
pub use structured_log::{LogEmitter, LogEntry, LogLevel};
